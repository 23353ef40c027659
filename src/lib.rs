// Core library for retmap: fetch a flashcard dataset, compute per-card
// retention statistics, and lay the collection out as a squarified treemap.
// Presentation (SVG/canvas/terminal) is a consumer concern.

pub mod color;
pub mod content;
pub mod errors;
pub mod fetch;
pub mod layout;
pub mod options;
pub mod retention;
pub mod tree;
pub mod view;

pub use errors::RetmapError;
pub use options::{ColorStyle, DisplayOptions, ValueMetric, WeightMetric};
