//! View-side state that sits between the layout engine and a frontend:
//! drill-down navigation and card preview selection.

pub mod navigation;
pub mod selection;

pub use navigation::{resolve_path, NavigationState};
pub use selection::{Selection, SelectionState};
