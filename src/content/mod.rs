//! Card content processing: HTML sanitizing, TeX typesetting, and the
//! line-oriented protocol that exposes both over stdio.

pub mod agent;
pub mod protocol;
pub mod sanitize;
pub mod typeset;

pub use agent::ContentAgent;
pub use sanitize::sanitize;
pub use typeset::typeset;
