//! CLI command implementations.

pub mod check;
pub mod serve;

pub use check::check_site;
pub use serve::serve_site;
