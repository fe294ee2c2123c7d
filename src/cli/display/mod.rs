//! Display helpers for record tables.

pub mod colors;
pub mod table;

pub use colors::colorize_level;
pub use table::{record_table, render_page};
