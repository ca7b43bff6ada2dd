pub mod csv;
pub mod extract;
pub mod layout;

pub use csv::{Row, parse_line, parse_sheet};
