//! Balance report parsing and the command that produces it

pub mod command;
pub mod parser;

pub use command::*;
pub use parser::*;
