pub mod parse;
pub mod persist;
