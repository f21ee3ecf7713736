//! Java front end: turns source text into the parse trees consumed by the
//! synchronization engine.

mod parser;

pub use parser::JavaParser;
