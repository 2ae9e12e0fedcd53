//! Thin terminal host: stdin lines in, numbered window lists out.

pub mod terminal;

pub use terminal::run;
