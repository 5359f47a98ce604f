//! Dependency manifest parsing

pub mod ast;
pub mod grammar;

pub use ast::*;
pub use grammar::{load_manifest, parse_manifest};
