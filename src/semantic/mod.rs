//! Semantic analysis support
//!
//! Checks run inline while the parser builds the AST; there is no separate pass.
//! - [`types`]: data types and per-expression metadata
//! - [`symtable`]: symbol tables and the scope stack
//! - [`checks`]: operand validation, literal retyping, constant folding, assignability
//! - [`builtins`]: the `ifj.*` standard library signatures

pub mod builtins;
pub mod checks;
pub mod symtable;
pub mod types;
