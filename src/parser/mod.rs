//! IFJ24 source code parser
//!
//! This module transforms IFJ24 source text into a type-checked Abstract Syntax Tree:
//! - [`lexer`]: Tokenization (source text → tokens, pulled on demand)
//! - [`parse`]: The [`parse::Parser`] struct and its token helpers
//! - [`precedence`]: Operator-precedence table and expression stack
//! - [`ast`]: AST node definitions
//!
//! Declarations, statements and expressions are parsed by `impl Parser` blocks in
//! private submodules.
//!
//! # Supported IFJ24 Subset
//!
//! - Types: `i32`, `f64`, `[]u8`, each optionally nullable (`?i32`), and `void` returns
//! - Statements: `const`/`var` declarations, assignments, `_ =` discards, `if`/`else`,
//!   `while`, `return`, calls
//! - Expressions: `* / + -` and comparisons, literals, `null`, calls
//! - Standard library through `ifj.*` after the mandatory `@import` prolog
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent for declarations and statements, with an embedded
//! shift/reduce operator-precedence parser for expressions. Semantic checks run inline.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
pub mod precedence;
mod statements;
