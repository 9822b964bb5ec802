//! # Introduction
//!
//! ifjc compiles IFJ24, a small statically typed subset of Zig, into IFJcode24, a
//! textual stack-machine assembly with global, local and temporary frames.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser (+ inline semantic checks) → AST → Code generator → IFJcode24
//! ```
//!
//! 1. [`parser`]: pulls tokens from the lexer and builds the AST. Declarations and
//!    statements use recursive descent; expressions use an operator-precedence
//!    shift/reduce parser that type-checks each reduction.
//! 2. [`semantic`]: types, symbol tables with a scope stack, operand validation,
//!    literal retyping and constant folding, builtin signatures.
//! 3. [`codegen`]: walks the AST and emits IFJcode24 text.
//! 4. [`errors`]: the [`errors::CompileError`] type and its exit codes.
//!
//! Compilation stops at the first error; no code is produced for a faulty program.

pub mod codegen;
pub mod constants;
pub mod errors;
pub mod parser;
pub mod semantic;

use errors::CompileError;
use parser::parse::Parser;

/// Compile IFJ24 source into IFJcode24 text
pub fn compile(source: &str) -> Result<String, CompileError> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    Ok(codegen::generate(&program))
}
