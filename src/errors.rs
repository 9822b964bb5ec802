//! Compile error types
//!
//! This module defines [`CompileError`], the single error type that travels from every
//! phase of the compiler up to the driver, and [`ErrorKind`], the category that decides
//! the process exit status.
//!
//! All compile errors are fatal: the first one wins and no code is emitted.

use crate::parser::ast::SourceLocation;
use crate::parser::lexer::LexError;
use std::fmt;

/// Error categories, each with a fixed exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed literal, unterminated string, invalid character
    Lexical,
    /// Grammar violation, malformed expression, mismatched brackets
    Syntax,
    /// Identifier or function never declared
    Undefined,
    /// Argument count/type mismatch, return value type mismatch, discarded result
    Signature,
    /// Duplicate declaration in one scope, or assignment to a constant
    Redefinition,
    /// Missing or superfluous return expression
    Return,
    /// Operand type or nullability incompatibility
    Type,
    /// Type cannot be inferred from the initializer
    Inference,
    /// Variable never referenced before its scope closed
    Unused,
    /// Any other semantic rule
    Semantic,
    /// Unreachable compiler state
    Internal,
}

impl ErrorKind {
    /// Process exit status reported for this kind of error
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Lexical => 1,
            ErrorKind::Syntax => 2,
            ErrorKind::Undefined => 3,
            ErrorKind::Signature => 4,
            ErrorKind::Redefinition => 5,
            ErrorKind::Return => 6,
            ErrorKind::Type => 7,
            ErrorKind::Inference => 8,
            ErrorKind::Unused => 9,
            ErrorKind::Semantic => 10,
            ErrorKind::Internal => 99,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Undefined => "undefined symbol",
            ErrorKind::Signature => "signature mismatch",
            ErrorKind::Redefinition => "redefinition",
            ErrorKind::Return => "return error",
            ErrorKind::Type => "type error",
            ErrorKind::Inference => "type inference error",
            ErrorKind::Unused => "unused variable",
            ErrorKind::Semantic => "semantic error",
            ErrorKind::Internal => "internal compiler error",
        };
        write!(f, "{}", name)
    }
}

/// A fatal compile error with its source position
#[derive(Debug, Clone)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        CompileError {
            kind,
            message: message.into(),
            location: Some(location),
        }
    }

    /// Error that cannot be pinned to a single token (e.g. missing `main`)
    pub fn global(kind: ErrorKind, message: impl Into<String>) -> Self {
        CompileError {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Syntax, message, location)
    }

    pub fn type_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Type, message, location)
    }

    pub fn internal(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Internal, message, location)
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(
                f,
                "{} at line {}, column {}: {}",
                self.kind, location.line, location.column, self.message
            ),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::new(ErrorKind::Lexical, err.message, err.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let kinds = [
            ErrorKind::Lexical,
            ErrorKind::Syntax,
            ErrorKind::Undefined,
            ErrorKind::Signature,
            ErrorKind::Redefinition,
            ErrorKind::Return,
            ErrorKind::Type,
            ErrorKind::Inference,
            ErrorKind::Unused,
            ErrorKind::Semantic,
            ErrorKind::Internal,
        ];
        let mut codes: Vec<i32> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert_eq!(ErrorKind::Internal.exit_code(), 99);
    }

    #[test]
    fn test_display_with_location() {
        let err = CompileError::type_error("cannot add []u8", SourceLocation::new(3, 7));
        assert_eq!(
            err.to_string(),
            "type error at line 3, column 7: cannot add []u8"
        );
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_lex_error_converts_to_lexical() {
        let lex = LexError {
            message: "Unterminated string literal".to_string(),
            location: SourceLocation::new(1, 4),
        };
        let err: CompileError = lex.into();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.location, Some(SourceLocation::new(1, 4)));
    }
}
