//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! token helpers, the function context, and the program entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a recursive descent parser that pulls tokens lazily from the
//! [`Lexer`], keeping exactly one token of lookahead in `current`:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: prolog, signature pre-pass, functions and variable declarations
//! - `statements`: statements, blocks and calls
//! - `expressions`: the operator-precedence expression parser
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state. Semantic checks run while parsing,
//! so the scope stack and the function table live here too.

use crate::errors::CompileError;
use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::semantic::symtable::{ScopeStack, SymbolTable};
use crate::semantic::types::{ExprInfo, TypeSpec};
use std::rc::Rc;

/// The function whose body is being parsed
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub(crate) name: Rc<str>,
    pub(crate) return_type: Option<TypeSpec>,
}

/// Recursive descent parser for IFJ24
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) current: Token,
    pub(crate) scopes: ScopeStack,
    pub(crate) functions: SymbolTable,
    pub(crate) context: Option<FunctionContext>,
    source: Rc<str>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, CompileError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            scopes: ScopeStack::new(),
            functions: SymbolTable::new(),
            context: None,
            source: Rc::from(source),
        })
    }

    /// Parse the entire program: prolog, then function definitions
    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        self.functions = Self::collect_signatures(&self.source)?;
        self.parse_prolog()?;

        let mut program = Program::new();
        while !self.is_at_end() {
            program.functions.push(self.parse_function()?);
        }

        self.check_main()?;
        Ok(program)
    }

    // ===== Helper methods =====

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> Result<bool, CompileError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the current token and return it
    pub(crate) fn advance(&mut self) -> Result<Token, CompileError> {
        let next = if self.is_at_end() {
            self.current.clone()
        } else {
            self.lexer.next_token()?
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.current.location
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: TokenKind,
        message: &str,
    ) -> Result<Token, CompileError> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(CompileError::syntax(
                format!("{}, found {}", message, self.current),
                self.current_location(),
            ))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<Token, CompileError> {
        self.expect_token(TokenKind::LParen, &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<Token, CompileError> {
        self.expect_token(TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<Token, CompileError> {
        self.expect_token(TokenKind::LBrace, &format!("Expected '{{' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<Token, CompileError> {
        self.expect_token(TokenKind::RBrace, &format!("Expected '}}' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<Token, CompileError> {
        self.expect_token(TokenKind::Semicolon, &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<(Rc<str>, SourceLocation), CompileError> {
        match (&self.current.kind, &self.current.lexeme) {
            (TokenKind::Ident, Some(name)) => {
                let name = Rc::clone(name);
                let location = self.current_location();
                self.advance()?;
                Ok((name, location))
            }
            _ => Err(CompileError::syntax(
                format!("Expected identifier, found {}", self.current),
                self.current_location(),
            )),
        }
    }

    pub(crate) fn function_context(&self) -> Result<&FunctionContext, CompileError> {
        self.context.as_ref().ok_or_else(|| {
            CompileError::internal("statement outside of a function", self.current_location())
        })
    }
}

/// Parse a single expression against a prepared scope stack.
///
/// The whole input must be one expression. The scopes are handed back to the caller
/// with any `used` flags the expression set.
pub fn parse_expression_str(
    source: &str,
    scopes: &mut ScopeStack,
) -> Result<(Expr, ExprInfo), CompileError> {
    let mut parser = Parser::new(source)?;
    parser.scopes = std::mem::take(scopes);

    let result = parser.parse_expression().and_then(|parsed| {
        if parser.is_at_end() {
            Ok(parsed)
        } else {
            Err(CompileError::syntax(
                format!("Unexpected {} after expression", parser.current),
                parser.current_location(),
            ))
        }
    });

    *scopes = std::mem::take(&mut parser.scopes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::semantic::types::DataType;

    const PROLOG: &str = "const ifj = @import(\"ifj24.zig\");\n";

    #[test]
    fn test_parse_simple_function() {
        let source = format!("{PROLOG}pub fn main() void {{ return; }}");
        let mut parser = Parser::new(&source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.functions.len(), 1);
        let main = &program.functions[0];
        assert_eq!(&*main.name, "main");
        assert!(main.params.is_empty());
        assert_eq!(main.return_type, None);
        assert_eq!(main.body.len(), 1);
    }

    #[test]
    fn test_parse_expression_with_scope() {
        let source = format!(
            "{PROLOG}pub fn main() void {{ var x: f64 = 1 + 2 * 3; _ = x; }}"
        );
        let mut parser = Parser::new(&source).unwrap();
        let program = parser.parse_program().unwrap();

        match &program.functions[0].body[0] {
            Stmt::VarDecl { ty, value, .. } => {
                assert_eq!(ty.base, DataType::F64);
                assert_eq!(value.to_string(), "(+ 1.0 (* 2.0 3.0))");
            }
            other => panic!("Expected variable declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_semicolon_is_syntax_error() {
        let source = format!("{PROLOG}pub fn main() void {{ var x = 1 _ = x; }}");
        let mut parser = Parser::new(&source).unwrap();
        let err = parser.parse_program().unwrap_err();

        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_trailing_tokens_after_expression() {
        let mut scopes = ScopeStack::new();
        let err = parse_expression_str("1 + 2 ;", &mut scopes).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }
}
