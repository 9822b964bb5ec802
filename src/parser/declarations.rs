//! Declaration parsing implementation
//!
//! This module handles parsing of declarations in IFJ24 programs:
//!
//! - The prolog: `const ifj = @import("ifj24.zig");`
//! - Function definitions: `pub fn name(params) type { ... }`
//! - Types: `i32`, `f64`, `[]u8`, optionally prefixed by `?`
//! - Variable declarations: `const x: i32 = 1;`, `var y = 2.5;`
//!
//! Functions may be called before they are defined, so a signature pre-pass scans the
//! source once for `pub fn` headers and fills the function table before parsing begins.
//!
//! # Grammar
//!
//! ```text
//! program   ::= prolog fn_decl* EOF
//! prolog    ::= "const" "ifj" "=" "@import" "(" STRING ")" ";"
//! fn_decl   ::= "pub" "fn" identifier "(" params ")" ret_type "{" statement* "}"
//! params    ::= (identifier ":" type ("," identifier ":" type)* ","?)?
//! ret_type  ::= type | "void"
//! type      ::= "?"? ("i32" | "f64" | "[" "]" "u8")
//! var_decl  ::= ("const" | "var") identifier (":" type)? "=" expression ";"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::constants::{MAIN_FUNCTION, PROLOG_MODULE, STDLIB_NAMESPACE};
use crate::errors::{CompileError, ErrorKind};
use crate::parser::ast::*;
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::parse::{FunctionContext, Parser};
use crate::semantic::checks::{check_assignable, fold, infer_type};
use crate::semantic::symtable::{FunctionEntry, Symbol, SymbolTable, VariableEntry};
use crate::semantic::types::{DataType, TypeSpec};
use std::rc::Rc;

impl Parser {
    /// Parse `const ifj = @import("ifj24.zig");`
    pub(crate) fn parse_prolog(&mut self) -> Result<(), CompileError> {
        self.expect_token(TokenKind::Const, "Expected prolog 'const ifj = @import(...)'")?;
        let (namespace, location) = self.expect_identifier()?;
        if &*namespace != STDLIB_NAMESPACE {
            return Err(CompileError::syntax(
                format!("Prolog must bind '{}', found '{}'", STDLIB_NAMESPACE, namespace),
                location,
            ));
        }
        self.expect_token(TokenKind::Eq, "Expected '=' in prolog")?;
        self.expect_token(TokenKind::Import, "Expected '@import' in prolog")?;
        self.expect_lparen("after '@import'")?;

        let module = self.expect_token(TokenKind::StringLiteral, "Expected module name")?;
        if module.text() != PROLOG_MODULE {
            return Err(CompileError::syntax(
                format!("Prolog must import \"{}\"", PROLOG_MODULE),
                module.location,
            ));
        }

        self.expect_rparen("after module name")?;
        self.expect_semicolon("after prolog")?;
        Ok(())
    }

    /// Parse one function definition
    pub(crate) fn parse_function(&mut self) -> Result<FuncDecl, CompileError> {
        let location = self.current_location();
        self.expect_token(TokenKind::Pub, "Expected 'pub fn'")?;
        self.expect_token(TokenKind::Fn, "Expected 'fn' after 'pub'")?;
        let (name, _) = self.expect_identifier()?;

        self.expect_lparen("after function name")?;
        let raw_params = self.parse_params()?;
        self.expect_rparen("after parameters")?;
        let return_type = self.parse_return_type()?;

        self.context = Some(FunctionContext {
            name: Rc::clone(&name),
            return_type,
        });
        self.scopes.reset_slots();
        self.scopes.push_scope();

        let mut params = Vec::with_capacity(raw_params.len());
        for (param_name, ty, param_location) in raw_params {
            let slot = self.scopes.fresh_slot(&param_name);
            let entry = VariableEntry::parameter(ty, Rc::clone(&slot), param_location);
            self.scopes
                .declare(Rc::clone(&param_name), Symbol::Variable(entry))?;
            params.push(Param {
                name: param_name,
                slot,
                ty,
                location: param_location,
            });
        }

        self.expect_lbrace("before function body")?;
        let body = self.parse_block_statements()?;
        self.expect_rbrace("after function body")?;

        if return_type.is_some() && !block_returns(&body) {
            return Err(CompileError::new(
                ErrorKind::Return,
                format!("function '{}' may end without returning a value", name),
                location,
            ));
        }

        let scope = self.scopes.pop_scope()?;
        self.context = None;

        Ok(FuncDecl {
            name,
            params,
            return_type,
            body,
            scope,
            location,
        })
    }

    /// Parse parameter list (without the surrounding parentheses)
    fn parse_params(&mut self) -> Result<Vec<(Rc<str>, TypeSpec, SourceLocation)>, CompileError> {
        let mut params = Vec::new();

        while !self.check(TokenKind::RParen) {
            let (name, location) = self.expect_identifier()?;
            self.expect_token(TokenKind::Colon, "Expected ':' after parameter name")?;
            let ty = self.parse_type()?;
            params.push((name, ty, location));

            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        Ok(params)
    }

    /// Parse a return type; `None` for `void`
    fn parse_return_type(&mut self) -> Result<Option<TypeSpec>, CompileError> {
        if self.match_token(TokenKind::Void)? {
            Ok(None)
        } else {
            self.parse_type().map(Some)
        }
    }

    /// Parse a value type: `?`? (`i32` | `f64` | `[]u8`)
    pub(crate) fn parse_type(&mut self) -> Result<TypeSpec, CompileError> {
        let nullable = self.match_token(TokenKind::Question)?;

        let base = match self.current.kind {
            TokenKind::I32 => {
                self.advance()?;
                DataType::I32
            }
            TokenKind::F64 => {
                self.advance()?;
                DataType::F64
            }
            TokenKind::LBracket => {
                self.advance()?;
                self.expect_token(TokenKind::RBracket, "Expected ']' in slice type")?;
                self.expect_token(TokenKind::U8, "Expected 'u8' after '[]'")?;
                DataType::U8Slice
            }
            _ => {
                return Err(CompileError::syntax(
                    format!("Expected type, found {}", self.current),
                    self.current_location(),
                ))
            }
        };

        Ok(TypeSpec { base, nullable })
    }

    /// Parse `const`/`var` declaration; the keyword is the current token
    pub(crate) fn parse_var_declaration(&mut self) -> Result<Stmt, CompileError> {
        let is_const = self.check(TokenKind::Const);
        self.advance()?;
        let (name, location) = self.expect_identifier()?;

        let declared = if self.match_token(TokenKind::Colon)? {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect_token(TokenKind::Eq, "Expected '=' in variable declaration")?;
        let (mut value, info) = self.parse_expression()?;
        self.expect_semicolon("after variable declaration")?;

        let ty = match declared {
            Some(ty) => {
                check_assignable(ty, &mut value, &info, ErrorKind::Type)?;
                ty
            }
            None => infer_type(&value, &info)?,
        };

        let known_value = if is_const && info.known && !ty.nullable && ty.base.is_numeric() {
            fold(&value)
        } else {
            None
        };
        if let Some(literal) = &known_value {
            value = Expr::Literal(literal.clone(), value.location());
        }

        let slot = self.scopes.fresh_slot(&name);
        let entry = VariableEntry {
            is_const,
            known_value,
            ..VariableEntry::new(ty, Rc::clone(&slot), location)
        };
        self.scopes
            .declare(Rc::clone(&name), Symbol::Variable(entry))?;

        Ok(Stmt::VarDecl {
            name,
            slot,
            ty,
            is_const,
            value,
            location,
        })
    }

    /// `pub fn main() void` must exist
    pub(crate) fn check_main(&self) -> Result<(), CompileError> {
        let main = self
            .functions
            .get(MAIN_FUNCTION)
            .and_then(Symbol::as_function)
            .ok_or_else(|| {
                CompileError::global(ErrorKind::Undefined, "missing 'pub fn main() void'")
            })?;

        if !main.params.is_empty() || main.return_type.is_some() {
            return Err(CompileError::new(
                ErrorKind::Signature,
                "'main' must take no parameters and return void",
                main.location,
            ));
        }

        Ok(())
    }

    /// Scan the source for `pub fn` headers and build the function table.
    ///
    /// Malformed headers and lexical errors are skipped here; the main pass reports them
    /// at their position.
    pub(crate) fn collect_signatures(source: &str) -> Result<SymbolTable, CompileError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            // every failed token consumes input, so this reaches Eof
            let Ok(token) = lexer.next_token() else {
                continue;
            };
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        let mut table = SymbolTable::new();
        let mut scanner = SignatureScanner { tokens, position: 0 };
        while let Some((name, entry)) = scanner.next_header() {
            let location = entry.location;
            if !table.insert(Rc::clone(&name), Symbol::Function(entry)) {
                return Err(CompileError::new(
                    ErrorKind::Redefinition,
                    format!("function '{}' is defined more than once", name),
                    location,
                ));
            }
        }

        Ok(table)
    }
}

/// Cursor over pre-lexed tokens used by the signature pre-pass
struct SignatureScanner {
    tokens: Vec<Token>,
    position: usize,
}

impl SignatureScanner {
    /// Find the next top-level header
    fn next_header(&mut self) -> Option<(Rc<str>, FunctionEntry)> {
        let mut depth: usize = 0;
        while self.position < self.tokens.len() {
            let kind = self.tokens[self.position].kind;
            self.position += 1;
            match kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                TokenKind::Pub if depth == 0 => {
                    let start = self.position;
                    if let Some(header) = self.header() {
                        return Some(header);
                    }
                    self.position = start;
                }
                _ => {}
            }
        }
        None
    }

    fn header(&mut self) -> Option<(Rc<str>, FunctionEntry)> {
        self.eat(TokenKind::Fn)?;
        let name_token = self.eat(TokenKind::Ident)?;
        let name = name_token.lexeme.clone()?;
        let location = name_token.location;
        self.eat(TokenKind::LParen)?;

        let mut params = Vec::new();
        while self.peek()? != TokenKind::RParen {
            let param = self.eat(TokenKind::Ident)?.lexeme.clone()?;
            self.eat(TokenKind::Colon)?;
            params.push((param, self.value_type()?));
            if self.peek()? == TokenKind::Comma {
                self.position += 1;
            } else {
                break;
            }
        }
        self.eat(TokenKind::RParen)?;

        let return_type = if self.peek()? == TokenKind::Void {
            self.position += 1;
            None
        } else {
            Some(self.value_type()?)
        };

        Some((
            name,
            FunctionEntry {
                params,
                return_type,
                location,
            },
        ))
    }

    fn value_type(&mut self) -> Option<TypeSpec> {
        let nullable = self.peek()? == TokenKind::Question;
        if nullable {
            self.position += 1;
        }
        let base = match self.peek()? {
            TokenKind::I32 => DataType::I32,
            TokenKind::F64 => DataType::F64,
            TokenKind::LBracket => {
                self.position += 1;
                self.eat(TokenKind::RBracket)?;
                if self.peek()? != TokenKind::U8 {
                    return None;
                }
                DataType::U8Slice
            }
            _ => return None,
        };
        self.position += 1;
        Some(TypeSpec { base, nullable })
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.position).map(|token| token.kind)
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&Token> {
        let token = self.tokens.get(self.position)?;
        if token.kind != kind {
            return None;
        }
        self.position += 1;
        self.tokens.get(self.position - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROLOG: &str = "const ifj = @import(\"ifj24.zig\");\n";

    fn compile(body: &str) -> Result<Program, CompileError> {
        let source = format!("{PROLOG}{body}");
        Parser::new(&source)?.parse_program()
    }

    #[test]
    fn test_signature_prepass_allows_forward_calls() {
        let program = compile(
            "pub fn main() void { const r = twice(21); _ = r; }\n\
             pub fn twice(x: i32) i32 { return x * 2; }",
        )
        .unwrap();
        assert_eq!(program.functions.len(), 2);
        assert_eq!(program.functions[1].params.len(), 1);
    }

    #[test]
    fn test_signature_table_contents() {
        let table = Parser::collect_signatures(
            "pub fn f(a: ?i32, b: []u8,) ?f64 { return null; }\npub fn main() void {}",
        )
        .unwrap();
        let f = table.get("f").and_then(Symbol::as_function).unwrap();

        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].1, TypeSpec::nullable(DataType::I32));
        assert_eq!(f.params[1].1, TypeSpec::new(DataType::U8Slice));
        assert_eq!(f.return_type, Some(TypeSpec::nullable(DataType::F64)));
        assert_eq!(f.location.line, 1);
    }

    #[test]
    fn test_signature_table_skips_bad_characters() {
        let table = Parser::collect_signatures(
            "pub fn bar() void { var s = 1 # 2; }\npub fn foo(n: i32) void {}",
        )
        .unwrap();
        let foo = table.get("foo").and_then(Symbol::as_function).unwrap();
        assert_eq!(foo.params.len(), 1);
        assert_eq!(foo.location.line, 2);
    }

    #[test]
    fn test_duplicate_function_is_redefinition() {
        let err = compile("pub fn main() void {}\npub fn main() void {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Redefinition);
    }

    #[test]
    fn test_missing_main() {
        let err = compile("pub fn helper() void {}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Undefined);
    }

    #[test]
    fn test_main_with_wrong_signature() {
        let err = compile("pub fn main() i32 { return 0; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);
    }

    #[test]
    fn test_bad_prolog() {
        let source = "const ifj = @import(\"other.zig\");\npub fn main() void {}";
        let err = Parser::new(source).unwrap().parse_program().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
    }

    #[test]
    fn test_missing_return_path() {
        let err = compile(
            "pub fn f(x: i32) i32 { if (x > 0) { return 1; } }\npub fn main() void {}",
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Return);
    }

    #[test]
    fn test_const_declaration_is_folded() {
        let program =
            compile("pub fn main() void { const a = 2 * 3; var b: f64 = a + 1; _ = b; }")
                .unwrap();

        match &program.functions[0].body[1] {
            Stmt::VarDecl { value, ty, .. } => {
                assert_eq!(ty.base, DataType::F64);
                assert_eq!(value.to_string(), "(+ 6.0 1.0)");
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_null_initializer_needs_type() {
        let err = compile("pub fn main() void { var x = null; _ = x; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Inference);
    }

    #[test]
    fn test_declaration_type_mismatch() {
        let err = compile("pub fn main() void { var x: i32 = \"s\"; _ = x; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }
}
