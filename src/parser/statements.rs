//! Statement parsing implementation
//!
//! This module handles parsing of all IFJ24 statement types:
//!
//! - Variable declarations: `var x: i32 = 42;` (see `declarations`)
//! - Assignments and discards: `x = x + 1;`, `_ = f();`
//! - Control flow: `if`/`else`, `while`, both with the optional `|x|` null unwrap
//! - `return` with or without a value
//! - Call statements: `f(a, b);`, `ifj.write(x);`
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | assign | discard | call_stmt | if_stmt | while_stmt | return_stmt
//! assign    ::= identifier "=" expression ";"
//! discard   ::= "_" "=" expression ";"
//! call_stmt ::= call ";"
//! call      ::= (identifier | "ifj" "." identifier) "(" (expression ("," expression)* ","?)? ")"
//! if_stmt   ::= "if" "(" expression ")" ("|" identifier "|")? block ("else" block)?
//! while_stmt ::= "while" "(" expression ")" ("|" identifier "|")? block
//! return_stmt ::= "return" expression? ";"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::constants::STDLIB_NAMESPACE;
use crate::errors::{CompileError, ErrorKind};
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::semantic::builtins::{Builtin, ParamKind};
use crate::semantic::checks::check_assignable;
use crate::semantic::symtable::{Symbol, VariableEntry};
use crate::semantic::types::{DataType, ExprInfo, TypeSpec};
use std::rc::Rc;

/// Variable introduced by `|name|` for the then-branch or loop body
struct Binding {
    name: Rc<str>,
    slot: Rc<str>,
    ty: TypeSpec,
    location: SourceLocation,
}

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, CompileError> {
        match self.current.kind {
            TokenKind::Const | TokenKind::Var => self.parse_var_declaration(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Underscore => self.parse_discard_statement(),
            TokenKind::Ident => {
                let (name, location) = self.expect_identifier()?;
                match self.current.kind {
                    TokenKind::Eq => self.parse_assignment(name, location),
                    TokenKind::LParen | TokenKind::Dot => self.parse_call_statement(name, location),
                    _ => Err(CompileError::syntax(
                        format!("Expected '=' or '(' after '{}', found {}", name, self.current),
                        self.current_location(),
                    )),
                }
            }
            _ => Err(CompileError::syntax(
                format!("Expected statement, found {}", self.current),
                self.current_location(),
            )),
        }
    }

    /// `name = expression;` with the identifier already consumed
    fn parse_assignment(
        &mut self,
        name: Rc<str>,
        location: SourceLocation,
    ) -> Result<Stmt, CompileError> {
        let (target, slot) = match self.scopes.lookup_variable(&name) {
            Some(entry) if entry.is_const || entry.is_param => {
                return Err(CompileError::new(
                    ErrorKind::Redefinition,
                    format!("cannot assign to constant '{}'", name),
                    location,
                ))
            }
            Some(entry) => (entry.ty, Rc::clone(&entry.slot)),
            None => {
                return Err(CompileError::new(
                    ErrorKind::Undefined,
                    format!("undefined variable '{}'", name),
                    location,
                ))
            }
        };

        self.expect_token(TokenKind::Eq, "Expected '=' in assignment")?;
        let (mut value, info) = self.parse_expression()?;
        self.expect_semicolon("after assignment")?;
        check_assignable(target, &mut value, &info, ErrorKind::Type)?;

        Ok(Stmt::Assign {
            name,
            slot,
            value,
            location,
        })
    }

    /// `_ = expression;`
    fn parse_discard_statement(&mut self) -> Result<Stmt, CompileError> {
        let location = self.current_location();
        self.advance()?;
        self.expect_token(TokenKind::Eq, "Expected '=' after '_'")?;
        let (value, info) = self.parse_expression()?;
        self.expect_semicolon("after discarded expression")?;

        if info.ty == DataType::Void || value.is_relational() {
            return Err(CompileError::type_error(
                "discarded expression has no value",
                value.location(),
            ));
        }

        Ok(Stmt::Discard { value, location })
    }

    /// A call whose result is not used
    fn parse_call_statement(
        &mut self,
        name: Rc<str>,
        location: SourceLocation,
    ) -> Result<Stmt, CompileError> {
        let call = self.parse_call(name, location)?;
        self.expect_semicolon("after call")?;

        if call.return_type.is_some() {
            return Err(CompileError::new(
                ErrorKind::Signature,
                format!("result of '{}' must be used or discarded with '_ ='", call.name),
                location,
            ));
        }

        Ok(Stmt::Call(call))
    }

    /// Parse if statement; the `if` keyword is the current token
    fn parse_if_statement(&mut self) -> Result<Stmt, CompileError> {
        let location = self.current_location();
        self.advance()?;
        let (condition, binding) = self.parse_condition("if")?;

        let then_block = self.parse_block(binding)?;
        let else_block = if self.match_token(TokenKind::Else)? {
            Some(self.parse_block(None)?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
            location,
        })
    }

    /// Parse while statement; the `while` keyword is the current token
    fn parse_while_statement(&mut self) -> Result<Stmt, CompileError> {
        let location = self.current_location();
        self.advance()?;
        let (condition, binding) = self.parse_condition("while")?;
        let body = self.parse_block(binding)?;

        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    /// `( expression ) [|name|]`
    fn parse_condition(
        &mut self,
        keyword: &str,
    ) -> Result<(Condition, Option<Binding>), CompileError> {
        self.expect_lparen(&format!("after '{}'", keyword))?;
        let (value, info) = self.parse_expression()?;
        self.expect_rparen(&format!("after {} condition", keyword))?;

        if !self.match_token(TokenKind::Pipe)? {
            if !value.is_relational() {
                return Err(CompileError::type_error(
                    format!("{} condition must be a comparison", keyword),
                    value.location(),
                ));
            }
            return Ok((Condition::Relational(value), None));
        }

        let (name, location) = self.expect_identifier()?;
        self.expect_token(TokenKind::Pipe, "Expected '|' after binding name")?;

        if !info.nullable || info.ty == DataType::Null || value.is_relational() {
            return Err(CompileError::type_error(
                format!("'|{}|' needs a nullable value", name),
                value.location(),
            ));
        }

        let slot = self.scopes.fresh_slot(&name);
        let binding = Binding {
            name,
            slot: Rc::clone(&slot),
            ty: TypeSpec::new(info.ty),
            location,
        };
        Ok((
            Condition::Unwrap {
                value,
                binding: slot,
            },
            Some(binding),
        ))
    }

    /// Parse `{ statements }` in a fresh scope, declaring the unwrap binding first
    fn parse_block(&mut self, binding: Option<Binding>) -> Result<Block, CompileError> {
        self.expect_lbrace("to open block")?;
        self.scopes.push_scope();

        if let Some(binding) = binding {
            let entry = VariableEntry {
                is_const: true,
                ..VariableEntry::new(binding.ty, binding.slot, binding.location)
            };
            self.scopes
                .declare(binding.name, Symbol::Variable(entry))?;
        }

        let statements = self.parse_block_statements()?;
        self.expect_rbrace("to close block")?;
        let scope = self.scopes.pop_scope()?;

        Ok(Block { statements, scope })
    }

    /// Parse return statement; the `return` keyword is the current token
    fn parse_return_statement(&mut self) -> Result<Stmt, CompileError> {
        let location = self.current_location();
        self.advance()?;
        let context = self.function_context()?.clone();

        if self.match_token(TokenKind::Semicolon)? {
            if context.return_type.is_some() {
                return Err(CompileError::new(
                    ErrorKind::Return,
                    format!("'{}' must return a value", context.name),
                    location,
                ));
            }
            return Ok(Stmt::Return {
                value: None,
                location,
            });
        }

        let (mut value, info) = self.parse_expression()?;
        self.expect_semicolon("after return value")?;

        let target = context.return_type.ok_or_else(|| {
            CompileError::new(
                ErrorKind::Return,
                format!("void function '{}' cannot return a value", context.name),
                location,
            )
        })?;
        check_assignable(target, &mut value, &info, ErrorKind::Signature)?;

        Ok(Stmt::Return {
            value: Some(value),
            location,
        })
    }

    /// Parse a call with its callee name already consumed.
    ///
    /// The current token is `(` for user functions or `.` for `ifj.name(...)`.
    pub(crate) fn parse_call(
        &mut self,
        name: Rc<str>,
        location: SourceLocation,
    ) -> Result<FuncCall, CompileError> {
        if self.match_token(TokenKind::Dot)? {
            if &*name != STDLIB_NAMESPACE {
                return Err(CompileError::new(
                    ErrorKind::Undefined,
                    format!("undefined namespace '{}'", name),
                    location,
                ));
            }
            let (member, member_location) = self.expect_identifier()?;
            let builtin = Builtin::from_name(&member).ok_or_else(|| {
                CompileError::new(
                    ErrorKind::Undefined,
                    format!("'{}.{}' is not a standard library function", name, member),
                    member_location,
                )
            })?;
            return self.parse_builtin_call(builtin, member, location);
        }

        let (params, return_type) = match self.functions.get(&name).and_then(Symbol::as_function) {
            Some(entry) => (entry.params.clone(), entry.return_type),
            None => {
                return Err(CompileError::new(
                    ErrorKind::Undefined,
                    format!("undefined function '{}'", name),
                    location,
                ))
            }
        };

        let mut args = self.parse_arguments()?;
        if args.len() != params.len() {
            return Err(CompileError::new(
                ErrorKind::Signature,
                format!(
                    "'{}' takes {} argument(s), {} given",
                    name,
                    params.len(),
                    args.len()
                ),
                location,
            ));
        }
        for ((value, info), (_, ty)) in args.iter_mut().zip(&params) {
            check_assignable(*ty, value, info, ErrorKind::Signature)?;
        }

        Ok(FuncCall {
            name,
            builtin: None,
            args: args.into_iter().map(|(value, _)| value).collect(),
            return_type,
            location,
        })
    }

    fn parse_builtin_call(
        &mut self,
        builtin: Builtin,
        name: Rc<str>,
        location: SourceLocation,
    ) -> Result<FuncCall, CompileError> {
        let mut args = self.parse_arguments()?;
        let params = builtin.params();
        if args.len() != params.len() {
            return Err(CompileError::new(
                ErrorKind::Signature,
                format!(
                    "'{}' takes {} argument(s), {} given",
                    builtin,
                    params.len(),
                    args.len()
                ),
                location,
            ));
        }

        for ((value, info), kind) in args.iter_mut().zip(params) {
            match kind {
                ParamKind::Any => {
                    if info.ty == DataType::Void || value.is_relational() {
                        return Err(CompileError::new(
                            ErrorKind::Signature,
                            format!("'{}' needs a value argument", builtin),
                            value.location(),
                        ));
                    }
                }
                ParamKind::Typed(ty) => {
                    check_assignable(TypeSpec::new(*ty), value, info, ErrorKind::Signature)?
                }
            }
        }

        Ok(FuncCall {
            name,
            builtin: Some(builtin),
            args: args.into_iter().map(|(value, _)| value).collect(),
            return_type: builtin.return_type(),
            location,
        })
    }

    /// `( expression, ... )`, trailing comma allowed
    fn parse_arguments(&mut self) -> Result<Vec<(Expr, ExprInfo)>, CompileError> {
        self.expect_lparen("before arguments")?;
        let mut args = Vec::new();

        while !self.check(TokenKind::RParen) {
            args.push(self.parse_expression()?);
            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROLOG: &str = "const ifj = @import(\"ifj24.zig\");\n";

    fn compile_main(body: &str) -> Result<Program, CompileError> {
        let source = format!("{PROLOG}pub fn main() void {{\n{body}\n}}");
        Parser::new(&source)?.parse_program()
    }

    fn main_body(body: &str) -> Vec<Stmt> {
        compile_main(body).unwrap().functions.remove(0).body
    }

    #[test]
    fn test_parse_if_else() {
        let body = main_body("var a = 1; if (a < 2) { a = 3; } else { a = 4; }");
        match &body[1] {
            Stmt::If {
                condition: Condition::Relational(cond),
                else_block: Some(_),
                ..
            } => assert_eq!(cond.to_string(), "(< a 2)"),
            other => panic!("Expected if/else, got {:?}", other),
        }
    }

    #[test]
    fn test_unwrap_binding_is_scoped_to_then_block() {
        let body = main_body(
            "const input = ifj.readi32();\n\
             if (input) |v| { ifj.write(v); } else { ifj.write(0); }",
        );
        match &body[1] {
            Stmt::If {
                condition: Condition::Unwrap { binding, .. },
                then_block,
                ..
            } => {
                assert_eq!(&**binding, "v");
                let entry = then_block.scope.get("v").and_then(Symbol::as_variable).unwrap();
                assert_eq!(entry.ty, TypeSpec::new(DataType::I32));
            }
            other => panic!("Expected unwrap if, got {:?}", other),
        }
    }

    #[test]
    fn test_unwrap_needs_nullable() {
        let err = compile_main("const a = 1; if (a) |v| { ifj.write(v); }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_condition_must_be_comparison() {
        let err = compile_main("var a = 1; while (a) { a = a - 1; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Type);
    }

    #[test]
    fn test_assign_to_const() {
        let err = compile_main("const a = 1; a = 2;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Redefinition);
    }

    #[test]
    fn test_discarded_result_is_signature_error() {
        let err = compile_main("ifj.length(\"abc\");").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);
    }

    #[test]
    fn test_builtin_argument_checks() {
        let err = compile_main("ifj.write();").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);

        let err = compile_main("_ = ifj.length(5);").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);

        let body = main_body("const f = ifj.i2f(3); ifj.write(f);");
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_unknown_builtin() {
        let err = compile_main("ifj.print(1);").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Undefined);
    }

    #[test]
    fn test_return_value_in_void_function() {
        let err = compile_main("return 1;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Return);
    }

    #[test]
    fn test_return_type_mismatch() {
        let source = format!(
            "{PROLOG}pub fn f() i32 {{ return \"x\"; }}\npub fn main() void {{}}"
        );
        let err = Parser::new(&source).unwrap().parse_program().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Signature);
    }

    #[test]
    fn test_unused_variable_in_block() {
        let err = compile_main("if (1 < 2) { var x = 5; }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unused);
    }

    #[test]
    fn test_shadowing_in_nested_block() {
        let body = main_body("const x = ifj.readi32(); if (x != null) { const x = 2.5; ifj.write(x); }");
        match &body[1] {
            Stmt::If { then_block, .. } => match &then_block.statements[0] {
                Stmt::VarDecl { slot, .. } => assert_eq!(&**slot, "x$1"),
                other => panic!("Expected declaration, got {:?}", other),
            },
            other => panic!("Expected if, got {:?}", other),
        }
    }
}
