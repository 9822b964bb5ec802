//! Expression parsing implementation
//!
//! Expressions are parsed bottom-up by an operator-precedence automaton rather than
//! by recursive descent. The statement parser hands over control at each expression
//! position, and the automaton stops at the first token that cannot continue an
//! expression, leaving it as the current token.
//!
//! Type checking happens during reduction: every stack item carries an [`ExprInfo`]
//! describing its subtree, and each binary reduction validates both operands before
//! building the node.
//!
//! # Grammar
//!
//! ```text
//! E ::= E op E | ( E ) | i
//! op ::= * | / | + | - | == | != | < | > | <= | >=
//! i  ::= literal | null | identifier | call
//! ```
//!
//! All parsing methods are implemented as methods on the [`Parser`] struct.

use crate::errors::{CompileError, ErrorKind};
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::parser::precedence::{relation, ExprStack, GrammarSymbol, Relation, StackItem};
use crate::semantic::checks::validate_binary;
use crate::semantic::types::{DataType, ExprInfo, TypeSpec};
use std::rc::Rc;

impl Parser {
    /// Parse an expression starting at the current token
    pub fn parse_expression(&mut self) -> Result<(Expr, ExprInfo), CompileError> {
        let mut stack = ExprStack::new(self.current_location());
        let mut input = self.accumulate_token(&stack)?;

        loop {
            let top = stack.top_terminal()?;

            match relation(top, input.symbol) {
                Relation::Shift | Relation::Equal => {
                    stack.push(input);
                    input = self.accumulate_token(&stack)?;
                }
                Relation::Reduce => reduce(&mut stack)?,
                Relation::Undefined => {
                    if top == GrammarSymbol::End && input.symbol == GrammarSymbol::End {
                        return accept(stack, input.location);
                    }
                    return Err(undefined_relation(top, &input));
                }
            }
        }
    }

    /// Classify the current token as a grammar symbol and consume it.
    /// Tokens that cannot continue the expression become `End` and stay unconsumed.
    fn accumulate_token(&mut self, stack: &ExprStack) -> Result<StackItem, CompileError> {
        let location = self.current_location();
        let symbol = match self.current.kind {
            TokenKind::Star => GrammarSymbol::Mul,
            TokenKind::Slash => GrammarSymbol::Div,
            TokenKind::Plus => GrammarSymbol::Add,
            TokenKind::Minus => GrammarSymbol::Sub,
            TokenKind::EqEq => GrammarSymbol::Eq,
            TokenKind::NotEq => GrammarSymbol::NotEq,
            TokenKind::Lt => GrammarSymbol::Lt,
            TokenKind::Gt => GrammarSymbol::Gt,
            TokenKind::Le => GrammarSymbol::Le,
            TokenKind::Ge => GrammarSymbol::Ge,
            TokenKind::LParen => GrammarSymbol::LParen,
            // A `)` with no opener belongs to the enclosing construct
            TokenKind::RParen if stack.contains_open_bracket() => GrammarSymbol::RParen,
            TokenKind::IntLiteral
            | TokenKind::Zero
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::Null
            | TokenKind::Ident => return self.accumulate_operand(),
            _ => return Ok(StackItem::terminal(GrammarSymbol::End, location)),
        };

        self.advance()?;
        Ok(StackItem::terminal(symbol, location))
    }

    /// Build the leaf for a literal, variable or call
    fn accumulate_operand(&mut self) -> Result<StackItem, CompileError> {
        let token = self.advance()?;
        let location = token.location;
        let text = token.text();

        let (node, info) = match token.kind {
            TokenKind::IntLiteral | TokenKind::Zero => {
                let value = text.parse::<i32>().map_err(|_| {
                    CompileError::internal(format!("bad integer lexeme '{}'", text), location)
                })?;
                (
                    Expr::Literal(Literal::Int(value), location),
                    ExprInfo::literal(DataType::I32, true),
                )
            }
            TokenKind::FloatLiteral => {
                let value = text.parse::<f64>().map_err(|_| {
                    CompileError::internal(format!("bad float lexeme '{}'", text), location)
                })?;
                let literal = Literal::Float(value);
                let convertible = literal.is_integral();
                (
                    Expr::Literal(literal, location),
                    ExprInfo::literal(DataType::F64, convertible),
                )
            }
            TokenKind::StringLiteral => (
                Expr::Literal(Literal::Str(Rc::from(text)), location),
                ExprInfo::literal(DataType::U8Slice, false),
            ),
            TokenKind::Null => (
                Expr::Literal(Literal::Null, location),
                ExprInfo::literal(DataType::Null, false),
            ),
            _ => {
                let name = token.lexeme.clone().ok_or_else(|| {
                    CompileError::internal("identifier token without text", location)
                })?;
                return self.resolve_identifier(name, location);
            }
        };

        Ok(StackItem::operand(node, info))
    }

    /// Turn an identifier into a constant, a variable read, or a call
    fn resolve_identifier(
        &mut self,
        name: Rc<str>,
        location: SourceLocation,
    ) -> Result<StackItem, CompileError> {
        if let Some(entry) = self.scopes.lookup_variable_mut(&name) {
            entry.used = true;

            if let (Some(value), false) = (&entry.known_value, entry.ty.nullable) {
                let info = ExprInfo::literal(value.data_type(), value.is_integral());
                return Ok(StackItem::operand(
                    Expr::Literal(value.clone(), location),
                    info,
                ));
            }

            let node = Expr::Variable {
                name,
                slot: Rc::clone(&entry.slot),
                ty: entry.ty,
                location,
            };
            return Ok(StackItem::operand(node, ExprInfo::runtime(entry.ty)));
        }

        if self.check(TokenKind::LParen) || self.check(TokenKind::Dot) {
            let call = self.parse_call(name, location)?;
            let info = match call.return_type {
                Some(spec) => ExprInfo::runtime(spec),
                None => ExprInfo::runtime(TypeSpec::new(DataType::Void)),
            };
            return Ok(StackItem::operand(Expr::Call(call), info));
        }

        Err(CompileError::new(
            ErrorKind::Undefined,
            format!("undefined variable '{}'", name),
            location,
        ))
    }
}

/// Apply one reduction to the top of the stack
fn reduce(stack: &mut ExprStack) -> Result<(), CompileError> {
    match stack.top_terminal()? {
        GrammarSymbol::Operand => match stack.last_mut() {
            Some(item) if item.symbol == GrammarSymbol::Operand => {
                item.symbol = GrammarSymbol::NonTerminal;
                Ok(())
            }
            Some(item) => Err(CompileError::syntax(
                "missing operator before operand",
                item.location,
            )),
            None => Err(CompileError::global(
                ErrorKind::Internal,
                "reduction on an empty expression stack",
            )),
        },
        GrammarSymbol::RParen => reduce_brackets(stack),
        GrammarSymbol::End | GrammarSymbol::LParen | GrammarSymbol::NonTerminal => {
            let location = stack
                .last_mut()
                .map(|item| item.location)
                .unwrap_or(SourceLocation::new(1, 1));
            Err(CompileError::syntax("malformed expression", location))
        }
        op => reduce_binary(stack, op),
    }
}

/// `( E )` → `E`
fn reduce_brackets(stack: &mut ExprStack) -> Result<(), CompileError> {
    let close = pop_symbol(stack, GrammarSymbol::RParen)?;
    let inner = match stack.pop() {
        Some(item) if item.symbol == GrammarSymbol::NonTerminal => item,
        _ => {
            return Err(CompileError::syntax(
                "expected expression inside parentheses",
                close.location,
            ))
        }
    };
    pop_symbol(stack, GrammarSymbol::LParen)?;
    stack.push(inner);
    Ok(())
}

/// `E op E` → `E`, validating operand types on the way
fn reduce_binary(stack: &mut ExprStack, symbol: GrammarSymbol) -> Result<(), CompileError> {
    let op = symbol.bin_op().ok_or_else(|| {
        CompileError::global(ErrorKind::Internal, format!("{} is not an operator", symbol))
    })?;

    if stack.len() < 4 {
        let location = stack
            .last_mut()
            .map(|item| item.location)
            .unwrap_or(SourceLocation::new(1, 1));
        return Err(CompileError::syntax(
            format!("operator '{}' is missing an operand", op.symbol()),
            location,
        ));
    }

    let right = pop_symbol(stack, GrammarSymbol::NonTerminal)?;
    let operator = pop_symbol(stack, symbol)?;
    let left = pop_symbol(stack, GrammarSymbol::NonTerminal)?;
    let location = operator.location;

    let (mut left_node, mut right_node) = match (left.node, right.node) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(CompileError::internal(
                "reduced expression without a subtree",
                location,
            ))
        }
    };

    if op.is_relational() && (left_node.is_relational() || right_node.is_relational()) {
        return Err(CompileError::syntax(
            "comparison operators cannot be chained",
            location,
        ));
    }

    let info = validate_binary(
        op,
        &mut left_node,
        &left.info,
        &mut right_node,
        &right.info,
        location,
    )?;

    let ty = if info.ty == DataType::Null {
        left.info.ty
    } else {
        info.ty
    };
    let node = Expr::Binary {
        op,
        left: Box::new(left_node),
        right: Box::new(right_node),
        ty,
        location,
    };
    stack.push(StackItem::reduced(node, info));
    Ok(())
}

fn pop_symbol(stack: &mut ExprStack, expected: GrammarSymbol) -> Result<StackItem, CompileError> {
    match stack.pop() {
        Some(item) if item.symbol == expected => Ok(item),
        Some(item) => Err(CompileError::syntax(
            format!("expected {}, found {}", expected, item.symbol),
            item.location,
        )),
        None => Err(CompileError::global(
            ErrorKind::Internal,
            "expression stack underflow",
        )),
    }
}

/// The stack must hold exactly `$ E`
fn accept(mut stack: ExprStack, location: SourceLocation) -> Result<(Expr, ExprInfo), CompileError> {
    if stack.len() != 2 {
        return Err(CompileError::syntax("expected expression", location));
    }
    match stack.pop() {
        Some(StackItem {
            node: Some(node),
            symbol: GrammarSymbol::NonTerminal,
            info,
            ..
        }) => Ok((node, info)),
        _ => Err(CompileError::syntax("expected expression", location)),
    }
}

fn undefined_relation(top: GrammarSymbol, input: &StackItem) -> CompileError {
    let message = match (top, input.symbol) {
        (GrammarSymbol::LParen, GrammarSymbol::End) => "unclosed '('".to_string(),
        (
            GrammarSymbol::Operand | GrammarSymbol::RParen,
            GrammarSymbol::Operand | GrammarSymbol::LParen,
        ) => format!("missing operator before {}", input.symbol),
        (_, symbol) => format!("unexpected {}", symbol),
    };
    CompileError::syntax(message, input.location)
}
