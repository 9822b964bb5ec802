//! Operator-precedence table and expression stack
//!
//! The expression parser is a shift/reduce automaton driven by [`relation`], a 14×14 table
//! indexed by the topmost terminal on the [`ExprStack`] and the incoming terminal.
//!
//! ```text
//!        *  /  +  -  == != <  >  <= >= (  )  i  $
//!  * /   R  R  R  R  R  R  R  R  R  R  S  R  S  R
//!  + -   S  S  R  R  R  R  R  R  R  R  S  R  S  R
//!  rel   S  S  S  S  R  R  R  R  R  R  S  R  S  R
//!  (     S  S  S  S  S  S  S  S  S  S  S  E  S  U
//!  ) i   R  R  R  R  R  R  R  R  R  R  U  R  U  R
//!  $     S  S  S  S  S  S  S  S  S  S  S  U  S  U
//! ```
//!
//! `$`/`$` is the accepting configuration. `(`/`$` signals an unclosed bracket.

use super::ast::{BinOp, Expr, SourceLocation};
use crate::errors::CompileError;
use crate::semantic::types::ExprInfo;
use std::fmt;

/// Terminals of the expression grammar, plus the reduced-expression marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarSymbol {
    Mul,
    Div,
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    LParen,
    RParen,
    Operand,
    End,
    NonTerminal,
}

impl GrammarSymbol {
    /// Table index; `None` for `NonTerminal`
    fn index(self) -> Option<usize> {
        let index = match self {
            GrammarSymbol::Mul => 0,
            GrammarSymbol::Div => 1,
            GrammarSymbol::Add => 2,
            GrammarSymbol::Sub => 3,
            GrammarSymbol::Eq => 4,
            GrammarSymbol::NotEq => 5,
            GrammarSymbol::Lt => 6,
            GrammarSymbol::Gt => 7,
            GrammarSymbol::Le => 8,
            GrammarSymbol::Ge => 9,
            GrammarSymbol::LParen => 10,
            GrammarSymbol::RParen => 11,
            GrammarSymbol::Operand => 12,
            GrammarSymbol::End => 13,
            GrammarSymbol::NonTerminal => return None,
        };
        Some(index)
    }

    pub fn bin_op(self) -> Option<BinOp> {
        let op = match self {
            GrammarSymbol::Mul => BinOp::Mul,
            GrammarSymbol::Div => BinOp::Div,
            GrammarSymbol::Add => BinOp::Add,
            GrammarSymbol::Sub => BinOp::Sub,
            GrammarSymbol::Eq => BinOp::Eq,
            GrammarSymbol::NotEq => BinOp::NotEq,
            GrammarSymbol::Lt => BinOp::Lt,
            GrammarSymbol::Gt => BinOp::Gt,
            GrammarSymbol::Le => BinOp::Le,
            GrammarSymbol::Ge => BinOp::Ge,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarSymbol::LParen => write!(f, "'('"),
            GrammarSymbol::RParen => write!(f, "')'"),
            GrammarSymbol::Operand => write!(f, "operand"),
            GrammarSymbol::End => write!(f, "end of expression"),
            GrammarSymbol::NonTerminal => write!(f, "expression"),
            op => match op.bin_op() {
                Some(op) => write!(f, "'{}'", op.symbol()),
                None => write!(f, "{:?}", op),
            },
        }
    }
}

/// Action for a (stack top, input) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Shift,
    Equal,
    Reduce,
    Undefined,
}

use Relation::{Equal as E, Reduce as R, Shift as S, Undefined as U};

#[rustfmt::skip]
const TABLE: [[Relation; 14]; 14] = [
    //  *  /  +  -  == != <  >  <= >= (  )  i  $
    [R, R, R, R, R, R, R, R, R, R, S, R, S, R], // *
    [R, R, R, R, R, R, R, R, R, R, S, R, S, R], // /
    [S, S, R, R, R, R, R, R, R, R, S, R, S, R], // +
    [S, S, R, R, R, R, R, R, R, R, S, R, S, R], // -
    [S, S, S, S, R, R, R, R, R, R, S, R, S, R], // ==
    [S, S, S, S, R, R, R, R, R, R, S, R, S, R], // !=
    [S, S, S, S, R, R, R, R, R, R, S, R, S, R], // <
    [S, S, S, S, R, R, R, R, R, R, S, R, S, R], // >
    [S, S, S, S, R, R, R, R, R, R, S, R, S, R], // <=
    [S, S, S, S, R, R, R, R, R, R, S, R, S, R], // >=
    [S, S, S, S, S, S, S, S, S, S, S, E, S, U], // (
    [R, R, R, R, R, R, R, R, R, R, U, R, U, R], // )
    [R, R, R, R, R, R, R, R, R, R, U, R, U, R], // i
    [S, S, S, S, S, S, S, S, S, S, S, U, S, U], // $
];

/// Look up the action for the top terminal and the input terminal
pub fn relation(top: GrammarSymbol, input: GrammarSymbol) -> Relation {
    match (top.index(), input.index()) {
        (Some(row), Some(column)) => TABLE[row][column],
        _ => Relation::Undefined,
    }
}

/// One entry of the expression stack
#[derive(Debug, Clone)]
pub struct StackItem {
    pub node: Option<Expr>,
    pub symbol: GrammarSymbol,
    pub info: ExprInfo,
    pub location: SourceLocation,
}

impl StackItem {
    /// An operator, bracket or end marker
    pub fn terminal(symbol: GrammarSymbol, location: SourceLocation) -> Self {
        StackItem {
            node: None,
            symbol,
            info: ExprInfo::empty(),
            location,
        }
    }

    pub fn operand(node: Expr, info: ExprInfo) -> Self {
        StackItem {
            location: node.location(),
            node: Some(node),
            symbol: GrammarSymbol::Operand,
            info,
        }
    }

    pub fn reduced(node: Expr, info: ExprInfo) -> Self {
        StackItem {
            symbol: GrammarSymbol::NonTerminal,
            ..Self::operand(node, info)
        }
    }
}

/// Shift/reduce stack with a `$` sentinel at the bottom
#[derive(Debug)]
pub struct ExprStack {
    items: Vec<StackItem>,
}

impl ExprStack {
    pub fn new(location: SourceLocation) -> Self {
        ExprStack {
            items: vec![StackItem::terminal(GrammarSymbol::End, location)],
        }
    }

    pub fn push(&mut self, item: StackItem) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    pub fn last_mut(&mut self) -> Option<&mut StackItem> {
        self.items.last_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Symbols from bottom to top
    pub fn symbols(&self) -> impl Iterator<Item = GrammarSymbol> + '_ {
        self.items.iter().map(|item| item.symbol)
    }

    /// Topmost terminal, looking past at most one reduced expression
    pub fn top_terminal(&self) -> Result<GrammarSymbol, CompileError> {
        let mut nonterminals = 0;
        for item in self.items.iter().rev() {
            if item.symbol != GrammarSymbol::NonTerminal {
                return Ok(item.symbol);
            }
            nonterminals += 1;
            if nonterminals > 1 {
                return Err(CompileError::syntax(
                    "missing operator between expressions",
                    item.location,
                ));
            }
        }
        Err(CompileError::global(
            crate::errors::ErrorKind::Internal,
            "expression stack lost its sentinel",
        ))
    }

    /// True when a `(` on the stack is still waiting for its `)`
    pub fn contains_open_bracket(&self) -> bool {
        let mut depth: usize = 0;
        for symbol in self.symbols() {
            match symbol {
                GrammarSymbol::LParen => depth += 1,
                GrammarSymbol::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        depth > 0
    }
}
