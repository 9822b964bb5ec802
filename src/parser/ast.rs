// AST (Abstract Syntax Tree) definitions for the IFJ24 compiler

use crate::semantic::builtins::Builtin;
use crate::semantic::symtable::SymbolTable;
use crate::semantic::types::{DataType, TypeSpec};
use std::fmt;
use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Float(f64),
    Str(Rc<str>),
    Null,
}

impl Literal {
    pub fn data_type(&self) -> DataType {
        match self {
            Literal::Int(_) => DataType::I32,
            Literal::Float(_) => DataType::F64,
            Literal::Str(_) => DataType::U8Slice,
            Literal::Null => DataType::Null,
        }
    }

    /// An integer, or a float with no fractional part that fits `i32`
    pub fn is_integral(&self) -> bool {
        match self {
            Literal::Int(_) => true,
            Literal::Float(value) => {
                value.fract() == 0.0 && *value >= i32::MIN as f64 && *value <= i32::MAX as f64
            }
            Literal::Str(_) | Literal::Null => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Float(value) => write!(f, "{:?}", value),
            Literal::Str(text) => write!(f, "{:?}", text),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
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
}

impl BinOp {
    /// Comparison operators, including `==` and `!=`
    pub fn is_relational(self) -> bool {
        !matches!(self, BinOp::Mul | BinOp::Div | BinOp::Add | BinOp::Sub)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Eq | BinOp::NotEq)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
        }
    }
}

/// A call of a user function or an `ifj.*` builtin
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    pub name: Rc<str>,
    pub builtin: Option<Builtin>,
    pub args: Vec<Expr>,
    pub return_type: Option<TypeSpec>, // None for void
    pub location: SourceLocation,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, SourceLocation),
    Variable {
        name: Rc<str>,
        slot: Rc<str>,
        ty: TypeSpec,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        ty: DataType, // operand type after retyping
        location: SourceLocation,
    },
    Call(FuncCall),
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Literal(_, location) => *location,
            Expr::Variable { location, .. } | Expr::Binary { location, .. } => *location,
            Expr::Call(call) => call.location,
        }
    }

    /// True when the root is a comparison
    pub fn is_relational(&self) -> bool {
        matches!(self, Expr::Binary { op, .. } if op.is_relational())
    }
}

/// S-expression rendering, e.g. `(+ 1 (* 2 3))`
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal, _) => write!(f, "{}", literal),
            Expr::Variable { name, .. } => write!(f, "{}", name),
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "({} {} {})", op.symbol(), left, right),
            Expr::Call(call) => {
                match call.builtin {
                    Some(builtin) => write!(f, "(call {}", builtin)?,
                    None => write!(f, "(call {}", call.name)?,
                }
                for arg in &call.args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Condition of `if` and `while`
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Relational(Expr),
    /// `(value) |binding|`: taken when `value` is not null
    Unwrap { value: Expr, binding: Rc<str> },
}

/// A braced statement list with its own scope
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub scope: SymbolTable,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        name: Rc<str>,
        slot: Rc<str>,
        ty: TypeSpec,
        is_const: bool,
        value: Expr,
        location: SourceLocation,
    },
    Assign {
        name: Rc<str>,
        slot: Rc<str>,
        value: Expr,
        location: SourceLocation,
    },
    If {
        condition: Condition,
        then_block: Block,
        else_block: Option<Block>,
        location: SourceLocation,
    },
    While {
        condition: Condition,
        body: Block,
        location: SourceLocation,
    },
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    Call(FuncCall),
    /// `_ = expr;`
    Discard {
        value: Expr,
        location: SourceLocation,
    },
}

impl Stmt {
    /// True when every path through the statement ends in `return`
    pub fn always_returns(&self) -> bool {
        match self {
            Stmt::Return { .. } => true,
            Stmt::If {
                then_block,
                else_block: Some(else_block),
                ..
            } => block_returns(&then_block.statements) && block_returns(&else_block.statements),
            _ => false,
        }
    }
}

pub fn block_returns(statements: &[Stmt]) -> bool {
    statements.iter().any(Stmt::always_returns)
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Rc<str>,
    pub slot: Rc<str>,
    pub ty: TypeSpec,
    pub location: SourceLocation,
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Rc<str>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeSpec>, // None for void
    pub body: Vec<Stmt>,
    pub scope: SymbolTable,
    pub location: SourceLocation,
}

/// Program root
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<FuncDecl>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            functions: Vec::new(),
        }
    }
}
