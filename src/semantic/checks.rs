//! Type rules applied while expressions are reduced
//!
//! - [`validate_binary`]: operand compatibility for one binary operator, retyping
//!   numeric literals where the other side fixes the type
//! - [`retype`]: flip a literal-only subtree between `i32` and `f64`
//! - [`fold`]: evaluate a compile-time-known subtree
//! - [`check_assignable`]: value-to-slot compatibility shared by declarations,
//!   assignments, arguments and returns

use super::types::{DataType, ExprInfo, TypeSpec};
use crate::errors::{CompileError, ErrorKind};
use crate::parser::ast::{BinOp, Expr, Literal, SourceLocation};

/// Check `left op right` and compute the metadata of the result.
///
/// A convertible operand may be retyped in place to match the other side.
pub fn validate_binary(
    op: BinOp,
    left: &mut Expr,
    left_info: &ExprInfo,
    right: &mut Expr,
    right_info: &ExprInfo,
    location: SourceLocation,
) -> Result<ExprInfo, CompileError> {
    if op.is_equality() && (left_info.ty == DataType::Null || right_info.ty == DataType::Null) {
        if !left_info.nullable || !right_info.nullable {
            let other = if left_info.ty == DataType::Null {
                right_info
            } else {
                left_info
            };
            return Err(CompileError::type_error(
                format!("cannot compare non-nullable {} with null", other.ty),
                location,
            ));
        }
        return Ok(ExprInfo::null_comparison());
    }

    for (operand, info) in [(&*left, left_info), (&*right, right_info)] {
        match info.ty {
            DataType::U8Slice => {
                return Err(CompileError::type_error(
                    format!("operator '{}' cannot be applied to []u8", op.symbol()),
                    location,
                ))
            }
            DataType::Void => {
                return Err(CompileError::type_error(
                    format!("void value used as operand of '{}'", op.symbol()),
                    location,
                ))
            }
            _ => {}
        }
        if !op.is_relational() && operand.is_relational() {
            return Err(CompileError::type_error(
                format!("comparison result used as operand of '{}'", op.symbol()),
                location,
            ));
        }
        if info.nullable && !op.is_equality() {
            return Err(CompileError::type_error(
                format!("nullable operand of '{}'", op.symbol()),
                location,
            ));
        }
    }

    if left_info.ty == right_info.ty {
        return Ok(ExprInfo {
            ty: left_info.ty,
            nullable: false,
            known: left_info.known && right_info.known,
            convertible: left_info.convertible
                && right_info.convertible
                && retypes_losslessly(op, left, right),
        });
    }

    if !left_info.ty.is_numeric() || !right_info.ty.is_numeric() {
        return Err(CompileError::type_error(
            format!(
                "mismatched operand types {} and {}",
                left_info.ty, right_info.ty
            ),
            location,
        ));
    }

    let retype_left = match (left_info.convertible, right_info.convertible) {
        (true, true) => left_info.ty == DataType::I32,
        (true, false) => true,
        (false, true) => false,
        (false, false) => {
            return Err(CompileError::type_error(
                format!(
                    "mismatched operand types {} and {}",
                    left_info.ty, right_info.ty
                ),
                location,
            ))
        }
    };

    let kept = if retype_left {
        retype(left)?;
        right_info
    } else {
        retype(right)?;
        left_info
    };

    Ok(ExprInfo {
        ty: kept.ty,
        nullable: false,
        known: left_info.known && right_info.known,
        convertible: kept.convertible && retypes_losslessly(op, left, right),
    })
}

/// Whether flipping `left op right` to the other numeric type keeps its value.
/// `7 / 2` is 3 but `7.0 / 2.0` is 3.5, so that tree stays fixed.
fn retypes_losslessly(op: BinOp, left: &Expr, right: &Expr) -> bool {
    let check = || -> Option<bool> {
        let value = fold_binary(op, fold(left)?, fold(right)?)?;
        let (mut left, mut right) = (left.clone(), right.clone());
        retype(&mut left).ok()?;
        retype(&mut right).ok()?;
        let flipped = fold_binary(op, fold(&left)?, fold(&right)?)?;
        Some(converted(&value) == Some(flipped))
    };
    check().unwrap_or(false)
}

/// The same value in the other numeric type, if it is representable exactly
fn converted(literal: &Literal) -> Option<Literal> {
    match *literal {
        Literal::Int(value) => Some(Literal::Float(f64::from(value))),
        Literal::Float(value)
            if value.fract() == 0.0
                && value >= f64::from(i32::MIN)
                && value <= f64::from(i32::MAX) =>
        {
            Some(Literal::Int(value as i32))
        }
        _ => None,
    }
}

fn flip(ty: DataType, location: SourceLocation) -> Result<DataType, CompileError> {
    match ty {
        DataType::I32 => Ok(DataType::F64),
        DataType::F64 => Ok(DataType::I32),
        other => Err(CompileError::internal(
            format!("cannot retype a {} subtree", other),
            location,
        )),
    }
}

/// Flip every literal leaf and binary node of a subtree between `i32` and `f64`.
/// Floats are truncated towards zero.
pub fn retype(expr: &mut Expr) -> Result<(), CompileError> {
    match expr {
        Expr::Literal(literal, location) => {
            *literal = match literal {
                Literal::Int(value) => Literal::Float(f64::from(*value)),
                Literal::Float(value) => Literal::Int(*value as i32),
                _ => {
                    return Err(CompileError::internal(
                        "only numeric literals can be retyped",
                        *location,
                    ))
                }
            };
            Ok(())
        }
        Expr::Binary {
            left,
            right,
            ty,
            location,
            ..
        } => {
            retype(left)?;
            retype(right)?;
            *ty = flip(*ty, *location)?;
            Ok(())
        }
        other => Err(CompileError::internal(
            "only literal subtrees can be retyped",
            other.location(),
        )),
    }
}

/// Evaluate a compile-time-known numeric subtree.
/// Returns `None` on overflow, division by zero or any non-literal leaf.
pub fn fold(expr: &Expr) -> Option<Literal> {
    match expr {
        Expr::Literal(literal @ (Literal::Int(_) | Literal::Float(_)), _) => Some(literal.clone()),
        Expr::Binary {
            op, left, right, ..
        } => fold_binary(*op, fold(left)?, fold(right)?),
        _ => None,
    }
}

fn fold_binary(op: BinOp, left: Literal, right: Literal) -> Option<Literal> {
    if op.is_relational() {
        return None;
    }
    match (left, right) {
        (Literal::Int(a), Literal::Int(b)) => {
            let value = match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Sub => a.checked_sub(b),
                BinOp::Mul => a.checked_mul(b),
                BinOp::Div => a.checked_div(b),
                _ => None,
            }?;
            Some(Literal::Int(value))
        }
        (Literal::Float(a), Literal::Float(b)) => {
            let value = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div if b != 0.0 => a / b,
                _ => return None,
            };
            value.is_finite().then_some(Literal::Float(value))
        }
        _ => None,
    }
}

/// Check that a value of `info` may be stored in a slot of type `target`.
///
/// `mismatch` is the error kind reported on failure: `Type` for declarations and
/// assignments, `Signature` for arguments and return values.
pub fn check_assignable(
    target: TypeSpec,
    value: &mut Expr,
    info: &ExprInfo,
    mismatch: ErrorKind,
) -> Result<(), CompileError> {
    let location = value.location();

    if value.is_relational() {
        return Err(CompileError::new(
            mismatch,
            "comparison result cannot be stored",
            location,
        ));
    }

    if info.ty == DataType::Void {
        return Err(CompileError::new(
            mismatch,
            "void value cannot be stored",
            location,
        ));
    }

    if info.ty == DataType::Null || info.nullable {
        if !target.nullable {
            return Err(CompileError::new(
                mismatch,
                format!("nullable value assigned to non-nullable {}", target),
                location,
            ));
        }
        if info.ty == DataType::Null {
            return Ok(());
        }
    }

    if info.ty == target.base {
        return Ok(());
    }

    if info.convertible && info.ty.is_numeric() && target.base.is_numeric() {
        return retype(value);
    }

    Err(CompileError::new(
        mismatch,
        format!("expected {}, found {}", target, info.type_spec()),
        location,
    ))
}

/// Type of a declaration without an annotation
pub fn infer_type(value: &Expr, info: &ExprInfo) -> Result<TypeSpec, CompileError> {
    let location = value.location();
    if value.is_relational() {
        return Err(CompileError::type_error(
            "comparison result cannot be stored",
            location,
        ));
    }
    match info.ty {
        DataType::Null | DataType::Void => Err(CompileError::new(
            ErrorKind::Inference,
            format!("cannot infer a type from a {} initializer", info.ty),
            location,
        )),
        _ => Ok(info.type_spec()),
    }
}
