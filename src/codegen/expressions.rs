//! Expression evaluation on the IFJcode24 data stack
//!
//! Every expression leaves exactly one value on the data stack, except calls of void
//! functions, which leave nothing. Builtins with a matching instruction are expanded
//! inline through the global temporaries; the others call a helper routine.

use super::emitter::literal_operand;
use super::helpers::helper_label;
use super::Generator;
use crate::constants::{PARAM_PREFIX, TEMPORARIES};
use crate::parser::ast::*;
use crate::semantic::builtins::Builtin;
use crate::semantic::types::DataType;

impl Generator {
    pub(crate) fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(literal, _) => {
                self.emit(&format!("PUSHS {}", literal_operand(literal)));
            }
            Expr::Variable { slot, .. } => {
                self.emit(&format!("PUSHS LF@{}", slot));
            }
            Expr::Binary {
                op,
                left,
                right,
                ty,
                ..
            } => {
                self.emit_expr(left);
                self.emit_expr(right);
                self.emit_operator(*op, *ty);
            }
            Expr::Call(call) => self.emit_call(call),
        }
    }

    fn emit_operator(&mut self, op: BinOp, ty: DataType) {
        match op {
            BinOp::Add => self.emit("ADDS"),
            BinOp::Sub => self.emit("SUBS"),
            BinOp::Mul => self.emit("MULS"),
            BinOp::Div if ty == DataType::I32 => self.emit("IDIVS"),
            BinOp::Div => self.emit("DIVS"),
            BinOp::Eq => self.emit("EQS"),
            BinOp::NotEq => {
                self.emit("EQS");
                self.emit("NOTS");
            }
            BinOp::Lt => self.emit("LTS"),
            BinOp::Gt => self.emit("GTS"),
            BinOp::Le => {
                self.emit("GTS");
                self.emit("NOTS");
            }
            BinOp::Ge => {
                self.emit("LTS");
                self.emit("NOTS");
            }
        }
    }

    pub(crate) fn emit_call(&mut self, call: &FuncCall) {
        for arg in &call.args {
            self.emit_expr(arg);
        }

        match call.builtin {
            Some(builtin) => self.emit_builtin(builtin, call.args.len()),
            None => self.emit_frame_call(&call.name, call.args.len()),
        }
    }

    /// Pop `arity` stacked arguments into a fresh frame and call `label`
    fn emit_frame_call(&mut self, label: &str, arity: usize) {
        self.emit("CREATEFRAME");
        for index in (0..arity).rev() {
            self.emit(&format!("DEFVAR TF@{}{}", PARAM_PREFIX, index));
            self.emit(&format!("POPS TF@{}{}", PARAM_PREFIX, index));
        }
        self.emit(&format!("CALL {}", label));
    }

    /// Arguments are already on the data stack
    fn emit_builtin(&mut self, builtin: Builtin, arity: usize) {
        let [tmp0, tmp1] = TEMPORARIES;

        if builtin.needs_helper() {
            self.used_helpers.insert(builtin);
            self.emit_frame_call(&helper_label(builtin), arity);
            return;
        }

        match builtin {
            Builtin::ReadStr => self.emit_read(tmp0, "string"),
            Builtin::ReadI32 => self.emit_read(tmp0, "int"),
            Builtin::ReadF64 => self.emit_read(tmp0, "float"),
            Builtin::Write => {
                self.emit(&format!("POPS {}", tmp0));
                self.emit(&format!("WRITE {}", tmp0));
            }
            Builtin::I2F => self.emit("INT2FLOATS"),
            Builtin::F2I => self.emit("FLOAT2INTS"),
            Builtin::Chr => self.emit("INT2CHARS"),
            Builtin::String => {}
            Builtin::Length => {
                self.emit(&format!("POPS {}", tmp0));
                self.emit(&format!("STRLEN {} {}", tmp0, tmp0));
                self.emit(&format!("PUSHS {}", tmp0));
            }
            Builtin::Concat => {
                self.emit(&format!("POPS {}", tmp1));
                self.emit(&format!("POPS {}", tmp0));
                self.emit(&format!("CONCAT {} {} {}", tmp0, tmp0, tmp1));
                self.emit(&format!("PUSHS {}", tmp0));
            }
            Builtin::Substring | Builtin::Strcmp | Builtin::Ord => {}
        }
    }

    fn emit_read(&mut self, target: &str, ty: &str) {
        self.emit(&format!("READ {} {}", target, ty));
        self.emit(&format!("PUSHS {}", target));
    }
}
