//! IFJcode24 code generation
//!
//! This module walks a checked [`Program`] and appends IFJcode24 instructions to a text
//! buffer:
//! - This module: [`Generator`], program layout, functions and statements
//! - `expressions`: expression evaluation on the data stack, calls and builtins
//! - [`emitter`]: operand formatting (hex floats, escaped strings)
//! - [`helpers`]: routines for builtins with no single-instruction form
//!
//! # Calling Convention
//!
//! Arguments are evaluated onto the data stack, then popped into `TF@%p0..` of a fresh
//! temporary frame before `CALL`. The callee's `PUSHFRAME` turns that frame into `LF`,
//! copies each parameter into its own slot, and leaves any return value on the data
//! stack before `POPFRAME`/`RETURN`.
//!
//! Every variable of a function, including those in nested blocks, is declared with
//! `DEFVAR` at function entry, so loops never redeclare a slot.

mod expressions;
pub mod emitter;
pub mod helpers;

use crate::constants::{MAIN_FUNCTION, PARAM_PREFIX, TARGET_HEADER, TEMPORARIES};
use crate::parser::ast::*;
use crate::semantic::builtins::Builtin;
use crate::semantic::symtable::SymbolTable;
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// Generate the complete IFJcode24 program
pub fn generate(program: &Program) -> String {
    let mut generator = Generator::new();
    generator.emit_program(program);
    generator.finish()
}

/// Instruction buffer plus label and helper bookkeeping
pub struct Generator {
    out: String,
    label_counter: usize,
    used_helpers: FxHashSet<Builtin>,
    function: Rc<str>,
}

impl Generator {
    pub fn new() -> Self {
        Generator {
            out: String::new(),
            label_counter: 0,
            used_helpers: FxHashSet::default(),
            function: Rc::from(""),
        }
    }

    /// Append helper routines and return the program text
    pub fn finish(mut self) -> String {
        let mut routines: Vec<Builtin> = self.used_helpers.iter().copied().collect();
        routines.sort_by_key(|builtin| builtin.name());
        for builtin in routines {
            if let Some(routine) = helpers::helper_routine(builtin) {
                self.out.push_str(&routine);
            }
        }
        self.out
    }

    pub(crate) fn emit(&mut self, instruction: &str) {
        self.out.push_str(instruction);
        self.out.push('\n');
    }

    /// Unique label within the current function
    pub(crate) fn new_label(&mut self, kind: &str) -> String {
        self.label_counter += 1;
        format!("{}${}${}", self.function, kind, self.label_counter)
    }

    fn emit_program(&mut self, program: &Program) {
        self.emit(TARGET_HEADER);
        for temporary in TEMPORARIES {
            self.emit(&format!("DEFVAR {}", temporary));
        }
        self.emit("CREATEFRAME");
        self.emit(&format!("CALL {}", MAIN_FUNCTION));
        self.emit("EXIT int@0");

        for function in &program.functions {
            self.emit_function(function);
        }
    }

    fn emit_function(&mut self, function: &FuncDecl) {
        self.function = Rc::clone(&function.name);
        self.emit("");
        self.emit(&format!("LABEL {}", function.name));
        self.emit("PUSHFRAME");

        let mut slots = Vec::new();
        collect_slots(&function.scope, &function.body, &mut slots);
        for slot in &slots {
            self.emit(&format!("DEFVAR LF@{}", slot));
        }
        for (index, param) in function.params.iter().enumerate() {
            self.emit(&format!("MOVE LF@{} LF@{}{}", param.slot, PARAM_PREFIX, index));
        }

        self.emit_statements(&function.body);

        if function.return_type.is_none() {
            self.emit("POPFRAME");
            self.emit("RETURN");
        }
    }

    fn emit_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.emit_statement(statement);
        }
    }

    fn emit_statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::VarDecl { slot, value, .. } | Stmt::Assign { slot, value, .. } => {
                self.emit_expr(value);
                self.emit(&format!("POPS LF@{}", slot));
            }
            Stmt::Discard { value, .. } => {
                self.emit_expr(value);
                self.emit(&format!("POPS {}", TEMPORARIES[0]));
            }
            Stmt::Call(call) => self.emit_call(call),
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.emit_expr(value);
                }
                self.emit("POPFRAME");
                self.emit("RETURN");
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
                ..
            } => {
                let else_label = self.new_label("else");
                let end_label = self.new_label("endif");

                self.emit_condition(condition, &else_label);
                self.emit_statements(&then_block.statements);
                self.emit(&format!("JUMP {}", end_label));
                self.emit(&format!("LABEL {}", else_label));
                if let Some(else_block) = else_block {
                    self.emit_statements(&else_block.statements);
                }
                self.emit(&format!("LABEL {}", end_label));
            }
            Stmt::While {
                condition, body, ..
            } => {
                let start_label = self.new_label("while");
                let end_label = self.new_label("endwhile");

                self.emit(&format!("LABEL {}", start_label));
                self.emit_condition(condition, &end_label);
                self.emit_statements(&body.statements);
                self.emit(&format!("JUMP {}", start_label));
                self.emit(&format!("LABEL {}", end_label));
            }
        }
    }

    /// Evaluate a condition and jump to `false_label` when it does not hold
    fn emit_condition(&mut self, condition: &Condition, false_label: &str) {
        match condition {
            Condition::Relational(expr) => {
                self.emit_expr(expr);
                self.emit("PUSHS bool@true");
                self.emit(&format!("JUMPIFNEQS {}", false_label));
            }
            Condition::Unwrap { value, binding } => {
                self.emit_expr(value);
                self.emit(&format!("POPS LF@{}", binding));
                self.emit(&format!("PUSHS LF@{}", binding));
                self.emit("PUSHS nil@nil");
                self.emit(&format!("JUMPIFEQS {}", false_label));
            }
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

/// Every variable slot of a function body, nested blocks included
fn collect_slots(scope: &SymbolTable, statements: &[Stmt], slots: &mut Vec<Rc<str>>) {
    slots.extend(scope.variables().map(|(_, entry)| Rc::clone(&entry.slot)));

    for statement in statements {
        match statement {
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                collect_slots(&then_block.scope, &then_block.statements, slots);
                if let Some(else_block) = else_block {
                    collect_slots(&else_block.scope, &else_block.statements, slots);
                }
            }
            Stmt::While { body, .. } => collect_slots(&body.scope, &body.statements, slots),
            _ => {}
        }
    }
}
