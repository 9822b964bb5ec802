//! Symbol tables and the scope stack
//!
//! This module provides the name bookkeeping used during parsing:
//! - [`SymbolTable`]: one scope, an ordered map from identifier to [`Symbol`]
//! - [`ScopeStack`]: the open scopes of the function being parsed, innermost last
//! - [`VariableEntry`] / [`FunctionEntry`]: per-name metadata
//!
//! # Scoping
//!
//! Each function body opens one scope, and every nested block (if-then, else, while body)
//! opens another. Lookup walks from the innermost scope outwards, so an inner declaration
//! shadows an outer one. Declaring a name twice in the same scope is a redefinition.
//!
//! Closing a scope hands its table back to the caller, which stores it in the AST so the
//! code generator can declare every frame slot up front.

use super::types::TypeSpec;
use crate::constants::SLOT_SEPARATOR;
use crate::errors::{CompileError, ErrorKind};
use crate::parser::ast::{Literal, SourceLocation};
use rustc_hash::FxHashMap;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A local variable, parameter or `|x|` binding
#[derive(Debug, Clone, PartialEq)]
pub struct VariableEntry {
    pub ty: TypeSpec,
    pub is_const: bool,
    pub is_param: bool,
    pub known_value: Option<Literal>,
    pub used: bool,
    pub slot: Rc<str>, // unique frame name within the function
    pub location: SourceLocation,
}

impl VariableEntry {
    pub fn new(ty: TypeSpec, slot: Rc<str>, location: SourceLocation) -> Self {
        VariableEntry {
            ty,
            is_const: false,
            is_param: false,
            known_value: None,
            used: false,
            slot,
            location,
        }
    }

    pub fn parameter(ty: TypeSpec, slot: Rc<str>, location: SourceLocation) -> Self {
        VariableEntry {
            is_param: true,
            is_const: true,
            ..Self::new(ty, slot, location)
        }
    }
}

/// A user-defined function header
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    pub params: Vec<(Rc<str>, TypeSpec)>,
    pub return_type: Option<TypeSpec>, // None for void
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VariableEntry),
    Function(FunctionEntry),
}

impl Symbol {
    pub fn as_variable(&self) -> Option<&VariableEntry> {
        match self {
            Symbol::Variable(entry) => Some(entry),
            Symbol::Function(_) => None,
        }
    }

    pub fn as_variable_mut(&mut self) -> Option<&mut VariableEntry> {
        match self {
            Symbol::Variable(entry) => Some(entry),
            Symbol::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionEntry> {
        match self {
            Symbol::Function(entry) => Some(entry),
            Symbol::Variable(_) => None,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            Symbol::Variable(entry) => entry.location,
            Symbol::Function(entry) => entry.location,
        }
    }
}

/// One scope of symbols, iterated in identifier order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: BTreeMap<Rc<str>, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol. Returns `false` and leaves the table unchanged if the name exists.
    pub fn insert(&mut self, name: Rc<str>, symbol: Symbol) -> bool {
        match self.entries.entry(name) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(symbol);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Rc<str>, &Symbol)> {
        self.entries.iter()
    }

    /// Variable entries only
    pub fn variables(&self) -> impl Iterator<Item = (&Rc<str>, &VariableEntry)> {
        self.entries
            .iter()
            .filter_map(|(name, symbol)| symbol.as_variable().map(|entry| (name, entry)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Open scopes of the function currently being parsed
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<SymbolTable>,
    slot_counters: FxHashMap<Rc<str>, usize>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new scope
    pub fn push_scope(&mut self) {
        self.scopes.push(SymbolTable::new());
    }

    /// Exit the current scope, reporting the first variable that was never read
    pub fn pop_scope(&mut self) -> Result<SymbolTable, CompileError> {
        let table = self
            .scopes
            .pop()
            .ok_or_else(|| CompileError::global(ErrorKind::Internal, "scope stack underflow"))?;

        if let Some((name, entry)) = table
            .variables()
            .filter(|(_, entry)| !entry.is_param && !entry.used)
            .min_by_key(|(_, entry)| (entry.location.line, entry.location.column))
        {
            return Err(CompileError::new(
                ErrorKind::Unused,
                format!("variable '{}' is never used", name),
                entry.location,
            ));
        }

        Ok(table)
    }

    /// Declare a name in the innermost scope
    pub fn declare(&mut self, name: Rc<str>, symbol: Symbol) -> Result<(), CompileError> {
        let location = symbol.location();
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| CompileError::internal("declaration outside of any scope", location))?;

        if scope.contains(&name) {
            return Err(CompileError::new(
                ErrorKind::Redefinition,
                format!("'{}' is already declared in this scope", name),
                location,
            ));
        }

        scope.insert(name, symbol);
        Ok(())
    }

    /// Find a name, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&VariableEntry> {
        self.lookup(name).and_then(Symbol::as_variable)
    }

    pub fn lookup_variable_mut(&mut self, name: &str) -> Option<&mut VariableEntry> {
        self.lookup_mut(name).and_then(Symbol::as_variable_mut)
    }

    /// Frame slot for a new variable. The first `x` of a function is `x`, later ones
    /// are `x$1`, `x$2`, ...
    pub fn fresh_slot(&mut self, name: &Rc<str>) -> Rc<str> {
        let counter = self.slot_counters.entry(Rc::clone(name)).or_insert(0);
        let slot = if *counter == 0 {
            Rc::clone(name)
        } else {
            Rc::from(format!("{}{}{}", name, SLOT_SEPARATOR, counter))
        };
        *counter += 1;
        slot
    }

    /// Forget slot numbering; called at the start of every function
    pub fn reset_slots(&mut self) {
        self.slot_counters.clear();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
