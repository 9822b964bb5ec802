// Data types and expression metadata for the semantic checker

use std::fmt;

/// Base data types of IFJ24 values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    I32,
    F64,
    U8Slice,
    Void,
    Null,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::I32 | DataType::F64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::I32 => "i32",
            DataType::F64 => "f64",
            DataType::U8Slice => "[]u8",
            DataType::Void => "void",
            DataType::Null => "null",
        };
        write!(f, "{}", name)
    }
}

/// A declared type: base plus the `?` qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub base: DataType,
    pub nullable: bool,
}

impl TypeSpec {
    pub fn new(base: DataType) -> Self {
        TypeSpec {
            base,
            nullable: false,
        }
    }

    pub fn nullable(base: DataType) -> Self {
        TypeSpec {
            base,
            nullable: true,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "?{}", self.base)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

/// Metadata carried next to every expression subtree.
///
/// - `known`: the value is fixed at compile time
/// - `convertible`: a numeric literal tree whose value survives retyping between `i32` and `f64`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprInfo {
    pub ty: DataType,
    pub nullable: bool,
    pub known: bool,
    pub convertible: bool,
}

impl ExprInfo {
    /// Metadata for a value read from storage or returned by a call
    pub fn runtime(spec: TypeSpec) -> Self {
        ExprInfo {
            ty: spec.base,
            nullable: spec.nullable,
            known: false,
            convertible: false,
        }
    }

    /// Metadata for a literal of the given type
    pub fn literal(ty: DataType, convertible: bool) -> Self {
        ExprInfo {
            ty,
            nullable: ty == DataType::Null,
            known: true,
            convertible,
        }
    }

    /// Metadata of a `null` comparison result
    pub fn null_comparison() -> Self {
        ExprInfo {
            ty: DataType::Null,
            nullable: true,
            known: false,
            convertible: false,
        }
    }

    /// Placeholder for stack items that carry no subtree
    pub fn empty() -> Self {
        ExprInfo {
            ty: DataType::Void,
            nullable: false,
            known: false,
            convertible: false,
        }
    }

    pub fn type_spec(&self) -> TypeSpec {
        TypeSpec {
            base: self.ty,
            nullable: self.nullable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        assert_eq!(TypeSpec::new(DataType::U8Slice).to_string(), "[]u8");
        assert_eq!(TypeSpec::nullable(DataType::I32).to_string(), "?i32");
    }

    #[test]
    fn test_null_literal_is_nullable() {
        let info = ExprInfo::literal(DataType::Null, false);
        assert!(info.nullable);
        assert!(info.known);
        assert!(!ExprInfo::literal(DataType::I32, true).nullable);
    }
}
