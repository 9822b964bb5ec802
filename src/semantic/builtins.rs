//! Signatures of the `ifj.*` standard library
//!
//! Builtins are resolved by name after the `ifj.` prefix. Their signatures are fixed, so
//! they never appear in the function table built by the signature pre-pass.

use super::types::{DataType, TypeSpec};
use std::fmt;

/// Functions reachable through the `ifj` namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    ReadStr,
    ReadI32,
    ReadF64,
    Write,
    I2F,
    F2I,
    String,
    Length,
    Concat,
    Substring,
    Strcmp,
    Ord,
    Chr,
}

/// Accepted argument type for a builtin parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Any value, including null and nullable values
    Any,
    /// Exactly this non-nullable type (convertible literals are retyped)
    Typed(DataType),
}

const NO_PARAMS: &[ParamKind] = &[];
const ANY: &[ParamKind] = &[ParamKind::Any];
const INT: &[ParamKind] = &[ParamKind::Typed(DataType::I32)];
const FLOAT: &[ParamKind] = &[ParamKind::Typed(DataType::F64)];
const STR: &[ParamKind] = &[ParamKind::Typed(DataType::U8Slice)];
const STR_STR: &[ParamKind] = &[
    ParamKind::Typed(DataType::U8Slice),
    ParamKind::Typed(DataType::U8Slice),
];
const STR_INT: &[ParamKind] = &[
    ParamKind::Typed(DataType::U8Slice),
    ParamKind::Typed(DataType::I32),
];
const STR_INT_INT: &[ParamKind] = &[
    ParamKind::Typed(DataType::U8Slice),
    ParamKind::Typed(DataType::I32),
    ParamKind::Typed(DataType::I32),
];

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "readstr" => Builtin::ReadStr,
            "readi32" => Builtin::ReadI32,
            "readf64" => Builtin::ReadF64,
            "write" => Builtin::Write,
            "i2f" => Builtin::I2F,
            "f2i" => Builtin::F2I,
            "string" => Builtin::String,
            "length" => Builtin::Length,
            "concat" => Builtin::Concat,
            "substring" => Builtin::Substring,
            "strcmp" => Builtin::Strcmp,
            "ord" => Builtin::Ord,
            "chr" => Builtin::Chr,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::ReadStr => "readstr",
            Builtin::ReadI32 => "readi32",
            Builtin::ReadF64 => "readf64",
            Builtin::Write => "write",
            Builtin::I2F => "i2f",
            Builtin::F2I => "f2i",
            Builtin::String => "string",
            Builtin::Length => "length",
            Builtin::Concat => "concat",
            Builtin::Substring => "substring",
            Builtin::Strcmp => "strcmp",
            Builtin::Ord => "ord",
            Builtin::Chr => "chr",
        }
    }

    pub fn params(self) -> &'static [ParamKind] {
        match self {
            Builtin::ReadStr | Builtin::ReadI32 | Builtin::ReadF64 => NO_PARAMS,
            Builtin::Write => ANY,
            Builtin::I2F | Builtin::Chr => INT,
            Builtin::F2I => FLOAT,
            Builtin::String | Builtin::Length => STR,
            Builtin::Concat | Builtin::Strcmp => STR_STR,
            Builtin::Substring => STR_INT_INT,
            Builtin::Ord => STR_INT,
        }
    }

    /// Return type, `None` for void
    pub fn return_type(self) -> Option<TypeSpec> {
        match self {
            Builtin::ReadStr | Builtin::Substring => Some(TypeSpec::nullable(DataType::U8Slice)),
            Builtin::ReadI32 => Some(TypeSpec::nullable(DataType::I32)),
            Builtin::ReadF64 => Some(TypeSpec::nullable(DataType::F64)),
            Builtin::Write => None,
            Builtin::I2F => Some(TypeSpec::new(DataType::F64)),
            Builtin::F2I | Builtin::Length | Builtin::Strcmp | Builtin::Ord => {
                Some(TypeSpec::new(DataType::I32))
            }
            Builtin::String | Builtin::Concat | Builtin::Chr => {
                Some(TypeSpec::new(DataType::U8Slice))
            }
        }
    }

    /// Builtins implemented as a called routine rather than inline instructions
    pub fn needs_helper(self) -> bool {
        matches!(self, Builtin::Substring | Builtin::Strcmp | Builtin::Ord)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ifj.{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Builtin::from_name("substring"), Some(Builtin::Substring));
        assert_eq!(Builtin::from_name("print"), None);
        assert_eq!(Builtin::Chr.to_string(), "ifj.chr");
    }

    #[test]
    fn test_signatures() {
        assert_eq!(Builtin::Substring.params().len(), 3);
        assert!(Builtin::ReadI32.return_type().is_some_and(|t| t.nullable));
        assert_eq!(Builtin::Write.return_type(), None);
        assert!(Builtin::Ord.needs_helper());
        assert!(!Builtin::Concat.needs_helper());
    }
}
