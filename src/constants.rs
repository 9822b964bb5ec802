// Constants for the IFJ24 compiler

/// Module name the prolog must import: `const ifj = @import("ifj24.zig");`
pub const PROLOG_MODULE: &str = "ifj24.zig";

/// Identifier the prolog binds the standard library to
pub const STDLIB_NAMESPACE: &str = "ifj";

/// Name of the mandatory entry point
pub const MAIN_FUNCTION: &str = "main";

/// First line of every generated program
pub const TARGET_HEADER: &str = ".IFJcode24";

/// Global scratch variables used by builtin expansions
/// Declared once in the program header, never live across a call
pub const TEMPORARIES: [&str; 2] = ["GF@%tmp0", "GF@%tmp1"];

/// Prefix for temporary-frame argument slots: `TF@%p0`, `TF@%p1`, ...
pub const PARAM_PREFIX: &str = "%p";

/// Prefix for labels of generated helper routines (`$ifj$substring`, ...)
/// `$` cannot start an IFJ24 identifier, so these never collide with user functions
pub const HELPER_PREFIX: &str = "$ifj$";

/// Separator between a variable name and its shadowing counter in frame slots
pub const SLOT_SEPARATOR: char = '$';
