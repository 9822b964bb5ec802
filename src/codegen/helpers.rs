// IFJcode24 routines backing builtins that have no single-instruction form.
// Each routine takes its arguments in LF@%p0.. and leaves the result on the data stack.

use crate::constants::HELPER_PREFIX;
use crate::semantic::builtins::Builtin;

const SUBSTRING: &str = "\
LABEL {label}
PUSHFRAME
DEFVAR LF@len
DEFVAR LF@res
DEFVAR LF@ch
DEFVAR LF@cond
STRLEN LF@len LF@%p0
LT LF@cond LF@%p1 int@0
JUMPIFEQ {label}$nil LF@cond bool@true
LT LF@cond LF@%p2 int@0
JUMPIFEQ {label}$nil LF@cond bool@true
GT LF@cond LF@%p1 LF@%p2
JUMPIFEQ {label}$nil LF@cond bool@true
LT LF@cond LF@%p1 LF@len
JUMPIFEQ {label}$nil LF@cond bool@false
GT LF@cond LF@%p2 LF@len
JUMPIFEQ {label}$nil LF@cond bool@true
MOVE LF@res string@
LABEL {label}$loop
JUMPIFEQ {label}$done LF@%p1 LF@%p2
GETCHAR LF@ch LF@%p0 LF@%p1
CONCAT LF@res LF@res LF@ch
ADD LF@%p1 LF@%p1 int@1
JUMP {label}$loop
LABEL {label}$done
PUSHS LF@res
POPFRAME
RETURN
LABEL {label}$nil
PUSHS nil@nil
POPFRAME
RETURN
";

const STRCMP: &str = "\
LABEL {label}
PUSHFRAME
DEFVAR LF@cond
LT LF@cond LF@%p0 LF@%p1
JUMPIFEQ {label}$less LF@cond bool@true
GT LF@cond LF@%p0 LF@%p1
JUMPIFEQ {label}$greater LF@cond bool@true
PUSHS int@0
POPFRAME
RETURN
LABEL {label}$less
PUSHS int@-1
POPFRAME
RETURN
LABEL {label}$greater
PUSHS int@1
POPFRAME
RETURN
";

const ORD: &str = "\
LABEL {label}
PUSHFRAME
DEFVAR LF@len
DEFVAR LF@cond
DEFVAR LF@res
STRLEN LF@len LF@%p0
LT LF@cond LF@%p1 int@0
JUMPIFEQ {label}$zero LF@cond bool@true
LT LF@cond LF@%p1 LF@len
JUMPIFEQ {label}$zero LF@cond bool@false
STRI2INT LF@res LF@%p0 LF@%p1
PUSHS LF@res
POPFRAME
RETURN
LABEL {label}$zero
PUSHS int@0
POPFRAME
RETURN
";

/// Call target of a helper routine, e.g. `$ifj$substring`
pub fn helper_label(builtin: Builtin) -> String {
    format!("{}{}", HELPER_PREFIX, builtin.name())
}

/// Full routine text, or `None` for builtins expanded inline
pub fn helper_routine(builtin: Builtin) -> Option<String> {
    let template = match builtin {
        Builtin::Substring => SUBSTRING,
        Builtin::Strcmp => STRCMP,
        Builtin::Ord => ORD,
        _ => return None,
    };
    Some(template.replace("{label}", &helper_label(builtin)))
}
