// Integration tests for whole-program semantic checks

use ifjc::compile;
use ifjc::errors::ErrorKind;
use ifjc::parser::ast::Stmt;
use ifjc::parser::parse::Parser;

const PROLOG: &str = "const ifj = @import(\"ifj24.zig\");\n";

fn check(source: &str) -> Result<(), ErrorKind> {
    let full = format!("{PROLOG}{source}");
    compile(&full).map(|_| ()).map_err(|e| e.kind)
}

fn check_main(body: &str) -> Result<(), ErrorKind> {
    check(&format!("pub fn main() void {{\n{body}\n}}"))
}

#[test]
fn test_valid_program() {
    let result = check(
        r#"
        pub fn factorial(n: i32) i32 {
            if (n < 2) {
                return 1;
            } else {
                const rest = factorial(n - 1);
                return n * rest;
            }
        }

        pub fn main() void {
            const input = ifj.readi32();
            if (input) |value| {
                const result = factorial(value);
                ifj.write(result);
            } else {
                ifj.write("no input\n");
            }
        }
        "#,
    );
    assert!(result.is_ok(), "Compilation failed: {:?}", result);
}

#[test]
fn test_shadowing_allowed_in_nested_scope() {
    let result = check_main(
        r#"
        const x: i32 = 1;
        if (x == 1) {
            const x: f64 = 2.5;
            ifj.write(x);
        }
        "#,
    );
    assert!(result.is_ok(), "Shadowing rejected: {:?}", result);
}

#[test]
fn test_redeclaration_in_same_scope() {
    assert_eq!(
        check_main("var x = 1; var x = 2; x = x + 1;"),
        Err(ErrorKind::Redefinition)
    );
}

#[test]
fn test_unused_variable() {
    assert_eq!(check_main("var never = 3;"), Err(ErrorKind::Unused));
}

#[test]
fn test_unused_parameter_is_fine() {
    let result = check(
        "pub fn ignore(a: i32) void { return; }\n\
         pub fn main() void { ignore(1); }",
    );
    assert!(result.is_ok(), "{:?}", result);
}

#[test]
fn test_undefined_variable_and_function() {
    assert_eq!(check_main("ifj.write(ghost);"), Err(ErrorKind::Undefined));
    assert_eq!(check_main("ghost(1);"), Err(ErrorKind::Undefined));
}

#[test]
fn test_call_argument_mismatch() {
    let header = "pub fn takes(a: i32, b: []u8) void { ifj.write(a); ifj.write(b); }\n";
    assert_eq!(
        check(&format!("{header}pub fn main() void {{ takes(1); }}")),
        Err(ErrorKind::Signature)
    );
    assert_eq!(
        check(&format!("{header}pub fn main() void {{ takes(1.5, \"s\"); }}")),
        Err(ErrorKind::Signature)
    );
    assert!(check(&format!("{header}pub fn main() void {{ takes(2.0, \"s\"); }}")).is_ok());
}

#[test]
fn test_return_rules() {
    assert_eq!(
        check("pub fn f() i32 { return; }\npub fn main() void {}"),
        Err(ErrorKind::Return)
    );
    assert_eq!(
        check("pub fn f() i32 { ifj.write(1); }\npub fn main() void {}"),
        Err(ErrorKind::Return)
    );
    assert_eq!(
        check("pub fn f() ?i32 { return 1.5; }\npub fn main() void {}"),
        Err(ErrorKind::Signature)
    );
    assert!(check("pub fn f() ?i32 { return null; }\npub fn main() void {}").is_ok());
}

#[test]
fn test_nullable_assignment() {
    assert!(check_main("var x: ?i32 = null; x = 5; _ = x;").is_ok());
    assert_eq!(
        check_main("var x: i32 = 0; x = ifj.readi32(); _ = x;"),
        Err(ErrorKind::Type)
    );
}

#[test]
fn test_inference_failure() {
    assert_eq!(check_main("const n = null; _ = n;"), Err(ErrorKind::Inference));
}

#[test]
fn test_condition_must_be_relational() {
    assert_eq!(
        check_main("const a = 3; if (a + 1) { ifj.write(a); }"),
        Err(ErrorKind::Type)
    );
}

#[test]
fn test_assignment_to_parameter() {
    assert_eq!(
        check("pub fn f(p: i32) void { p = 2; }\npub fn main() void {}"),
        Err(ErrorKind::Redefinition)
    );
}

#[test]
fn test_lexical_and_syntax_errors() {
    assert_eq!(check_main("var s = \"open;"), Err(ErrorKind::Lexical));
    assert_eq!(check_main("var x = (1 + 2;"), Err(ErrorKind::Syntax));
    assert_eq!(check_main("var x = 1 < 2 < 3;"), Err(ErrorKind::Syntax));
}

#[test]
fn test_const_propagated_into_later_uses() {
    let source = format!(
        "{PROLOG}pub fn main() void {{ const k = 4 * 2; var f: f64 = k / 2; _ = f; }}"
    );
    let mut parser = Parser::new(&source).expect("Parser creation failed");
    let program = parser.parse_program().expect("Parsing failed");

    match &program.functions[0].body[1] {
        Stmt::VarDecl { value, .. } => assert_eq!(value.to_string(), "(/ 8.0 2.0)"),
        other => panic!("Expected declaration, got {:?}", other),
    }
}

#[test]
fn test_integer_quotient_next_to_float() {
    assert_eq!(
        check_main("var f: f64 = 1.5; f = f + 7 / 2; _ = f;"),
        Err(ErrorKind::Type)
    );
    assert_eq!(check_main("var g: f64 = 7 / 2; _ = g;"), Err(ErrorKind::Type));
    assert!(check_main("const a = 7 / 2; var f: f64 = 1.5; f = f + a; _ = f;").is_ok());
}

#[test]
fn test_bad_character_after_forward_call() {
    assert_eq!(
        check(
            "pub fn main() void { foo(); }\n\
             pub fn bar() void { var s = 1 # 2; }\n\
             pub fn foo() void {}"
        ),
        Err(ErrorKind::Lexical)
    );
}
