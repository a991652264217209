//! Printer integration tests.
//!
//! Each test runs source through parse -> bind -> lower -> render and checks
//! the JavaScript text.

use bumpalo::Bump;
use phast_binder::*;
use phast_core::InternalError;
use phast_diagnostics::DiagnosticCollection;
use phast_parser::parse_source;
use phast_printer::*;
use phast_transformers::lower_file;

/// Helper: parse and bind `<?php` + source, requiring no diagnostics.
fn bind_clean(source: &str) -> BoundFile {
    let arena = Bump::new();
    let text = arena.alloc_str(&format!("<?php {source}"));
    let mut diagnostics = DiagnosticCollection::new();
    let file = parse_source(&arena, "test.php", text, &mut diagnostics);
    let bound = bind(&file, &mut diagnostics, None);
    assert!(
        diagnostics.is_empty(),
        "source: {source}\n{:?}",
        diagnostics.diagnostics()
    );
    bound
}

/// Helper: full pipeline with default options.
fn print(source: &str) -> String {
    let lowered = lower_file(&bind_clean(source), "");
    render(&lowered, &PrinterOptions::default()).unwrap()
}

/// Helper: output lines after the import line, if any.
fn body_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|line| !line.starts_with("import "))
        .collect()
}

// ============================================================================
// Module Shape
// ============================================================================

#[test]
fn test_plain_statements_need_no_import() {
    let output = print("$a = 1; $b = $a + 2;");
    assert_eq!(output, "let $a, $b;\n$a = 1;\n$b = $a + 2;\n");
}

#[test]
fn test_import_lists_builtins_in_first_use_order() {
    let output = print("echo \"x\" . 5;");
    assert_eq!(
        output,
        "import { __php__print, __php__to_string } from \"./php-runtime.mjs\";\n\
         __php__print(\"x\" + __php__to_string(5));\n"
    );
}

#[test]
fn test_import_uses_configured_module() {
    let lowered = lower_file(&bind_clean("echo 1;"), "");
    let options = PrinterOptions {
        runtime_module: "php-runtime".to_string(),
        ..Default::default()
    };
    let output = render(&lowered, &options).unwrap();
    assert!(output.starts_with("import { __php__print } from \"php-runtime\";\n"));
}

#[test]
fn test_builtin_imported_once() {
    let output = print("echo strlen(\"ab\"); echo strlen(\"cd\");");
    assert!(output.starts_with("import { __php__print, strlen } from"));
    assert_eq!(output.matches("import").count(), 1);
}

#[test]
fn test_read_only_symbols_get_no_let() {
    let output = print("const LIMIT = 3; $n = 1;");
    assert!(output.contains("let $n;\n"));
    assert!(!output.contains("LIMIT;"));
}

#[test]
fn test_unlowered_tree_is_an_internal_error() {
    let bound = bind_clean("echo 1;");
    let err = render(&bound, &PrinterOptions::default()).unwrap_err();
    assert_eq!(err, InternalError::unlowered("BoundEchoStatement"));
}

// ============================================================================
// Control Flow
// ============================================================================

#[test]
fn test_plain_loops_print_no_labels() {
    let output = print("while (1) { break; } for ($i = 0; $i < 3; $i++) { continue; }");
    assert_eq!(
        body_lines(&output),
        vec![
            "let $i;",
            "while (1) {",
            "    break;",
            "}",
            "for ($i = 0; $i < 3; $i++) {",
            "    continue;",
            "}",
        ]
    );
}

#[test]
fn test_multi_level_break_prints_label() {
    let output = print("while (1) { while (1) { break 2; } }");
    assert_eq!(
        body_lines(&output),
        vec![
            "break_0: while (1) {",
            "    while (1) {",
            "        break break_0;",
            "    }",
            "}",
        ]
    );
}

#[test]
fn test_multi_level_continue_prints_label() {
    let output = print("while (1) { switch (1) { case 1: continue 2; } }");
    assert!(output.contains("continue_0: while (1) {"));
    assert!(output.contains("continue continue_0;"));
    assert!(!output.contains("break_1:"));
}

#[test]
fn test_continue_in_switch_prints_break() {
    let output = print("switch (1) { case 1: continue; default: echo 2; }");
    assert_eq!(
        body_lines(&output),
        vec![
            "switch (1) {",
            "    case 1:",
            "        break;",
            "    default:",
            "        __php__print(2);",
            "}",
        ]
    );
}

#[test]
fn test_if_else() {
    let output = print("if (1) { echo 1; } else { echo 2; }");
    assert!(output.contains("if (1) {\n    __php__print(1);\n} else {\n    __php__print(2);\n}\n"));
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_array_literal_prints_pairs() {
    let output = print("$a = [1, \"k\" => 2];");
    assert!(output.contains("$a = __php__array([[undefined, 1], [\"k\", 2]]);"));
}

#[test]
fn test_array_element_operations() {
    let output = print("$a = []; $a[\"k\"] = 3; $a[] = 4; echo $a[\"k\"];");
    let lines = body_lines(&output);
    assert_eq!(lines[1], "$a = __php__array([]);");
    assert_eq!(lines[2], "$a = __php__array_set($a, \"k\", 3);");
    assert_eq!(lines[3], "$a = __php__array_append($a, 4);");
    assert_eq!(lines[4], "__php__print(__php__array_get($a, \"k\"));");
}

#[test]
fn test_string_literal_is_escaped() {
    let output = print("$s = 'say \"hi\"';");
    assert!(output.contains("$s = \"say \\\"hi\\\"\";"));
}

#[test]
fn test_mixed_coalesce_is_parenthesized() {
    let output = print("$c = $a ?? $b || $d;");
    assert!(output.contains("$c = $a ?? ($b || $d);"));
}

#[test]
fn test_source_parentheses_are_kept() {
    let output = print("$a = (1 + 2) * 3;");
    assert!(output.contains("$a = (1 + 2) * 3;"));
}

#[test]
fn test_null_safe_member_access() {
    let output = print("$n = $a?->b;");
    assert!(output.contains("$n = $a?.b;"));
}

#[test]
fn test_free_names_resolve_through_runtime() {
    let output = print("namespace App; $p = new Point(1, 2);");
    assert_eq!(
        body_lines(&output),
        vec!["let $p;", "$p = new (__php__use(\"Point\", \"App\"))(1, 2);"]
    );
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_function_registration() {
    let output = print("function add($a, $b = 1) { $sum = $a + $b; return $sum; }");
    assert_eq!(
        body_lines(&output),
        vec![
            "__php__namespace(\"\", \"add\", () => {",
            "    return function add($a, $b = 1) {",
            "        let $sum;",
            "        $sum = $a + $b;",
            "        return $sum;",
            "    };",
            "});",
        ]
    );
}

#[test]
fn test_class_members() {
    let output = print(
        "class Point { public $x; public int $y = 0; const ORIGIN = 0; public static $count = 0; \
         public function __construct($x) { $this->x = $x; self::$count++; } \
         public function getX() { return $this->x; } }",
    );
    assert!(output.contains("    return class Point {\n"));
    assert!(output.contains("        x = null;\n"));
    assert!(output.contains("        y = 0;\n"));
    assert!(output.contains("        static ORIGIN = 0;\n"));
    assert!(output.contains("        static count = 0;\n"));
    assert!(output.contains("        constructor($x) {\n            this.x = $x;\n"));
    assert!(output.contains("(__php__use(\"Point\", \"\")).count++;"));
    assert!(output.contains("        getX() {\n            return this.x;\n        }\n"));
    assert!(!output.contains("$this"));
}

#[test]
fn test_abstract_methods_are_omitted() {
    let output = print(
        "abstract class Shape { abstract public function area(); \
         public function name() { return \"shape\"; } }",
    );
    assert!(!output.contains("area"));
    assert!(output.contains("name() {"));
}

#[test]
fn test_parent_constructor_prints_super() {
    let output = print(
        "class B extends A { public function __construct() { parent::__construct(1); } \
         public static function make() { return new self(); } }",
    );
    assert!(output.contains("return class B extends (__php__use(\"A\", \"\")) {"));
    assert!(output.contains("super(1);"));
    assert!(output.contains("static make() {"));
    assert!(output.contains("return new (__php__use(\"B\", \"\"))();"));
}
