//! Compiler integration tests.
//!
//! End-to-end tests for the compilation pipeline: scan -> parse -> bind ->
//! lower -> print, single files and whole programs.

use phast_compiler::*;
use phast_options::CompilerOptions;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// A program using classes, a labeled multi-level break, concatenation and
/// ordered arrays.
const ROUND_TRIP_SOURCE: &str = r#"<?php
class Counter {
    private $count = 0;

    public function increment() {
        $this->count++;
        return $this;
    }

    public function get() {
        return $this->count;
    }
}

$counter = new Counter();
$counter->increment()->increment();
echo "count: " . $counter->get() . "\n";

$items = ["a" => 1, "b" => 2];
$items[] = 3;
$total = 0;
for ($i = 0; $i < 10; $i++) {
    while (1) {
        if ($i == 3) {
            break 2;
        }
        $total = $total + $i;
        break;
    }
}
echo "total: " . $total . "\n";
echo implode(",", $items) . "\n";
echo count($items) . "\n";
"#;

const ROUND_TRIP_OUTPUT: &str = "count: 2\ntotal: 3\n1,2,3\n3\n";

/// Helper: compile with default options.
fn compile(source: &str) -> CompileOutput {
    compile_source("test.php", source, &CompilerOptions::default()).unwrap()
}

/// Helper: a fresh scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("phast_compiler_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Single Files
// ============================================================================

#[test]
fn test_compile_empty_file() {
    let output = compile("<?php");
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.js, "");
}

#[test]
fn test_round_trip_program_is_diagnostics_free() {
    let output = compile(ROUND_TRIP_SOURCE);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);

    let js = &output.js;
    assert!(js.starts_with("import { __php__namespace, "));
    assert!(js.contains(" from \"./php-runtime.mjs\";\n"));
    assert!(js.contains("let $counter, $items, $total, $i;\n"));
    assert!(js.contains("__php__namespace(\"\", \"Counter\", () => {"));
    assert!(js.contains("this.count++;"));
    assert!(js.contains("$counter = new (__php__use(\"Counter\", \"\"))();"));
    assert!(js.contains("$items = __php__array([[\"a\", 1], [\"b\", 2]]);"));
    assert!(js.contains("$items = __php__array_append($items, 3);"));
    assert!(js.contains("break_0: for ($i = 0; $i < 10; $i++) {"));
    assert!(js.contains("break break_0;"));
    assert!(js.contains("__php__print(\"total: \" + __php__to_string($total) + \"\\n\");"));
    assert!(!js.contains("echo"));
}

#[test]
fn test_function_does_not_read_file_variables() {
    let output = compile("<?php $x = 1; function f() { return $x; } var_dump(f());");
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert!(output.js.contains("let $x;\n"));
    assert!(output
        .js
        .contains("    return function f() {\n        let $x;\n        return $x;\n    };\n"));
}

#[test]
fn test_parent_as_base_class_is_a_diagnostic() {
    let output = compile("<?php class A extends parent {}");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code, 2019);
    assert!(output.js.contains("class A {"));
}

#[test]
fn test_diagnostics_still_produce_output() {
    let output = compile("<?php break; echo 1;");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code, 2007);
    assert_eq!(output.diagnostics[0].file.as_deref(), Some("test.php"));
    assert!(output.has_errors());
    assert!(output.js.contains("__php__print(1);"));
}

#[test]
fn test_syntax_errors_are_reported() {
    let output = compile("<?php $a = ;");
    assert!(output.diagnostics.iter().any(|d| d.code < 2000));
}

#[test]
fn test_runtime_module_option() {
    let options = CompilerOptions {
        runtime_module: Some("php-runtime".into()),
        root_namespace: Some("App".into()),
        ..Default::default()
    };
    let output = compile_source("a.php", "<?php echo new Foo();", &options).unwrap();
    assert!(output.js.contains(" from \"php-runtime\";"));
    assert!(output.js.contains("__php__use(\"Foo\", \"App\")"));
}

#[test]
fn test_dump_bound() {
    let (dump, diagnostics) = dump_bound("test.php", "<?php while (1) { $i++; }");
    assert!(diagnostics.is_empty());
    assert!(dump.contains("BoundBodyStatement break_0 continue_0"));
}

// ============================================================================
// Programs
// ============================================================================

#[test]
fn test_compile_all_keeps_source_order() {
    let mut program = Program::new(vec![], CompilerOptions::default());
    for i in 0..8 {
        program.add_source(format!("file{i}.php"), format!("<?php $x{i} = {i};"));
    }
    let results = program.compile_all();
    assert_eq!(results.len(), 8);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.file_name, format!("file{i}.php"));
        let output = result.output.as_ref().unwrap();
        assert!(output.js.contains(&format!("$x{i} = {i};")));
    }
}

#[test]
fn test_load_missing_root_file() {
    let mut program = Program::new(vec![PathBuf::from("/nonexistent/main.php")], CompilerOptions::default());
    let err = program.load_root_files().unwrap_err();
    assert!(matches!(err, CompileError::Read { .. }));
}

#[test]
fn test_load_rejects_invalid_utf8() {
    let dir = scratch_dir("utf8");
    let source = dir.join("latin1.php");
    fs::write(&source, b"<?php echo \"caf\xe9\";").unwrap();
    let mut program = Program::new(vec![source], CompilerOptions::default());
    let err = program.load_root_files().unwrap_err();
    assert!(matches!(err, CompileError::InvalidUtf8 { .. }));
    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_no_emit_writes_nothing() {
    let options = CompilerOptions {
        no_emit: Some(true),
        ..Default::default()
    };
    let mut program = Program::new(vec![], options);
    program.add_source("a.php", "<?php echo 1;");
    let results = program.compile_all();
    assert!(program.emit(&results).unwrap().is_empty());
}

#[test]
fn test_emit_writes_modules_and_runtime() {
    let dir = scratch_dir("emit");
    let source = dir.join("main.php");
    fs::write(&source, "<?php echo \"hi\";").unwrap();

    let options = CompilerOptions {
        out_dir: Some(dir.join("dist").to_string_lossy().into_owned()),
        emit_runtime: Some(true),
        ..Default::default()
    };
    let mut program = Program::new(vec![source], options);
    program.load_root_files().unwrap();
    let results = program.compile_all();
    let written = program.emit(&results).unwrap();

    assert_eq!(written, vec![dir.join("dist/main.mjs"), dir.join("dist/php-runtime.mjs")]);
    assert!(fs::read_to_string(dir.join("dist/main.mjs")).unwrap().contains("__php__print(\"hi\");"));
    assert_eq!(fs::read_to_string(dir.join("dist/php-runtime.mjs")).unwrap(), RUNTIME_SOURCE);
    fs::remove_dir_all(&dir).unwrap();
}

// ============================================================================
// Execution
// ============================================================================

#[test]
#[ignore = "requires a node binary on PATH"]
fn test_round_trip_output_matches_php() {
    let dir = scratch_dir("node");
    let output = compile(ROUND_TRIP_SOURCE);
    fs::write(dir.join("main.mjs"), &output.js).unwrap();
    fs::write(dir.join("php-runtime.mjs"), RUNTIME_SOURCE).unwrap();

    let run = Command::new("node").arg(dir.join("main.mjs")).output().unwrap();
    assert!(run.status.success(), "{}", String::from_utf8_lossy(&run.stderr));
    assert_eq!(String::from_utf8_lossy(&run.stdout), ROUND_TRIP_OUTPUT);
    fs::remove_dir_all(&dir).unwrap();
}
