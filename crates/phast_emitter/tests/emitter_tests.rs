//! Emitter integration tests: bound file in, module text and paths out.

use bumpalo::Bump;
use phast_binder::{bind, BoundFile};
use phast_diagnostics::DiagnosticCollection;
use phast_emitter::*;
use phast_parser::parse_source;
use std::path::PathBuf;

/// Helper: parse and bind a file, ignoring diagnostics.
fn bind_file(file_name: &str, source: &str) -> BoundFile {
    let arena = Bump::new();
    let mut diagnostics = DiagnosticCollection::new();
    let file = parse_source(&arena, file_name, source, &mut diagnostics);
    bind(&file, &mut diagnostics, None)
}

#[test]
fn test_emit_lowers_and_prints() {
    let bound = bind_file("app/index.php", "<?php echo \"hi\";");
    let result = Emitter::new().emit(&bound).unwrap();
    assert_eq!(
        result.js_content,
        "import { __php__print } from \"./php-runtime.mjs\";\n__php__print(\"hi\");\n"
    );
    assert_eq!(result.output_files.len(), 1);
    assert_eq!(result.output_files[0].path, PathBuf::from("app/index.mjs"));
    assert_eq!(result.output_files[0].text, result.js_content);
}

#[test]
fn test_root_namespace_applies_before_namespace_statement() {
    let bound = bind_file("a.php", "<?php $x = new Foo(); namespace Other; $y = new Foo();");
    let mut emitter = Emitter::new();
    emitter.root_namespace = "App".to_string();
    let js = emitter.print(&bound).unwrap();
    assert!(js.contains("$x = new (__php__use(\"Foo\", \"App\"))();"));
    assert!(js.contains("$y = new (__php__use(\"Foo\", \"Other\"))();"));
}

#[test]
fn test_output_is_best_effort_with_diagnostics() {
    let arena = Bump::new();
    let mut diagnostics = DiagnosticCollection::new();
    let file = parse_source(&arena, "bad.php", "<?php $a = \"x\" * 2; echo 1;", &mut diagnostics);
    let bound = bind(&file, &mut diagnostics, None);
    assert!(!diagnostics.is_empty());

    let js = Emitter::new().print(&bound).unwrap();
    assert!(js.contains("$a = undefined;"));
    assert!(js.contains("__php__print(1);"));
}

#[test]
fn test_write_output_files_creates_directories() {
    let dir = std::env::temp_dir().join(format!("phast_emitter_test_{}", std::process::id()));
    let emitter = Emitter::new();
    let file = OutputFile {
        path: dir.join("nested").join("out.mjs"),
        text: "export {};\n".to_string(),
    };
    emitter.write_output_files(std::slice::from_ref(&file)).unwrap();
    assert_eq!(std::fs::read_to_string(&file.path).unwrap(), "export {};\n");
    std::fs::remove_dir_all(&dir).unwrap();
}
