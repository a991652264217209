//! Binder integration tests.
//!
//! Tests the parse -> bind pipeline: name resolution, implicit declaration,
//! jump labels, operators and declaration checks.

use bumpalo::Bump;
use phast_binder::*;
use phast_diagnostics::DiagnosticCollection;
use phast_parser::parse_source;
use std::rc::Rc;

/// Helper: parse and bind `<?php` + source.
fn bind_php(source: &str) -> (BoundFile, DiagnosticCollection) {
    let arena = Bump::new();
    let text = arena.alloc_str(&format!("<?php {source}"));
    let mut diagnostics = DiagnosticCollection::new();
    let file = parse_source(&arena, "test.php", text, &mut diagnostics);
    let bound = bind(&file, &mut diagnostics, None);
    (bound, diagnostics)
}

/// Helper: bind and require no diagnostics.
fn bind_clean(source: &str) -> BoundFile {
    let (bound, diagnostics) = bind_php(source);
    assert!(
        diagnostics.is_empty(),
        "source: {source}\n{:?}",
        diagnostics.diagnostics()
    );
    bound
}

fn codes(diagnostics: &DiagnosticCollection) -> Vec<u32> {
    diagnostics.diagnostics().iter().map(|d| d.code).collect()
}

fn expression_of(statement: &BoundStatement) -> &ExprRef {
    match statement {
        BoundStatement::Expression(n) => &n.expression,
        BoundStatement::Echo(n) => &n.expression,
        other => panic!("expected expression statement, got {}", other.kind_name()),
    }
}

fn loop_body(statement: &BoundStatement) -> &BoundBodyStatement {
    let body = match statement {
        BoundStatement::While(n) => &n.body,
        BoundStatement::For(n) => &n.body,
        other => panic!("expected loop, got {}", other.kind_name()),
    };
    match &**body {
        BoundStatement::Body(b) => b,
        other => panic!("expected body, got {}", other.kind_name()),
    }
}

/// Every break/continue under `statement`, in source order.
fn jumps(statement: &BoundStatement, out: &mut Vec<(LabelRole, LabelRef)>) {
    match statement {
        BoundStatement::Break(n) => out.push((LabelRole::Break, n.label.clone())),
        BoundStatement::Continue(n) => out.push((LabelRole::Continue, n.label.clone())),
        BoundStatement::Block(n) => n.statements.iter().for_each(|s| jumps(s, out)),
        BoundStatement::If(n) => {
            jumps(&n.then_statement, out);
            if let Some(ref e) = n.else_statement {
                jumps(e, out);
            }
        }
        BoundStatement::While(n) => jumps(&n.body, out),
        BoundStatement::For(n) => jumps(&n.body, out),
        BoundStatement::Body(n) => jumps(n.statement(), out),
        BoundStatement::Switch(n) => {
            for case in n.cases() {
                case.statements.iter().for_each(|s| jumps(s, out));
            }
        }
        _ => {}
    }
}

// ============================================================================
// Implicit Declaration
// ============================================================================

#[test]
fn test_assignment_declares_variable() {
    let bound = bind_clean("$a = 1; $b = $a;");
    let a = bound.scope.lookup_local("$a").expect("$a declared");
    assert!(!a.read_only);
    assert!(bound.scope.lookup_local("$b").is_some());

    let BoundExpression::Assignment(second) = &**expression_of(&bound.statements[1]) else {
        panic!("expected assignment");
    };
    let BoundExpression::Name(read) = &*second.value else {
        panic!("expected name");
    };
    assert!(std::sync::Arc::ptr_eq(&read.symbol, &a));
}

#[test]
fn test_read_of_unknown_name_is_any_placeholder() {
    let bound = bind_clean("echo $never_assigned;");
    let BoundExpression::Name(name) = &**expression_of(&bound.statements[0]) else {
        panic!("expected name");
    };
    assert_eq!(name.symbol.name, "$never_assigned");
    assert!(name.symbol.ty.is_any());
    assert!(bound.scope.lookup_local("$never_assigned").is_none());
}

#[test]
fn test_unknown_bare_name_is_not_an_error() {
    let bound = bind_clean("render_page(1);");
    let BoundExpression::Binary(call) = &**expression_of(&bound.statements[0]) else {
        panic!("expected call");
    };
    assert_eq!(call.operator.kind, BinaryOperatorKind::FunctionCall);
    assert!(call.ty.is_any());
}

#[test]
fn test_function_variables_are_local() {
    let bound = bind_clean("$outer = 1; function f() { $inner = $outer; }");
    assert!(bound.scope.lookup_local("$inner").is_none());
    let function = bound
        .statements
        .iter()
        .find_map(|s| match &**s {
            BoundStatement::Function(f) => Some(f),
            _ => None,
        })
        .expect("function");
    assert!(function.scope.lookup_local("$inner").is_some());
    assert!(function.scope.lookup_local("$outer").is_none());
    assert!(bound.scope.lookup_local("f").is_some());
}

#[test]
fn test_unknown_variable_in_function_is_declared_locally() {
    let bound = bind_clean("$x = 1; function f() { return $x; }");
    let function = bound
        .statements
        .iter()
        .find_map(|s| match &**s {
            BoundStatement::Function(f) => Some(f),
            _ => None,
        })
        .expect("function");
    let local = function.scope.lookup_local("$x").expect("$x declared in f");
    let outer = bound.scope.lookup_local("$x").expect("$x declared at file level");
    assert!(!std::sync::Arc::ptr_eq(&local, &outer));
    assert!(local.ty.is_any());

    let body = function.body.as_ref().expect("body");
    let BoundStatement::Return(BoundReturnStatement {
        expression: Some(ref value),
    }) = *body[0]
    else {
        panic!("expected return");
    };
    let BoundExpression::Name(read) = &**value else {
        panic!("expected name");
    };
    assert!(std::sync::Arc::ptr_eq(&read.symbol, &local));
}

#[test]
fn test_this_in_static_method_is_not_declared() {
    let bound = bind_clean("class A { static function make() { return $this; } }");
    let BoundStatement::Class(class) = &*bound.statements[0] else {
        panic!("expected class");
    };
    assert!(class.methods[0].scope.lookup_local("$this").is_none());
}

// ============================================================================
// Read-only Enforcement
// ============================================================================

#[test]
fn test_assignment_to_const_reports_once_and_keeps_value() {
    let (bound, diagnostics) = bind_php("const LIMIT = 3; LIMIT = 4;");
    assert_eq!(codes(&diagnostics), vec![2003]);
    let BoundExpression::Literal(literal) = &**expression_of(&bound.statements[1]) else {
        panic!("expected the right-hand side alone");
    };
    assert_eq!(literal.value, ConstantValue::Int(4));
}

#[test]
fn test_assignment_to_this_is_read_only() {
    let (_, diagnostics) = bind_php("class A { function f() { $this = 1; } }");
    assert_eq!(codes(&diagnostics), vec![2003]);
}

#[test]
fn test_assignment_to_builtin_is_read_only() {
    let (_, diagnostics) = bind_php("strlen = 1;");
    assert_eq!(codes(&diagnostics), vec![2003]);
}

#[test]
fn test_const_redeclaration() {
    let (_, diagnostics) = bind_php("const A = 1; const A = 2;");
    assert_eq!(codes(&diagnostics), vec![2002]);
}

#[test]
fn test_typed_parameter_mismatch() {
    let (_, diagnostics) = bind_php("function f(int $n) { $n = \"text\"; }");
    assert_eq!(codes(&diagnostics), vec![2004]);
}

#[test]
fn test_any_is_assignable_to_typed_parameter() {
    bind_clean("function f(int $n, $m) { $n = $m; }");
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn test_jump_labels_are_the_body_labels() {
    let bound = bind_clean("while (true) { if ($x) { break; } continue; }");
    let body = loop_body(&bound.statements[0]);
    let mut found = Vec::new();
    jumps(&bound.statements[0], &mut found);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].0, LabelRole::Break);
    assert!(Rc::ptr_eq(&found[0].1, &body.break_label));
    assert_eq!(found[1].0, LabelRole::Continue);
    assert!(Rc::ptr_eq(&found[1].1, &body.continue_label));
}

#[test]
fn test_label_names_count_per_role() {
    let bound = bind_clean("while (1) {} for (;;) {} switch ($x) { default: }");
    let first = loop_body(&bound.statements[0]);
    let second = loop_body(&bound.statements[1]);
    assert_eq!(first.break_label.name, "break_0");
    assert_eq!(first.continue_label.name, "continue_0");
    assert_eq!(second.break_label.name, "break_1");
    assert_eq!(second.continue_label.name, "continue_1");
    let BoundStatement::Switch(switch) = &*bound.statements[2] else {
        panic!("expected switch");
    };
    assert_eq!(switch.break_label.name, "break_2");
    assert!(!first.break_label.is_materialized());
}

#[test]
fn test_break_two_targets_outer_loop() {
    let bound = bind_clean("while (1) { while (2) { break 2; } }");
    let outer = loop_body(&bound.statements[0]);
    let mut found = Vec::new();
    jumps(&bound.statements[0], &mut found);
    assert_eq!(found.len(), 1);
    assert!(Rc::ptr_eq(&found[0].1, &outer.break_label));
}

#[test]
fn test_break_past_stack_is_no_op() {
    let (bound, diagnostics) = bind_php("while (1) { while (2) { break 3; } }");
    assert_eq!(codes(&diagnostics), vec![2008]);
    let mut found = Vec::new();
    jumps(&bound.statements[0], &mut found);
    assert!(found.is_empty());

    let outer = loop_body(&bound.statements[0]);
    let BoundStatement::Block(outer_block) = &**outer.statement() else {
        panic!("expected block");
    };
    let inner = loop_body(&outer_block.statements[0]);
    let BoundStatement::Block(inner_block) = &**inner.statement() else {
        panic!("expected block");
    };
    assert!(matches!(&*inner_block.statements[0], BoundStatement::Semicolon));
}

#[test]
fn test_break_outside_loop() {
    let (bound, diagnostics) = bind_php("break;");
    assert_eq!(codes(&diagnostics), vec![2007]);
    assert!(matches!(&*bound.statements[0], BoundStatement::Semicolon));
}

#[test]
fn test_zero_and_negative_depth() {
    let (_, diagnostics) = bind_php("while (1) { break 0; continue -1; }");
    assert_eq!(codes(&diagnostics), vec![2018, 2018]);
}

#[test]
fn test_continue_in_switch_targets_switch() {
    let bound = bind_clean("while (1) { switch ($x) { case 1: continue; } }");
    let mut found = Vec::new();
    jumps(&bound.statements[0], &mut found);
    let body = loop_body(&bound.statements[0]);
    let BoundStatement::Block(block) = &**body.statement() else {
        panic!("expected block");
    };
    let BoundStatement::Switch(switch) = &*block.statements[0] else {
        panic!("expected switch");
    };
    assert_eq!(found.len(), 1);
    assert!(Rc::ptr_eq(&found[0].1, &switch.break_label));
}

#[test]
fn test_function_body_does_not_see_enclosing_loop() {
    let (_, diagnostics) = bind_php("while (1) { function f() { break; } }");
    assert_eq!(codes(&diagnostics), vec![2007]);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_concatenation_is_string_typed() {
    let bound = bind_clean("$s = \"a\" . 1;");
    let BoundExpression::Assignment(assignment) = &**expression_of(&bound.statements[0]) else {
        panic!("expected assignment");
    };
    let BoundExpression::Binary(concat) = &*assignment.value else {
        panic!("expected binary");
    };
    assert_eq!(concat.operator.kind, BinaryOperatorKind::Concatenation);
    assert_eq!(concat.ty, Type::string());
}

#[test]
fn test_unknown_binary_operator_is_error_expression() {
    let (bound, diagnostics) = bind_php("\"a\" * 2;");
    assert_eq!(codes(&diagnostics), vec![2005]);
    assert!(matches!(&**expression_of(&bound.statements[0]), BoundExpression::Error));
}

#[test]
fn test_error_operand_does_not_cascade() {
    let (_, diagnostics) = bind_php("(\"a\" * 2) + 1;");
    assert_eq!(codes(&diagnostics), vec![2005]);
}

#[test]
fn test_unknown_unary_operator() {
    let (bound, diagnostics) = bind_php("-\"a\";");
    assert_eq!(codes(&diagnostics), vec![2006]);
    assert!(matches!(&**expression_of(&bound.statements[0]), BoundExpression::Error));
}

#[test]
fn test_increment_requires_variable() {
    let (_, diagnostics) = bind_php("5++;");
    assert_eq!(codes(&diagnostics), vec![2012]);
    bind_clean("$i++; --$i; $this->count++;");
}

#[test]
fn test_builtin_call_uses_return_type() {
    let bound = bind_clean("$n = strlen(\"abc\");");
    let BoundExpression::Assignment(assignment) = &**expression_of(&bound.statements[0]) else {
        panic!("expected assignment");
    };
    assert_eq!(assignment.ty, Type::int());
}

#[test]
fn test_new_without_arguments_becomes_call() {
    let bound = bind_clean("new Foo;");
    let BoundExpression::Unary(new) = &**expression_of(&bound.statements[0]) else {
        panic!("expected unary");
    };
    assert_eq!(new.operator.kind, UnaryOperatorKind::New);
    let BoundExpression::Binary(call) = &*new.operand else {
        panic!("expected call");
    };
    assert_eq!(call.operator.kind, BinaryOperatorKind::FunctionCall);
    assert!(matches!(&*call.right, BoundExpression::Empty));
}

#[test]
fn test_new_with_arguments_of_declared_class() {
    let bound = bind_clean("class Point {} new Point(1, 2);");
    let BoundExpression::Unary(new) = &**expression_of(&bound.statements[1]) else {
        panic!("expected unary");
    };
    let BoundExpression::Binary(call) = &*new.operand else {
        panic!("expected call");
    };
    assert_eq!(call_arguments(&call.right).len(), 2);
}

#[test]
fn test_member_name_is_not_resolved() {
    let bound = bind_clean("$o->count;");
    let BoundExpression::Binary(member) = &**expression_of(&bound.statements[0]) else {
        panic!("expected member access");
    };
    assert_eq!(member.operator.kind, BinaryOperatorKind::MemberAccess);
    let BoundExpression::Name(name) = &*member.right else {
        panic!("expected name");
    };
    assert!(!name.symbol.is_builtin());
}

#[test]
fn test_compound_assignment_is_desugared() {
    let bound = bind_clean("$s = \"\"; $s .= \"x\";");
    let BoundExpression::Assignment(assignment) = &**expression_of(&bound.statements[1]) else {
        panic!("expected assignment");
    };
    let BoundExpression::Binary(concat) = &*assignment.value else {
        panic!("expected binary");
    };
    assert_eq!(concat.operator.kind, BinaryOperatorKind::Concatenation);
}

#[test]
fn test_fat_arrow_outside_array() {
    let (_, diagnostics) = bind_php("$x = 1 => 2;");
    assert_eq!(codes(&diagnostics), vec![2017]);
}

#[test]
fn test_array_literal_elements() {
    let bound = bind_clean("$a = [1, \"k\" => 2];");
    let BoundExpression::Assignment(assignment) = &**expression_of(&bound.statements[0]) else {
        panic!("expected assignment");
    };
    let BoundExpression::ArrayLiteral(array) = &*assignment.value else {
        panic!("expected array literal");
    };
    assert_eq!(array.elements.len(), 2);
    let BoundExpression::Binary(pair) = &*array.elements[1] else {
        panic!("expected pair");
    };
    assert_eq!(pair.operator.kind, BinaryOperatorKind::KeyValue);
}

#[test]
fn test_invalid_member_assignment_target() {
    let (_, diagnostics) = bind_php("f() = 1;");
    assert!(codes(&diagnostics).contains(&2016));
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_class_modifier_collision() {
    let (_, diagnostics) = bind_php("final abstract class A {}");
    assert_eq!(codes(&diagnostics), vec![2010]);
}

#[test]
fn test_method_modifiers() {
    let (_, diagnostics) = bind_php(
        "class A { public private function f() {} readonly function g() {} public public $x; }",
    );
    let mut found = codes(&diagnostics);
    found.sort();
    assert_eq!(found, vec![2009, 2010, 2011]);
}

#[test]
fn test_abstract_method_body_rules() {
    let (_, diagnostics) =
        bind_php("abstract class S { abstract function area() { return 1; } function name(); }");
    assert_eq!(codes(&diagnostics), vec![2014, 2015]);
}

#[test]
fn test_unknown_type_name() {
    let (_, diagnostics) = bind_php("function f(Widget $w) {}");
    assert_eq!(codes(&diagnostics), vec![2001]);
}

#[test]
fn test_class_type_declared_later_in_file() {
    bind_clean("function f(Widget $w): Widget { return $w; } class Widget {}");
}

#[test]
fn test_class_members_and_this() {
    let bound = bind_clean(
        "class Counter { private int $count = 0; const STEP = 1; \
         public function inc() { $this->count++; } \
         public static function make() { return new Counter(); } }",
    );
    let BoundStatement::Class(class) = &*bound.statements[0] else {
        panic!("expected class");
    };
    assert_eq!(class.properties.len(), 2);
    assert_eq!(class.properties[0].name, "count");
    assert_eq!(class.properties[0].ty, Type::int());
    assert!(class.properties[1].is_const);
    let this = class.methods[0].scope.lookup_local("$this").expect("$this");
    assert!(this.read_only);
    assert_eq!(this.ty, class.ty);
    assert!(class.methods[1].scope.lookup_local("$this").is_none());
}

#[test]
fn test_duplicate_class() {
    let (_, diagnostics) = bind_php("class A {} class A {}");
    assert_eq!(codes(&diagnostics), vec![2002]);
}

#[test]
fn test_duplicate_member() {
    let (_, diagnostics) = bind_php("class A { function f() {} function f() {} }");
    assert_eq!(codes(&diagnostics), vec![2002]);
}

#[test]
fn test_extends_binds_base_name() {
    let bound = bind_clean("class Base {} class Derived extends Base implements Countable {}");
    let BoundStatement::Class(class) = &*bound.statements[1] else {
        panic!("expected class");
    };
    let Some(base) = &class.base else {
        panic!("expected base");
    };
    let BoundExpression::Name(name) = &**base else {
        panic!("expected name");
    };
    assert_eq!(name.symbol.ty, Type::class());
    assert_eq!(class.interfaces, vec!["Countable".to_string()]);
}

#[test]
fn test_relative_class_name_as_base_is_reported() {
    for name in ["parent", "self", "Parent"] {
        let (bound, diagnostics) = bind_php(&format!("class A extends {name} {{}}"));
        assert_eq!(codes(&diagnostics), vec![2019], "extends {name}");
        let BoundStatement::Class(class) = &*bound.statements[0] else {
            panic!("expected class");
        };
        assert!(class.base.is_none());
    }
}

// ============================================================================
// Shared Root Scope
// ============================================================================

#[test]
fn test_shared_root_scope() {
    let root = Scope::root();
    root.try_declare(VariableSymbol::variable("HOST_NAME", true, Type::string()));

    let arena = Bump::new();
    let mut diagnostics = DiagnosticCollection::new();
    let file = parse_source(&arena, "a.php", "<?php HOST_NAME = 1;", &mut diagnostics);
    let bound = bind(&file, &mut diagnostics, Some(root.clone()));
    assert_eq!(codes(&diagnostics), vec![2003]);
    assert!(Rc::ptr_eq(&bound.root, &root));
}

#[test]
fn test_dump() {
    let bound = bind_clean("while ($i < 3) { $i++; }");
    let dump = bound_tree_dump(&bound);
    assert!(dump.starts_with("BoundFile test.php\n"));
    assert!(dump.contains("BoundWhileStatement"));
    assert!(dump.contains("BoundBodyStatement break_0 continue_0"));
    assert!(dump.contains("BoundUnaryExpression PostIncrement: int"));
}
