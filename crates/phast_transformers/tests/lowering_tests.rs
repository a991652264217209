//! Transformer and lowering integration tests.
//!
//! Tests the parse -> bind -> lower pipeline: identity reuse of untouched
//! subtrees, label stability across rebuilds, and each lowering rule.

use bumpalo::Bump;
use phast_binder::*;
use phast_diagnostics::DiagnosticCollection;
use phast_parser::parse_source;
use phast_transformers::*;
use std::rc::Rc;

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

/// Helper: bind and lower in the root namespace.
fn lower(source: &str) -> (BoundFile, BoundFile) {
    let bound = bind_clean(source);
    let lowered = lower_file(&bound, "");
    (bound, lowered)
}

fn expression_of(statement: &BoundStatement) -> &ExprRef {
    match statement {
        BoundStatement::Expression(n) => &n.expression,
        other => panic!("expected expression statement, got {}", other.kind_name()),
    }
}

fn assigned_value(statement: &BoundStatement) -> &ExprRef {
    match &**expression_of(statement) {
        BoundExpression::Assignment(n) => &n.value,
        other => panic!("expected assignment, got {}", other.kind_name()),
    }
}

/// The callee name and arguments of a call to a plain name.
fn call_of(expression: &BoundExpression) -> (String, Vec<ExprRef>) {
    let BoundExpression::Binary(call) = expression else {
        panic!("expected call, got {}", expression.kind_name());
    };
    assert_eq!(call.operator.kind, BinaryOperatorKind::FunctionCall);
    let BoundExpression::Name(callee) = &*call.left else {
        panic!("expected named callee, got {}", call.left.kind_name());
    };
    (callee.symbol.name.clone(), call_arguments(&call.right))
}

fn string_value(expression: &BoundExpression) -> &str {
    match expression {
        BoundExpression::Literal(BoundLiteralExpression {
            value: ConstantValue::String(text),
            ..
        }) => text,
        other => panic!("expected string literal, got {:?}", other),
    }
}

fn literal_value(expression: &BoundExpression) -> &ConstantValue {
    match expression {
        BoundExpression::Literal(n) => &n.value,
        other => panic!("expected literal, got {}", other.kind_name()),
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

struct Identity;

impl Transformer for Identity {}

// ============================================================================
// Reference Reuse
// ============================================================================

#[test]
fn test_identity_transform_is_same() {
    let bound = bind_clean(
        "$a = [1, 2]; echo $a[0] . \"x\"; class A { function f() { return 1; } } \
         while ($a) { switch ($a) { case 1: break 2; default: continue; } }",
    );
    assert!(Identity.transform_file(&bound).is_same());
}

#[test]
fn test_lowering_without_rules_is_same() {
    let bound = bind_clean("$a = 1 + 2; while ($a > 0) { $a--; if ($a == 1) { break; } }");
    assert!(Lowering::new("").transform_file(&bound).is_same());
}

#[test]
fn test_unchanged_siblings_are_shared() {
    let (bound, lowered) = lower("$a = 1; echo $a; $b = 2;");
    assert!(Rc::ptr_eq(&bound.statements[0], &lowered.statements[0]));
    assert!(!Rc::ptr_eq(&bound.statements[1], &lowered.statements[1]));
    assert!(Rc::ptr_eq(&bound.statements[2], &lowered.statements[2]));
    assert!(Rc::ptr_eq(&bound.scope, &lowered.scope));
}

#[test]
fn test_rebuilt_body_keeps_labels() {
    let (bound, lowered) = lower("while (1) { echo 1; break; }");
    let before = loop_body(&bound.statements[0]);
    let after = loop_body(&lowered.statements[0]);
    assert!(!Rc::ptr_eq(before.statement(), after.statement()));
    assert!(Rc::ptr_eq(&before.break_label, &after.break_label));
    assert!(Rc::ptr_eq(&before.continue_label, &after.continue_label));

    let BoundStatement::Block(block) = &**after.statement() else {
        panic!("expected block");
    };
    let BoundStatement::Break(jump) = &*block.statements[1] else {
        panic!("expected break");
    };
    assert!(Rc::ptr_eq(&jump.label, &after.break_label));
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn test_deep_jump_materializes_target() {
    let (_, lowered) = lower("while (1) { while (2) { break 2; } continue; }");
    let outer = loop_body(&lowered.statements[0]);
    assert!(outer.break_label.is_materialized());
    assert!(!outer.continue_label.is_materialized());

    let BoundStatement::Block(block) = &**outer.statement() else {
        panic!("expected block");
    };
    let inner = loop_body(&block.statements[0]);
    assert!(!inner.break_label.is_materialized());
}

// ============================================================================
// Echo, Concatenation, Arrays
// ============================================================================

#[test]
fn test_echo_becomes_print_call() {
    let (_, lowered) = lower("echo 1;");
    let (callee, arguments) = call_of(expression_of(&lowered.statements[0]));
    assert_eq!(callee, "__php__print");
    assert_eq!(arguments.len(), 1);
    assert_eq!(literal_value(&arguments[0]), &ConstantValue::Int(1));
}

#[test]
fn test_concatenation_wraps_only_non_strings() {
    let (_, lowered) = lower("$s = \"x\" . 5;");
    let BoundExpression::Binary(addition) = &**assigned_value(&lowered.statements[0]) else {
        panic!("expected binary");
    };
    assert_eq!(addition.operator.kind, BinaryOperatorKind::Addition);
    assert_eq!(addition.operator.kind.js_text(), Some("+"));
    assert_eq!(string_value(&addition.left), "x");

    let (callee, arguments) = call_of(&addition.right);
    assert_eq!(callee, "__php__to_string");
    assert_eq!(literal_value(&arguments[0]), &ConstantValue::Int(5));
}

#[test]
fn test_array_literal_becomes_pairs() {
    let (_, lowered) = lower("$a = [1, \"k\" => 2];");
    let (callee, arguments) = call_of(assigned_value(&lowered.statements[0]));
    assert_eq!(callee, "__php__array");
    assert_eq!(arguments.len(), 1);

    let BoundExpression::JsArray(pairs) = &*arguments[0] else {
        panic!("expected pair list");
    };
    assert_eq!(pairs.elements.len(), 2);
    let pair = |index: usize| match &*pairs.elements[index] {
        BoundExpression::JsArray(pair) => pair.elements.clone(),
        other => panic!("expected pair, got {}", other.kind_name()),
    };
    let first = pair(0);
    assert_eq!(literal_value(&first[0]), &ConstantValue::Absent);
    assert_eq!(literal_value(&first[1]), &ConstantValue::Int(1));
    let second = pair(1);
    assert_eq!(string_value(&second[0]), "k");
    assert_eq!(literal_value(&second[1]), &ConstantValue::Int(2));
}

#[test]
fn test_element_access() {
    let (_, lowered) = lower("$a = []; $x = $a[0];");
    let (callee, arguments) = call_of(assigned_value(&lowered.statements[1]));
    assert_eq!(callee, "__php__array_get");
    assert_eq!(arguments.len(), 2);
}

#[test]
fn test_element_assignment_writes_back() {
    let (_, lowered) = lower("$a = []; $a[\"k\"] = 2;");
    let BoundExpression::Binary(assignment) = &**expression_of(&lowered.statements[1]) else {
        panic!("expected assignment");
    };
    assert_eq!(assignment.operator.kind, BinaryOperatorKind::Assignment);
    let BoundExpression::Name(target) = &*assignment.left else {
        panic!("expected variable target");
    };
    assert_eq!(target.symbol.name, "$a");
    let (callee, arguments) = call_of(&assignment.right);
    assert_eq!(callee, "__php__array_set");
    assert_eq!(arguments.len(), 3);
}

#[test]
fn test_append_assignment() {
    let (_, lowered) = lower("$a = []; $a[] = 3;");
    let BoundExpression::Assignment(assignment) = &**expression_of(&lowered.statements[1]) else {
        panic!("expected assignment");
    };
    assert!(!assignment.append);
    let (callee, arguments) = call_of(&assignment.value);
    assert_eq!(callee, "__php__array_append");
    assert!(matches!(&*arguments[0], BoundExpression::Name(n) if n.symbol.name == "$a"));
}

// ============================================================================
// Names and Registration
// ============================================================================

fn use_call_of(expression: &BoundExpression) -> (String, String) {
    let BoundExpression::Paren(paren) = expression else {
        panic!("expected parenthesized lookup, got {}", expression.kind_name());
    };
    let (callee, arguments) = call_of(&paren.expression);
    assert_eq!(callee, "__php__use");
    (
        string_value(&arguments[0]).to_string(),
        string_value(&arguments[1]).to_string(),
    )
}

#[test]
fn test_free_name_is_resolved_at_runtime() {
    let (_, lowered) = lower("namespace App\\Http; render(1);");
    assert!(matches!(&*lowered.statements[0], BoundStatement::Semicolon));
    let BoundExpression::Binary(call) = &**expression_of(&lowered.statements[1]) else {
        panic!("expected call");
    };
    assert_eq!(use_call_of(&call.left), ("render".to_string(), "App\\Http".to_string()));
}

#[test]
fn test_builtin_is_not_resolved() {
    let (bound, lowered) = lower("strlen(\"abc\");");
    assert!(Rc::ptr_eq(&bound.statements[0], &lowered.statements[0]));
}

#[test]
fn test_member_name_is_kept() {
    let (bound, lowered) = lower("$o->count;");
    assert!(Rc::ptr_eq(&bound.statements[0], &lowered.statements[0]));
}

#[test]
fn test_static_access_becomes_member_access() {
    let (_, lowered) = lower("Foo::bar();");
    let BoundExpression::Binary(call) = &**expression_of(&lowered.statements[0]) else {
        panic!("expected call");
    };
    let BoundExpression::Binary(member) = &*call.left else {
        panic!("expected member access");
    };
    assert_eq!(member.operator.kind, BinaryOperatorKind::MemberAccess);
    assert_eq!(use_call_of(&member.left).0, "Foo");
    assert!(matches!(&*member.right, BoundExpression::Name(n) if n.symbol.name == "bar"));
}

#[test]
fn test_class_is_registered() {
    let (_, lowered) = lower("class Greeter { function hi() { echo \"hi\"; } }");
    let (callee, arguments) = call_of(expression_of(&lowered.statements[0]));
    assert_eq!(callee, "__php__namespace");
    assert_eq!(string_value(&arguments[0]), "");
    assert_eq!(string_value(&arguments[1]), "Greeter");

    let BoundExpression::Closure(factory) = &*arguments[2] else {
        panic!("expected closure");
    };
    let BoundStatement::Return(BoundReturnStatement {
        expression: Some(ref value),
    }) = *factory.body[0]
    else {
        panic!("expected return");
    };
    let BoundExpression::Declaration(declaration) = &**value else {
        panic!("expected declaration");
    };
    let BoundStatement::Class(class) = &**declaration else {
        panic!("expected class");
    };
    // The echo inside the method was lowered too.
    let body = class.methods[0].body.as_ref().expect("method body");
    let (callee, _) = call_of(expression_of(&body[0]));
    assert_eq!(callee, "__php__print");
}

#[test]
fn test_function_and_const_are_registered() {
    let (_, lowered) = lower("function f() {} const LIMIT = 3;");
    for (index, name) in [(0, "f"), (1, "LIMIT")] {
        let (callee, arguments) = call_of(expression_of(&lowered.statements[index]));
        assert_eq!(callee, "__php__namespace");
        assert_eq!(string_value(&arguments[1]), name);
    }
}

#[test]
fn test_parent_call_uses_super() {
    let (_, lowered) = lower(
        "class A { function __construct() {} } \
         class B extends A { function __construct() { parent::__construct(); } }",
    );
    let (_, arguments) = call_of(expression_of(&lowered.statements[1]));
    let BoundExpression::Closure(factory) = &*arguments[2] else {
        panic!("expected closure");
    };
    let BoundStatement::Return(BoundReturnStatement {
        expression: Some(ref value),
    }) = *factory.body[0]
    else {
        panic!("expected return");
    };
    let BoundExpression::Declaration(declaration) = &**value else {
        panic!("expected declaration");
    };
    let BoundStatement::Class(class) = &**declaration else {
        panic!("expected class");
    };
    assert_eq!(use_call_of(class.base.as_ref().expect("base")).0, "A");

    let body = class.methods[0].body.as_ref().expect("constructor body");
    let BoundExpression::Binary(call) = &**expression_of(&body[0]) else {
        panic!("expected call");
    };
    let BoundExpression::Binary(member) = &*call.left else {
        panic!("expected member access");
    };
    assert!(matches!(&*member.left, BoundExpression::Name(n) if n.symbol.name == "super"));
}

/// The class declaration inside a `__php__namespace` registration.
fn registered_class(statement: &BoundStatement) -> BoundClassDeclaration {
    let (_, arguments) = call_of(expression_of(statement));
    let BoundExpression::Closure(factory) = &*arguments[2] else {
        panic!("expected closure");
    };
    let BoundStatement::Return(BoundReturnStatement {
        expression: Some(ref value),
    }) = *factory.body[0]
    else {
        panic!("expected return");
    };
    let BoundExpression::Declaration(declaration) = &**value else {
        panic!("expected declaration");
    };
    let BoundStatement::Class(class) = &**declaration else {
        panic!("expected class");
    };
    class.clone()
}

#[test]
fn test_parent_name_resolves_to_base() {
    let (_, lowered) = lower(
        "class A {} \
         class B extends A { static function make() { return new parent(); } }",
    );
    let class = registered_class(&lowered.statements[1]);
    let body = class.methods[0].body.as_ref().expect("method body");
    let BoundStatement::Return(BoundReturnStatement {
        expression: Some(ref value),
    }) = *body[0]
    else {
        panic!("expected return");
    };
    let BoundExpression::Unary(new) = &**value else {
        panic!("expected new, got {}", value.kind_name());
    };
    let BoundExpression::Binary(call) = &*new.operand else {
        panic!("expected constructor call");
    };
    assert_eq!(use_call_of(&call.left).0, "A");
}

#[test]
fn test_parent_as_base_does_not_resolve_against_itself() {
    let bound = bind_clean("class A {}");
    let BoundStatement::Class(ref class) = *bound.statements[0] else {
        panic!("expected class");
    };
    let class = BoundClassDeclaration {
        base: Some(BoundExpression::name(VariableSymbol::variable(
            "parent",
            false,
            Type::any(),
        ))),
        ..class.clone()
    };

    let lowered = Lowering::new("").transform_class(&class).or_original(&class);
    assert_eq!(
        use_call_of(lowered.base.as_ref().expect("base")),
        ("parent".to_string(), String::new())
    );
}
