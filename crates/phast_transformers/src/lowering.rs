//! Lowering of source-only constructs.
//!
//! After this pass the tree only holds node kinds the printer can write as
//! JavaScript. Everything the runtime has to do (printing, ordered arrays,
//! string coercion, resolving names across files) becomes a call to a
//! built-in from [`phast_binder::builtins`].

use crate::transformer::*;
use phast_binder::builtins;
use phast_binder::*;
use std::rc::Rc;
use tracing::trace;

/// Lower `file`. `namespace` is the namespace in effect before the first
/// `namespace` statement.
pub fn lower_file(file: &BoundFile, namespace: &str) -> BoundFile {
    Lowering::new(namespace).transform_file(file).or_original(file)
}

struct ClassContext {
    name: String,
    /// Already lowered.
    base: Option<ExprRef>,
}

pub struct Lowering {
    namespace: String,
    classes: Vec<ClassContext>,
}

impl Lowering {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            classes: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn lower(&mut self, expression: &ExprRef) -> ExprRef {
        self.transform_expression(expression).or_original(expression)
    }

    /// `__php__namespace(ns, "name", () => { return value; })`
    fn register(&self, name: &str, value: ExprRef) -> StmtRef {
        let factory = Rc::new(BoundExpression::Closure(BoundClosureExpression {
            body: vec![Rc::new(BoundStatement::Return(BoundReturnStatement {
                expression: Some(value),
            }))],
        }));
        BoundStatement::expression(BoundExpression::call(
            builtin(builtins::NAMESPACE),
            vec![
                BoundExpression::string(self.namespace.clone()),
                BoundExpression::string(name),
                factory,
            ],
            Type::void(),
        ))
    }

    fn to_string(&self, expression: ExprRef) -> ExprRef {
        if expression.ty() == Type::string() {
            return expression;
        }
        BoundExpression::call(builtin(builtins::TO_STRING), vec![expression], Type::string())
    }

    fn lower_concatenation(&mut self, node: &BoundBinaryExpression) -> ExprRef {
        let left = self.lower(&node.left);
        let right = self.lower(&node.right);
        Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: self.to_string(left),
            operator: BinaryOperator::addition_any(),
            right: self.to_string(right),
            ty: Type::string(),
        }))
    }

    /// `Foo::bar` becomes `Foo.bar`; `parent::bar` becomes `super.bar`.
    fn lower_static_access(&mut self, node: &BoundBinaryExpression) -> ExprRef {
        if is_named(&node.left, "parent") && !self.classes.is_empty() {
            return Rc::new(BoundExpression::Binary(BoundBinaryExpression {
                left: BoundExpression::name(VariableSymbol::variable("super", true, Type::any())),
                operator: BinaryOperator::member_access(),
                right: node.right.clone(),
                ty: node.ty.clone(),
            }));
        }
        let member = Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: node.left.clone(),
            operator: BinaryOperator::member_access(),
            right: node.right.clone(),
            ty: node.ty.clone(),
        }));
        self.lower(&member)
    }

    /// The member name on the right is left alone.
    fn lower_member_access(&mut self, node: &BoundBinaryExpression) -> Rewrite<ExprRef> {
        let left = self.transform_expression(&node.left);
        let right = match &*node.right {
            BoundExpression::Name(_) => Rewrite::Same,
            _ => self.transform_expression(&node.right),
        };
        if left.is_same() && right.is_same() {
            return Rewrite::Same;
        }
        Rewrite::Replaced(Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: left.or_original(&node.left),
            operator: node.operator,
            right: right.or_original(&node.right),
            ty: node.ty.clone(),
        })))
    }

    /// `$a[k] = v` becomes `$a = __php__array_set($a, k, v)`. A container
    /// that cannot be written back only gets the call.
    fn lower_element_assignment(
        &mut self,
        target: &BoundBinaryExpression,
        node: &BoundBinaryExpression,
    ) -> ExprRef {
        let container = self.lower(&target.left);
        let key = self.lower(&target.right);
        let value = self.lower(&node.right);
        let set = BoundExpression::call(
            builtin(builtins::ARRAY_SET),
            vec![container.clone(), key, value],
            Type::array(),
        );
        if !is_assignable(&target.left) {
            return set;
        }
        Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: container,
            operator: BinaryOperator::assignment(),
            right: set,
            ty: node.ty.clone(),
        }))
    }

    fn lower_free_name(&mut self, symbol: &SymbolRef) -> Option<ExprRef> {
        let name = symbol.name.as_str();
        if symbol.is_variable() || symbol.is_builtin() {
            return None;
        }
        if name.eq_ignore_ascii_case("self") || name.eq_ignore_ascii_case("static") {
            if let Some(class) = self.classes.last() {
                let class_name = class.name.clone();
                return Some(self.use_name(&class_name, symbol.ty.clone()));
            }
        }
        if name.eq_ignore_ascii_case("parent") {
            if let Some(base) = self.classes.last().and_then(|class| class.base.clone()) {
                return Some(base);
            }
        }
        Some(self.use_name(name, symbol.ty.clone()))
    }

    /// `(__php__use("name", ns))`
    fn use_name(&self, name: &str, ty: Type) -> ExprRef {
        let call = BoundExpression::call(
            builtin(builtins::USE),
            vec![
                BoundExpression::string(name),
                BoundExpression::string(self.namespace.clone()),
            ],
            ty,
        );
        Rc::new(BoundExpression::Paren(BoundParenExpression { expression: call }))
    }
}

impl Transformer for Lowering {
    fn transform_echo(&mut self, node: &BoundEchoStatement) -> Rewrite<StmtRef> {
        trace!(rule = "echo", "lowered");
        let value = self.lower(&node.expression);
        Rewrite::Replaced(BoundStatement::expression(BoundExpression::call(
            builtin(builtins::PRINT),
            vec![value],
            Type::void(),
        )))
    }

    fn transform_jump(&mut self, node: &BoundJumpStatement) -> Rewrite<StmtRef> {
        if node.depth > 1 {
            trace!(rule = "labeled jump", label = %node.label.name, "lowered");
            node.label.materialize();
        }
        Rewrite::Same
    }

    fn transform_class_statement(&mut self, node: &BoundClassDeclaration) -> Rewrite<StmtRef> {
        trace!(rule = "class registration", class = %node.name, "lowered");
        let class = self.transform_class(node).or_original(node);
        let declaration = Rc::new(BoundExpression::Declaration(Rc::new(BoundStatement::Class(class))));
        Rewrite::Replaced(self.register(&node.name, declaration))
    }

    fn transform_function_statement(&mut self, node: &BoundFunctionDeclaration) -> Rewrite<StmtRef> {
        trace!(rule = "function registration", function = %node.name, "lowered");
        let function = self.transform_function(node).or_original(node);
        let declaration = Rc::new(BoundExpression::Declaration(Rc::new(BoundStatement::Function(
            function,
        ))));
        Rewrite::Replaced(self.register(&node.name, declaration))
    }

    fn transform_const(&mut self, node: &BoundConstStatement) -> Rewrite<StmtRef> {
        trace!(rule = "const registration", name = %node.symbol.name, "lowered");
        let value = self.lower(&node.value);
        Rewrite::Replaced(self.register(&node.symbol.name, value))
    }

    fn transform_namespace(&mut self, node: &BoundNamespaceStatement) -> Rewrite<StmtRef> {
        trace!(rule = "namespace", namespace = %node.name, "lowered");
        self.namespace = node.name.clone();
        Rewrite::Replaced(Rc::new(BoundStatement::Semicolon))
    }

    /// The base is lowered before the class context exists, so a name in
    /// the `extends` clause never resolves against the class itself.
    fn transform_class(&mut self, node: &BoundClassDeclaration) -> Rewrite<BoundClassDeclaration> {
        let base = match node.base {
            Some(ref base) => self.transform_expression(base),
            None => Rewrite::Same,
        };
        let lowered_base = node.base.as_ref().map(|original| match base {
            Rewrite::Replaced(ref lowered) => lowered.clone(),
            Rewrite::Same => original.clone(),
        });

        self.classes.push(ClassContext {
            name: node.name.clone(),
            base: lowered_base.clone(),
        });
        let members = walk_class(
            self,
            &BoundClassDeclaration {
                base: None,
                ..node.clone()
            },
        );
        self.classes.pop();

        if base.is_same() && members.is_same() {
            return Rewrite::Same;
        }
        Rewrite::Replaced(BoundClassDeclaration {
            base: lowered_base,
            ..members.or_original(node)
        })
    }

    fn transform_binary(&mut self, node: &BoundBinaryExpression) -> Rewrite<ExprRef> {
        match node.operator.kind {
            BinaryOperatorKind::Concatenation => {
                trace!(rule = "concatenation", "lowered");
                Rewrite::Replaced(self.lower_concatenation(node))
            }
            BinaryOperatorKind::StaticMemberAccess => {
                trace!(rule = "static access", "lowered");
                Rewrite::Replaced(self.lower_static_access(node))
            }
            BinaryOperatorKind::MemberAccess => self.lower_member_access(node),
            BinaryOperatorKind::ElementAccess => {
                trace!(rule = "element access", "lowered");
                let array = self.lower(&node.left);
                let key = self.lower(&node.right);
                Rewrite::Replaced(BoundExpression::call(
                    builtin(builtins::ARRAY_GET),
                    vec![array, key],
                    node.ty.clone(),
                ))
            }
            BinaryOperatorKind::Assignment => match &*node.left {
                BoundExpression::Binary(target)
                    if target.operator.kind == BinaryOperatorKind::ElementAccess =>
                {
                    trace!(rule = "element assignment", "lowered");
                    Rewrite::Replaced(self.lower_element_assignment(target, node))
                }
                _ => walk_binary(self, node),
            },
            _ => walk_binary(self, node),
        }
    }

    fn transform_name(&mut self, node: &BoundNameExpression) -> Rewrite<ExprRef> {
        match self.lower_free_name(&node.symbol) {
            Some(resolved) => {
                trace!(rule = "free name", name = %node.symbol.name, "lowered");
                Rewrite::Replaced(resolved)
            }
            None => Rewrite::Same,
        }
    }

    fn transform_assignment(&mut self, node: &BoundAssignmentExpression) -> Rewrite<ExprRef> {
        if !node.append {
            return walk_assignment(self, node);
        }
        trace!(rule = "append", name = %node.symbol.name, "lowered");
        let value = self.lower(&node.value);
        let append = BoundExpression::call(
            builtin(builtins::ARRAY_APPEND),
            vec![BoundExpression::name(node.symbol.clone()), value],
            Type::array(),
        );
        Rewrite::Replaced(Rc::new(BoundExpression::Assignment(BoundAssignmentExpression {
            symbol: node.symbol.clone(),
            value: append,
            append: false,
            ty: Type::array(),
        })))
    }

    fn transform_array_literal(&mut self, node: &BoundArrayLiteralExpression) -> Rewrite<ExprRef> {
        trace!(rule = "array literal", elements = node.elements.len(), "lowered");
        let pairs = node
            .elements
            .iter()
            .map(|element| {
                let (key, value) = match &**element {
                    BoundExpression::Binary(pair) if pair.operator.kind == BinaryOperatorKind::KeyValue => {
                        (self.lower(&pair.left), self.lower(&pair.right))
                    }
                    _ => (BoundExpression::literal(ConstantValue::Absent), self.lower(element)),
                };
                Rc::new(BoundExpression::JsArray(BoundJsArrayExpression {
                    elements: vec![key, value],
                }))
            })
            .collect();
        let pairs = Rc::new(BoundExpression::JsArray(BoundJsArrayExpression { elements: pairs }));
        Rewrite::Replaced(BoundExpression::call(builtin(builtins::ARRAY), vec![pairs], Type::array()))
    }
}

/// A registry entry by name.
///
/// # Panics
/// If `name` is not in the built-in registry.
fn builtin(name: &str) -> ExprRef {
    let symbol = builtins::lookup(name)
        .unwrap_or_else(|| panic!("built-in `{}` missing from the registry", name));
    BoundExpression::name(symbol)
}

fn is_named(expression: &BoundExpression, name: &str) -> bool {
    matches!(expression, BoundExpression::Name(n) if n.symbol.name.eq_ignore_ascii_case(name))
}

/// Containers an updated array can be written back to.
fn is_assignable(expression: &BoundExpression) -> bool {
    match expression {
        BoundExpression::Name(n) => n.symbol.is_variable() && !n.symbol.read_only,
        BoundExpression::Binary(n) => matches!(
            n.operator.kind,
            BinaryOperatorKind::MemberAccess | BinaryOperatorKind::StaticMemberAccess
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let BoundExpression::Name(name) = &*builtin(builtins::PRINT) else {
            panic!("expected name");
        };
        assert!(name.symbol.is_builtin());
    }

    #[test]
    fn test_variables_are_not_free_names() {
        let mut lowering = Lowering::new("");
        let variable = VariableSymbol::variable("$a", false, Type::any());
        assert!(lowering.lower_free_name(&variable).is_none());
        let free = VariableSymbol::variable("render", false, Type::any());
        assert!(lowering.lower_free_name(&free).is_some());
    }

    #[test]
    fn test_assignable_containers() {
        let variable = BoundExpression::name(VariableSymbol::variable("$a", false, Type::any()));
        assert!(is_assignable(&variable));
        let constant = BoundExpression::name(VariableSymbol::variable("LIMIT", true, Type::any()));
        assert!(!is_assignable(&constant));
    }
}
