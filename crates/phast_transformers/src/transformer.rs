//! Copy-on-write traversal of the bound tree.
//!
//! Every `transform_*` method returns [`Rewrite::Same`] when nothing below
//! the node changed. A parent is rebuilt only when one of its children was
//! replaced, and the rebuilt parent shares every unchanged child with the
//! original. Implementors override the hooks for the node kinds they rewrite
//! and call the matching `walk_*` function for the children they keep.

use phast_binder::*;
use std::rc::Rc;

/// The result of transforming one node.
#[derive(Debug)]
pub enum Rewrite<T> {
    Same,
    Replaced(T),
}

impl<T> Rewrite<T> {
    pub fn is_same(&self) -> bool {
        matches!(self, Rewrite::Same)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Rewrite<U> {
        match self {
            Rewrite::Same => Rewrite::Same,
            Rewrite::Replaced(value) => Rewrite::Replaced(f(value)),
        }
    }
}

impl<T: Clone> Rewrite<T> {
    /// The replacement, or a clone of `original` (an `Rc` clone for nodes).
    pub fn or_original(self, original: &T) -> T {
        match self {
            Rewrite::Same => original.clone(),
            Rewrite::Replaced(value) => value,
        }
    }
}

/// Transform each item, allocating a new list only from the first change on.
pub fn rewrite_each<T: Clone>(items: &[T], mut f: impl FnMut(&T) -> Rewrite<T>) -> Rewrite<Vec<T>> {
    let mut result: Option<Vec<T>> = None;
    for (index, item) in items.iter().enumerate() {
        match f(item) {
            Rewrite::Same => {
                if let Some(ref mut result) = result {
                    result.push(item.clone());
                }
            }
            Rewrite::Replaced(new) => {
                result
                    .get_or_insert_with(|| {
                        let mut prefix = Vec::with_capacity(items.len());
                        prefix.extend_from_slice(&items[..index]);
                        prefix
                    })
                    .push(new);
            }
        }
    }
    result.map_or(Rewrite::Same, Rewrite::Replaced)
}

fn rewrite_option<T: Clone>(item: &Option<T>, f: impl FnOnce(&T) -> Rewrite<T>) -> Rewrite<Option<T>> {
    match item {
        Some(value) => f(value).map(Some),
        None => Rewrite::Same,
    }
}

pub trait Transformer: Sized {
    fn transform_file(&mut self, file: &BoundFile) -> Rewrite<BoundFile> {
        walk_file(self, file)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn transform_statement(&mut self, statement: &StmtRef) -> Rewrite<StmtRef> {
        match &**statement {
            BoundStatement::Echo(n) => self.transform_echo(n),
            BoundStatement::Break(n) | BoundStatement::Continue(n) => self.transform_jump(n),
            BoundStatement::Class(n) => self.transform_class_statement(n),
            BoundStatement::Function(n) => self.transform_function_statement(n),
            BoundStatement::Const(n) => self.transform_const(n),
            BoundStatement::Namespace(n) => self.transform_namespace(n),
            _ => walk_statement(self, statement),
        }
    }

    fn transform_statements(&mut self, statements: &[StmtRef]) -> Rewrite<Vec<StmtRef>> {
        rewrite_each(statements, |s| self.transform_statement(s))
    }

    fn transform_echo(&mut self, node: &BoundEchoStatement) -> Rewrite<StmtRef> {
        self.transform_expression(&node.expression).map(|expression| {
            Rc::new(BoundStatement::Echo(BoundEchoStatement { expression }))
        })
    }

    fn transform_jump(&mut self, _node: &BoundJumpStatement) -> Rewrite<StmtRef> {
        Rewrite::Same
    }

    fn transform_class_statement(&mut self, node: &BoundClassDeclaration) -> Rewrite<StmtRef> {
        self.transform_class(node)
            .map(|class| Rc::new(BoundStatement::Class(class)))
    }

    fn transform_function_statement(&mut self, node: &BoundFunctionDeclaration) -> Rewrite<StmtRef> {
        self.transform_function(node)
            .map(|function| Rc::new(BoundStatement::Function(function)))
    }

    fn transform_const(&mut self, node: &BoundConstStatement) -> Rewrite<StmtRef> {
        self.transform_expression(&node.value).map(|value| {
            Rc::new(BoundStatement::Const(BoundConstStatement {
                symbol: node.symbol.clone(),
                value,
            }))
        })
    }

    fn transform_namespace(&mut self, _node: &BoundNamespaceStatement) -> Rewrite<StmtRef> {
        Rewrite::Same
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn transform_function(&mut self, node: &BoundFunctionDeclaration) -> Rewrite<BoundFunctionDeclaration> {
        walk_function(self, node)
    }

    fn transform_class(&mut self, node: &BoundClassDeclaration) -> Rewrite<BoundClassDeclaration> {
        walk_class(self, node)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn transform_expression(&mut self, expression: &ExprRef) -> Rewrite<ExprRef> {
        match &**expression {
            BoundExpression::Binary(n) => self.transform_binary(n),
            BoundExpression::Unary(n) => self.transform_unary(n),
            BoundExpression::Name(n) => self.transform_name(n),
            BoundExpression::Assignment(n) => self.transform_assignment(n),
            BoundExpression::ArrayLiteral(n) => self.transform_array_literal(n),
            _ => walk_expression(self, expression),
        }
    }

    fn transform_expressions(&mut self, expressions: &[ExprRef]) -> Rewrite<Vec<ExprRef>> {
        rewrite_each(expressions, |e| self.transform_expression(e))
    }

    fn transform_binary(&mut self, node: &BoundBinaryExpression) -> Rewrite<ExprRef> {
        walk_binary(self, node)
    }

    fn transform_unary(&mut self, node: &BoundUnaryExpression) -> Rewrite<ExprRef> {
        walk_unary(self, node)
    }

    fn transform_name(&mut self, _node: &BoundNameExpression) -> Rewrite<ExprRef> {
        Rewrite::Same
    }

    fn transform_assignment(&mut self, node: &BoundAssignmentExpression) -> Rewrite<ExprRef> {
        walk_assignment(self, node)
    }

    fn transform_array_literal(&mut self, node: &BoundArrayLiteralExpression) -> Rewrite<ExprRef> {
        walk_array_literal(self, node)
    }
}

// ============================================================================
// Default walks
// ============================================================================

pub fn walk_file<T: Transformer>(t: &mut T, file: &BoundFile) -> Rewrite<BoundFile> {
    t.transform_statements(&file.statements).map(|statements| BoundFile {
        file_name: file.file_name.clone(),
        statements,
        scope: file.scope.clone(),
        root: file.root.clone(),
    })
}

/// Rebuild `statement` from its transformed children.
pub fn walk_statement<T: Transformer>(t: &mut T, statement: &StmtRef) -> Rewrite<StmtRef> {
    let rebuilt = match &**statement {
        BoundStatement::Block(n) => t
            .transform_statements(&n.statements)
            .map(|statements| BoundStatement::Block(BoundBlockStatement { statements })),
        BoundStatement::If(n) => {
            let condition = t.transform_expression(&n.condition);
            let then_statement = t.transform_statement(&n.then_statement);
            let else_statement = rewrite_option(&n.else_statement, |s| t.transform_statement(s));
            if condition.is_same() && then_statement.is_same() && else_statement.is_same() {
                Rewrite::Same
            } else {
                Rewrite::Replaced(BoundStatement::If(BoundIfStatement {
                    condition: condition.or_original(&n.condition),
                    then_statement: then_statement.or_original(&n.then_statement),
                    else_statement: else_statement.or_original(&n.else_statement),
                }))
            }
        }
        BoundStatement::While(n) => {
            let condition = t.transform_expression(&n.condition);
            let body = t.transform_statement(&n.body);
            if condition.is_same() && body.is_same() {
                Rewrite::Same
            } else {
                Rewrite::Replaced(BoundStatement::While(BoundWhileStatement {
                    condition: condition.or_original(&n.condition),
                    body: body.or_original(&n.body),
                }))
            }
        }
        BoundStatement::For(n) => {
            let initializer = t.transform_expression(&n.initializer);
            let condition = t.transform_expression(&n.condition);
            let incrementor = t.transform_expression(&n.incrementor);
            let body = t.transform_statement(&n.body);
            if initializer.is_same() && condition.is_same() && incrementor.is_same() && body.is_same() {
                Rewrite::Same
            } else {
                Rewrite::Replaced(BoundStatement::For(BoundForStatement {
                    initializer: initializer.or_original(&n.initializer),
                    condition: condition.or_original(&n.condition),
                    incrementor: incrementor.or_original(&n.incrementor),
                    body: body.or_original(&n.body),
                }))
            }
        }
        // The rebuilt body keeps the original labels, so jumps inside it
        // still point at the same targets.
        BoundStatement::Body(n) => t.transform_statement(n.statement()).map(|statement| {
            BoundStatement::Body(BoundBodyStatement::filled(
                n.break_label.clone(),
                n.continue_label.clone(),
                statement,
            ))
        }),
        BoundStatement::Switch(n) => {
            let expression = t.transform_expression(&n.expression);
            let cases = rewrite_each(n.cases(), |case| {
                let expression = rewrite_option(&case.expression, |e| t.transform_expression(e));
                let statements = t.transform_statements(&case.statements);
                if expression.is_same() && statements.is_same() {
                    Rewrite::Same
                } else {
                    Rewrite::Replaced(BoundCaseClause {
                        expression: expression.or_original(&case.expression),
                        statements: statements.or_original(&case.statements),
                    })
                }
            });
            if expression.is_same() && cases.is_same() {
                Rewrite::Same
            } else {
                Rewrite::Replaced(BoundStatement::Switch(BoundSwitchStatement::filled(
                    expression.or_original(&n.expression),
                    n.break_label.clone(),
                    match cases {
                        Rewrite::Same => n.cases().to_vec(),
                        Rewrite::Replaced(cases) => cases,
                    },
                )))
            }
        }
        BoundStatement::Return(n) => rewrite_option(&n.expression, |e| t.transform_expression(e))
            .map(|expression| BoundStatement::Return(BoundReturnStatement { expression })),
        BoundStatement::Echo(n) => t
            .transform_expression(&n.expression)
            .map(|expression| BoundStatement::Echo(BoundEchoStatement { expression })),
        BoundStatement::Expression(n) => t
            .transform_expression(&n.expression)
            .map(|expression| BoundStatement::Expression(BoundExpressionStatement { expression })),
        BoundStatement::Class(n) => t.transform_class(n).map(BoundStatement::Class),
        BoundStatement::Function(n) => t.transform_function(n).map(BoundStatement::Function),
        BoundStatement::Const(n) => t.transform_expression(&n.value).map(|value| {
            BoundStatement::Const(BoundConstStatement {
                symbol: n.symbol.clone(),
                value,
            })
        }),
        BoundStatement::Break(_)
        | BoundStatement::Continue(_)
        | BoundStatement::Semicolon
        | BoundStatement::Namespace(_) => Rewrite::Same,
    };
    rebuilt.map(Rc::new)
}

pub fn walk_function<T: Transformer>(
    t: &mut T,
    node: &BoundFunctionDeclaration,
) -> Rewrite<BoundFunctionDeclaration> {
    let parameters = rewrite_each(&node.parameters, |parameter| {
        rewrite_option(&parameter.default_value, |e| t.transform_expression(e)).map(|default_value| {
            BoundParameter {
                symbol: parameter.symbol.clone(),
                default_value,
            }
        })
    });
    let body = match node.body {
        Some(ref body) => t.transform_statements(body).map(Some),
        None => Rewrite::Same,
    };
    if parameters.is_same() && body.is_same() {
        return Rewrite::Same;
    }
    Rewrite::Replaced(BoundFunctionDeclaration {
        parameters: parameters.or_original(&node.parameters),
        body: body.or_original(&node.body),
        ..node.clone()
    })
}

pub fn walk_class<T: Transformer>(t: &mut T, node: &BoundClassDeclaration) -> Rewrite<BoundClassDeclaration> {
    let base = rewrite_option(&node.base, |e| t.transform_expression(e));
    let properties = rewrite_each(&node.properties, |property| {
        rewrite_option(&property.initializer, |e| t.transform_expression(e)).map(|initializer| {
            BoundPropertyDeclaration {
                initializer,
                ..property.clone()
            }
        })
    });
    let methods = rewrite_each(&node.methods, |method| t.transform_function(method).map(Rc::new));
    if base.is_same() && properties.is_same() && methods.is_same() {
        return Rewrite::Same;
    }
    Rewrite::Replaced(BoundClassDeclaration {
        base: base.or_original(&node.base),
        properties: properties.or_original(&node.properties),
        methods: methods.or_original(&node.methods),
        ..node.clone()
    })
}

/// Rebuild `expression` from its transformed children.
pub fn walk_expression<T: Transformer>(t: &mut T, expression: &ExprRef) -> Rewrite<ExprRef> {
    match &**expression {
        BoundExpression::Binary(n) => walk_binary(t, n),
        BoundExpression::Unary(n) => walk_unary(t, n),
        BoundExpression::Assignment(n) => walk_assignment(t, n),
        BoundExpression::ArrayLiteral(n) => walk_array_literal(t, n),
        BoundExpression::Paren(n) => t.transform_expression(&n.expression).map(|expression| {
            Rc::new(BoundExpression::Paren(BoundParenExpression { expression }))
        }),
        BoundExpression::Comma(n) => t.transform_expressions(&n.expressions).map(|expressions| {
            Rc::new(BoundExpression::Comma(BoundCommaExpression { expressions }))
        }),
        BoundExpression::JsArray(n) => t.transform_expressions(&n.elements).map(|elements| {
            Rc::new(BoundExpression::JsArray(BoundJsArrayExpression { elements }))
        }),
        BoundExpression::Closure(n) => t
            .transform_statements(&n.body)
            .map(|body| Rc::new(BoundExpression::Closure(BoundClosureExpression { body }))),
        BoundExpression::Declaration(statement) => t
            .transform_statement(statement)
            .map(|statement| Rc::new(BoundExpression::Declaration(statement))),
        BoundExpression::Name(_)
        | BoundExpression::Literal(_)
        | BoundExpression::Empty
        | BoundExpression::Error => Rewrite::Same,
    }
}

pub fn walk_binary<T: Transformer>(t: &mut T, node: &BoundBinaryExpression) -> Rewrite<ExprRef> {
    let left = t.transform_expression(&node.left);
    let right = t.transform_expression(&node.right);
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

pub fn walk_unary<T: Transformer>(t: &mut T, node: &BoundUnaryExpression) -> Rewrite<ExprRef> {
    t.transform_expression(&node.operand).map(|operand| {
        Rc::new(BoundExpression::Unary(BoundUnaryExpression {
            operator: node.operator,
            operand,
            ty: node.ty.clone(),
        }))
    })
}

pub fn walk_assignment<T: Transformer>(t: &mut T, node: &BoundAssignmentExpression) -> Rewrite<ExprRef> {
    t.transform_expression(&node.value).map(|value| {
        Rc::new(BoundExpression::Assignment(BoundAssignmentExpression {
            symbol: node.symbol.clone(),
            value,
            append: node.append,
            ty: node.ty.clone(),
        }))
    })
}

pub fn walk_array_literal<T: Transformer>(t: &mut T, node: &BoundArrayLiteralExpression) -> Rewrite<ExprRef> {
    t.transform_expressions(&node.elements).map(|elements| {
        Rc::new(BoundExpression::ArrayLiteral(BoundArrayLiteralExpression { elements }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_each_keeps_prefix_and_suffix() {
        let items = vec![Rc::new(1), Rc::new(2), Rc::new(3)];
        let result = rewrite_each(&items, |item| {
            if **item == 2 {
                Rewrite::Replaced(Rc::new(20))
            } else {
                Rewrite::Same
            }
        });
        let Rewrite::Replaced(result) = result else {
            panic!("expected a replaced list");
        };
        assert!(Rc::ptr_eq(&result[0], &items[0]));
        assert_eq!(*result[1], 20);
        assert!(Rc::ptr_eq(&result[2], &items[2]));
    }

    #[test]
    fn test_rewrite_each_unchanged() {
        let items = vec![Rc::new(1), Rc::new(2)];
        assert!(rewrite_each(&items, |_| Rewrite::Same).is_same());
    }

    #[test]
    fn test_or_original() {
        let original = Rc::new(5);
        let same: Rewrite<Rc<i32>> = Rewrite::Same;
        assert!(Rc::ptr_eq(&same.or_original(&original), &original));
    }
}
