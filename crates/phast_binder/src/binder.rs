//! The binder implementation.
//!
//! Walks the syntax tree once and builds the bound tree. Handles:
//! - Name resolution through the scope chain, with `any` placeholders for
//!   names that were never declared
//! - Implicit declaration of variables on first assignment
//! - Operator resolution against the operator tables
//! - Function, method and class scopes
//! - Break/continue targets and their labels
//! - Modifier legality on classes, methods and properties

use crate::bound::*;
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::scope::{Scope, ScopeRef};
use crate::symbols::{ParameterSymbol, SymbolRef, Type, VariableSymbol};
use phast_ast::modifiers::COLLIDING_MODIFIERS;
use phast_ast::visitor::{span_of_expression, span_of_type_clause};
use phast_ast::*;
use phast_core::text::{TextPos, TextSpan};
use phast_diagnostics::{messages, DiagnosticCollection, DiagnosticMessage};
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use tracing::debug;

/// Bind a parsed file. `root` defaults to a fresh [`Scope::root`]; pass one
/// in to share pre-declared names between files.
pub fn bind(
    file: &SourceFile<'_>,
    diagnostics: &mut DiagnosticCollection,
    root: Option<ScopeRef>,
) -> BoundFile {
    let root = root.unwrap_or_else(Scope::root);
    Binder::new(root, diagnostics).bind_source_file(file)
}

pub struct Binder<'d> {
    root: ScopeRef,
    /// The current scope. Replaced on entering a function, method or class.
    scope: ScopeRef,
    /// Active loop bodies and switches, innermost last.
    jump_targets: Vec<StmtRef>,
    /// Per-role counters for generated label names.
    label_counters: FxHashMap<LabelRole, u32>,
    /// Classes declared ahead of time, keyed by the position of their name.
    hoisted_classes: FxHashMap<TextPos, (Type, SymbolRef)>,
    /// Number of enclosing function and method bodies.
    function_depth: u32,
    diagnostics: &'d mut DiagnosticCollection,
}

impl<'d> Binder<'d> {
    pub fn new(root: ScopeRef, diagnostics: &'d mut DiagnosticCollection) -> Self {
        let scope = Scope::child(&root);
        Self {
            root,
            scope,
            jump_targets: Vec::new(),
            label_counters: FxHashMap::default(),
            hoisted_classes: FxHashMap::default(),
            function_depth: 0,
            diagnostics,
        }
    }

    // ========================================================================
    // Source file binding
    // ========================================================================

    pub fn bind_source_file(mut self, file: &SourceFile<'_>) -> BoundFile {
        debug!(file = file.file_name, "binding file");
        self.hoist_class_declarations(file.statements);
        let statements = self.bind_statements(file.statements);
        BoundFile {
            file_name: file.file_name.to_string(),
            statements,
            scope: self.scope,
            root: self.root,
        }
    }

    fn report(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.report(span, message, args);
    }

    fn report_at_expression(
        &mut self,
        expression: &Expression<'_>,
        fallback: TextSpan,
        message: &DiagnosticMessage,
        args: &[&str],
    ) {
        let span = span_of_expression(expression).unwrap_or(fallback);
        self.report(span, message, args);
    }

    fn with_scope<T>(&mut self, scope: ScopeRef, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.scope, scope);
        debug!("pushed scope");
        let result = f(self);
        self.scope = saved;
        debug!("popped scope");
        result
    }

    fn declare(&mut self, symbol: SymbolRef, name_token: &Token<'_>) -> bool {
        if self.scope.try_declare(symbol.clone()) {
            debug!(name = %symbol.name, ty = %symbol.ty, "declared symbol");
            true
        } else {
            self.report(name_token.span(), &messages::_0_IS_ALREADY_DECLARED, &[&symbol.name]);
            false
        }
    }

    /// Variables are local to their function; bare names (functions,
    /// classes, constants, built-ins) resolve through the whole chain.
    fn lookup(&self, name: &str) -> Option<SymbolRef> {
        if name.starts_with('$') {
            self.scope.lookup_local(name)
        } else {
            self.scope.try_lookup(name)
        }
    }

    fn create_label(&mut self, role: LabelRole) -> LabelRef {
        let counter = self.label_counters.entry(role).or_insert(0);
        let name = format!("{}_{}", role.as_str(), counter);
        *counter += 1;
        debug!(label = %name, "created label");
        Label::new(name, role)
    }

    // ========================================================================
    // Hoisting
    // ========================================================================

    /// Declare every file-level class before binding, so type clauses can
    /// name a class declared further down.
    fn hoist_class_declarations(&mut self, statements: &[Statement<'_>]) {
        for statement in statements {
            if let Statement::Class(class) = statement {
                let declared = self.declare_class(&class.name);
                self.hoisted_classes.insert(class.name.pos, declared);
            }
        }
    }

    fn declare_class(&mut self, name: &Token<'_>) -> (Type, SymbolRef) {
        let ty = Type::new_class(name.text);
        let symbol = VariableSymbol::class(name.text);
        if !name.is_missing() && self.declare(symbol.clone(), name) {
            self.scope.try_declare_type(name.text, ty.clone());
        }
        (ty, symbol)
    }

    // ========================================================================
    // Statement binding
    // ========================================================================

    fn bind_statements(&mut self, statements: &[Statement<'_>]) -> Vec<StmtRef> {
        statements.iter().map(|s| self.bind_statement(s)).collect()
    }

    fn bind_statement(&mut self, statement: &Statement<'_>) -> StmtRef {
        match statement {
            Statement::Block(n) => Rc::new(BoundStatement::Block(BoundBlockStatement {
                statements: self.bind_statements(n.statements),
            })),
            Statement::If(n) => {
                let condition = self.bind_expression(n.condition);
                let then_statement = self.bind_statement(n.then_statement);
                let else_statement = n
                    .else_clause
                    .as_ref()
                    .map(|clause| self.bind_statement(clause.statement));
                Rc::new(BoundStatement::If(BoundIfStatement {
                    condition,
                    then_statement,
                    else_statement,
                }))
            }
            Statement::While(n) => {
                let condition = self.bind_expression(n.condition);
                let body = self.bind_loop_body(n.body);
                Rc::new(BoundStatement::While(BoundWhileStatement { condition, body }))
            }
            Statement::For(n) => {
                let initializer = self.bind_expression(n.initializer);
                let condition = self.bind_expression(n.condition);
                let incrementor = self.bind_expression(n.incrementor);
                let body = self.bind_loop_body(n.body);
                Rc::new(BoundStatement::For(BoundForStatement {
                    initializer,
                    condition,
                    incrementor,
                    body,
                }))
            }
            Statement::Break(n) => self.bind_jump(LabelRole::Break, &n.break_keyword, n.depth),
            Statement::Continue(n) => {
                self.bind_jump(LabelRole::Continue, &n.continue_keyword, n.depth)
            }
            Statement::Return(n) => Rc::new(BoundStatement::Return(BoundReturnStatement {
                expression: n.expression.map(|e| self.bind_expression(e)),
            })),
            Statement::Echo(n) => Rc::new(BoundStatement::Echo(BoundEchoStatement {
                expression: self.bind_expression(n.expression),
            })),
            Statement::Switch(n) => self.bind_switch_statement(n),
            Statement::Expression(n) => BoundStatement::expression(self.bind_expression(n.expression)),
            Statement::Semicolon(_) => Rc::new(BoundStatement::Semicolon),
            Statement::Class(n) => self.bind_class_declaration(n),
            Statement::Function(n) => {
                let function = self.bind_function_declaration(n, None);
                Rc::new(BoundStatement::Function(function))
            }
            Statement::Const(n) => {
                let value = self.bind_expression(n.value);
                let symbol = VariableSymbol::variable(n.name.text, true, value.ty());
                self.declare(symbol.clone(), &n.name);
                Rc::new(BoundStatement::Const(BoundConstStatement { symbol, value }))
            }
            Statement::Namespace(n) => Rc::new(BoundStatement::Namespace(BoundNamespaceStatement {
                name: n.name.text.trim_start_matches('\\').to_string(),
            })),
        }
    }

    /// Bind a loop body. The body node and its labels exist before the inner
    /// statement is bound, so jumps inside it can point at them.
    fn bind_loop_body(&mut self, statement: &Statement<'_>) -> StmtRef {
        let break_label = self.create_label(LabelRole::Break);
        let continue_label = self.create_label(LabelRole::Continue);
        let body = Rc::new(BoundStatement::Body(BoundBodyStatement::placeholder(
            break_label,
            continue_label,
        )));

        self.jump_targets.push(body.clone());
        let inner = self.bind_statement(statement);
        self.jump_targets.pop();

        if let BoundStatement::Body(placeholder) = &*body {
            placeholder.fill(inner);
        }
        body
    }

    fn bind_switch_statement(&mut self, node: &SwitchStatement<'_>) -> StmtRef {
        let expression = self.bind_expression(node.expression);
        let label = self.create_label(LabelRole::Break);
        let switch = Rc::new(BoundStatement::Switch(BoundSwitchStatement::placeholder(
            expression, label,
        )));

        self.jump_targets.push(switch.clone());
        let mut cases = Vec::with_capacity(node.cases.len());
        for case in node.cases.iter() {
            let expression = case.expression.map(|e| self.bind_expression(e));
            let statements = self.bind_statements(case.statements);
            cases.push(BoundCaseClause {
                expression,
                statements,
            });
        }
        self.jump_targets.pop();

        if let BoundStatement::Switch(placeholder) = &*switch {
            placeholder.fill(cases);
        }
        switch
    }

    /// `break`/`continue` with an optional depth. Every error degrades the
    /// statement to a no-op.
    fn bind_jump(
        &mut self,
        role: LabelRole,
        keyword: &Token<'_>,
        depth: Option<&Expression<'_>>,
    ) -> StmtRef {
        let no_op = || Rc::new(BoundStatement::Semicolon);
        let keyword_text = role.as_str();

        let depth_value = match depth {
            None => 1,
            Some(expression) => match positive_depth(expression) {
                Some(value) => value,
                None => {
                    self.report_at_expression(
                        expression,
                        keyword.span(),
                        &messages::_0_DEPTH_MUST_BE_A_POSITIVE_INTEGER,
                        &[keyword_text],
                    );
                    return no_op();
                }
            },
        };

        if self.jump_targets.is_empty() {
            self.report(
                keyword.span(),
                &messages::_0_IS_NOT_ALLOWED_OUTSIDE_A_LOOP_OR_SWITCH,
                &[keyword_text],
            );
            return no_op();
        }

        let labels = self
            .jump_targets
            .iter()
            .rev()
            .nth(depth_value as usize - 1)
            .and_then(|target| target.jump_labels())
            .map(|(break_label, continue_label)| (break_label.clone(), continue_label.clone()));

        let Some((break_label, continue_label)) = labels else {
            self.report(
                keyword.span(),
                &messages::CANNOT_0_1_LEVELS,
                &[keyword_text, &depth_value.to_string()],
            );
            return no_op();
        };

        Rc::new(match role {
            LabelRole::Break => BoundStatement::Break(BoundJumpStatement {
                label: break_label,
                depth: depth_value,
            }),
            LabelRole::Continue => BoundStatement::Continue(BoundJumpStatement {
                label: continue_label,
                depth: depth_value,
            }),
        })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// A free function (`class_type` is `None`) or a method.
    fn bind_function_declaration(
        &mut self,
        node: &FunctionDeclaration<'_>,
        class_type: Option<&Type>,
    ) -> BoundFunctionDeclaration {
        let name = node.name.text;
        let modifiers = match class_type {
            Some(_) => self.bind_modifiers(node.modifiers, Modifiers::ALLOWED_ON_METHOD, "a method"),
            None => self.bind_modifiers(node.modifiers, Modifiers::NONE, "a function"),
        };

        if class_type.is_some() {
            let is_abstract = modifiers.contains(Modifiers::ABSTRACT);
            if is_abstract && node.body.is_some() {
                self.report(node.name.span(), &messages::ABSTRACT_METHOD_0_CANNOT_HAVE_A_BODY, &[name]);
            } else if !is_abstract && node.body.is_none() {
                self.report(node.name.span(), &messages::METHOD_0_REQUIRES_A_BODY, &[name]);
            }
        }

        let return_type = match node.return_type {
            Some(ref clause) => self.bind_type_clause(clause),
            None => Type::any(),
        };

        let scope = Scope::child(&self.scope);
        let (parameters, body) = self.with_scope(scope.clone(), |binder| {
            if let Some(class_type) = class_type {
                if !modifiers.contains(Modifiers::STATIC) {
                    scope.try_declare(VariableSymbol::variable("$this", true, class_type.clone()));
                }
            }
            let parameters: Vec<BoundParameter> = node
                .parameters
                .iter()
                .map(|parameter| binder.bind_parameter(parameter))
                .collect();

            let saved_targets = std::mem::take(&mut binder.jump_targets);
            binder.function_depth += 1;
            let body = node
                .body
                .as_ref()
                .map(|block| binder.bind_statements(block.statements));
            binder.function_depth -= 1;
            binder.jump_targets = saved_targets;
            (parameters, body)
        });

        let symbol = VariableSymbol::function(
            name,
            parameters
                .iter()
                .map(|p| ParameterSymbol {
                    name: p.symbol.name.clone(),
                    ty: p.symbol.ty.clone(),
                })
                .collect(),
            return_type,
        );
        if class_type.is_none() && !node.name.is_missing() {
            self.declare(symbol.clone(), &node.name);
        }

        BoundFunctionDeclaration {
            name: name.to_string(),
            modifiers,
            symbol,
            parameters,
            body,
            scope,
        }
    }

    fn bind_parameter(&mut self, node: &Parameter<'_>) -> BoundParameter {
        let ty = match node.type_clause {
            Some(ref clause) => self.bind_type_clause(clause),
            None => Type::any(),
        };
        let default_value = node
            .default_value
            .as_ref()
            .map(|init| self.bind_expression(init.value));
        let symbol = VariableSymbol::variable(node.name.text, false, ty);
        if !node.name.is_missing() {
            self.declare(symbol.clone(), &node.name);
        }
        BoundParameter {
            symbol,
            default_value,
        }
    }

    fn bind_class_declaration(&mut self, node: &ClassDeclaration<'_>) -> StmtRef {
        let modifiers = self.bind_modifiers(node.modifiers, Modifiers::ALLOWED_ON_CLASS, "a class");
        let (ty, symbol) = match self.hoisted_classes.remove(&node.name.pos) {
            Some(declared) => declared,
            None => self.declare_class(&node.name),
        };

        let base = match node.extends_clause.as_ref().and_then(|clause| clause.names.first()) {
            Some(name) if is_reserved_class_name(name.text) => {
                self.report(name.span(), &messages::CANNOT_USE_0_AS_CLASS_NAME, &[name.text]);
                None
            }
            Some(name) => Some(self.bind_name(name)),
            None => None,
        };
        let interfaces = node
            .implements_clause
            .as_ref()
            .map(|clause| clause.names.iter().map(|n| n.text.to_string()).collect())
            .unwrap_or_default();

        let scope = Scope::child(&self.scope);
        scope.try_declare_type("self", ty.clone());
        scope.try_declare_type("static", ty.clone());

        let (properties, methods) = self.with_scope(scope.clone(), |binder| {
            let mut member_names = FxHashSet::default();
            let mut properties = Vec::with_capacity(node.properties.len());
            for property in node.properties.iter() {
                if !member_names.insert(property.name.text) {
                    binder.report(
                        property.name.span(),
                        &messages::_0_IS_ALREADY_DECLARED,
                        &[property.name.text],
                    );
                }
                properties.push(binder.bind_property_declaration(property));
            }
            let mut methods = Vec::with_capacity(node.methods.len());
            for method in node.methods.iter() {
                if !member_names.insert(method.name.text) {
                    binder.report(
                        method.name.span(),
                        &messages::_0_IS_ALREADY_DECLARED,
                        &[method.name.text],
                    );
                }
                methods.push(Rc::new(binder.bind_function_declaration(method, Some(&ty))));
            }
            (properties, methods)
        });

        Rc::new(BoundStatement::Class(BoundClassDeclaration {
            name: node.name.text.to_string(),
            modifiers,
            symbol,
            ty,
            base,
            interfaces,
            properties,
            methods,
            scope,
        }))
    }

    fn bind_property_declaration(&mut self, node: &PropertyDeclaration<'_>) -> BoundPropertyDeclaration {
        let is_const = node.const_keyword.is_some();
        let modifiers = if is_const {
            self.bind_modifiers(node.modifiers, Modifiers::VISIBILITY, "a class constant")
        } else {
            self.bind_modifiers(node.modifiers, Modifiers::ALLOWED_ON_PROPERTY, "a property")
        };
        let ty = match node.type_clause {
            Some(ref clause) => self.bind_type_clause(clause),
            None => Type::any(),
        };
        let initializer = node
            .initializer
            .as_ref()
            .map(|init| self.bind_expression(init.value));
        BoundPropertyDeclaration {
            name: node.name.text.trim_start_matches('$').to_string(),
            modifiers,
            is_const,
            ty,
            initializer,
        }
    }

    /// Check each modifier against `allowed`, duplicates and mutually
    /// exclusive groups. Rejected modifiers are reported and dropped.
    fn bind_modifiers(&mut self, tokens: &[Token<'_>], allowed: Modifiers, target: &str) -> Modifiers {
        let mut result = Modifiers::NONE;
        let mut accepted: Vec<(Modifiers, &str)> = Vec::new();
        for token in tokens {
            let flag = Modifiers::from_token_kind(token.kind);
            if flag.is_empty() {
                continue;
            }
            if !allowed.contains(flag) {
                self.report(token.span(), &messages::MODIFIER_0_NOT_ALLOWED_ON_1, &[token.text, target]);
                continue;
            }
            if result.contains(flag) {
                self.report(token.span(), &messages::MODIFIER_0_ALREADY_SEEN, &[token.text]);
                continue;
            }
            let collision = COLLIDING_MODIFIERS
                .iter()
                .filter(|group| group.contains(flag))
                .find_map(|group| accepted.iter().find(|(seen, _)| group.contains(*seen)));
            if let Some((_, other)) = collision {
                let other = *other;
                self.report(
                    token.span(),
                    &messages::MODIFIERS_0_AND_1_CANNOT_BE_COMBINED,
                    &[other, token.text],
                );
                continue;
            }
            result |= flag;
            accepted.push((flag, token.text));
        }
        result
    }

    fn bind_type_clause(&mut self, clause: &TypeClause<'_>) -> Type {
        let name = clause.name.text;
        if clause.name.is_missing() {
            return Type::error();
        }
        match self.scope.try_lookup_type(name) {
            Some(ty) => ty,
            None => {
                let span = span_of_type_clause(clause).unwrap_or_else(|| clause.name.span());
                self.report(span, &messages::TYPE_0_DOES_NOT_EXIST, &[name]);
                Type::error()
            }
        }
    }

    // ========================================================================
    // Expression binding
    // ========================================================================

    fn bind_expression(&mut self, expression: &Expression<'_>) -> ExprRef {
        match expression {
            Expression::Binary(n) => self.bind_binary_expression(n),
            Expression::Unary(n) => self.bind_unary_expression(n),
            Expression::Name(n) => self.bind_name(&n.identifier),
            Expression::Literal(n) => bind_literal(&n.token),
            Expression::Paren(n) => Rc::new(BoundExpression::Paren(BoundParenExpression {
                expression: self.bind_expression(n.expression),
            })),
            Expression::Comma(n) => Rc::new(BoundExpression::Comma(BoundCommaExpression {
                expressions: n.expressions.iter().map(|e| self.bind_expression(e)).collect(),
            })),
            Expression::Assignment(n) => self.bind_assignment_expression(n),
            Expression::Empty(_) => Rc::new(BoundExpression::Empty),
            Expression::ArrayLiteral(n) => self.bind_array_literal(n),
        }
    }

    /// A name or `$variable`. A name that was never declared binds to a
    /// fresh `any` placeholder without a diagnostic. Inside a function the
    /// placeholder is declared locally so it shadows file-level variables.
    fn bind_name(&mut self, token: &Token<'_>) -> ExprRef {
        if let Some(symbol) = self.lookup(token.text) {
            return BoundExpression::name(symbol);
        }
        let symbol = VariableSymbol::variable(token.text, false, Type::any());
        if self.function_depth > 0 && token.text.starts_with('$') && token.text != "$this" {
            self.scope.try_declare(symbol.clone());
            debug!(name = %symbol.name, "declared placeholder");
        }
        BoundExpression::name(symbol)
    }

    /// The right side of `->` or `::` names a member, not something in scope.
    fn bind_member_name(&mut self, expression: &Expression<'_>) -> ExprRef {
        match expression {
            Expression::Name(n) => {
                BoundExpression::name(VariableSymbol::variable(n.identifier.text, false, Type::any()))
            }
            other => self.bind_expression(other),
        }
    }

    fn bind_binary_expression(&mut self, node: &BinaryExpression<'_>) -> ExprRef {
        let kind = node.operator_token.kind;
        if kind.is_assignment() {
            return self.bind_member_assignment(node);
        }
        if kind == SyntaxKind::EqualsGreaterThanToken {
            self.report(
                node.operator_token.span(),
                &messages::KEY_VALUE_PAIR_OUTSIDE_ARRAY_LITERAL,
                &[],
            );
            self.bind_expression(node.left);
            self.bind_expression(node.right);
            return Rc::new(BoundExpression::Error);
        }

        let left = self.bind_expression(node.left);
        let right = match kind {
            SyntaxKind::MinusGreaterThanToken | SyntaxKind::ColonColonToken => {
                self.bind_member_name(node.right)
            }
            _ => self.bind_expression(node.right),
        };
        self.bind_binary_operator(kind, &node.operator_token, left, right)
    }

    fn bind_binary_operator(
        &mut self,
        kind: SyntaxKind,
        operator_token: &Token<'_>,
        left: ExprRef,
        right: ExprRef,
    ) -> ExprRef {
        let left_type = left.ty();
        let right_type = right.ty();
        if left_type.is_error() || right_type.is_error() {
            return Rc::new(BoundExpression::Error);
        }

        let Some(operator) = BinaryOperator::bind(kind, &left_type, &right_type) else {
            self.report(
                operator_token.span(),
                &messages::OPERATOR_0_NOT_DEFINED_FOR_TYPES_1_AND_2,
                &[kind.text(), left_type.name(), right_type.name()],
            );
            return Rc::new(BoundExpression::Error);
        };

        let ty = match &*left {
            BoundExpression::Name(callee) if kind == SyntaxKind::OpenParenToken => callee
                .symbol
                .return_type()
                .cloned()
                .unwrap_or_else(|| operator.result_type.clone()),
            _ => operator.result_type.clone(),
        };
        Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left,
            operator,
            right,
            ty,
        }))
    }

    /// `$obj->x = v`, `Foo::$x = v`, `$a[k] = v` and their compound forms.
    /// A compound form reuses the bound target on both sides.
    fn bind_member_assignment(&mut self, node: &BinaryExpression<'_>) -> ExprRef {
        let is_target = matches!(
            node.left.skip_parens(),
            Expression::Binary(target) if matches!(
                target.operator_token.kind,
                SyntaxKind::MinusGreaterThanToken
                    | SyntaxKind::ColonColonToken
                    | SyntaxKind::OpenBracketToken
            )
        );
        if !is_target {
            self.report_at_expression(
                node.left,
                node.operator_token.span(),
                &messages::INVALID_ASSIGNMENT_TARGET,
                &[],
            );
            self.bind_expression(node.right);
            return Rc::new(BoundExpression::Error);
        }

        let target = self.bind_expression(node.left);
        let mut value = self.bind_expression(node.right);
        if let Some(operator) = node.operator_token.kind.compound_assignment_operator() {
            value = self.bind_binary_operator(operator, &node.operator_token, target.clone(), value);
        }
        if target.ty().is_error() || value.ty().is_error() {
            return Rc::new(BoundExpression::Error);
        }
        let ty = value.ty();
        Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: target,
            operator: BinaryOperator::assignment(),
            right: value,
            ty,
        }))
    }

    /// `$name = v`, `NAME = v`, `$name[] = v` and compound forms. An unknown
    /// target is declared in the current scope.
    fn bind_assignment_expression(&mut self, node: &AssignmentExpression<'_>) -> ExprRef {
        let name = node.target.text;
        let value = self.bind_expression(node.value);

        let symbol = match self.lookup(name) {
            Some(symbol) => symbol,
            None => {
                let symbol = VariableSymbol::variable(name, false, Type::any());
                self.declare(symbol.clone(), &node.target);
                symbol
            }
        };

        if symbol.read_only {
            self.report(
                node.target.span(),
                &messages::CANNOT_ASSIGN_TO_0_BECAUSE_IT_IS_READ_ONLY,
                &[name],
            );
            return value;
        }

        let value = match node.operator_token.kind.compound_assignment_operator() {
            Some(operator) => {
                let current = BoundExpression::name(symbol.clone());
                self.bind_binary_operator(operator, &node.operator_token, current, value)
            }
            None => value,
        };

        let append = node.append_brackets.is_some();
        let value_type = value.ty();
        if !append && !symbol.ty.is_compatible_with(&value_type) {
            self.report_at_expression(
                node.value,
                node.target.span(),
                &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
                &[value_type.name(), symbol.ty.name()],
            );
        }

        Rc::new(BoundExpression::Assignment(BoundAssignmentExpression {
            symbol,
            value,
            append,
            ty: value_type,
        }))
    }

    fn bind_unary_expression(&mut self, node: &UnaryExpression<'_>) -> ExprRef {
        let kind = node.operator_token.kind;
        if kind == SyntaxKind::NewKeyword {
            return self.bind_new_expression(node);
        }

        if matches!(kind, SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken)
            && !is_increment_target(node.operand)
        {
            self.report(
                node.operator_token.span(),
                &messages::OPERATOR_0_CAN_ONLY_BE_APPLIED_TO_A_VARIABLE,
                &[kind.text()],
            );
            self.bind_expression(node.operand);
            return Rc::new(BoundExpression::Error);
        }

        let operand = self.bind_expression(node.operand);
        self.bind_unary_operator(&node.operator_token, node.is_postfix, operand)
    }

    fn bind_unary_operator(&mut self, operator_token: &Token<'_>, is_postfix: bool, operand: ExprRef) -> ExprRef {
        let operand_type = operand.ty();
        if operand_type.is_error() {
            return Rc::new(BoundExpression::Error);
        }
        match UnaryOperator::bind(operator_token.kind, is_postfix, &operand_type) {
            Some(operator) => Rc::new(BoundExpression::Unary(BoundUnaryExpression {
                operator,
                operand,
                ty: operator.result_type.clone(),
            })),
            None => {
                self.report(
                    operator_token.span(),
                    &messages::OPERATOR_0_NOT_DEFINED_FOR_TYPE_1,
                    &[operator_token.kind.text(), operand_type.name()],
                );
                Rc::new(BoundExpression::Error)
            }
        }
    }

    /// `new Foo(args)`. A bare `new Foo` gets an empty argument list.
    fn bind_new_expression(&mut self, node: &UnaryExpression<'_>) -> ExprRef {
        let operand = match node.operand {
            Expression::Binary(call) if call.operator_token.kind == SyntaxKind::OpenParenToken => {
                self.bind_expression(node.operand)
            }
            other => {
                let callee = self.bind_expression(other);
                if callee.ty().is_error() {
                    return Rc::new(BoundExpression::Error);
                }
                BoundExpression::call(callee, Vec::new(), Type::any())
            }
        };
        self.bind_unary_operator(&node.operator_token, false, operand)
    }

    fn bind_array_literal(&mut self, node: &ArrayLiteralExpression<'_>) -> ExprRef {
        let mut elements = Vec::with_capacity(node.elements.len());
        for element in node.elements.iter() {
            let bound = match element {
                Expression::Binary(pair)
                    if pair.operator_token.kind == SyntaxKind::EqualsGreaterThanToken =>
                {
                    let key = self.bind_expression(pair.left);
                    let value = self.bind_expression(pair.right);
                    self.bind_binary_operator(pair.operator_token.kind, &pair.operator_token, key, value)
                }
                Expression::Empty(_) => continue,
                other => self.bind_expression(other),
            };
            elements.push(bound);
        }
        Rc::new(BoundExpression::ArrayLiteral(BoundArrayLiteralExpression { elements }))
    }
}

fn bind_literal(token: &Token<'_>) -> ExprRef {
    let value = match (token.kind, token.value) {
        (_, Some(LiteralValue::Int(value))) => ConstantValue::Int(value),
        (_, Some(LiteralValue::Float(value))) => ConstantValue::Float(value),
        (_, Some(LiteralValue::String(value))) => ConstantValue::String(value.to_string()),
        (SyntaxKind::TrueKeyword, _) => ConstantValue::Bool(true),
        (SyntaxKind::FalseKeyword, _) => ConstantValue::Bool(false),
        (SyntaxKind::IntegerLiteral, None) => ConstantValue::Int(0),
        (SyntaxKind::StringLiteral, None) => ConstantValue::String(String::new()),
        _ => ConstantValue::Null,
    };
    BoundExpression::literal(value)
}

/// The value of `N` in `break N` when it is a positive integer literal.
fn positive_depth(expression: &Expression<'_>) -> Option<u32> {
    match expression.skip_parens() {
        Expression::Literal(literal) if literal.token.kind == SyntaxKind::IntegerLiteral => literal
            .token
            .int_value()
            .filter(|value| *value > 0)
            .and_then(|value| u32::try_from(value).ok()),
        _ => None,
    }
}

/// `++`/`--` need something that can be written back: a name, a variable,
/// or a property.
fn is_increment_target(expression: &Expression<'_>) -> bool {
    match expression.skip_parens() {
        Expression::Name(_) => true,
        Expression::Binary(member) => matches!(
            member.operator_token.kind,
            SyntaxKind::MinusGreaterThanToken | SyntaxKind::ColonColonToken
        ),
        _ => false,
    }
}

/// Names that refer to a class relative to the current one.
fn is_reserved_class_name(name: &str) -> bool {
    ["self", "parent", "static"]
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
}
