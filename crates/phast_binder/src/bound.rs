//! Bound tree definitions.
//!
//! Bound nodes are reference counted so that a rewrite can share every
//! subtree it leaves alone. Nodes are immutable once built, with two
//! exceptions: a loop body's inner statement (and a switch's cases) is filled
//! in once after the node exists, and a [`Label`] can be flagged for printing.

use crate::operators::{BinaryOperator, UnaryOperator};
use crate::scope::ScopeRef;
use crate::symbols::{SymbolRef, Type};
use phast_ast::Modifiers;
use std::cell::{Cell, OnceCell};
use std::rc::Rc;

pub type ExprRef = Rc<BoundExpression>;
pub type StmtRef = Rc<BoundStatement>;
pub type LabelRef = Rc<Label>;

// ============================================================================
// Labels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelRole {
    Break,
    Continue,
}

impl LabelRole {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelRole::Break => "break",
            LabelRole::Continue => "continue",
        }
    }
}

/// A jump target. Printed only when a `break N`/`continue N` with N > 1
/// needs it.
#[derive(Debug)]
pub struct Label {
    pub name: String,
    pub role: LabelRole,
    materialize: Cell<bool>,
}

impl Label {
    pub fn new(name: impl Into<String>, role: LabelRole) -> LabelRef {
        Rc::new(Label {
            name: name.into(),
            role,
            materialize: Cell::new(false),
        })
    }

    pub fn materialize(&self) {
        self.materialize.set(true);
    }

    pub fn is_materialized(&self) -> bool {
        self.materialize.get()
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Clone)]
pub struct BoundFile {
    pub file_name: String,
    pub statements: Vec<StmtRef>,
    /// File-level variables. A child of `root`.
    pub scope: ScopeRef,
    /// Keeps the built-in scope alive for lookups through `scope`.
    pub root: ScopeRef,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
    /// The missing key of an array element without `=>`.
    Absent,
}

#[derive(Debug)]
pub enum BoundExpression {
    Binary(BoundBinaryExpression),
    Unary(BoundUnaryExpression),
    Name(BoundNameExpression),
    Literal(BoundLiteralExpression),
    Paren(BoundParenExpression),
    Comma(BoundCommaExpression),
    Assignment(BoundAssignmentExpression),
    Empty,
    Error,
    ArrayLiteral(BoundArrayLiteralExpression),
    /// A native JavaScript array `[a, b]`. Only produced by lowering.
    JsArray(BoundJsArrayExpression),
    /// `() => { ... }`. Only produced by lowering.
    Closure(BoundClosureExpression),
    /// A class or function declaration in expression position.
    Declaration(StmtRef),
}

#[derive(Debug)]
pub struct BoundBinaryExpression {
    pub left: ExprRef,
    pub operator: &'static BinaryOperator,
    pub right: ExprRef,
    pub ty: Type,
}

#[derive(Debug)]
pub struct BoundUnaryExpression {
    pub operator: &'static UnaryOperator,
    pub operand: ExprRef,
    pub ty: Type,
}

#[derive(Debug)]
pub struct BoundNameExpression {
    pub symbol: SymbolRef,
}

#[derive(Debug)]
pub struct BoundLiteralExpression {
    pub value: ConstantValue,
    pub ty: Type,
}

#[derive(Debug)]
pub struct BoundParenExpression {
    pub expression: ExprRef,
}

#[derive(Debug)]
pub struct BoundCommaExpression {
    pub expressions: Vec<ExprRef>,
}

/// `$name = value`, or `$name[] = value` when `append` is set.
#[derive(Debug)]
pub struct BoundAssignmentExpression {
    pub symbol: SymbolRef,
    pub value: ExprRef,
    pub append: bool,
    pub ty: Type,
}

#[derive(Debug)]
pub struct BoundArrayLiteralExpression {
    /// Plain values or `=>` binary expressions.
    pub elements: Vec<ExprRef>,
}

#[derive(Debug)]
pub struct BoundJsArrayExpression {
    pub elements: Vec<ExprRef>,
}

#[derive(Debug)]
pub struct BoundClosureExpression {
    pub body: Vec<StmtRef>,
}

impl BoundExpression {
    pub fn ty(&self) -> Type {
        match self {
            BoundExpression::Binary(n) => n.ty.clone(),
            BoundExpression::Unary(n) => n.ty.clone(),
            BoundExpression::Name(n) => n.symbol.ty.clone(),
            BoundExpression::Literal(n) => n.ty.clone(),
            BoundExpression::Paren(n) => n.expression.ty(),
            BoundExpression::Comma(n) => n
                .expressions
                .last()
                .map(|e| e.ty())
                .unwrap_or_else(Type::void),
            BoundExpression::Assignment(n) => n.ty.clone(),
            BoundExpression::Empty => Type::void(),
            BoundExpression::Error => Type::error(),
            BoundExpression::ArrayLiteral(_) => Type::array(),
            BoundExpression::JsArray(_) => Type::any(),
            BoundExpression::Closure(_) => Type::function(),
            BoundExpression::Declaration(stmt) => match &**stmt {
                BoundStatement::Class(_) => Type::class(),
                _ => Type::function(),
            },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            BoundExpression::Binary(_) => "BoundBinaryExpression",
            BoundExpression::Unary(_) => "BoundUnaryExpression",
            BoundExpression::Name(_) => "BoundNameExpression",
            BoundExpression::Literal(_) => "BoundLiteralExpression",
            BoundExpression::Paren(_) => "BoundParenExpression",
            BoundExpression::Comma(_) => "BoundCommaExpression",
            BoundExpression::Assignment(_) => "BoundAssignmentExpression",
            BoundExpression::Empty => "BoundEmptyExpression",
            BoundExpression::Error => "BoundErrorExpression",
            BoundExpression::ArrayLiteral(_) => "BoundArrayLiteralExpression",
            BoundExpression::JsArray(_) => "BoundJsArrayExpression",
            BoundExpression::Closure(_) => "BoundClosureExpression",
            BoundExpression::Declaration(_) => "BoundDeclarationExpression",
        }
    }

    pub fn literal(value: ConstantValue) -> ExprRef {
        let ty = match &value {
            ConstantValue::Int(_) => Type::int(),
            ConstantValue::String(_) => Type::string(),
            ConstantValue::Bool(_) => Type::bool(),
            ConstantValue::Null => Type::null(),
            ConstantValue::Float(_) | ConstantValue::Absent => Type::any(),
        };
        Rc::new(BoundExpression::Literal(BoundLiteralExpression { value, ty }))
    }

    pub fn string(text: impl Into<String>) -> ExprRef {
        Self::literal(ConstantValue::String(text.into()))
    }

    pub fn name(symbol: SymbolRef) -> ExprRef {
        Rc::new(BoundExpression::Name(BoundNameExpression { symbol }))
    }

    /// `callee(arguments)` with the usual argument shape: empty, a single
    /// expression, or a comma expression.
    pub fn call(callee: ExprRef, mut arguments: Vec<ExprRef>, ty: Type) -> ExprRef {
        let right = match arguments.len() {
            0 => Rc::new(BoundExpression::Empty),
            1 => arguments.remove(0),
            _ => Rc::new(BoundExpression::Comma(BoundCommaExpression {
                expressions: arguments,
            })),
        };
        Rc::new(BoundExpression::Binary(BoundBinaryExpression {
            left: callee,
            operator: BinaryOperator::call(),
            right,
            ty,
        }))
    }

}

/// The arguments held by a call's right operand.
pub fn call_arguments(right: &ExprRef) -> Vec<ExprRef> {
    match &**right {
        BoundExpression::Empty => Vec::new(),
        BoundExpression::Comma(n) => n.expressions.clone(),
        _ => vec![right.clone()],
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum BoundStatement {
    Block(BoundBlockStatement),
    If(BoundIfStatement),
    While(BoundWhileStatement),
    For(BoundForStatement),
    /// The body of a loop, carrying its jump labels.
    Body(BoundBodyStatement),
    Switch(BoundSwitchStatement),
    Break(BoundJumpStatement),
    Continue(BoundJumpStatement),
    Return(BoundReturnStatement),
    Echo(BoundEchoStatement),
    Expression(BoundExpressionStatement),
    Semicolon,
    Class(BoundClassDeclaration),
    Function(BoundFunctionDeclaration),
    Const(BoundConstStatement),
    Namespace(BoundNamespaceStatement),
}

#[derive(Debug)]
pub struct BoundBlockStatement {
    pub statements: Vec<StmtRef>,
}

#[derive(Debug)]
pub struct BoundIfStatement {
    pub condition: ExprRef,
    pub then_statement: StmtRef,
    pub else_statement: Option<StmtRef>,
}

#[derive(Debug)]
pub struct BoundWhileStatement {
    pub condition: ExprRef,
    pub body: StmtRef,
}

#[derive(Debug)]
pub struct BoundForStatement {
    pub initializer: ExprRef,
    pub condition: ExprRef,
    pub incrementor: ExprRef,
    pub body: StmtRef,
}

#[derive(Debug)]
pub struct BoundBodyStatement {
    pub break_label: LabelRef,
    pub continue_label: LabelRef,
    statement: OnceCell<StmtRef>,
}

impl BoundBodyStatement {
    /// A body whose statement is bound later with [`fill`](Self::fill).
    pub fn placeholder(break_label: LabelRef, continue_label: LabelRef) -> Self {
        Self {
            break_label,
            continue_label,
            statement: OnceCell::new(),
        }
    }

    pub fn filled(break_label: LabelRef, continue_label: LabelRef, statement: StmtRef) -> Self {
        Self {
            break_label,
            continue_label,
            statement: OnceCell::from(statement),
        }
    }

    pub fn fill(&self, statement: StmtRef) {
        let result = self.statement.set(statement);
        debug_assert!(result.is_ok(), "loop body filled twice");
    }

    /// # Panics
    /// If read before the binder filled the placeholder.
    pub fn statement(&self) -> &StmtRef {
        self.statement
            .get()
            .unwrap_or_else(|| panic!("loop body `{}` read before it was bound", self.break_label.name))
    }
}

/// A switch. `continue` inside a switch targets the break label, so the
/// switch has a single label for both.
#[derive(Debug)]
pub struct BoundSwitchStatement {
    pub expression: ExprRef,
    pub break_label: LabelRef,
    cases: OnceCell<Vec<BoundCaseClause>>,
}

#[derive(Debug, Clone)]
pub struct BoundCaseClause {
    /// `None` for `default`.
    pub expression: Option<ExprRef>,
    pub statements: Vec<StmtRef>,
}

impl BoundSwitchStatement {
    pub fn placeholder(expression: ExprRef, break_label: LabelRef) -> Self {
        Self {
            expression,
            break_label,
            cases: OnceCell::new(),
        }
    }

    pub fn filled(expression: ExprRef, break_label: LabelRef, cases: Vec<BoundCaseClause>) -> Self {
        Self {
            expression,
            break_label,
            cases: OnceCell::from(cases),
        }
    }

    pub fn fill(&self, cases: Vec<BoundCaseClause>) {
        let result = self.cases.set(cases);
        debug_assert!(result.is_ok(), "switch cases filled twice");
    }

    /// # Panics
    /// If read before the binder filled the placeholder.
    pub fn cases(&self) -> &[BoundCaseClause] {
        self.cases
            .get()
            .unwrap_or_else(|| panic!("switch `{}` read before it was bound", self.break_label.name))
    }
}

#[derive(Debug)]
pub struct BoundJumpStatement {
    pub label: LabelRef,
    /// 1 for a plain `break`/`continue`.
    pub depth: u32,
}

#[derive(Debug)]
pub struct BoundReturnStatement {
    pub expression: Option<ExprRef>,
}

#[derive(Debug)]
pub struct BoundEchoStatement {
    pub expression: ExprRef,
}

#[derive(Debug)]
pub struct BoundExpressionStatement {
    pub expression: ExprRef,
}

#[derive(Debug, Clone)]
pub struct BoundConstStatement {
    pub symbol: SymbolRef,
    pub value: ExprRef,
}

#[derive(Debug, Clone)]
pub struct BoundNamespaceStatement {
    pub name: String,
}

impl BoundStatement {
    /// The break and continue labels of a jump target (loop body or switch).
    pub fn jump_labels(&self) -> Option<(&LabelRef, &LabelRef)> {
        match self {
            BoundStatement::Body(n) => Some((&n.break_label, &n.continue_label)),
            BoundStatement::Switch(n) => Some((&n.break_label, &n.break_label)),
            _ => None,
        }
    }

    pub fn expression(expression: ExprRef) -> StmtRef {
        Rc::new(BoundStatement::Expression(BoundExpressionStatement { expression }))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            BoundStatement::Block(_) => "BoundBlockStatement",
            BoundStatement::If(_) => "BoundIfStatement",
            BoundStatement::While(_) => "BoundWhileStatement",
            BoundStatement::For(_) => "BoundForStatement",
            BoundStatement::Body(_) => "BoundBodyStatement",
            BoundStatement::Switch(_) => "BoundSwitchStatement",
            BoundStatement::Break(_) => "BoundBreakStatement",
            BoundStatement::Continue(_) => "BoundContinueStatement",
            BoundStatement::Return(_) => "BoundReturnStatement",
            BoundStatement::Echo(_) => "BoundEchoStatement",
            BoundStatement::Expression(_) => "BoundExpressionStatement",
            BoundStatement::Semicolon => "BoundSemicolonStatement",
            BoundStatement::Class(_) => "BoundClassDeclaration",
            BoundStatement::Function(_) => "BoundFunctionDeclaration",
            BoundStatement::Const(_) => "BoundConstStatement",
            BoundStatement::Namespace(_) => "BoundNamespaceStatement",
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone)]
pub struct BoundParameter {
    pub symbol: SymbolRef,
    pub default_value: Option<ExprRef>,
}

/// A free function or a class method.
#[derive(Debug, Clone)]
pub struct BoundFunctionDeclaration {
    pub name: String,
    pub modifiers: Modifiers,
    pub symbol: SymbolRef,
    pub parameters: Vec<BoundParameter>,
    /// `None` for an abstract method.
    pub body: Option<Vec<StmtRef>>,
    /// Parameters, locals and (for instance methods) `$this`.
    pub scope: ScopeRef,
}

#[derive(Debug, Clone)]
pub struct BoundPropertyDeclaration {
    /// Without the `$` sigil.
    pub name: String,
    pub modifiers: Modifiers,
    pub is_const: bool,
    pub ty: Type,
    pub initializer: Option<ExprRef>,
}

#[derive(Debug, Clone)]
pub struct BoundClassDeclaration {
    pub name: String,
    pub modifiers: Modifiers,
    pub symbol: SymbolRef,
    pub ty: Type,
    pub base: Option<ExprRef>,
    pub interfaces: Vec<String>,
    pub properties: Vec<BoundPropertyDeclaration>,
    pub methods: Vec<Rc<BoundFunctionDeclaration>>,
    pub scope: ScopeRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_placeholder_fills_once() {
        let body = BoundBodyStatement::placeholder(
            Label::new("break_0", LabelRole::Break),
            Label::new("continue_0", LabelRole::Continue),
        );
        let inner = Rc::new(BoundStatement::Semicolon);
        body.fill(inner.clone());
        assert!(Rc::ptr_eq(body.statement(), &inner));
    }

    #[test]
    #[should_panic(expected = "read before it was bound")]
    fn test_unfilled_body_panics() {
        let body = BoundBodyStatement::placeholder(
            Label::new("break_0", LabelRole::Break),
            Label::new("continue_0", LabelRole::Continue),
        );
        body.statement();
    }

    #[test]
    fn test_switch_shares_one_label() {
        let label = Label::new("break_3", LabelRole::Break);
        let switch = BoundStatement::Switch(BoundSwitchStatement::filled(
            Rc::new(BoundExpression::Empty),
            label.clone(),
            Vec::new(),
        ));
        let (break_label, continue_label) = switch.jump_labels().unwrap();
        assert!(Rc::ptr_eq(break_label, continue_label));
        assert!(Rc::ptr_eq(break_label, &label));
    }

    #[test]
    fn test_label_materialize_flag() {
        let label = Label::new("break_0", LabelRole::Break);
        assert!(!label.is_materialized());
        label.materialize();
        assert!(label.is_materialized());
    }

    #[test]
    fn test_call_argument_shapes() {
        let callee = BoundExpression::string("f");
        let none = BoundExpression::call(callee.clone(), vec![], Type::any());
        let BoundExpression::Binary(call) = &*none else { panic!() };
        assert!(matches!(&*call.right, BoundExpression::Empty));

        let two = BoundExpression::call(
            callee,
            vec![BoundExpression::string("a"), BoundExpression::string("b")],
            Type::any(),
        );
        let BoundExpression::Binary(call) = &*two else { panic!() };
        assert_eq!(call_arguments(&call.right).len(), 2);
    }
}
