//! Type and variable symbols.
//!
//! Primitive types are process-wide singletons. Two [`Type`]s are equal only
//! when they point at the same descriptor, so a user class named `int` is
//! never the `int` primitive.

use lazy_static::lazy_static;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct TypeData {
    name: String,
}

/// An identity-compared type descriptor.
#[derive(Clone)]
pub struct Type(Arc<TypeData>);

lazy_static! {
    static ref BOOL: Type = Type::named("bool");
    static ref INT: Type = Type::named("int");
    static ref STRING: Type = Type::named("string");
    static ref FUNCTION: Type = Type::named("function");
    static ref VOID: Type = Type::named("void");
    static ref ERROR: Type = Type::named("?");
    static ref ANY: Type = Type::named("any");
    static ref CLASS: Type = Type::named("class");
    static ref ARRAY: Type = Type::named("array");
    static ref NULL: Type = Type::named("null");
    static ref SELF: Type = Type::named("self");
}

impl Type {
    fn named(name: &str) -> Type {
        Type(Arc::new(TypeData {
            name: name.to_string(),
        }))
    }

    /// A fresh type for a user class. Distinct from every other type,
    /// including another class with the same name.
    pub fn new_class(name: &str) -> Type {
        Type::named(name)
    }

    pub fn bool() -> Type {
        BOOL.clone()
    }

    pub fn int() -> Type {
        INT.clone()
    }

    pub fn string() -> Type {
        STRING.clone()
    }

    pub fn function() -> Type {
        FUNCTION.clone()
    }

    pub fn void() -> Type {
        VOID.clone()
    }

    pub fn error() -> Type {
        ERROR.clone()
    }

    pub fn any() -> Type {
        ANY.clone()
    }

    pub fn class() -> Type {
        CLASS.clone()
    }

    pub fn array() -> Type {
        ARRAY.clone()
    }

    pub fn null() -> Type {
        NULL.clone()
    }

    pub fn self_type() -> Type {
        SELF.clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_any(&self) -> bool {
        Arc::ptr_eq(&self.0, &ANY.0)
    }

    pub fn is_error(&self) -> bool {
        Arc::ptr_eq(&self.0, &ERROR.0)
    }

    /// `any` and `error` are compatible with every type.
    pub fn is_wildcard(&self) -> bool {
        self.is_any() || self.is_error()
    }

    pub fn is_compatible_with(&self, other: &Type) -> bool {
        self == other || self.is_wildcard() || other.is_wildcard()
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.name())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared parameter of a function, method or built-in.
#[derive(Debug, Clone)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub enum SymbolKind {
    Variable,
    /// A class name. Its type is `class`; the class's own type is in
    /// the scope's type table.
    Class,
    /// A user function or method.
    Function {
        parameters: Vec<ParameterSymbol>,
        return_type: Type,
    },
    /// A function provided by the runtime module.
    Builtin {
        parameters: Vec<ParameterSymbol>,
        return_type: Type,
        export_name: &'static str,
        module: &'static str,
    },
}

#[derive(Debug)]
pub struct VariableSymbol {
    pub name: String,
    pub read_only: bool,
    pub ty: Type,
    pub kind: SymbolKind,
}

pub type SymbolRef = Arc<VariableSymbol>;

impl VariableSymbol {
    pub fn variable(name: impl Into<String>, read_only: bool, ty: Type) -> SymbolRef {
        Arc::new(VariableSymbol {
            name: name.into(),
            read_only,
            ty,
            kind: SymbolKind::Variable,
        })
    }

    pub fn class(name: impl Into<String>) -> SymbolRef {
        Arc::new(VariableSymbol {
            name: name.into(),
            read_only: true,
            ty: Type::class(),
            kind: SymbolKind::Class,
        })
    }

    pub fn function(
        name: impl Into<String>,
        parameters: Vec<ParameterSymbol>,
        return_type: Type,
    ) -> SymbolRef {
        Arc::new(VariableSymbol {
            name: name.into(),
            read_only: true,
            ty: Type::function(),
            kind: SymbolKind::Function {
                parameters,
                return_type,
            },
        })
    }

    /// `$name` rather than a bare identifier.
    pub fn is_variable(&self) -> bool {
        self.name.starts_with('$')
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, SymbolKind::Builtin { .. })
    }

    pub fn return_type(&self) -> Option<&Type> {
        match &self.kind {
            SymbolKind::Function { return_type, .. } | SymbolKind::Builtin { return_type, .. } => {
                Some(return_type)
            }
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[ParameterSymbol] {
        match &self.kind {
            SymbolKind::Function { parameters, .. } | SymbolKind::Builtin { parameters, .. } => {
                parameters
            }
            _ => &[],
        }
    }
}
