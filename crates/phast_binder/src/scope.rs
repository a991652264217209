//! Scope chain for the binder.
//!
//! Children are owned by the bound nodes that introduce them (the file,
//! functions, classes, methods); the parent link is weak.

use crate::builtins;
use crate::symbols::{SymbolRef, Type};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub type ScopeRef = Rc<Scope>;

pub struct Scope {
    /// Insertion-ordered so that the printer's `let` list is stable.
    variables: RefCell<IndexMap<String, SymbolRef>>,
    types: RefCell<FxHashMap<String, Type>>,
    parent: Option<Weak<Scope>>,
}

impl Scope {
    /// An empty scope with no parent.
    pub fn empty() -> ScopeRef {
        Rc::new(Scope {
            variables: RefCell::new(IndexMap::new()),
            types: RefCell::new(FxHashMap::default()),
            parent: None,
        })
    }

    /// A root scope seeded with the primitive type names and the built-ins.
    pub fn root() -> ScopeRef {
        let scope = Scope::empty();
        for (name, ty) in [
            ("bool", Type::bool()),
            ("int", Type::int()),
            ("string", Type::string()),
            ("array", Type::array()),
            ("void", Type::void()),
            ("null", Type::null()),
            ("callable", Type::function()),
            ("iterable", Type::any()),
            ("mixed", Type::any()),
            ("float", Type::any()),
            ("object", Type::any()),
            ("self", Type::self_type()),
            ("static", Type::self_type()),
        ] {
            scope.try_declare_type(name, ty);
        }
        for symbol in builtins::symbols() {
            scope.try_declare(symbol.clone());
        }
        scope
    }

    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(Scope {
            variables: RefCell::new(IndexMap::new()),
            types: RefCell::new(FxHashMap::default()),
            parent: Some(Rc::downgrade(parent)),
        })
    }

    pub fn parent(&self) -> Option<ScopeRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Declare in this scope. Fails if the name is already declared here;
    /// shadowing an outer scope is fine.
    pub fn try_declare(&self, symbol: SymbolRef) -> bool {
        let mut variables = self.variables.borrow_mut();
        if variables.contains_key(&symbol.name) {
            return false;
        }
        variables.insert(symbol.name.clone(), symbol);
        true
    }

    pub fn lookup_local(&self, name: &str) -> Option<SymbolRef> {
        self.variables.borrow().get(name).cloned()
    }

    pub fn try_lookup(&self, name: &str) -> Option<SymbolRef> {
        if let Some(symbol) = self.lookup_local(name) {
            return Some(symbol);
        }
        self.parent()?.try_lookup(name)
    }

    pub fn try_declare_type(&self, name: &str, ty: Type) -> bool {
        let mut types = self.types.borrow_mut();
        if types.contains_key(name) {
            return false;
        }
        types.insert(name.to_string(), ty);
        true
    }

    /// Type names are case-insensitive.
    pub fn try_lookup_type(&self, name: &str) -> Option<Type> {
        if let Some(ty) = self.types.borrow().get(name) {
            return Some(ty.clone());
        }
        let lower = name.to_ascii_lowercase();
        if lower != name {
            if let Some(ty) = self.types.borrow().get(&lower) {
                return Some(ty.clone());
            }
        }
        self.parent()?.try_lookup_type(name)
    }

    /// Symbols declared directly in this scope, in declaration order.
    pub fn declared_variables(&self) -> Vec<SymbolRef> {
        self.variables.borrow().values().cloned().collect()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("variables", &self.variables.borrow().keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
