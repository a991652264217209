//! Functions provided by the JavaScript runtime module.
//!
//! The root scope is seeded from this table, and the lowering pass emits
//! calls to the internal entries by name. The printer imports every entry a
//! file references from [`RUNTIME_MODULE`].

use crate::symbols::{ParameterSymbol, SymbolKind, SymbolRef, Type, VariableSymbol};
use lazy_static::lazy_static;
use std::sync::Arc;

/// Name of the runtime module that exports every built-in.
pub const RUNTIME_MODULE: &str = "php-runtime";

pub const PRINT: &str = "__php__print";
pub const ARRAY: &str = "__php__array";
pub const ARRAY_GET: &str = "__php__array_get";
pub const ARRAY_SET: &str = "__php__array_set";
pub const ARRAY_APPEND: &str = "__php__array_append";
pub const NAMESPACE: &str = "__php__namespace";
pub const USE: &str = "__php__use";
pub const TO_STRING: &str = "__php__to_string";

struct BuiltinSpec {
    name: &'static str,
    export_name: &'static str,
    parameters: &'static [(&'static str, fn() -> Type)],
    return_type: fn() -> Type,
}

const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: PRINT,
        export_name: PRINT,
        parameters: &[("$value", Type::any)],
        return_type: Type::void,
    },
    BuiltinSpec {
        name: ARRAY,
        export_name: ARRAY,
        parameters: &[("$pairs", Type::any)],
        return_type: Type::array,
    },
    BuiltinSpec {
        name: ARRAY_GET,
        export_name: ARRAY_GET,
        parameters: &[("$array", Type::any), ("$key", Type::any)],
        return_type: Type::any,
    },
    BuiltinSpec {
        name: ARRAY_SET,
        export_name: ARRAY_SET,
        parameters: &[("$array", Type::any), ("$key", Type::any), ("$value", Type::any)],
        return_type: Type::array,
    },
    BuiltinSpec {
        name: ARRAY_APPEND,
        export_name: ARRAY_APPEND,
        parameters: &[("$array", Type::any), ("$value", Type::any)],
        return_type: Type::array,
    },
    BuiltinSpec {
        name: NAMESPACE,
        export_name: NAMESPACE,
        parameters: &[("$namespace", Type::string), ("$name", Type::string), ("$factory", Type::function)],
        return_type: Type::void,
    },
    BuiltinSpec {
        name: USE,
        export_name: USE,
        parameters: &[("$name", Type::string), ("$namespace", Type::string)],
        return_type: Type::any,
    },
    BuiltinSpec {
        name: TO_STRING,
        export_name: TO_STRING,
        parameters: &[("$value", Type::any)],
        return_type: Type::string,
    },
    BuiltinSpec {
        name: "var_dump",
        export_name: "var_dump",
        parameters: &[("$value", Type::any)],
        return_type: Type::void,
    },
    BuiltinSpec {
        name: "count",
        export_name: "count",
        parameters: &[("$value", Type::any)],
        return_type: Type::int,
    },
    BuiltinSpec {
        name: "strlen",
        export_name: "strlen",
        parameters: &[("$string", Type::string)],
        return_type: Type::int,
    },
    BuiltinSpec {
        name: "str_repeat",
        export_name: "str_repeat",
        parameters: &[("$string", Type::string), ("$times", Type::int)],
        return_type: Type::string,
    },
    BuiltinSpec {
        name: "implode",
        export_name: "implode",
        parameters: &[("$separator", Type::string), ("$array", Type::any)],
        return_type: Type::string,
    },
];

lazy_static! {
    static ref SYMBOLS: Vec<SymbolRef> = BUILTINS
        .iter()
        .map(|spec| {
            Arc::new(VariableSymbol {
                name: spec.name.to_string(),
                read_only: true,
                ty: Type::function(),
                kind: SymbolKind::Builtin {
                    parameters: spec
                        .parameters
                        .iter()
                        .map(|(name, ty)| ParameterSymbol {
                            name: name.to_string(),
                            ty: ty(),
                        })
                        .collect(),
                    return_type: (spec.return_type)(),
                    export_name: spec.export_name,
                    module: RUNTIME_MODULE,
                },
            })
        })
        .collect();
}

/// Every built-in symbol. Shared by all compilations.
pub fn symbols() -> &'static [SymbolRef] {
    &SYMBOLS
}

pub fn lookup(name: &str) -> Option<SymbolRef> {
    SYMBOLS.iter().find(|symbol| symbol.name == name).cloned()
}

/// The export name of a built-in symbol.
pub fn export_name(symbol: &VariableSymbol) -> Option<&'static str> {
    match symbol.kind {
        SymbolKind::Builtin { export_name, .. } => Some(export_name),
        _ => None,
    }
}
