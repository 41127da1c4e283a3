use std::collections::HashMap;

use crate::ast::nodes::{Expr, ExprId};

/// Resolved type of an expression, as computed by the external driver.
///
/// Equality is type identity: the rule compares receiver and identifier
/// types with `==` and nothing looser. In particular `Pointer(Named)` and
/// `Named` are distinct types, which is what keeps a transaction handle
/// `*Tx` from ever matching a receiver `*Store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    // -- Primitives --
    Int,
    Float,
    String,
    Bool,
    Nil,

    // -- Composites --
    Pointer(Box<Type>),
    Function {
        params: Vec<Type>,
        return_type: Box<Type>,
    },

    // -- User-defined --
    Named(std::string::String),
}

impl Type {
    /// Human-readable name for diagnostic notes.
    pub fn display_name(&self) -> std::string::String {
        match self {
            Type::Int => "Int".into(),
            Type::Float => "Float".into(),
            Type::String => "String".into(),
            Type::Bool => "Bool".into(),
            Type::Nil => "Nil".into(),
            Type::Pointer(inner) => format!("*{}", inner.display_name()),
            Type::Function {
                params,
                return_type,
            } => {
                let p: Vec<_> = params.iter().map(|t| t.display_name()).collect();
                format!("fn({}) -> {}", p.join(", "), return_type.display_name())
            }
            Type::Named(n) => n.clone(),
        }
    }
}

/// The type-resolution oracle: expression identity to resolved type.
///
/// Populated by the external driver before the analysis runs; read-only
/// here. Absence of an entry means the driver resolved nothing for that
/// node, and an unresolved node never matches anything.
#[derive(Debug, Default)]
pub struct TypeTable {
    types: HashMap<ExprId, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: ExprId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn type_of(&self, expr: &Expr) -> Option<&Type> {
        self.types.get(&expr.id)
    }
}
