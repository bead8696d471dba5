//! Best-effort syntax tree produced by the recovering parser.
//!
//! Nodes that could not be parsed are kept as [`Statement::Error`] or
//! [`Expr::Missing`] so the shape of the rest of the file survives.

use serde::Serialize;

// ──────────────────────────────────────────────
// Items
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyntaxTree {
    pub items: Vec<Item>,
}

impl SyntaxTree {
    pub fn functions(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|i| matches!(i, Item::Function { .. }))
    }

    pub fn components(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|i| matches!(i, Item::Component { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Directive {
        name: String,
        args: Vec<Expr>,
        line: u32,
    },
    Function {
        name: String,
        params: Vec<String>,
        body: Vec<Statement>,
        line: u32,
    },
    Component {
        name: String,
        params: Vec<String>,
        body: Vec<Statement>,
        line: u32,
    },
    Import {
        path: String,
        line: u32,
    },
    Export {
        item: Box<Item>,
        line: u32,
    },
    Statement(Statement),
}

impl Item {
    pub fn name(&self) -> Option<&str> {
        match self {
            Item::Directive { name, .. }
            | Item::Function { name, .. }
            | Item::Component { name, .. } => Some(name),
            Item::Export { item, .. } => item.name(),
            Item::Import { .. } | Item::Statement(_) => None,
        }
    }
}

// ──────────────────────────────────────────────
// Statements
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Let {
        name: String,
        value: Expr,
        line: u32,
    },
    State {
        name: String,
        value: Expr,
        line: u32,
    },
    When {
        condition: Expr,
        then: Box<Statement>,
        otherwise: Option<Box<Statement>>,
        line: u32,
    },
    Return {
        value: Option<Expr>,
        line: u32,
    },
    Render {
        value: Expr,
        line: u32,
    },
    Expr {
        value: Expr,
        line: u32,
    },
    Block {
        body: Vec<Statement>,
        line: u32,
    },
    /// Nested function or component declaration.
    Item(Box<Item>),
    /// Placeholder for a statement dropped by recovery.
    Error {
        line: u32,
    },
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Ident {
        name: String,
    },
    Str {
        value: String,
    },
    Number {
        value: String,
    },
    Bool {
        value: bool,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: String,
    },
    List {
        items: Vec<Expr>,
    },
    Group {
        inner: Box<Expr>,
    },
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    /// An expression was required but none could be parsed.
    Missing,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident { name: name.into() }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Expr::Missing)
    }
}
