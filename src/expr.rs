use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Identity of a variable-referencing AST node, used as the key of the
/// interpreter's binding-distance table.
///
/// Ids are drawn from a process-wide counter rather than a per-parse one:
/// in the REPL each line is parsed by a fresh `Parser`, but closures keep
/// earlier ASTs (and their distance entries) alive, so ids must never
/// repeat within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

impl ExprId {
    pub fn next() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Literal payload carried straight from the token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    True,
    False,
    Nil,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(LiteralValue),

    Grouping(Box<Expr>),

    Unary {
        operator: Token,
        right: Box<Expr>,
    },

    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short-circuit `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    Variable {
        id: ExprId,
        name: Token,
    },

    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// ML-style local binding: `let NAME = init in body`.  The initializer
    /// is evaluated strictly, in the enclosing environment.
    Let {
        name: Token,
        initializer: Box<Expr>,
        body: Box<Expr>,
    },
}
