//! Closed AST for the restricted expression grammar. Produced by
//! `parser::parse`, consumed by `eval::Evaluator`. There is no path from
//! source text to execution that does not go through this type — the
//! grammar is exactly what `UnOp`/`BinOp`/`Expr` can represent.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
    Var(String),
    Field(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// A call to one of the fixed helper names. The parser accepts any
    /// identifier here; `eval::Evaluator` rejects anything not on the
    /// allow-list at evaluation time.
    Call(String, Vec<Expr>),
}
