use std::sync::Arc;

use crate::types::SourceSpan;
use crate::value::MsValue;

/// Root of a parsed script. Immutable once built; engines share it via `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub body: Block,
}

/// Statements are reference counted so runtime frames can hold a block
/// without borrowing the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Arc<[Statement]>,
    pub span: SourceSpan,
}

impl Block {
    pub fn new(statements: Vec<Statement>, span: SourceSpan) -> Self {
        Self {
            statements: statements.into(),
            span,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Call(CallExpr),
    Assign {
        name: String,
        value: Expr,
        span: SourceSpan,
    },
    Set {
        name: String,
        value: Expr,
        span: SourceSpan,
    },
    If {
        branches: Vec<ConditionalBranch>,
        otherwise: Option<Block>,
        span: SourceSpan,
    },
    While {
        guard: Expr,
        body: Block,
        span: SourceSpan,
    },
    Block(Block),
    Return {
        span: SourceSpan,
    },
    Comment {
        text: String,
        span: SourceSpan,
    },
}

impl Statement {
    pub fn span(&self) -> SourceSpan {
        match self {
            Self::Call(call) => call.span,
            Self::Assign { span, .. }
            | Self::Set { span, .. }
            | Self::If { span, .. }
            | Self::While { span, .. }
            | Self::Return { span }
            | Self::Comment { span, .. } => *span,
            Self::Block(block) => block.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    pub guard: Expr,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Argument>,
    pub span: SourceSpan,
}

/// `name` is set for keyword-style arguments (`target: "Data"`).
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: MsValue,
        span: SourceSpan,
    },
    Variable {
        name: String,
        span: SourceSpan,
    },
    Call(CallExpr),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: SourceSpan,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: SourceSpan,
    },
}

impl Expr {
    pub fn span(&self) -> SourceSpan {
        match self {
            Self::Call(call) => call.span,
            Self::Literal { span, .. }
            | Self::Variable { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Binding power; higher binds tighter. Every level is left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq
            | Self::NotEq
            | Self::Less
            | Self::LessEq
            | Self::Greater
            | Self::GreaterEq => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Rem => 6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn precedence(self) -> u8 {
        match self {
            Self::Not => 3,
            Self::Negate => 7,
        }
    }
}
