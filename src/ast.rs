use std::fmt;

/// Root of a parsed source text. The evaluator never mutates it.
#[derive(Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    VarDeclaration {
        name: String,
        value: Expression,
        constant: bool,
    },
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
        body: BlockStatement,
    },
    If {
        condition: Expression,
        consequence: BlockStatement,
        elif_branches: Vec<(Expression, BlockStatement)>,
        alternative: Option<BlockStatement>,
    },
    While {
        condition: Expression,
        body: BlockStatement,
    },
    Block(BlockStatement),
    Return(Option<Expression>),
    Expression(Expression),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Identifier(String),
    NumberLiteral(i64),
    StringLiteral(String),
    ArrayLiteral(Vec<Expression>),
    Unary(UnaryOperator, Box<Expression>),
    Binary(Box<Expression>, BinaryOperator, Box<Expression>),
    Comparison(Box<Expression>, ComparisonOperator, Box<Expression>),
    /// Target and value. Whether the target is actually assignable is a
    /// runtime question, not a parse-time one.
    Assignment(Box<Expression>, Box<Expression>),
    Call(Box<Expression>, Vec<Expression>),
    Index(Box<Expression>, Box<Expression>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnaryOperator {
    Minus,
    Bang,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOperator::Plus => write!(f, "+"),
            BinaryOperator::Minus => write!(f, "-"),
            BinaryOperator::Asterisk => write!(f, "*"),
            BinaryOperator::Slash => write!(f, "/"),
            BinaryOperator::Percent => write!(f, "%"),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOperator::Minus => write!(f, "-"),
            UnaryOperator::Bang => write!(f, "!"),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComparisonOperator::Eq => write!(f, "=="),
            ComparisonOperator::Ne => write!(f, "!="),
            ComparisonOperator::Gt => write!(f, ">"),
            ComparisonOperator::Ge => write!(f, ">="),
            ComparisonOperator::Lt => write!(f, "<"),
            ComparisonOperator::Le => write!(f, "<="),
        }
    }
}
