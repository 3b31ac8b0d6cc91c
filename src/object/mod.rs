use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{BinaryOperator, BlockStatement, ComparisonOperator, UnaryOperator};
pub use crate::object::environment::{Environment, ScopeId};

pub mod builtins;
pub mod environment;

/// Runtime value. Arrays are shared and mutated in place, so a value that has
/// been stored in several bindings observes mutations through any of them.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Null,
    Number(i64),
    Boolean(bool),
    Str(String),
    Array(Rc<RefCell<Vec<Object>>>),
    Function {
        parameters: Vec<String>,
        body: Rc<BlockStatement>,
        /// The scope the function was declared in; free variables resolve
        /// through it, which is what makes the function a closure.
        scope: ScopeId,
    },
    Builtin(&'static builtins::BuiltinDef),
}

impl Object {
    pub fn array(elements: Vec<Object>) -> Object {
        Object::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Number(_) => "number",
            Object::Boolean(_) => "boolean",
            Object::Str(_) => "string",
            Object::Array(_) => "array",
            Object::Function { .. } => "function",
            Object::Builtin(_) => "native function",
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Null => write!(f, "null"),
            Object::Number(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::Str(value) => write!(f, "{}", value),
            Object::Array(elements) => {
                let rendered: Vec<String> =
                    elements.borrow().iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Object::Function { .. } => write!(f, "<function>"),
            Object::Builtin(def) => write!(f, "<native function {}>", def.name),
        }
    }
}

pub type EvalResult = std::result::Result<Object, EvalError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("cannot resolve '{0}', it does not exist")]
    UndeclaredName(String),
    #[error("cannot declare '{0}', it is already defined")]
    Redeclaration(String),
    #[error("cannot reassign constant '{0}'")]
    ConstReassign(String),
    #[error("'{operator}' expects numbers, got {left} and {right}")]
    BinaryTypeMismatch {
        operator: BinaryOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("unary '{operator}' expects a {expected}, got {got}")]
    UnaryTypeMismatch {
        operator: UnaryOperator,
        expected: &'static str,
        got: &'static str,
    },
    #[error("cannot compare {left} with {right}")]
    ComparisonTypeMismatch {
        left: &'static str,
        right: &'static str,
    },
    #[error("'{operator}' is not supported for {type_name} values")]
    UnsupportedComparison {
        operator: ComparisonOperator,
        type_name: &'static str,
    },
    #[error("condition must be a boolean, got {0}")]
    NonBooleanCondition(&'static str),
    #[error("while condition must be a boolean or a number, got {0}")]
    InvalidLoopCondition(&'static str),
    #[error("while loop count must not be negative, got {0}")]
    NegativeLoopCount(i64),
    #[error("expected {expected} arguments, got {got}")]
    WrongArgumentCount { expected: usize, got: usize },
    #[error("can only call functions, got {0}")]
    NotCallable(&'static str),
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("return statement outside of a function")]
    ReturnOutsideFunction,
    #[error("only arrays can be indexed, got {0}")]
    NotIndexable(&'static str),
    #[error("array index must be a number, got {0}")]
    NonNumberIndex(&'static str),
    #[error("index {index} out of bounds for array of length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("division by zero")]
    DivisionByZero,
    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
    #[error("'{builtin}' expects {expected}")]
    UnsupportedArguments {
        builtin: &'static str,
        expected: &'static str,
    },
}

pub(crate) fn assert_argument_count(expected: usize, args: &[Object]) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::WrongArgumentCount {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}
