use std::rc::Rc;

use crate::ast::{
    BinaryOperator, BlockStatement, ComparisonOperator, Expression, Program, Statement,
    UnaryOperator,
};
use crate::object::{Environment, EvalError, EvalResult, Object, ScopeId};

/// Result of evaluating one statement: either an ordinary value, or an early
/// `return` unwinding to the nearest enclosing call. Keeping this separate
/// from the error channel means `return` can never be swallowed by error
/// handling.
#[derive(Debug, PartialEq)]
pub enum ControlFlow {
    Value(Object),
    Return(Object),
}

type FlowResult = std::result::Result<ControlFlow, EvalError>;

/// Evaluates a program in the given scope. The result is the value of the
/// last statement, or Null for an empty program.
pub fn eval(program: &Program, env: &mut Environment, scope: ScopeId) -> EvalResult {
    match eval_statements(&program.statements, env, scope)? {
        // `return` is validated against the scope chain where it appears, so
        // an early return can only surface here when the caller passed a
        // scope that is already inside a function.
        ControlFlow::Value(value) | ControlFlow::Return(value) => Ok(value),
    }
}

fn eval_statements(statements: &[Statement], env: &mut Environment, scope: ScopeId) -> FlowResult {
    let mut result = Object::Null;

    for statement in statements {
        match eval_statement(statement, env, scope)? {
            ControlFlow::Value(value) => result = value,
            ControlFlow::Return(value) => return Ok(ControlFlow::Return(value)),
        }
    }

    Ok(ControlFlow::Value(result))
}

fn eval_statement(statement: &Statement, env: &mut Environment, scope: ScopeId) -> FlowResult {
    match statement {
        Statement::Expression(expression) => Ok(ControlFlow::Value(eval_expression(
            expression, env, scope,
        )?)),
        Statement::VarDeclaration {
            name,
            value,
            constant,
        } => {
            let value = eval_expression(value, env, scope)?;
            env.declare(scope, name, value, *constant)?;
            Ok(ControlFlow::Value(Object::Null))
        }
        Statement::FunctionDeclaration {
            name,
            parameters,
            body,
        } => {
            // The function captures the scope it is declared in, by handle.
            let function = Object::Function {
                parameters: parameters.clone(),
                body: Rc::new(body.clone()),
                scope,
            };
            env.declare(scope, name, function, true)?;
            Ok(ControlFlow::Value(Object::Null))
        }
        Statement::Block(block) => eval_block(block, env, scope),
        Statement::If {
            condition,
            consequence,
            elif_branches,
            alternative,
        } => eval_if(condition, consequence, elif_branches, alternative, env, scope),
        Statement::While { condition, body } => eval_while(condition, body, env, scope),
        Statement::Return(value) => {
            if !env.in_function(scope) {
                return Err(EvalError::ReturnOutsideFunction);
            }
            let value = match value {
                Some(expression) => eval_expression(expression, env, scope)?,
                None => Object::Null,
            };
            Ok(ControlFlow::Return(value))
        }
    }
}

// A block body always runs in a fresh child scope.
fn eval_block(block: &BlockStatement, env: &mut Environment, scope: ScopeId) -> FlowResult {
    let block_scope = env.push_scope(scope);
    eval_statements(&block.statements, env, block_scope)
}

fn eval_if(
    condition: &Expression,
    consequence: &BlockStatement,
    elif_branches: &[(Expression, BlockStatement)],
    alternative: &Option<BlockStatement>,
    env: &mut Environment,
    scope: ScopeId,
) -> FlowResult {
    if expect_condition(eval_expression(condition, env, scope)?)? {
        return eval_block(consequence, env, scope);
    }

    for (elif_condition, elif_block) in elif_branches {
        if expect_condition(eval_expression(elif_condition, env, scope)?)? {
            return eval_block(elif_block, env, scope);
        }
    }

    match alternative {
        Some(block) => eval_block(block, env, scope),
        None => Ok(ControlFlow::Value(Object::Null)),
    }
}

// The first evaluation of the condition picks the loop mode: a boolean is
// re-checked before every iteration, a number fixes the iteration count at
// entry and is not re-read even if the body changes what it was computed
// from.
fn eval_while(
    condition: &Expression,
    body: &BlockStatement,
    env: &mut Environment,
    scope: ScopeId,
) -> FlowResult {
    let mut result = ControlFlow::Value(Object::Null);

    match eval_expression(condition, env, scope)? {
        Object::Boolean(_) => loop {
            match eval_expression(condition, env, scope)? {
                Object::Boolean(true) => {}
                Object::Boolean(false) => return Ok(result),
                other => return Err(EvalError::InvalidLoopCondition(other.type_name())),
            }
            result = eval_block(body, env, scope)?;
            if let ControlFlow::Return(_) = result {
                return Ok(result);
            }
        },
        Object::Number(count) => {
            if count < 0 {
                return Err(EvalError::NegativeLoopCount(count));
            }
            for _ in 0..count {
                result = eval_block(body, env, scope)?;
                if let ControlFlow::Return(_) = result {
                    return Ok(result);
                }
            }
            Ok(result)
        }
        other => Err(EvalError::InvalidLoopCondition(other.type_name())),
    }
}

fn expect_condition(value: Object) -> Result<bool, EvalError> {
    match value {
        Object::Boolean(b) => Ok(b),
        other => Err(EvalError::NonBooleanCondition(other.type_name())),
    }
}

fn eval_expression(expression: &Expression, env: &mut Environment, scope: ScopeId) -> EvalResult {
    match expression {
        Expression::NumberLiteral(value) => Ok(Object::Number(*value)),
        Expression::StringLiteral(value) => Ok(Object::Str(value.clone())),
        Expression::Identifier(name) => env.get(scope, name),
        Expression::ArrayLiteral(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(eval_expression(element, env, scope)?);
            }
            Ok(Object::array(values))
        }
        Expression::Unary(operator, operand) => eval_unary(*operator, operand, env, scope),
        Expression::Binary(left, operator, right) => {
            eval_binary(left, *operator, right, env, scope)
        }
        Expression::Comparison(left, operator, right) => {
            eval_comparison(left, *operator, right, env, scope)
        }
        Expression::Assignment(assignee, value) => eval_assignment(assignee, value, env, scope),
        Expression::Call(callee, arguments) => eval_call(callee, arguments, env, scope),
        Expression::Index(array, index) => eval_index(array, index, env, scope),
    }
}

fn eval_unary(
    operator: UnaryOperator,
    operand: &Expression,
    env: &mut Environment,
    scope: ScopeId,
) -> EvalResult {
    let value = eval_expression(operand, env, scope)?;

    match (operator, value) {
        (UnaryOperator::Minus, Object::Number(value)) => Ok(Object::Number(value.wrapping_neg())),
        (UnaryOperator::Bang, Object::Boolean(value)) => Ok(Object::Boolean(!value)),
        (UnaryOperator::Minus, other) => Err(EvalError::UnaryTypeMismatch {
            operator,
            expected: "number",
            got: other.type_name(),
        }),
        (UnaryOperator::Bang, other) => Err(EvalError::UnaryTypeMismatch {
            operator,
            expected: "boolean",
            got: other.type_name(),
        }),
    }
}

fn eval_binary(
    left: &Expression,
    operator: BinaryOperator,
    right: &Expression,
    env: &mut Environment,
    scope: ScopeId,
) -> EvalResult {
    let left = eval_expression(left, env, scope)?;
    let right = eval_expression(right, env, scope)?;

    let (l, r) = match (&left, &right) {
        (Object::Number(l), Object::Number(r)) => (*l, *r),
        _ => {
            return Err(EvalError::BinaryTypeMismatch {
                operator,
                left: left.type_name(),
                right: right.type_name(),
            })
        }
    };

    let value = match operator {
        BinaryOperator::Plus => l.wrapping_add(r),
        BinaryOperator::Minus => l.wrapping_sub(r),
        BinaryOperator::Asterisk => l.wrapping_mul(r),
        BinaryOperator::Slash => floor_div(l, r)?,
        BinaryOperator::Percent => floor_rem(l, r)?,
    };

    Ok(Object::Number(value))
}

// Floor semantics: the quotient rounds toward negative infinity and the
// remainder takes the sign of the divisor.
fn floor_div(left: i64, right: i64) -> Result<i64, EvalError> {
    if right == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let quotient = left.wrapping_div(right);
    if left.wrapping_rem(right) != 0 && (left < 0) != (right < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn floor_rem(left: i64, right: i64) -> Result<i64, EvalError> {
    if right == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let remainder = left.wrapping_rem(right);
    if remainder != 0 && (remainder < 0) != (right < 0) {
        Ok(remainder + right)
    } else {
        Ok(remainder)
    }
}

fn eval_comparison(
    left: &Expression,
    operator: ComparisonOperator,
    right: &Expression,
    env: &mut Environment,
    scope: ScopeId,
) -> EvalResult {
    let left = eval_expression(left, env, scope)?;
    let right = eval_expression(right, env, scope)?;

    // Null only ever compares equal to null; ordering it is an error.
    if matches!(left, Object::Null) || matches!(right, Object::Null) {
        let both_null = matches!(left, Object::Null) && matches!(right, Object::Null);
        return match operator {
            ComparisonOperator::Eq => Ok(Object::Boolean(both_null)),
            ComparisonOperator::Ne => Ok(Object::Boolean(!both_null)),
            _ => Err(EvalError::UnsupportedComparison {
                operator,
                type_name: "null",
            }),
        };
    }

    match (&left, &right) {
        (Object::Number(l), Object::Number(r)) => Ok(Object::Boolean(compare(operator, l, r))),
        (Object::Str(l), Object::Str(r)) => Ok(Object::Boolean(compare(operator, l, r))),
        (Object::Boolean(l), Object::Boolean(r)) => Ok(Object::Boolean(compare(operator, l, r))),
        (l, r) if l.type_name() != r.type_name() => Err(EvalError::ComparisonTypeMismatch {
            left: l.type_name(),
            right: r.type_name(),
        }),
        (l, _) => Err(EvalError::UnsupportedComparison {
            operator,
            type_name: l.type_name(),
        }),
    }
}

fn compare<T: PartialOrd + ?Sized>(operator: ComparisonOperator, left: &T, right: &T) -> bool {
    match operator {
        ComparisonOperator::Eq => left == right,
        ComparisonOperator::Ne => left != right,
        ComparisonOperator::Gt => left > right,
        ComparisonOperator::Ge => left >= right,
        ComparisonOperator::Lt => left < right,
        ComparisonOperator::Le => left <= right,
    }
}

fn eval_assignment(
    assignee: &Expression,
    value: &Expression,
    env: &mut Environment,
    scope: ScopeId,
) -> EvalResult {
    match assignee {
        Expression::Identifier(name) => {
            let value = eval_expression(value, env, scope)?;
            env.assign(scope, name, value.clone())?;
            Ok(value)
        }
        Expression::Index(array, index) => {
            let array = eval_expression(array, env, scope)?;
            let index = eval_expression(index, env, scope)?;
            let value = eval_expression(value, env, scope)?;

            let elements = match &array {
                Object::Array(elements) => elements,
                other => return Err(EvalError::NotIndexable(other.type_name())),
            };
            let index = match index {
                Object::Number(index) => index,
                other => return Err(EvalError::NonNumberIndex(other.type_name())),
            };

            let mut elements = elements.borrow_mut();
            let length = elements.len();
            if index < 0 || index as usize >= length {
                return Err(EvalError::IndexOutOfBounds { index, length });
            }
            elements[index as usize] = value.clone();
            Ok(value)
        }
        _ => Err(EvalError::InvalidAssignmentTarget),
    }
}

fn eval_index(
    array: &Expression,
    index: &Expression,
    env: &mut Environment,
    scope: ScopeId,
) -> EvalResult {
    let array = eval_expression(array, env, scope)?;
    let index = eval_expression(index, env, scope)?;

    match (array, index) {
        (Object::Array(elements), Object::Number(index)) => {
            let elements = elements.borrow();
            if index < 0 || index as usize >= elements.len() {
                return Err(EvalError::IndexOutOfBounds {
                    index,
                    length: elements.len(),
                });
            }
            Ok(elements[index as usize].clone())
        }
        (Object::Array(_), other) => Err(EvalError::NonNumberIndex(other.type_name())),
        (other, _) => Err(EvalError::NotIndexable(other.type_name())),
    }
}

fn eval_call(
    callee: &Expression,
    arguments: &[Expression],
    env: &mut Environment,
    scope: ScopeId,
) -> EvalResult {
    let callee = eval_expression(callee, env, scope)?;

    match callee {
        Object::Builtin(def) => {
            let mut values = Vec::with_capacity(arguments.len());
            for argument in arguments {
                values.push(eval_expression(argument, env, scope)?);
            }
            (def.func)(values, env, scope)
        }
        Object::Function {
            parameters,
            body,
            scope: defining_scope,
        } => {
            if arguments.len() != parameters.len() {
                return Err(EvalError::WrongArgumentCount {
                    expected: parameters.len(),
                    got: arguments.len(),
                });
            }

            env.enter_call()?;
            // Locals live under the scope the function was declared in, not
            // the caller's.
            let call_scope = env.push_call_scope(defining_scope);
            let result = eval_function_body(&parameters, arguments, &body, env, scope, call_scope);
            env.exit_call();
            result
        }
        other => Err(EvalError::NotCallable(other.type_name())),
    }
}

fn eval_function_body(
    parameters: &[String],
    arguments: &[Expression],
    body: &BlockStatement,
    env: &mut Environment,
    caller_scope: ScopeId,
    call_scope: ScopeId,
) -> EvalResult {
    // The argument expressions still see the caller's scope; only the bound
    // parameters land in the call scope.
    for (parameter, argument) in parameters.iter().zip(arguments) {
        let value = eval_expression(argument, env, caller_scope)?;
        env.declare(call_scope, parameter, value, false)?;
    }

    // The body runs directly in the call scope rather than through
    // eval_block, so parameters and body locals share one scope.
    match eval_statements(&body.statements, env, call_scope)? {
        ControlFlow::Value(value) | ControlFlow::Return(value) => Ok(value),
    }
}
