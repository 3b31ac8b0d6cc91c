use rand::Rng;

use super::{assert_argument_count, Environment, EvalError, EvalResult, Object, ScopeId};

/// Native functions receive their already-evaluated arguments plus the
/// calling scope, and may fail with an ordinary evaluation error.
pub type BuiltinFn = fn(Vec<Object>, &mut Environment, ScopeId) -> EvalResult;

#[derive(Debug, PartialEq)]
pub struct BuiltinDef {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// Registration table for the root scope. The order here is the order the
/// bindings land in, kept stable for deterministic sessions.
pub const BUILTINS: &[BuiltinDef] = &[
    BuiltinDef {
        name: "print",
        func: print,
    },
    BuiltinDef {
        name: "length",
        func: length,
    },
    BuiltinDef {
        name: "random",
        func: random,
    },
];

// Renders every argument and writes them as one line, with no separator.
fn print(args: Vec<Object>, _env: &mut Environment, _scope: ScopeId) -> EvalResult {
    let rendered: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    println!("{}", rendered.concat());

    Ok(Object::Null)
}

fn length(args: Vec<Object>, _env: &mut Environment, _scope: ScopeId) -> EvalResult {
    assert_argument_count(1, &args)?;

    match &args[0] {
        Object::Array(elements) => Ok(Object::Number(elements.borrow().len() as i64)),
        _ => Err(EvalError::UnsupportedArguments {
            builtin: "length",
            expected: "an array",
        }),
    }
}

// Uniformly chosen integer in the inclusive range [min, max].
fn random(args: Vec<Object>, _env: &mut Environment, _scope: ScopeId) -> EvalResult {
    assert_argument_count(2, &args)?;

    match (&args[0], &args[1]) {
        (Object::Number(min), Object::Number(max)) if min <= max => {
            Ok(Object::Number(rand::thread_rng().gen_range(*min..=*max)))
        }
        _ => Err(EvalError::UnsupportedArguments {
            builtin: "random",
            expected: "two numbers with min <= max",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{length, random};
    use crate::object::{Environment, EvalError, Object};

    #[test]
    fn length_of_array() {
        let mut env = Environment::new();
        let root = env.root();
        let array = Object::array(vec![Object::Number(1), Object::Number(2), Object::Number(3)]);

        assert_eq!(Ok(Object::Number(3)), length(vec![array], &mut env, root));
    }

    #[test]
    fn length_rejects_non_arrays() {
        let mut env = Environment::new();
        let root = env.root();

        assert_eq!(
            Err(EvalError::UnsupportedArguments {
                builtin: "length",
                expected: "an array",
            }),
            length(vec![Object::Number(3)], &mut env, root)
        );
    }

    #[test]
    fn length_requires_one_argument() {
        let mut env = Environment::new();
        let root = env.root();

        assert_eq!(
            Err(EvalError::WrongArgumentCount {
                expected: 1,
                got: 0,
            }),
            length(vec![], &mut env, root)
        );
    }

    #[test]
    fn random_stays_in_inclusive_range() {
        let mut env = Environment::new();
        let root = env.root();

        for _ in 0..100 {
            let result = random(
                vec![Object::Number(-2), Object::Number(3)],
                &mut env,
                root,
            )
            .unwrap();
            match result {
                Object::Number(value) => assert!((-2..=3).contains(&value)),
                other => panic!("expected a number, got {:?}", other),
            }
        }
    }

    #[test]
    fn random_with_equal_bounds() {
        let mut env = Environment::new();
        let root = env.root();

        assert_eq!(
            Ok(Object::Number(7)),
            random(vec![Object::Number(7), Object::Number(7)], &mut env, root)
        );
    }

    #[test]
    fn random_rejects_inverted_range() {
        let mut env = Environment::new();
        let root = env.root();

        assert_eq!(
            Err(EvalError::UnsupportedArguments {
                builtin: "random",
                expected: "two numbers with min <= max",
            }),
            random(vec![Object::Number(3), Object::Number(-2)], &mut env, root)
        );
    }
}
