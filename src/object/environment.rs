use std::collections::HashSet;

use indexmap::IndexMap;

use crate::object::builtins;
use crate::object::{EvalError, Object};

/// Ceiling on guest-program call nesting. The evaluator recurses on the host
/// stack, so runaway recursion in a script must fail before the process does.
const MAX_CALL_DEPTH: usize = 512;

/// Handle to a scope in the arena. Handles are only meaningful within the
/// `Environment` that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    bindings: IndexMap<String, Object>,
    constants: HashSet<String>,
    parent: Option<ScopeId>,
    /// Marks a function-call scope; `return` is legal wherever a walk to the
    /// root passes through one of these.
    call_boundary: bool,
}

impl Scope {
    fn new(parent: Option<ScopeId>, call_boundary: bool) -> Self {
        Scope {
            bindings: IndexMap::new(),
            constants: HashSet::new(),
            parent,
            call_boundary,
        }
    }
}

/// One interpreter session: an arena of lexical scopes plus the call-depth
/// counter. Scopes are never removed; closures keep handles into the arena
/// and the whole thing drops at the end of the run.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    call_depth: usize,
}

impl Environment {
    /// Creates the session with a root scope holding the language constants
    /// and the native-function table, all marked constant.
    pub fn new() -> Self {
        let mut env = Environment {
            scopes: vec![Scope::new(None, false)],
            call_depth: 0,
        };

        let root = &mut env.scopes[0];
        let language_constants = [
            ("true", Object::Boolean(true)),
            ("false", Object::Boolean(false)),
            ("null", Object::Null),
        ];
        for (name, value) in &language_constants {
            root.bindings.insert((*name).to_string(), value.clone());
            root.constants.insert((*name).to_string());
        }
        for def in builtins::BUILTINS {
            root.bindings.insert(def.name.to_string(), Object::Builtin(def));
            root.constants.insert(def.name.to_string());
        }

        env
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope::new(Some(parent), false));
        ScopeId(self.scopes.len() - 1)
    }

    pub fn push_call_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope::new(Some(parent), true));
        ScopeId(self.scopes.len() - 1)
    }

    /// Declares `name` in exactly the given scope. A name may be declared at
    /// most once per scope, shadowing outer scopes is fine.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Object,
        constant: bool,
    ) -> Result<(), EvalError> {
        let scope = &mut self.scopes[scope.0];
        if scope.bindings.contains_key(name) {
            return Err(EvalError::Redeclaration(name.to_string()));
        }
        scope.bindings.insert(name.to_string(), value);
        if constant {
            scope.constants.insert(name.to_string());
        }
        Ok(())
    }

    /// Overwrites the binding in the first scope outward that declares
    /// `name`. Unlike `declare`, assignment reaches through enclosing scopes.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Object) -> Result<(), EvalError> {
        let target = self
            .resolve(scope, name)
            .ok_or_else(|| EvalError::UndeclaredName(name.to_string()))?;
        let target = &mut self.scopes[target.0];
        if target.constants.contains(name) {
            return Err(EvalError::ConstReassign(name.to_string()));
        }
        target.bindings.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Result<Object, EvalError> {
        let target = self
            .resolve(scope, name)
            .ok_or_else(|| EvalError::UndeclaredName(name.to_string()))?;
        Ok(self.scopes[target.0].bindings[name].clone())
    }

    fn resolve(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            if self.scopes[id.0].bindings.contains_key(name) {
                return Some(id);
            }
            cur = self.scopes[id.0].parent;
        }
        None
    }

    pub fn in_function(&self, scope: ScopeId) -> bool {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            if self.scopes[id.0].call_boundary {
                return true;
            }
            cur = self.scopes[id.0].parent;
        }
        false
    }

    pub fn enter_call(&mut self) -> Result<(), EvalError> {
        if self.call_depth == MAX_CALL_DEPTH {
            return Err(EvalError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth -= 1;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
