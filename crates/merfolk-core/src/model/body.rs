//! Statements of a synthesized method body.

use serde::Serialize;

/// Whether a binding introduces a new local or assigns an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BindingKind {
    Declaration,
    Assignment,
}

/// A local variable receiving a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub name: String,
    pub type_name: String,
    pub kind: BindingKind,
}

impl Binding {
    /// A binding that declares a new local.
    pub fn declare(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: BindingKind::Declaration,
        }
    }

    /// A binding that assigns to an already declared local.
    pub fn assign(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: BindingKind::Assignment,
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.kind == BindingKind::Declaration
    }
}

/// Initial value of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Initializer {
    /// Literal text emitted as-is, e.g. `0` or `""`.
    Literal(String),
    /// Construction of the declared type with the given arguments.
    Construct(Vec<String>),
}

/// A method call, optionally binding its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    /// Expression the call is made on; `None` calls a method of the current object.
    pub receiver: Option<String>,
    pub method: String,
    pub arguments: Vec<String>,
    pub binding: Option<Binding>,
}

/// A two-way branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Conditional {
    pub condition: String,
    pub then_branch: Vec<Body>,
    pub else_branch: Vec<Body>,
}

impl Conditional {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            ..Self::default()
        }
    }

    /// The then- or else-branch.
    pub fn branch_mut(&mut self, else_branch: bool) -> &mut Vec<Body> {
        if else_branch {
            &mut self.else_branch
        } else {
            &mut self.then_branch
        }
    }

    pub fn is_empty(&self) -> bool {
        self.then_branch.is_empty() && self.else_branch.is_empty()
    }
}

/// One statement of a method body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Body {
    ObjectCreation {
        binding: Binding,
        arguments: Vec<String>,
    },
    FunctionCall(FunctionCall),
    Declaration {
        binding: Binding,
        initializer: Option<Initializer>,
    },
    Conditional(Conditional),
}

impl Body {
    /// Convenience constructor for [`Body::Declaration`].
    pub fn declaration(binding: Binding, initializer: Option<Initializer>) -> Self {
        Body::Declaration {
            binding,
            initializer,
        }
    }

    /// The binding made directly by this statement; conditionals have none.
    pub fn binding(&self) -> Option<&Binding> {
        match self {
            Body::ObjectCreation { binding, .. } | Body::Declaration { binding, .. } => {
                Some(binding)
            }
            Body::FunctionCall(call) => call.binding.as_ref(),
            Body::Conditional(_) => None,
        }
    }

    /// Mutable access to the binding made directly by this statement.
    pub fn binding_mut(&mut self) -> Option<&mut Binding> {
        match self {
            Body::ObjectCreation { binding, .. } | Body::Declaration { binding, .. } => {
                Some(binding)
            }
            Body::FunctionCall(call) => call.binding.as_mut(),
            Body::Conditional(_) => None,
        }
    }

    /// Push this statement's bindings, descending into branches.
    pub(crate) fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a Binding>) {
        match self {
            Body::Conditional(conditional) => {
                for statement in conditional
                    .then_branch
                    .iter()
                    .chain(conditional.else_branch.iter())
                {
                    statement.collect_bindings(out);
                }
            }
            other => out.extend(other.binding()),
        }
    }

    /// Visit every binding in document order, descending into branches.
    pub fn visit_bindings_mut(&mut self, visit: &mut impl FnMut(&mut Binding)) {
        match self {
            Body::Conditional(conditional) => {
                for statement in conditional
                    .then_branch
                    .iter_mut()
                    .chain(conditional.else_branch.iter_mut())
                {
                    statement.visit_bindings_mut(visit);
                }
            }
            other => {
                if let Some(binding) = other.binding_mut() {
                    visit(binding);
                }
            }
        }
    }
}

/// One step of a path from a method body to a (possibly nested) statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// Index into the method body; always the first step.
    Body(usize),
    /// Index into the then-branch of the conditional reached so far.
    Then(usize),
    /// Index into the else-branch of the conditional reached so far.
    Else(usize),
}

/// Resolve `path` against `body`.
///
/// Returns `None` when an index is out of range or a branch step does not
/// land on a conditional.
pub fn statement_mut<'a>(body: &'a mut [Body], path: &[PathStep]) -> Option<&'a mut Body> {
    let (first, rest) = path.split_first()?;
    let PathStep::Body(index) = *first else {
        return None;
    };
    let mut current = body.get_mut(index)?;
    for step in rest {
        current = match (current, *step) {
            (Body::Conditional(conditional), PathStep::Then(i)) => {
                conditional.then_branch.get_mut(i)?
            }
            (Body::Conditional(conditional), PathStep::Else(i)) => {
                conditional.else_branch.get_mut(i)?
            }
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, binding: Option<Binding>) -> Body {
        Body::FunctionCall(FunctionCall {
            receiver: Some("svc".to_string()),
            method: name.to_string(),
            arguments: Vec::new(),
            binding,
        })
    }

    #[test]
    fn test_binding_accessors() {
        let creation = Body::ObjectCreation {
            binding: Binding::declare("order", "Order"),
            arguments: vec!["id".to_string()],
        };
        assert_eq!(creation.binding().map(|b| b.name.as_str()), Some("order"));
        assert!(call("ping", None).binding().is_none());
        assert!(Body::Conditional(Conditional::new("x")).binding().is_none());
    }

    #[test]
    fn test_statement_mut_nested() {
        let mut inner = Conditional::new("inner");
        inner.else_branch.push(call("deep", None));
        let mut outer = Conditional::new("outer");
        outer.then_branch.push(Body::Conditional(inner));
        let mut body = vec![call("first", None), Body::Conditional(outer)];

        let path = [PathStep::Body(1), PathStep::Then(0), PathStep::Else(0)];
        let found = statement_mut(&mut body, &path);
        assert!(matches!(found, Some(Body::FunctionCall(c)) if c.method == "deep"));
    }

    #[test]
    fn test_statement_mut_invalid_paths() {
        let mut body = vec![call("first", None)];
        assert!(statement_mut(&mut body, &[]).is_none());
        assert!(statement_mut(&mut body, &[PathStep::Body(3)]).is_none());
        assert!(statement_mut(&mut body, &[PathStep::Then(0)]).is_none());
        assert!(statement_mut(&mut body, &[PathStep::Body(0), PathStep::Then(0)]).is_none());
    }

    #[test]
    fn test_visit_bindings_mut_order() {
        let mut conditional = Conditional::new("c");
        conditional
            .then_branch
            .push(call("a", Some(Binding::declare("a", "int"))));
        conditional
            .else_branch
            .push(call("b", Some(Binding::declare("b", "int"))));
        let mut statement = Body::Conditional(conditional);

        let mut seen = Vec::new();
        statement.visit_bindings_mut(&mut |binding| seen.push(binding.name.clone()));
        assert_eq!(seen, ["a", "b"]);
    }
}
