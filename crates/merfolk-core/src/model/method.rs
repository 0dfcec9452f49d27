//! Methods and their parameters.

use serde::Serialize;

use crate::{
    model::{Binding, Body, Visibility},
    types,
};

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Empty when the type could not be determined.
    pub type_name: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A method signature together with its synthesized body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    /// Empty means void.
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Body>,
    /// Name of the local whose value the method returns.
    pub return_value: Option<String>,
}

impl Method {
    /// Create a void method with no parameters and an empty body.
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
            ..Self::default()
        }
    }

    /// Returns `true` when the method produces no value.
    pub fn is_void(&self) -> bool {
        types::is_void(&self.return_type)
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// All bindings in the body in document order, including conditional branches.
    pub fn bindings(&self) -> Vec<&Binding> {
        let mut out = Vec::new();
        for statement in &self.body {
            statement.collect_bindings(&mut out);
        }
        out
    }

    /// Distinct bound names, in order of first appearance.
    pub fn binding_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for binding in self.bindings() {
            if !names.contains(&binding.name.as_str()) {
                names.push(&binding.name);
            }
        }
        names
    }

    /// Returns `true` if `name` is a parameter or bound anywhere in the body.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.parameter(name).is_some() || self.bindings().iter().any(|b| b.name == name)
    }
}
