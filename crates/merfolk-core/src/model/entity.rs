//! Entities and their attributes.

use std::fmt;

use serde::Serialize;

use crate::model::Method;

/// Whether an entity is emitted as a class or as an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Class,
    Interface,
}

/// Access modifier of an attribute or method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Protected,
    Package,
}

impl Visibility {
    /// Map a diagram visibility marker to a modifier.
    ///
    /// `+` public, `-` private, `#` protected, `~` package. Anything else,
    /// including a missing marker, is private.
    pub fn from_marker(marker: Option<char>) -> Self {
        match marker {
            Some('+') => Visibility::Public,
            Some('#') => Visibility::Protected,
            Some('~') => Visibility::Package,
            _ => Visibility::Private,
        }
    }

    /// The Java keyword for this modifier; package visibility has none.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Private => Some("private"),
            Visibility::Protected => Some("protected"),
            Visibility::Package => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Package => write!(f, "package"),
        }
    }
}

/// A field of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub type_name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_constant: bool,
    pub is_initialized: bool,
    /// Literal or expression text used when `is_initialized` is set.
    pub value: Option<String>,
}

impl Attribute {
    /// Create an uninitialized instance attribute.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            visibility,
            ..Self::default()
        }
    }
}

/// A class or interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub superclass: Option<String>,
    /// Implemented (for classes) or extended (for interfaces) interface names.
    pub interfaces: Vec<String>,
    /// Raw `<<annotation>>` names, in the order they were declared.
    pub annotations: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
}

impl Entity {
    /// Create an empty entity.
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Returns `true` for interfaces.
    pub fn is_interface(&self) -> bool {
        self.kind == EntityKind::Interface
    }

    /// A class is abstract when annotated so or when any method is abstract.
    pub fn is_abstract(&self) -> bool {
        !self.is_interface()
            && (self.annotations.iter().any(|a| a == "abstract")
                || self.methods.iter().any(|m| m.is_abstract))
    }

    /// Add `interface` to the interface list unless it is already present.
    pub fn add_interface(&mut self, interface: &str) {
        if !self.interfaces.iter().any(|i| i == interface) {
            self.interfaces.push(interface.to_string());
        }
    }

    /// Add an attribute unless one with the same name exists.
    ///
    /// Returns `true` if the attribute was added.
    pub fn add_attribute(&mut self, attribute: Attribute) -> bool {
        if self.attribute(&attribute.name).is_some() {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// First attribute whose type is `type_name`.
    pub fn attribute_of_type(&self, type_name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.type_name == type_name)
    }

    /// Index of the method named `name`, preferring one with `arity` parameters.
    pub fn method_index(&self, name: &str, arity: usize) -> Option<usize> {
        let mut by_name = self
            .methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name == name)
            .peekable();
        let first = by_name.peek().map(|(i, _)| *i);
        by_name
            .find(|(_, m)| m.parameters.len() == arity)
            .map(|(i, _)| i)
            .or(first)
    }

    /// Method named `name`, preferring one with `arity` parameters.
    pub fn find_method(&self, name: &str, arity: usize) -> Option<&Method> {
        self.method_index(name, arity).map(|i| &self.methods[i])
    }

    /// Append a method and return its index.
    pub fn add_method(&mut self, method: Method) -> usize {
        self.methods.push(method);
        self.methods.len() - 1
    }

    /// A method named like its entity is a constructor.
    pub fn is_constructor(&self, method: &Method) -> bool {
        method.name == self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_from_marker() {
        assert_eq!(Visibility::from_marker(Some('+')), Visibility::Public);
        assert_eq!(Visibility::from_marker(Some('-')), Visibility::Private);
        assert_eq!(Visibility::from_marker(Some('#')), Visibility::Protected);
        assert_eq!(Visibility::from_marker(Some('~')), Visibility::Package);
        assert_eq!(Visibility::from_marker(Some('?')), Visibility::Private);
        assert_eq!(Visibility::from_marker(None), Visibility::Private);
    }

    #[test]
    fn test_add_attribute_rejects_duplicate_name() {
        let mut entity = Entity::new("Duck", EntityKind::Class);
        assert!(entity.add_attribute(Attribute::new("age", "int", Visibility::Public)));
        assert!(!entity.add_attribute(Attribute::new("age", "long", Visibility::Private)));
        assert_eq!(entity.attributes.len(), 1);
        assert_eq!(entity.attributes[0].type_name, "int");
    }

    #[test]
    fn test_method_index_prefers_arity() {
        let mut entity = Entity::new("Calc", EntityKind::Class);
        entity.add_method(Method::new("add", Visibility::Public));
        let mut two = Method::new("add", Visibility::Public);
        two.parameters.push(crate::model::Parameter::new("a", "int"));
        two.parameters.push(crate::model::Parameter::new("b", "int"));
        entity.add_method(two);

        assert_eq!(entity.method_index("add", 2), Some(1));
        assert_eq!(entity.method_index("add", 0), Some(0));
        assert_eq!(entity.method_index("add", 5), Some(0));
        assert_eq!(entity.method_index("sub", 0), None);
    }

    #[test]
    fn test_is_abstract() {
        let mut entity = Entity::new("Shape", EntityKind::Class);
        assert!(!entity.is_abstract());

        let mut area = Method::new("area", Visibility::Public);
        area.is_abstract = true;
        entity.add_method(area);
        assert!(entity.is_abstract());

        entity.kind = EntityKind::Interface;
        assert!(!entity.is_abstract());
    }

    #[test]
    fn test_add_interface_is_a_set() {
        let mut entity = Entity::new("Duck", EntityKind::Class);
        entity.add_interface("Swimmer");
        entity.add_interface("Swimmer");
        assert_eq!(entity.interfaces, ["Swimmer"]);
    }
}
