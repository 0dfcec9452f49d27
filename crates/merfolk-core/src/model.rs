//! The intermediate code model.
//!
//! A [`CodeModel`] maps entity names to [`Entity`] values (classes and
//! interfaces). It is built incrementally: the class-diagram builder
//! contributes signatures and the sequence interpreter synthesizes method
//! bodies. Emitters only ever read it.
//!
//! Entity names are unique within a model. The first reference creates an
//! entity and every later reference reuses it.

mod body;
mod entity;
mod method;

pub use body::{
    Binding, BindingKind, Body, Conditional, FunctionCall, Initializer, PathStep, statement_mut,
};
pub use entity::{Attribute, Entity, EntityKind, Visibility};
pub use method::{Method, Parameter};

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

/// All entities of one transpilation run, in first-reference order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CodeModel {
    entities: IndexMap<String, Entity>,
}

impl CodeModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Look up an entity by name for mutation.
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    /// Returns `true` when an entity named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Return the entity named `name`, creating it with `kind` if it does not exist.
    ///
    /// The kind only applies on creation; an existing entity keeps its kind.
    pub fn get_or_create(&mut self, name: &str, kind: EntityKind) -> &mut Entity {
        self.entities.entry(name.to_string()).or_insert_with(|| {
            debug!(entity = name, kind:?; "Creating entity");
            Entity::new(name, kind)
        })
    }

    /// Iterate over all entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Iterate mutably over all entities in insertion order.
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` when the model has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_first_writer_wins() {
        let mut model = CodeModel::new();
        model.get_or_create("Animal", EntityKind::Interface);
        let entity = model.get_or_create("Animal", EntityKind::Class);

        assert_eq!(entity.kind, EntityKind::Interface);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_entities_keep_insertion_order() {
        let mut model = CodeModel::new();
        model.get_or_create("Zoo", EntityKind::Class);
        model.get_or_create("Animal", EntityKind::Class);
        model.get_or_create("Keeper", EntityKind::Class);

        let names: Vec<_> = model.entities().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Zoo", "Animal", "Keeper"]);
    }

    #[test]
    fn test_lookup_missing() {
        let model = CodeModel::new();
        assert!(model.entity("Nope").is_none());
        assert!(!model.contains("Nope"));
        assert!(model.is_empty());
    }
}
