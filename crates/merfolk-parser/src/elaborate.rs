//! Class-diagram elaboration.
//!
//! [`ClassBuilder`] folds a parsed [`ClassDiagram`] into a [`CodeModel`]:
//! members become attributes and method signatures, annotations and
//! relationships shape entity kinds, superclasses and reference attributes.
//! Entities are created lazily on first reference, so several diagrams can be
//! built into the same model.

use log::{debug, trace};

use merfolk_core::{
    model::{Attribute, CodeModel, EntityKind, Method, Parameter, Visibility},
    naming::lower_first,
    types::normalize_generics,
};

use crate::ast::{
    Annotation, ClassDeclaration, ClassDiagram, ClassInstruction, Classifier, MemberBody,
    MemberKind, Operation, Relationship, RelationshipKind,
};

/// Builds class-diagram instructions into a code model.
///
/// An operation written without a return type is taken as an interface
/// method: it becomes abstract, and an entity first seen through it is
/// created as an interface. Write `void` explicitly for a concrete method.
pub struct ClassBuilder<'a> {
    model: &'a mut CodeModel,
}

impl<'a> ClassBuilder<'a> {
    pub fn new(model: &'a mut CodeModel) -> Self {
        Self { model }
    }

    /// Apply every instruction of `diagram` in order.
    pub fn build(&mut self, diagram: &ClassDiagram) {
        debug!(instructions = diagram.instructions.len(); "Building class diagram");
        trace!(diagram:?; "Class diagram");

        for instruction in &diagram.instructions {
            match instruction.inner() {
                ClassInstruction::Member(member) => {
                    self.add_member(member.owner.inner(), &member.body);
                }
                ClassInstruction::Annotation(annotation) => self.annotate(annotation),
                ClassInstruction::Relationship(relationship) => self.relate(relationship),
                ClassInstruction::Class(declaration) => self.declare(declaration),
            }
        }
    }

    fn declare(&mut self, declaration: &ClassDeclaration) {
        let name = declaration.name.inner();
        self.model.get_or_create(name, EntityKind::Class);

        for annotation in &declaration.annotations {
            self.apply_annotation(name, annotation.inner());
        }
        for member in &declaration.members {
            self.add_member(name, member.inner());
        }
    }

    fn add_member(&mut self, owner: &str, body: &MemberBody) {
        let visibility = Visibility::from_marker(body.visibility);
        match &body.kind {
            MemberKind::Attribute(attribute) => {
                let entity = self.model.get_or_create(owner, EntityKind::Class);
                let type_name = attribute
                    .type_name
                    .as_deref()
                    .map(normalize_generics)
                    .unwrap_or_default();

                let mut field = Attribute::new(&attribute.name, type_name, visibility);
                field.is_static = attribute.classifier == Some(Classifier::Static);
                if !entity.add_attribute(field) {
                    debug!(entity = owner, attribute = attribute.name; "Attribute already declared");
                }
            }
            MemberKind::Operation(operation) => self.add_operation(owner, visibility, operation),
        }
    }

    fn add_operation(&mut self, owner: &str, visibility: Visibility, operation: &Operation) {
        // No return type reads as an interface method.
        let interface_shaped = operation.return_type.is_none();
        let kind = if interface_shaped {
            EntityKind::Interface
        } else {
            EntityKind::Class
        };

        let parameters: Vec<Parameter> = operation
            .parameters
            .iter()
            .map(|p| {
                Parameter::new(
                    &p.name,
                    p.type_name.as_deref().map(normalize_generics).unwrap_or_default(),
                )
            })
            .collect();

        let entity = self.model.get_or_create(owner, kind);
        let arity = parameters.len();
        if entity
            .methods
            .iter()
            .any(|m| m.name == operation.name && m.parameters.len() == arity)
        {
            debug!(entity = owner, method = operation.name, arity; "Method already declared");
            return;
        }

        let mut method = Method::new(&operation.name, visibility);
        method.is_static = operation.classifier == Some(Classifier::Static);
        method.is_abstract = interface_shaped || operation.classifier == Some(Classifier::Abstract);
        method.return_type = operation
            .return_type
            .as_deref()
            .map(normalize_generics)
            .unwrap_or_default();
        method.parameters = parameters.clone();

        debug!(
            entity = owner,
            method = operation.name,
            is_abstract = method.is_abstract;
            "Adding method"
        );
        entity.add_method(method);

        // Parameters typed as known entities become references on the owner.
        for parameter in parameters {
            if parameter.type_name.is_empty() || !self.model.contains(&parameter.type_name) {
                continue;
            }
            let Some(entity) = self.model.entity_mut(owner) else {
                continue;
            };
            if entity.attribute_of_type(&parameter.type_name).is_some()
                || entity.attribute(&parameter.name).is_some()
            {
                continue;
            }
            debug!(
                entity = owner,
                attribute = parameter.name,
                type_name = parameter.type_name;
                "Adding reference attribute from parameter"
            );
            entity.add_attribute(Attribute::new(
                parameter.name,
                parameter.type_name,
                Visibility::Private,
            ));
        }
    }

    fn annotate(&mut self, annotation: &Annotation) {
        self.apply_annotation(annotation.target.inner(), annotation.name.inner());
    }

    fn apply_annotation(&mut self, target: &str, name: &str) {
        let is_interface = name.eq_ignore_ascii_case("interface");
        let kind = if is_interface {
            EntityKind::Interface
        } else {
            EntityKind::Class
        };

        let entity = self.model.get_or_create(target, kind);
        if is_interface {
            entity.kind = EntityKind::Interface;
        }
        if !entity.annotations.iter().any(|a| a == name) {
            entity.annotations.push(name.to_string());
        }
        debug!(entity = target, annotation = name; "Applied annotation");
    }

    fn relate(&mut self, relationship: &Relationship) {
        let kind = relationship.marker.kind();
        let (decorated, plain) = relationship.decorated_ends();
        let (decorated, plain) = (decorated.inner().as_str(), plain.inner().as_str());

        self.model
            .get_or_create(relationship.left.inner(), EntityKind::Class);
        self.model
            .get_or_create(relationship.right.inner(), EntityKind::Class);

        match kind {
            RelationshipKind::Inheritance => self.inherit(plain, decorated),
            RelationshipKind::Realization => {
                if let Some(parent) = self.model.entity_mut(decorated) {
                    parent.kind = EntityKind::Interface;
                }
                if let Some(child) = self.model.entity_mut(plain) {
                    child.add_interface(decorated);
                }
                debug!(child = plain, interface = decorated; "Realization");
            }
            RelationshipKind::Composition | RelationshipKind::Aggregation => {
                self.add_reference(decorated, plain, relationship.label.as_deref());
            }
            RelationshipKind::Association => {
                self.add_reference(plain, decorated, relationship.label.as_deref());
            }
            RelationshipKind::Dependency | RelationshipKind::Link => {
                debug!(
                    left = relationship.left.inner(),
                    right = relationship.right.inner();
                    "Non-generative relationship"
                );
            }
        }
    }

    fn inherit(&mut self, child: &str, parent: &str) {
        let parent_is_interface = self
            .model
            .entity(parent)
            .is_some_and(|entity| entity.is_interface());

        let Some(entity) = self.model.entity_mut(child) else {
            return;
        };
        if parent_is_interface {
            entity.add_interface(parent);
        } else {
            entity.superclass = Some(parent.to_string());
        }
        debug!(child, parent, parent_is_interface; "Inheritance");
    }

    /// Give `owner` a private attribute referencing `target`.
    fn add_reference(&mut self, owner: &str, target: &str, label: Option<&str>) {
        let name = label
            .filter(|label| is_identifier(label))
            .map(str::to_string)
            .unwrap_or_else(|| lower_first(target));

        let Some(entity) = self.model.entity_mut(owner) else {
            return;
        };
        if entity.add_attribute(Attribute::new(&name, target, Visibility::Private)) {
            debug!(entity = owner, attribute = name, type_name = target; "Adding reference attribute");
        }
    }
}

fn is_identifier(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic())
        && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
