//! Post-passes run once after a sequence diagram has been interpreted.

use std::collections::HashSet;

use log::debug;

use merfolk_core::{
    model::{Binding, BindingKind, Body, CodeModel, Method},
    naming::unique_name,
    types,
};

/// Make every non-void method's `return_value` name a binding of the return type.
///
/// A top-level binding or parameter with the same name and type satisfies the
/// check. When the name is bound to another type, a uniquely named default
/// declaration is prepended and `return_value` retargeted to it; otherwise a
/// default declaration of the name itself is prepended. Running the pass again
/// changes nothing.
pub fn repair_return_bindings(model: &mut CodeModel) {
    for entity in model.entities_mut() {
        for method in &mut entity.methods {
            repair_method(&entity.name, method);
        }
    }
}

fn repair_method(entity: &str, method: &mut Method) {
    if method.is_void() {
        return;
    }
    let Some(name) = method.return_value.clone() else {
        return;
    };
    let type_name = method.return_type.clone();

    let satisfied = method
        .body
        .iter()
        .filter_map(Body::binding)
        .any(|b| b.name == name && b.type_name == type_name)
        || method
            .parameters
            .iter()
            .any(|p| p.name == name && p.type_name == type_name);
    if satisfied {
        return;
    }

    let conflicting = method
        .bindings()
        .iter()
        .any(|b| b.name == name && b.type_name != type_name)
        || method
            .parameters
            .iter()
            .any(|p| p.name == name && p.type_name != type_name);

    let declared = if conflicting {
        let renamed = unique_name(&name, |candidate| method.is_name_taken(candidate));
        debug!(
            entity,
            method = method.name,
            variable = name,
            renamed;
            "Return value bound to another type, declaring a replacement"
        );
        method.return_value = Some(renamed.clone());
        renamed
    } else {
        debug!(entity, method = method.name, variable = name; "Declaring missing return value");
        name
    };

    let initializer = types::default_initializer(&type_name);
    method.body.insert(
        0,
        Body::declaration(Binding::declare(declared, type_name), Some(initializer)),
    );
}

/// Rewrite repeated declarations of a name into assignments.
///
/// Bodies are walked flat in document order, branches included, starting from
/// the method's parameters. A declaration of a name already seen becomes an
/// assignment even when the types differ; an assignment to a name not seen yet
/// becomes a declaration.
pub fn deduplicate_declarations(model: &mut CodeModel) {
    for entity in model.entities_mut() {
        let entity_name = entity.name.as_str();
        for method in &mut entity.methods {
            let mut seen: HashSet<String> =
                method.parameters.iter().map(|p| p.name.clone()).collect();
            let method_name = method.name.as_str();

            for statement in &mut method.body {
                statement.visit_bindings_mut(&mut |binding: &mut Binding| {
                    let first = seen.insert(binding.name.clone());
                    match (binding.kind, first) {
                        (BindingKind::Declaration, false) => {
                            debug!(
                                entity = entity_name,
                                method = method_name,
                                variable = binding.name;
                                "Repeated declaration becomes assignment"
                            );
                            binding.kind = BindingKind::Assignment;
                        }
                        (BindingKind::Assignment, true) => {
                            debug!(
                                entity = entity_name,
                                method = method_name,
                                variable = binding.name;
                                "First assignment becomes declaration"
                            );
                            binding.kind = BindingKind::Declaration;
                        }
                        _ => {}
                    }
                });
            }
        }
    }
}
