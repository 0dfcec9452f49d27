//! Java source emission.
//!
//! Every entity becomes one `.java` file. Classes get their fields, method
//! signatures and synthesized bodies; interfaces get constants, abstract
//! signatures and `default` methods for anything that has a body. Names are
//! emitted as they appear in the model apart from the configured interface
//! prefix, and the output is not checked for compilability.

use log::{debug, info};

use merfolk_core::{
    model::{Attribute, Binding, Body, CodeModel, Conditional, Entity, Initializer, Method},
    types,
};

use crate::{
    config::EmitConfig,
    emit::{CodeWriter, Emitter, GeneratedFile},
};

/// Emits Java classes and interfaces.
#[derive(Debug)]
pub struct JavaEmitter<'a> {
    config: &'a EmitConfig,
}

impl<'a> JavaEmitter<'a> {
    pub fn new(config: &'a EmitConfig) -> Self {
        Self { config }
    }

    /// Render one entity of `model` into its source file.
    pub fn render_entity(&self, model: &CodeModel, entity: &Entity) -> GeneratedFile {
        let mut writer = CodeWriter::new(self.config.indent());
        if let Some(package) = self.config.package() {
            writer.line(format!("package {package};"));
            writer.blank();
        }

        let name = self.entity_name(model, &entity.name);
        if entity.is_interface() {
            self.interface(&mut writer, model, entity, &name);
        } else {
            self.class(&mut writer, model, entity, &name);
        }

        let file_name = format!("{}.java", file_stem(&name));
        debug!(entity = entity.name, file_name; "Rendered Java source");
        GeneratedFile {
            file_name,
            contents: writer.finish(),
        }
    }

    fn class(&self, writer: &mut CodeWriter, model: &CodeModel, entity: &Entity, name: &str) {
        let mut header = String::from("public ");
        let declares_abstract = entity.annotations.iter().any(|a| a == "abstract")
            || entity
                .methods
                .iter()
                .any(|m| m.is_abstract && m.body.is_empty());
        if declares_abstract {
            header.push_str("abstract ");
        }
        header.push_str("class ");
        header.push_str(name);
        if let Some(parent) = &entity.superclass {
            header.push_str(" extends ");
            header.push_str(&self.entity_name(model, parent));
        }
        if !entity.interfaces.is_empty() {
            header.push_str(" implements ");
            header.push_str(&self.entity_names(model, &entity.interfaces));
        }

        writer.open(header);
        for attribute in &entity.attributes {
            writer.line(self.field(model, attribute));
        }
        let mut separate = !entity.attributes.is_empty();
        for method in &entity.methods {
            if separate {
                writer.blank();
            }
            separate = true;
            self.class_method(writer, model, entity, method);
        }
        writer.close("");
    }

    fn interface(&self, writer: &mut CodeWriter, model: &CodeModel, entity: &Entity, name: &str) {
        let parents: Vec<String> = entity
            .superclass
            .iter()
            .chain(entity.interfaces.iter())
            .cloned()
            .collect();

        let mut header = format!("public interface {name}");
        if !parents.is_empty() {
            header.push_str(" extends ");
            header.push_str(&self.entity_names(model, &parents));
        }

        writer.open(header);
        for attribute in &entity.attributes {
            let type_name = self.type_ref(model, &attribute.type_name);
            let value = attribute
                .value
                .clone()
                .unwrap_or_else(|| default_literal(&attribute.type_name).to_string());
            writer.line(format!("{type_name} {} = {value};", attribute.name));
        }
        let mut separate = !entity.attributes.is_empty();
        for method in &entity.methods {
            if separate {
                writer.blank();
            }
            separate = true;

            let signature = self.signature(model, method);
            if method.body.is_empty() && !method.is_static {
                writer.line(format!("{signature};"));
                continue;
            }
            let modifier = if method.is_static { "static" } else { "default" };
            writer.open(format!("{modifier} {signature}"));
            self.statements(writer, model, &method.body);
            self.return_statement(writer, method);
            writer.close("");
        }
        writer.close("");
    }

    fn class_method(
        &self,
        writer: &mut CodeWriter,
        model: &CodeModel,
        entity: &Entity,
        method: &Method,
    ) {
        let mut modifiers = visibility_prefix(method.visibility.keyword());

        if entity.is_constructor(method) {
            let parameters = self.parameters(model, method);
            writer.open(format!("{modifiers}{}({parameters})", method.name));
            self.statements(writer, model, &method.body);
            writer.close("");
            return;
        }

        if method.is_static {
            modifiers.push_str("static ");
        }
        if method.is_abstract && method.body.is_empty() {
            writer.line(format!("{modifiers}abstract {};", self.signature(model, method)));
            return;
        }

        writer.open(format!("{modifiers}{}", self.signature(model, method)));
        self.statements(writer, model, &method.body);
        self.return_statement(writer, method);
        writer.close("");
    }

    fn field(&self, model: &CodeModel, attribute: &Attribute) -> String {
        let mut line = visibility_prefix(attribute.visibility.keyword());
        if attribute.is_static {
            line.push_str("static ");
        }
        if attribute.is_constant {
            line.push_str("final ");
        }
        line.push_str(&self.type_ref(model, &attribute.type_name));
        line.push(' ');
        line.push_str(&attribute.name);

        let value = match &attribute.value {
            Some(value) if attribute.is_initialized || attribute.is_constant => Some(value.clone()),
            None if attribute.is_constant => Some(default_literal(&attribute.type_name).to_string()),
            _ => None,
        };
        if let Some(value) = value {
            line.push_str(" = ");
            line.push_str(&value);
        }
        line.push(';');
        line
    }

    /// `ReturnType name(Type param, ...)`
    fn signature(&self, model: &CodeModel, method: &Method) -> String {
        let return_type = if method.is_void() {
            "void".to_string()
        } else {
            self.type_ref(model, &method.return_type)
        };
        format!(
            "{return_type} {}({})",
            method.name,
            self.parameters(model, method)
        )
    }

    fn parameters(&self, model: &CodeModel, method: &Method) -> String {
        method
            .parameters
            .iter()
            .map(|p| format!("{} {}", self.type_ref(model, &p.type_name), p.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn statements(&self, writer: &mut CodeWriter, model: &CodeModel, body: &[Body]) {
        for statement in body {
            self.statement(writer, model, statement);
        }
    }

    fn statement(&self, writer: &mut CodeWriter, model: &CodeModel, statement: &Body) {
        match statement {
            Body::ObjectCreation { binding, arguments } => {
                let expression = format!(
                    "new {}({})",
                    self.type_ref(model, &binding.type_name),
                    arguments.join(", ")
                );
                writer.line(self.bind(model, binding, &expression));
            }
            Body::FunctionCall(call) => {
                let target = call
                    .receiver
                    .as_ref()
                    .map(|receiver| format!("{receiver}."))
                    .unwrap_or_default();
                let expression = format!("{target}{}({})", call.method, call.arguments.join(", "));
                match &call.binding {
                    Some(binding) => writer.line(self.bind(model, binding, &expression)),
                    None => writer.line(format!("{expression};")),
                }
            }
            Body::Declaration {
                binding,
                initializer: Some(initializer),
            } => {
                let expression = match initializer {
                    Initializer::Literal(literal) => literal.clone(),
                    Initializer::Construct(arguments) => format!(
                        "new {}({})",
                        self.type_ref(model, &binding.type_name),
                        arguments.join(", ")
                    ),
                };
                writer.line(self.bind(model, binding, &expression));
            }
            Body::Declaration {
                binding,
                initializer: None,
            } => {
                if binding.is_declaration() {
                    let type_name = self.type_ref(model, &binding.type_name);
                    writer.line(format!("{type_name} {};", binding.name));
                }
            }
            Body::Conditional(conditional) => self.conditional(writer, model, conditional),
        }
    }

    fn conditional(&self, writer: &mut CodeWriter, model: &CodeModel, conditional: &Conditional) {
        let condition = match conditional.condition.trim() {
            "" => "true",
            condition => condition,
        };
        writer.open(format!("if ({condition})"));
        self.statements(writer, model, &conditional.then_branch);
        if !conditional.else_branch.is_empty() {
            writer.reopen("else");
            self.statements(writer, model, &conditional.else_branch);
        }
        writer.close("");
    }

    fn return_statement(&self, writer: &mut CodeWriter, method: &Method) {
        if method.is_void() {
            return;
        }
        match &method.return_value {
            Some(value) => writer.line(format!("return {value};")),
            None => writer.line(format!("return {};", default_literal(&method.return_type))),
        }
    }

    /// `T x = expression;` or `x = expression;`
    fn bind(&self, model: &CodeModel, binding: &Binding, expression: &str) -> String {
        if binding.is_declaration() {
            let type_name = self.type_ref(model, &binding.type_name);
            format!("{type_name} {} = {expression};", binding.name)
        } else {
            format!("{} = {expression};", binding.name)
        }
    }

    /// Java name of the entity called `name`, with the interface prefix applied.
    fn entity_name(&self, model: &CodeModel, name: &str) -> String {
        let java_name = types::normalize_generics(name);
        match model.entity(name) {
            Some(entity) if entity.is_interface() => {
                format!("{}{java_name}", self.config.interface_prefix())
            }
            _ => java_name,
        }
    }

    fn entity_names(&self, model: &CodeModel, names: &[String]) -> String {
        names
            .iter()
            .map(|name| self.entity_name(model, name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Java spelling of a type; unknown types become `Object`.
    fn type_ref(&self, model: &CodeModel, type_name: &str) -> String {
        if type_name.trim().is_empty() {
            "Object".to_string()
        } else {
            self.entity_name(model, type_name)
        }
    }
}

impl Emitter for JavaEmitter<'_> {
    fn emit_model(&self, model: &CodeModel) -> Vec<GeneratedFile> {
        info!(entities = model.len(); "Emitting Java sources");
        model
            .entities()
            .map(|entity| self.render_entity(model, entity))
            .collect()
    }
}

fn visibility_prefix(keyword: Option<&str>) -> String {
    keyword.map(|k| format!("{k} ")).unwrap_or_default()
}

/// Zero literal for primitives and `String`, `null` for everything else.
fn default_literal(type_name: &str) -> &'static str {
    types::zero_value(type_name).unwrap_or("null")
}

/// File stem for a possibly generic type name, e.g. `Box<T>` gives `Box`.
fn file_stem(name: &str) -> &str {
    name.split('<').next().unwrap_or(name)
}
