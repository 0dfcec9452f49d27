//! Sequence-diagram interpretation.
//!
//! The [`Interpreter`] walks the flat instruction list of a sequence diagram
//! and reconstructs method bodies in a [`CodeModel`]. The diagram carries no
//! scoping syntax, so the interpreter tracks a call stack of [`Frame`]s: the
//! top frame is the method currently receiving statements. Calls that produce
//! a value leave a [`PendingReturn`] so the matching return message can name
//! the result. `alt`/`opt` blocks become `Conditional` statements owned by the
//! frame that was active when the block opened.
//!
//! Problems never abort interpretation. The offending instruction is dropped
//! and a warning [`Diagnostic`] is recorded; [`Interpreter::finish`] hands
//! them back.
//!
//! # Example
//!
//! ```
//! # use merfolk_core::model::CodeModel;
//! # use merfolk_parser::{interpret, parse_sequence_diagram, InterpreterConfig};
//! let diagram = parse_sequence_diagram("sequenceDiagram\nA->>B: work()\n").unwrap();
//! let mut model = CodeModel::new();
//! let diagnostics = interpret(&mut model, &diagram, InterpreterConfig::default());
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(model.entity("A").unwrap().methods[0].name, "run");
//! ```

pub mod finalize;
mod state;

pub use state::{Frame, InterpreterState, PendingReturn};

use indexmap::IndexMap;
use log::{debug, info, trace};

use merfolk_core::{
    model::{
        Binding, BindingKind, Body, CodeModel, Conditional, EntityKind, FunctionCall,
        Initializer, Method, Parameter, PathStep, Visibility, statement_mut,
    },
    naming::{lower_first, unique_name},
};

use crate::{
    ast::{
        ArrowSemantics, Life, Message, Participant, ParticipantKind, SequenceDiagram,
        SequenceInstruction,
    },
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::{Span, Spanned},
};

use state::{OpenBlock, OpenConditional};

/// Options for sequence interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Method synthesized on a non-actor sender that has no active context.
    pub entry_method: String,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            entry_method: "run".to_string(),
        }
    }
}

/// Synthesizes method bodies from sequence-diagram instructions.
pub struct Interpreter<'m> {
    model: &'m mut CodeModel,
    config: InterpreterConfig,
    state: InterpreterState,
    /// Declarations to prepend to a method body when interpretation finishes.
    preludes: IndexMap<(String, usize), Vec<Body>>,
    diagnostics: DiagnosticCollector,
}

impl<'m> Interpreter<'m> {
    pub fn new(model: &'m mut CodeModel, config: InterpreterConfig) -> Self {
        Self {
            model,
            config,
            state: InterpreterState::default(),
            preludes: IndexMap::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn state(&self) -> &InterpreterState {
        &self.state
    }

    /// Interpret one instruction.
    pub fn step(&mut self, instruction: &Spanned<SequenceInstruction>) {
        let span = instruction.span();
        match instruction.inner() {
            SequenceInstruction::Message(message) => self.message(message, span),
            SequenceInstruction::Member(participant) => {
                self.state
                    .record_participant(participant.name.inner(), participant.kind);
            }
            SequenceInstruction::Life(Life::Create(participant)) => {
                self.create(participant, span);
            }
            SequenceInstruction::Life(Life::Destroy(name)) => {
                debug!(participant = name.inner(); "Ignoring destroy");
            }
            SequenceInstruction::Switch(switch) => {
                debug!(participant = switch.name.inner(), kind:? = switch.kind; "Ignoring activation");
            }
            SequenceInstruction::Loop(label) => {
                debug!(label; "Opening loop");
                self.state.blocks.push(OpenBlock::Loop { span });
            }
            SequenceInstruction::Alt(label) | SequenceInstruction::Opt(label) => {
                self.open_conditional(label, span);
            }
            SequenceInstruction::Else(label) => self.else_branch(label, span),
            SequenceInstruction::End => self.end(span),
        }
    }

    /// Close open blocks, merge preludes, run the post-passes and return the diagnostics.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        for block in std::mem::take(&mut self.state.blocks) {
            self.diagnostics.emit(
                Diagnostic::warning("unterminated block")
                    .with_code(ErrorCode::W203)
                    .with_label(block.span(), "block opened here has no `end`")
                    .with_help("add `end` to close the block"),
            );
        }

        for ((entity, index), prelude) in std::mem::take(&mut self.preludes) {
            if let Some(method) = self
                .model
                .entity_mut(&entity)
                .and_then(|e| e.methods.get_mut(index))
            {
                method.body.splice(0..0, prelude);
            }
        }

        finalize::repair_return_bindings(self.model);
        finalize::deduplicate_declarations(self.model);
        trace!(model:? = self.model; "Interpreted model");

        self.diagnostics.into_diagnostics()
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    fn message(&mut self, message: &Message, span: Span) {
        let dormant = self.state.dormant.take();
        let sender = message.left.inner().as_str();
        let receiver = message.right.inner().as_str();

        match message.arrow.semantics() {
            ArrowSemantics::Return => self.return_message(message, dormant, span),
            semantics => {
                if self.state.is_actor(receiver) {
                    self.diagnostics.emit(
                        Diagnostic::warning(format!("call to actor `{receiver}`"))
                            .with_code(ErrorCode::W204)
                            .with_label(message.right.span(), "actors have no methods")
                            .with_help("declare the receiver with `participant`"),
                    );
                    return;
                }
                let caller = self.enter_sender(sender, dormant);
                if semantics == ArrowSemantics::Signal {
                    self.signal(caller, message, span);
                } else {
                    self.call(caller, message, span);
                }
            }
        }
    }

    /// Find or establish the frame sending a call.
    ///
    /// Returns `None` when the sender is an actor with no context, in which
    /// case the call opens the initial context.
    fn enter_sender(&mut self, sender: &str, dormant: Option<Frame>) -> Option<Frame> {
        if let Some(position) = self.state.find_frame(sender) {
            self.state.unwind_to(position + 1);
            return self.state.frames.get(position).cloned();
        }

        if let Some(frame) = dormant.filter(|frame| frame.entity == sender) {
            debug!(entity = sender; "Re-entering dormant frame");
            self.state.frames.push(frame.clone());
            return Some(frame);
        }

        self.state.unwind_to(0);
        if self.state.is_actor(sender) {
            return None;
        }

        let entity = self.model.get_or_create(sender, EntityKind::Class);
        let entry = self.config.entry_method.as_str();
        let index = match entity
            .methods
            .iter()
            .position(|m| m.name == entry && m.parameters.is_empty())
        {
            Some(index) => index,
            None => {
                debug!(entity = sender, method = entry; "Synthesizing entry method");
                entity.add_method(Method::new(entry, Visibility::Public))
            }
        };
        Some(self.state.push_frame(sender, index))
    }

    fn call(&mut self, caller: Option<Frame>, message: &Message, span: Span) {
        let callee = message.right.inner().as_str();
        let name = message.name.inner().as_str();
        let (index, return_type, is_static) =
            self.resolve_method(caller.as_ref(), callee, name, &message.arguments);
        let is_constructor = name == callee;

        let Some(caller) = caller else {
            debug!(entity = callee, method = name; "Opening initial context");
            self.state.push_frame(callee, index);
            return;
        };

        if is_constructor {
            self.construct(&caller, callee, index, &message.arguments, span);
            return;
        }

        let receiver = self.resolve_receiver(&caller, callee, is_static);
        let value_producing = !merfolk_core::types::is_void(&return_type);

        let binding = value_producing.then(|| {
            let temp = unique_name(&format!("{name}Result"), |n| self.is_taken(&caller, n));
            Binding::declare(temp, return_type.clone())
        });
        let statement = Body::FunctionCall(FunctionCall {
            receiver,
            method: name.to_string(),
            arguments: message.arguments.clone(),
            binding,
        });
        let Some(path) = self.append(&caller, statement) else {
            self.missing_context(span);
            return;
        };

        let frame = self.state.push_frame(callee, index);
        if value_producing {
            debug!(caller = caller.entity, callee, method = name; "Value-producing call");
            self.state.pending.push(PendingReturn {
                caller,
                callee: frame,
                path,
                type_name: return_type,
            });
        } else {
            debug!(caller = caller.entity, callee, method = name; "Void call");
            self.state.frames.pop();
            self.state.dormant = Some(frame);
        }
    }

    fn construct(
        &mut self,
        caller: &Frame,
        callee: &str,
        index: usize,
        arguments: &[String],
        span: Span,
    ) {
        let variable = lower_first(callee);
        let existing = self.method(caller).and_then(|method| {
            find_statement(&method.body, PathStep::Body, &|statement| {
                matches!(
                    statement,
                    Body::ObjectCreation { binding, .. }
                        if binding.name == variable && binding.type_name == callee
                )
            })
        });

        let path = match existing {
            Some(path) => {
                debug!(caller = caller.entity, variable; "Reusing object creation");
                path
            }
            None => {
                let name = if self.bound_types(caller, &variable).iter().any(|t| t != callee) {
                    unique_name(&variable, |n| self.is_taken(caller, n))
                } else {
                    variable
                };
                let statement = Body::ObjectCreation {
                    binding: Binding::declare(name, callee),
                    arguments: arguments.to_vec(),
                };
                match self.append(caller, statement) {
                    Some(path) => path,
                    None => {
                        self.missing_context(span);
                        return;
                    }
                }
            }
        };

        let frame = self.state.push_frame(callee, index);
        self.state.pending.push(PendingReturn {
            caller: caller.clone(),
            callee: frame,
            path,
            type_name: callee.to_string(),
        });
    }

    fn signal(&mut self, caller: Option<Frame>, message: &Message, span: Span) {
        let callee = message.right.inner().as_str();
        let name = message.name.inner().as_str();
        let (_, _, is_static) =
            self.resolve_method(caller.as_ref(), callee, name, &message.arguments);

        let Some(caller) = caller else {
            debug!(entity = callee, method = name; "Signal without a caller context");
            return;
        };

        let receiver = self.resolve_receiver(&caller, callee, is_static);
        let statement = Body::FunctionCall(FunctionCall {
            receiver,
            method: name.to_string(),
            arguments: message.arguments.clone(),
            binding: None,
        });
        if self.append(&caller, statement).is_none() {
            self.missing_context(span);
        }
    }

    fn return_message(&mut self, message: &Message, dormant: Option<Frame>, span: Span) {
        let callee = message.left.inner().as_str();
        let caller = message.right.inner().as_str();
        let name = message.name.inner().as_str();

        let matched = self
            .state
            .pending
            .iter()
            .rposition(|pending| pending.callee.entity == callee && pending.caller.entity == caller);

        if let Some(position) = matched {
            self.state.pending.truncate(position + 1);
            let Some(pending) = self.state.pending.pop() else {
                return;
            };
            self.bind_return(&pending, name);

            if let Some(frame_position) = self
                .state
                .frames
                .iter()
                .position(|frame| frame.id == pending.caller.id)
            {
                self.state.unwind_to(frame_position + 1);
            }
            return;
        }

        if let Some(position) = self.state.find_frame(callee) {
            debug!(entity = callee; "Return ends interaction");
            self.state.unwind_to(position);
            return;
        }

        if dormant.is_some_and(|frame| frame.entity == callee) {
            debug!(entity = callee; "Ignoring return from void call");
            return;
        }

        self.diagnostics.emit(
            Diagnostic::warning("return without matching call")
                .with_code(ErrorCode::W200)
                .with_label(span, format!("no pending call from `{caller}` to `{callee}`"))
                .with_help("add the call message before its return"),
        );
    }

    /// Name the value of a pending call `name` and make it the caller's return value.
    fn bind_return(&mut self, pending: &PendingReturn, name: &str) {
        let caller = &pending.caller;
        let prelude: Vec<Binding> = self
            .preludes
            .get(&(caller.entity.clone(), caller.method))
            .map(|prelude| prelude.iter().filter_map(Body::binding).cloned().collect())
            .unwrap_or_default();

        let Some(method) = self
            .model
            .entity_mut(&caller.entity)
            .and_then(|e| e.methods.get_mut(caller.method))
        else {
            return;
        };
        let current = statement_mut(&mut method.body, &pending.path)
            .and_then(|statement| statement.binding().cloned());
        let type_name = current
            .as_ref()
            .map_or_else(|| pending.type_name.clone(), |b| b.type_name.clone());

        let mut bound: Vec<String> = method
            .bindings()
            .into_iter()
            .chain(prelude.iter())
            .filter(|b| b.name == name)
            .map(|b| b.type_name.clone())
            .chain(
                method
                    .parameters
                    .iter()
                    .filter(|p| p.name == name)
                    .map(|p| p.type_name.clone()),
            )
            .collect();
        if let Some(current) = current.as_ref().filter(|b| b.name == name) {
            if let Some(own) = bound.iter().position(|t| *t == current.type_name) {
                bound.remove(own);
            }
        }

        let (final_name, kind) = if bound.is_empty() {
            (name.to_string(), BindingKind::Declaration)
        } else if bound.contains(&type_name) {
            (name.to_string(), BindingKind::Assignment)
        } else {
            let renamed = unique_name(name, |n| {
                method.is_name_taken(n) || prelude.iter().any(|b| b.name == n)
            });
            (renamed, BindingKind::Declaration)
        };

        debug!(
            entity = caller.entity,
            method = method.name,
            variable = final_name,
            kind:?;
            "Binding returned value"
        );

        match statement_mut(&mut method.body, &pending.path) {
            Some(Body::FunctionCall(call)) if call.binding.is_none() => {
                call.binding = Some(Binding {
                    name: final_name.clone(),
                    type_name,
                    kind,
                });
            }
            Some(statement) => {
                if let Some(binding) = statement.binding_mut() {
                    binding.name = final_name.clone();
                    binding.kind = kind;
                }
            }
            None => {}
        }
        method.return_value = Some(final_name);
    }

    // -----------------------------------------------------------------------
    // Lifecycle and blocks
    // -----------------------------------------------------------------------

    fn create(&mut self, participant: &Participant, span: Span) {
        let name = participant.name.inner().as_str();
        self.state.record_participant(name, participant.kind);
        if participant.kind == ParticipantKind::Actor {
            return;
        }

        let Some(frame) = self.state.current().cloned() else {
            self.missing_context(span);
            return;
        };
        self.model.get_or_create(name, EntityKind::Class);

        let variable = lower_first(name);
        let exists = self.method(&frame).is_some_and(|method| {
            find_statement(&method.body, PathStep::Body, &|statement| {
                matches!(
                    statement,
                    Body::ObjectCreation { binding, .. }
                        if binding.name == variable && binding.type_name == name
                )
            })
            .is_some()
        });
        if exists {
            debug!(entity = frame.entity, variable; "Object already created");
            return;
        }

        let statement = Body::ObjectCreation {
            binding: Binding::declare(variable, name),
            arguments: Vec::new(),
        };
        if self.append(&frame, statement).is_none() {
            self.missing_context(span);
        }
    }

    fn open_conditional(&mut self, label: &str, span: Span) {
        if let Some(OpenBlock::Conditional { conditional, .. }) = self.state.blocks.last_mut() {
            debug!(label; "Repeated alt switches to else branch");
            conditional.in_else = true;
            return;
        }

        let owner = self.state.current().cloned();
        let path = match &owner {
            Some(frame) => self
                .append(frame, Body::Conditional(Conditional::new(label)))
                .unwrap_or_default(),
            None => Vec::new(),
        };
        let owner = owner.filter(|_| !path.is_empty());

        debug!(label, owned = owner.is_some(); "Opening conditional");
        self.state.blocks.push(OpenBlock::Conditional {
            span,
            conditional: OpenConditional {
                owner,
                path,
                in_else: false,
            },
        });
    }

    fn else_branch(&mut self, label: &str, span: Span) {
        match self.state.blocks.last_mut() {
            Some(OpenBlock::Conditional { conditional, .. }) => {
                debug!(label; "Switching to else branch");
                conditional.in_else = true;
            }
            _ => self.diagnostics.emit(
                Diagnostic::warning("else without open conditional")
                    .with_code(ErrorCode::W205)
                    .with_label(span, "no `alt` or `opt` is open here")
                    .with_help("start the block with `alt` or `opt`"),
            ),
        }
    }

    fn end(&mut self, span: Span) {
        match self.state.blocks.pop() {
            None => self.diagnostics.emit(
                Diagnostic::warning("end without open block")
                    .with_code(ErrorCode::W201)
                    .with_label(span, "nothing to close")
                    .with_help("remove the `end` or open a block before it"),
            ),
            Some(OpenBlock::Loop { .. }) => debug!("Closing loop"),
            Some(OpenBlock::Conditional {
                span: opened,
                conditional,
            }) => match conditional.owner {
                Some(owner) => self.close_conditional(&owner, &conditional.path),
                None => self.diagnostics.emit(
                    Diagnostic::warning("conditional outside any method")
                        .with_code(ErrorCode::W202)
                        .with_label(opened, "opened before any call established a context")
                        .with_secondary_label(span, "dropped here"),
                ),
            },
        }
    }

    /// Remove the conditional at `path` if both of its branches stayed empty.
    ///
    /// Recorded paths into the same method that pointed past the removed
    /// node are shifted back by one.
    fn close_conditional(&mut self, owner: &Frame, path: &[PathStep]) {
        let Some(method) = self.method_mut(owner) else {
            return;
        };
        let empty = matches!(
            statement_mut(&mut method.body, path),
            Some(Body::Conditional(conditional)) if conditional.is_empty()
        );
        if !empty {
            return;
        }

        debug!(entity = owner.entity, method = method.name; "Removing empty conditional");
        let Some((last, parent)) = path.split_last() else {
            return;
        };
        let removed = match (last, parent.is_empty()) {
            (PathStep::Body(index), true) if *index < method.body.len() => {
                method.body.remove(*index);
                true
            }
            (PathStep::Then(index) | PathStep::Else(index), false) => {
                match statement_mut(&mut method.body, parent) {
                    Some(Body::Conditional(conditional)) => {
                        let branch = conditional.branch_mut(matches!(last, PathStep::Else(_)));
                        let in_range = *index < branch.len();
                        if in_range {
                            branch.remove(*index);
                        }
                        in_range
                    }
                    _ => false,
                }
            }
            _ => false,
        };
        if !removed {
            return;
        }

        let same_method =
            |frame: &Frame| frame.entity == owner.entity && frame.method == owner.method;
        for pending in &mut self.state.pending {
            if same_method(&pending.caller) {
                shift_after_removal(&mut pending.path, parent, *last);
            }
        }
        for block in &mut self.state.blocks {
            let OpenBlock::Conditional { conditional, .. } = block else {
                continue;
            };
            if conditional.owner.as_ref().is_some_and(same_method) {
                shift_after_removal(&mut conditional.path, parent, *last);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn missing_context(&mut self, span: Span) {
        self.diagnostics.emit(
            Diagnostic::warning("no active method context")
                .with_code(ErrorCode::W202)
                .with_label(span, "no method is receiving statements here")
                .with_help("start the interaction with a call message"),
        );
    }

    fn method(&self, frame: &Frame) -> Option<&Method> {
        self.model
            .entity(&frame.entity)
            .and_then(|e| e.methods.get(frame.method))
    }

    fn method_mut(&mut self, frame: &Frame) -> Option<&mut Method> {
        self.model
            .entity_mut(&frame.entity)
            .and_then(|e| e.methods.get_mut(frame.method))
    }

    fn prelude(&self, frame: &Frame) -> &[Body] {
        self.preludes
            .get(&(frame.entity.clone(), frame.method))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if `name` is a parameter or local of the frame's method.
    fn is_taken(&self, frame: &Frame, name: &str) -> bool {
        self.method(frame).is_some_and(|m| m.is_name_taken(name))
            || self
                .prelude(frame)
                .iter()
                .filter_map(Body::binding)
                .any(|b| b.name == name)
    }

    /// Types `name` is bound to in the frame's method.
    fn bound_types(&self, frame: &Frame, name: &str) -> Vec<String> {
        let mut types: Vec<String> = self
            .prelude(frame)
            .iter()
            .filter_map(Body::binding)
            .filter(|b| b.name == name)
            .map(|b| b.type_name.clone())
            .collect();
        if let Some(method) = self.method(frame) {
            types.extend(
                method
                    .bindings()
                    .into_iter()
                    .filter(|b| b.name == name)
                    .map(|b| b.type_name.clone()),
            );
            types.extend(
                method
                    .parameters
                    .iter()
                    .filter(|p| p.name == name)
                    .map(|p| p.type_name.clone()),
            );
        }
        types
    }

    /// Append `statement` where `frame` currently receives statements.
    ///
    /// Returns the statement's path, or `None` if the frame's method no longer exists.
    fn append(&mut self, frame: &Frame, statement: Body) -> Option<Vec<PathStep>> {
        let target = self
            .state
            .conditional_of(frame.id)
            .map(|conditional| (conditional.path.clone(), conditional.in_else));
        let method = self.method_mut(frame)?;

        // A synthesized body makes a heuristically abstract method concrete
        if method.is_abstract && !matches!(statement, Body::Conditional(_)) {
            debug!(entity = frame.entity, method = method.name; "Method gained a body");
            method.is_abstract = false;
        }

        if let Some((mut path, in_else)) = target {
            if let Some(Body::Conditional(conditional)) = statement_mut(&mut method.body, &path) {
                let branch = conditional.branch_mut(in_else);
                branch.push(statement);
                let index = branch.len() - 1;
                path.push(if in_else {
                    PathStep::Else(index)
                } else {
                    PathStep::Then(index)
                });
                return Some(path);
            }
        }

        method.body.push(statement);
        Some(vec![PathStep::Body(method.body.len() - 1)])
    }

    /// Find the callee method, creating a stub when the entity has none.
    ///
    /// Returns the method index, its return type and whether it is static.
    fn resolve_method(
        &mut self,
        caller: Option<&Frame>,
        callee: &str,
        name: &str,
        arguments: &[String],
    ) -> (usize, String, bool) {
        let exists = self
            .model
            .entity(callee)
            .and_then(|entity| entity.method_index(name, arguments.len()));
        if let Some(index) = exists {
            if let Some(method) = self.model.entity(callee).and_then(|e| e.methods.get(index)) {
                return (index, method.return_type.clone(), method.is_static);
            }
        }

        let mut parameters: Vec<Parameter> = Vec::with_capacity(arguments.len());
        for (position, argument) in arguments.iter().enumerate() {
            let base = if argument.starts_with(|c: char| c.is_ascii_alphabetic()) {
                argument.clone()
            } else {
                format!("arg{position}")
            };
            let param_name = unique_name(&base, |n| parameters.iter().any(|p| p.name == n));
            let type_name = self.argument_type(caller, argument);
            parameters.push(Parameter::new(param_name, type_name));
        }

        debug!(entity = callee, method = name, arity = arguments.len(); "Creating stub method");
        let mut stub = Method::new(name, Visibility::Public);
        stub.parameters = parameters;
        let entity = self.model.get_or_create(callee, EntityKind::Class);
        (entity.add_method(stub), String::new(), false)
    }

    /// Type of a message argument as seen from the caller, empty when unknown.
    fn argument_type(&self, caller: Option<&Frame>, argument: &str) -> String {
        if argument.starts_with(|c: char| c.is_ascii_digit()) {
            let numeric = if argument.contains('.') { "double" } else { "int" };
            return numeric.to_string();
        }
        let Some(frame) = caller else {
            return String::new();
        };

        if let Some(type_name) = self.bound_types(frame, argument).into_iter().next() {
            return type_name;
        }
        self.model
            .entity(&frame.entity)
            .and_then(|e| e.attribute(argument))
            .map(|a| a.type_name.clone())
            .unwrap_or_default()
    }

    /// Expression a call from `caller` to an object of type `callee` is made on.
    fn resolve_receiver(&mut self, caller: &Frame, callee: &str, is_static: bool) -> Option<String> {
        if caller.entity == callee {
            return None;
        }
        if is_static {
            return Some(callee.to_string());
        }
        if let Some(attribute) = self
            .model
            .entity(&caller.entity)
            .and_then(|e| e.attribute_of_type(callee))
        {
            return Some(attribute.name.clone());
        }
        if let Some(method) = self.method(caller) {
            if let Some(parameter) = method.parameters.iter().find(|p| p.type_name == callee) {
                return Some(parameter.name.clone());
            }
            if let Some(binding) = method.bindings().into_iter().find(|b| b.type_name == callee) {
                return Some(binding.name.clone());
            }
        }
        if let Some(binding) = self
            .prelude(caller)
            .iter()
            .filter_map(Body::binding)
            .find(|b| b.type_name == callee)
        {
            return Some(binding.name.clone());
        }

        let variable = unique_name(&lower_first(callee), |n| self.is_taken(caller, n));
        debug!(caller = caller.entity, variable, type_name = callee; "Declaring receiver local");
        self.preludes
            .entry((caller.entity.clone(), caller.method))
            .or_default()
            .push(Body::declaration(
                Binding::declare(variable.clone(), callee),
                Some(Initializer::Construct(Vec::new())),
            ));
        Some(variable)
    }
}

/// Path of the first statement matching `matches`, searching branches depth first.
fn find_statement(
    body: &[Body],
    wrap: fn(usize) -> PathStep,
    matches: &dyn Fn(&Body) -> bool,
) -> Option<Vec<PathStep>> {
    for (index, statement) in body.iter().enumerate() {
        if matches(statement) {
            return Some(vec![wrap(index)]);
        }
        if let Body::Conditional(conditional) = statement {
            let nested = find_statement(&conditional.then_branch, PathStep::Then, matches)
                .or_else(|| find_statement(&conditional.else_branch, PathStep::Else, matches));
            if let Some(rest) = nested {
                let mut path = vec![wrap(index)];
                path.extend(rest);
                return Some(path);
            }
        }
    }
    None
}

/// Move `path` back by one when it points past `removed`, a sibling step
/// under `parent` that was just deleted.
fn shift_after_removal(path: &mut [PathStep], parent: &[PathStep], removed: PathStep) {
    if path.len() <= parent.len() || path[..parent.len()] != *parent {
        return;
    }
    match (&mut path[parent.len()], removed) {
        (PathStep::Body(index), PathStep::Body(gone))
        | (PathStep::Then(index), PathStep::Then(gone))
        | (PathStep::Else(index), PathStep::Else(gone))
            if *index > gone =>
        {
            *index -= 1;
        }
        _ => {}
    }
}

/// Interpret a whole sequence diagram into `model`.
pub fn interpret(
    model: &mut CodeModel,
    diagram: &SequenceDiagram,
    config: InterpreterConfig,
) -> Vec<Diagnostic> {
    info!(instructions = diagram.instructions.len(); "Interpreting sequence diagram");

    let mut interpreter = Interpreter::new(model, config);
    for instruction in &diagram.instructions {
        interpreter.step(instruction);
    }
    interpreter.finish()
}
