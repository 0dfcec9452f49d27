//! State carried across the instructions of one sequence diagram.

use indexmap::IndexMap;
use log::debug;

use merfolk_core::model::PathStep;

use crate::{ast::ParticipantKind, span::Span};

pub(crate) type FrameId = usize;

/// One activation on the call stack: a method of an entity receiving statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub(crate) id: FrameId,
    pub(crate) entity: String,
    /// Index into the entity's methods.
    pub(crate) method: usize,
}

impl Frame {
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn method_index(&self) -> usize {
        self.method
    }
}

/// A value-producing or constructor call waiting for its return message.
#[derive(Debug, Clone)]
pub struct PendingReturn {
    pub(crate) caller: Frame,
    pub(crate) callee: Frame,
    /// Where the call statement sits in the caller's body.
    pub(crate) path: Vec<PathStep>,
    /// Type of the value the call produces.
    pub(crate) type_name: String,
}

impl PendingReturn {
    pub fn caller(&self) -> &str {
        &self.caller.entity
    }

    pub fn callee(&self) -> &str {
        &self.callee.entity
    }
}

/// A conditional whose `end` has not been seen yet.
#[derive(Debug, Clone)]
pub(crate) struct OpenConditional {
    /// Frame whose statements go into the branches; `None` when opened outside any context.
    pub(crate) owner: Option<Frame>,
    /// Path of the `Conditional` node in the owner's body.
    pub(crate) path: Vec<PathStep>,
    pub(crate) in_else: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum OpenBlock {
    Loop { span: Span },
    Conditional { span: Span, conditional: OpenConditional },
}

impl OpenBlock {
    pub(crate) fn span(&self) -> Span {
        match self {
            OpenBlock::Loop { span } | OpenBlock::Conditional { span, .. } => *span,
        }
    }
}

/// Call stack, pending returns, participants and open blocks.
#[derive(Debug, Default)]
pub struct InterpreterState {
    pub(crate) frames: Vec<Frame>,
    pub(crate) pending: Vec<PendingReturn>,
    pub(crate) participants: IndexMap<String, ParticipantKind>,
    pub(crate) blocks: Vec<OpenBlock>,
    /// Callee of the void call popped most recently.
    pub(crate) dormant: Option<Frame>,
    next_frame: FrameId,
}

impl InterpreterState {
    /// Number of frames on the call stack.
    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of calls still waiting for a return message.
    pub fn pending_returns(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when `name` was declared with `actor`.
    pub fn is_actor(&self, name: &str) -> bool {
        self.participants.get(name) == Some(&ParticipantKind::Actor)
    }

    /// Declared and created participants, in declaration order.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.participants.keys().map(String::as_str)
    }

    /// Number of `loop`, `alt` and `opt` blocks without an `end`.
    pub fn open_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// The frame currently receiving statements.
    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Pending returns, oldest first.
    pub fn pending(&self) -> &[PendingReturn] {
        &self.pending
    }

    pub(crate) fn record_participant(&mut self, name: &str, kind: ParticipantKind) {
        self.participants.insert(name.to_string(), kind);
    }

    pub(crate) fn push_frame(&mut self, entity: &str, method: usize) -> Frame {
        let frame = Frame {
            id: self.next_frame,
            entity: entity.to_string(),
            method,
        };
        self.next_frame += 1;
        self.frames.push(frame.clone());
        frame
    }

    /// Position of the topmost frame on `entity`.
    pub(crate) fn find_frame(&self, entity: &str) -> Option<usize> {
        self.frames.iter().rposition(|frame| frame.entity == entity)
    }

    /// Truncate the call stack to `len` frames and drop pending returns whose callee went with it.
    pub(crate) fn unwind_to(&mut self, len: usize) {
        if len >= self.frames.len() {
            return;
        }
        debug!(from = self.frames.len(), to = len; "Unwinding call stack");

        self.frames.truncate(len);
        let frames = &self.frames;
        self.pending
            .retain(|pending| frames.iter().any(|frame| frame.id == pending.callee.id));
    }

    /// Innermost open conditional owned by the frame `owner`.
    pub(crate) fn conditional_of(&self, owner: FrameId) -> Option<&OpenConditional> {
        self.blocks.iter().rev().find_map(|block| match block {
            OpenBlock::Conditional { conditional, .. }
                if conditional.owner.as_ref().is_some_and(|frame| frame.id == owner) =>
            {
                Some(conditional)
            }
            _ => None,
        })
    }
}
