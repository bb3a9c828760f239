//! Building blocks shared by the component reducers: the edit-phase state
//! machine, list request sequencing, and the outcome each update hands back to
//! the application shell.

use crate::worker::Request;

/// Severity of a status-line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Text for the footer status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
        }
    }
}

/// What an update produced: requests for the worker plus an optional status
/// message.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub requests: Vec<Request>,
    pub notice: Option<Notice>,
}

impl Outcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn request(request: Request) -> Self {
        Self {
            requests: vec![request],
            notice: None,
        }
    }

    pub fn notice(notice: Notice) -> Self {
        Self {
            requests: Vec::new(),
            notice: Some(notice),
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }
}

/// An open form: which record it targets (if any) plus the draft buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit<D> {
    /// Id of the record being updated; `None` creates a new one.
    pub target: Option<String>,
    pub draft: D,
    /// Last failure shown inside the form.
    pub error: Option<String>,
}

/// `Idle -> Editing -> Saving -> {Idle | Editing}`. Entering `Editing`
/// always replaces the whole draft.
#[derive(Debug, Clone, PartialEq)]
pub enum EditPhase<D> {
    Idle,
    Editing(Edit<D>),
    Saving(Edit<D>),
}

impl<D> Default for EditPhase<D> {
    fn default() -> Self {
        EditPhase::Idle
    }
}

impl<D> EditPhase<D> {
    /// Open the form with a fresh draft. Refused while a save is in flight.
    pub fn start(&mut self, target: Option<String>, draft: D) -> bool {
        if self.is_saving() {
            return false;
        }
        *self = EditPhase::Editing(Edit {
            target,
            draft,
            error: None,
        });
        true
    }

    /// Drop the form. Refused while a save is in flight.
    pub fn cancel(&mut self) -> bool {
        match self {
            EditPhase::Editing(_) => {
                *self = EditPhase::Idle;
                true
            }
            EditPhase::Idle | EditPhase::Saving(_) => false,
        }
    }

    /// Move `Editing -> Saving` and return the edit being persisted.
    pub fn begin_save(&mut self) -> Option<&Edit<D>> {
        match std::mem::replace(self, EditPhase::Idle) {
            EditPhase::Editing(edit) => {
                *self = EditPhase::Saving(edit);
                self.current()
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// `Saving -> Idle`. Returns whether a save was actually pending.
    pub fn save_succeeded(&mut self) -> bool {
        if self.is_saving() {
            *self = EditPhase::Idle;
            true
        } else {
            false
        }
    }

    /// `Saving -> Editing`, keeping the draft untouched and recording the
    /// failure on the form.
    pub fn save_failed(&mut self, message: impl Into<String>) -> bool {
        match std::mem::replace(self, EditPhase::Idle) {
            EditPhase::Saving(mut edit) => {
                edit.error = Some(message.into());
                *self = EditPhase::Editing(edit);
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// Record a validation failure without leaving `Editing`.
    pub fn reject(&mut self, message: impl Into<String>) {
        if let EditPhase::Editing(edit) = self {
            edit.error = Some(message.into());
        }
    }

    pub fn current(&self) -> Option<&Edit<D>> {
        match self {
            EditPhase::Idle => None,
            EditPhase::Editing(edit) | EditPhase::Saving(edit) => Some(edit),
        }
    }

    /// Mutable access to the draft, only while the form accepts input.
    pub fn editing_mut(&mut self) -> Option<&mut Edit<D>> {
        match self {
            EditPhase::Editing(edit) => Some(edit),
            EditPhase::Idle | EditPhase::Saving(_) => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditPhase::Idle)
    }

    pub fn is_saving(&self) -> bool {
        matches!(self, EditPhase::Saving(_))
    }
}

/// Hands out monotonically increasing tickets for list requests so that only
/// the response to the most recent one is applied.
#[derive(Debug, Default, Clone)]
pub struct Sequencer {
    issued: u64,
}

impl Sequencer {
    pub fn next(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.issued
    }
}
