/// Toast notifications
///
/// `ToastBoard` is the notifier the desktop shell injects into both state
/// machines. Pending toasts stay until they are resolved; resolved toasts
/// expire after a short delay (longer for failures).
use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use super::{Notifier, ToastId, ToastOutcome};

pub const SUCCESS_TTL: Duration = Duration::from_secs(2);
pub const FAILURE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    /// When the toast stops being shown; `None` while pending
    pub expires_at: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct ToastBoard {
    toasts: RefCell<Vec<Toast>>,
    next_id: Cell<u64>,
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the visible toasts, oldest first
    pub fn visible(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.borrow().is_empty()
    }

    /// Drop resolved toasts whose time is up
    pub fn expire(&self, now: Instant) {
        self.toasts
            .borrow_mut()
            .retain(|t| t.expires_at.map_or(true, |at| at > now));
    }

    fn push(&self, kind: ToastKind, message: &str) -> ToastId {
        let id = ToastId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.toasts.borrow_mut().push(Toast {
            id,
            kind,
            message: message.to_string(),
            expires_at: expiry(kind, Instant::now()),
        });
        id
    }
}

fn expiry(kind: ToastKind, from: Instant) -> Option<Instant> {
    match kind {
        ToastKind::Pending => None,
        ToastKind::Success => Some(from + SUCCESS_TTL),
        ToastKind::Failure => Some(from + FAILURE_TTL),
    }
}

impl Notifier for ToastBoard {
    fn pending(&self, message: &str) -> ToastId {
        self.push(ToastKind::Pending, message)
    }

    fn resolve(&self, id: ToastId, outcome: ToastOutcome) {
        let (kind, message) = match outcome {
            ToastOutcome::Success(message) => (ToastKind::Success, message),
            ToastOutcome::Failure(message) => (ToastKind::Failure, message),
        };
        let updated = {
            let mut toasts = self.toasts.borrow_mut();
            match toasts.iter_mut().find(|t| t.id == id) {
                Some(toast) => {
                    toast.kind = kind;
                    toast.message = message.clone();
                    toast.expires_at = expiry(kind, Instant::now());
                    true
                }
                None => false,
            }
        };
        // Dismissed while pending; still show how it ended
        if !updated {
            self.push(kind, &message);
        }
    }

    fn success(&self, message: &str) {
        self.push(ToastKind::Success, message);
    }

    fn failure(&self, message: &str) {
        self.push(ToastKind::Failure, message);
    }

    fn dismiss(&self, id: ToastId) {
        self.toasts.borrow_mut().retain(|t| t.id != id);
    }
}
