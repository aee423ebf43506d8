/// Collaborator doubles shared by the unit tests
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use super::{FitStore, FormFields, Navigator, Notifier, Pending, ToastId, ToastOutcome, Uploader};
use crate::config::PermittedType;
use crate::state::upload::CandidateFile;

/// Uploader that counts calls and replies from a script (default: success)
pub struct StubUploader {
    pub types: Vec<PermittedType>,
    pub calls: RefCell<Vec<String>>,
    pub replies: RefCell<VecDeque<Result<String, String>>>,
}

impl StubUploader {
    pub fn new() -> Self {
        Self {
            types: vec![PermittedType::image()],
            calls: RefCell::new(Vec::new()),
            replies: RefCell::new(VecDeque::new()),
        }
    }

    pub fn reply(self, reply: Result<String, String>) -> Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Uploader for StubUploader {
    fn permitted_types(&self) -> &[PermittedType] {
        &self.types
    }

    fn upload(&self, file: CandidateFile) -> Pending<Result<String, String>> {
        self.calls.borrow_mut().push(file.name.clone());
        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("https://cdn/{}", file.name)));
        Box::pin(std::future::ready(reply))
    }
}

/// Store that records submitted field maps and replies from a script
pub struct StubStore {
    pub submitted: RefCell<Vec<FormFields>>,
    pub replies: RefCell<VecDeque<Result<(), String>>>,
}

impl StubStore {
    pub fn new() -> Self {
        Self {
            submitted: RefCell::new(Vec::new()),
            replies: RefCell::new(VecDeque::new()),
        }
    }

    pub fn reply(self, reply: Result<(), String>) -> Self {
        self.replies.borrow_mut().push_back(reply);
        self
    }
}

impl FitStore for StubStore {
    fn create_fit(&self, fields: FormFields) -> Pending<Result<(), String>> {
        self.submitted.borrow_mut().push(fields);
        let reply = self.replies.borrow_mut().pop_front().unwrap_or(Ok(()));
        Box::pin(std::future::ready(reply))
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub visits: RefCell<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, path: &str) {
        self.visits.borrow_mut().push(path.to_string());
    }
}

/// Every notifier call, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    Pending(ToastId, String),
    Resolved(ToastId, ToastOutcome),
    Success(String),
    Failure(String),
    Dismissed(ToastId),
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notes: RefCell<Vec<Note>>,
    next: Cell<u64>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> usize {
        self.notes
            .borrow()
            .iter()
            .filter(|n| matches!(n, Note::Success(_) | Note::Resolved(_, ToastOutcome::Success(_))))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.notes
            .borrow()
            .iter()
            .filter(|n| matches!(n, Note::Failure(_) | Note::Resolved(_, ToastOutcome::Failure(_))))
            .count()
    }

    pub fn pendings(&self) -> usize {
        self.notes
            .borrow()
            .iter()
            .filter(|n| matches!(n, Note::Pending(..)))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn pending(&self, message: &str) -> ToastId {
        let id = ToastId(self.next.get());
        self.next.set(id.0 + 1);
        self.notes.borrow_mut().push(Note::Pending(id, message.to_string()));
        id
    }

    fn resolve(&self, id: ToastId, outcome: ToastOutcome) {
        self.notes.borrow_mut().push(Note::Resolved(id, outcome));
    }

    fn success(&self, message: &str) {
        self.notes.borrow_mut().push(Note::Success(message.to_string()));
    }

    fn failure(&self, message: &str) {
        self.notes.borrow_mut().push(Note::Failure(message.to_string()));
    }

    fn dismiss(&self, id: ToastId) {
        self.notes.borrow_mut().push(Note::Dismissed(id));
    }
}

/// In-memory candidate file with `len` zero bytes
pub fn file(name: &str, len: usize) -> CandidateFile {
    CandidateFile::new(name, vec![0u8; len])
}
