/// Collaborator interfaces
///
/// The state machines never talk to the outside world directly. Everything
/// they need is injected through these traits:
/// - uploading a file and the permitted-type configuration (Uploader)
/// - persisting a finished fit (FitStore)
/// - moving the user somewhere else after success (Navigator)
/// - pending/success/failure feedback (Notifier)
///
/// Async calls return `'static` boxed futures so the shell can hand them
/// straight to `iced::Task::perform`.

pub mod local;
pub mod route;
pub mod toast;

#[cfg(test)]
pub mod testing;

use std::future::Future;
use std::pin::Pin;

use crate::config::PermittedType;
use crate::state::upload::CandidateFile;

/// A settled-later collaborator call
pub type Pending<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Accepts a binary file and eventually yields a durable URL
pub trait Uploader {
    /// Permitted-type configuration, consumed at selection time
    fn permitted_types(&self) -> &[PermittedType];

    /// Start an upload. Must eventually settle with the URL or a reason.
    fn upload(&self, file: CandidateFile) -> Pending<Result<String, String>>;
}

/// Persists a submitted fit
pub trait FitStore {
    fn create_fit(&self, fields: FormFields) -> Pending<Result<(), String>>;
}

/// Fire-and-forget navigation
pub trait Navigator {
    fn navigate_to(&self, path: &str);
}

/// Identifies a pending notification so it can be resolved later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(pub u64);

/// How a pending notification ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastOutcome {
    Success(String),
    Failure(String),
}

/// Three-phase user feedback bound to an async call
pub trait Notifier {
    fn pending(&self, message: &str) -> ToastId;
    fn resolve(&self, id: ToastId, outcome: ToastOutcome);
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
    /// Withdraw a pending notification whose call no longer matters
    fn dismiss(&self, id: ToastId);
}

/// Flat, ordered field map handed to the persistence collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    fields: Vec<(String, String)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing any earlier value under the same name
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
