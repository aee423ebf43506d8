/// Upload session state machine
///
/// Owns the single candidate file of one open form and drives it through
///
/// ```text
/// Empty -> Selected -> Uploading -> Uploaded -> (clear) -> Empty
///                         |
///                         +-> (failed) -> Selected (reason kept, file kept)
/// ```
///
/// Every upload attempt is tagged with a `Generation`. Selecting a new file
/// bumps it, so a completion for an older attempt can never change state.
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collab::{Notifier, Pending, ToastId, ToastOutcome, Uploader};
use crate::config::PermittedType;
use crate::error::{FitError, FitResult, RejectReason};

/// A user-selected file held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// File name only (e.g. "shoe.png")
    pub name: String,
    /// Shared handle to the file contents
    pub bytes: Arc<[u8]>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercase extension without the dot, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Monotonic tag of an upload attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

/// Result of the latest upload attempt as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Pending,
    Succeeded { url: String },
    Failed { reason: String },
}

/// A settled upload, tagged with the attempt it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCompletion {
    pub generation: Generation,
    pub result: Result<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhase {
    Empty,
    Selected {
        file: CandidateFile,
        /// Reason of the last failed attempt on this file
        failure: Option<String>,
    },
    Uploading {
        file: CandidateFile,
        generation: Generation,
        toast: ToastId,
    },
    Uploaded {
        file: CandidateFile,
        url: String,
    },
}

/// Selection-time filter built from the uploader's permitted types
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptFilter {
    types: Vec<PermittedType>,
}

impl AcceptFilter {
    pub fn from_permitted(types: &[PermittedType]) -> Self {
        Self {
            types: types
                .iter()
                .map(|t| PermittedType {
                    kind: t.kind.clone(),
                    extensions: t.extensions.iter().map(|e| e.to_lowercase()).collect(),
                    max_file_size: t.max_file_size,
                })
                .collect(),
        }
    }

    /// Check a file against the filter
    pub fn check(&self, file: &CandidateFile) -> Result<(), RejectReason> {
        let unsupported = || RejectReason::UnsupportedType {
            name: file.name.clone(),
        };
        let ext = file.extension().ok_or_else(unsupported)?;
        let permitted = self
            .types
            .iter()
            .find(|t| t.extensions.iter().any(|e| *e == ext))
            .ok_or_else(unsupported)?;

        if file.size() > permitted.max_file_size {
            return Err(RejectReason::TooLarge {
                name: file.name.clone(),
                size: file.size(),
                limit: permitted.max_file_size,
            });
        }
        Ok(())
    }

    /// (filter name, extensions) pairs for the native file dialog
    pub fn dialog_filters(&self) -> Vec<(String, Vec<String>)> {
        self.types
            .iter()
            .map(|t| (t.kind.clone(), t.extensions.clone()))
            .collect()
    }
}

pub struct UploadSession {
    phase: UploadPhase,
    generation: Generation,
    filter: AcceptFilter,
    uploader: Rc<dyn Uploader>,
    notifier: Rc<dyn Notifier>,
}

impl UploadSession {
    pub fn new(uploader: Rc<dyn Uploader>, notifier: Rc<dyn Notifier>) -> Self {
        let filter = AcceptFilter::from_permitted(uploader.permitted_types());
        Self {
            phase: UploadPhase::Empty,
            generation: Generation::default(),
            filter,
            uploader,
            notifier,
        }
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn accept_filter(&self) -> &AcceptFilter {
        &self.filter
    }

    /// Current generation; completions carrying any other value are stale
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn file(&self) -> Option<&CandidateFile> {
        match &self.phase {
            UploadPhase::Empty => None,
            UploadPhase::Selected { file, .. }
            | UploadPhase::Uploading { file, .. }
            | UploadPhase::Uploaded { file, .. } => Some(file),
        }
    }

    pub fn uploaded_url(&self) -> Option<&str> {
        match &self.phase {
            UploadPhase::Uploaded { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.phase {
            UploadPhase::Selected { failure, .. } => failure.as_deref(),
            _ => None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.phase, UploadPhase::Uploading { .. })
    }

    /// Outcome of the latest attempt, if there has been one
    pub fn outcome(&self) -> Option<UploadOutcome> {
        match &self.phase {
            UploadPhase::Uploading { .. } => Some(UploadOutcome::Pending),
            UploadPhase::Uploaded { url, .. } => Some(UploadOutcome::Succeeded { url: url.clone() }),
            UploadPhase::Selected {
                failure: Some(reason),
                ..
            } => Some(UploadOutcome::Failed {
                reason: reason.clone(),
            }),
            _ => None,
        }
    }

    /// Select a single file, replacing whatever was there before
    pub fn select_file(&mut self, file: CandidateFile) -> FitResult<()> {
        if let Err(reason) = self.filter.check(&file) {
            warn!(file = %file.name, %reason, "selection rejected");
            return Err(FitError::rejected(reason));
        }

        // Anything in flight belongs to the previous file now
        self.withdraw_in_flight();
        self.bump();
        info!(file = %file.name, size = file.size(), "file selected");
        self.phase = UploadPhase::Selected {
            file,
            failure: None,
        };
        Ok(())
    }

    /// Select from a batch; only the first file is retained
    pub fn select_files(&mut self, files: Vec<CandidateFile>) -> FitResult<()> {
        let mut files = files.into_iter();
        let first = files
            .next()
            .ok_or_else(|| FitError::rejected(RejectReason::NoFile))?;
        let dropped = files.count();
        if dropped > 0 {
            warn!(dropped, "multiple files selected, keeping the first");
        }
        self.select_file(first)
    }

    /// Start uploading the selected file.
    ///
    /// Returns the completion future only when a new attempt was started;
    /// in any state other than `Selected` this is a no-op.
    pub fn begin_upload(&mut self) -> Option<Pending<UploadCompletion>> {
        let file = match &self.phase {
            UploadPhase::Selected { file, .. } => file.clone(),
            other => {
                debug!(phase = phase_name(other), "begin_upload ignored");
                return None;
            }
        };

        let generation = self.bump();
        let toast = self
            .notifier
            .pending(&format!("Uploading {}...", file.name));
        info!(file = %file.name, generation = generation.0, "upload started");

        let upload = self.uploader.upload(file.clone());
        self.phase = UploadPhase::Uploading {
            file,
            generation,
            toast,
        };

        Some(Box::pin(async move {
            UploadCompletion {
                generation,
                result: upload.await,
            }
        }))
    }

    /// Route a settled upload to the matching callback
    pub fn on_upload_settled(&mut self, completion: UploadCompletion) -> bool {
        match completion.result {
            Ok(url) => self.on_upload_succeeded(completion.generation, url),
            Err(reason) => self.on_upload_failed(completion.generation, reason),
        }
    }

    /// Upload finished; returns false if the completion was stale
    pub fn on_upload_succeeded(&mut self, generation: Generation, url: String) -> bool {
        let Some((file, toast)) = self.take_uploading(generation) else {
            return false;
        };
        info!(file = %file.name, %url, "upload complete");
        self.notifier.resolve(
            toast,
            ToastOutcome::Success("Image Uploaded Successfully".to_string()),
        );
        self.phase = UploadPhase::Uploaded { file, url };
        true
    }

    /// Upload failed; the file stays selected for an explicit retry
    pub fn on_upload_failed(&mut self, generation: Generation, reason: String) -> bool {
        let Some((file, toast)) = self.take_uploading(generation) else {
            return false;
        };
        let err = FitError::UploadFailed {
            reason: reason.clone(),
        };
        warn!(file = %file.name, %err, "upload attempt ended");
        self.notifier.resolve(
            toast,
            ToastOutcome::Failure("Failed To Upload Image".to_string()),
        );
        self.phase = UploadPhase::Selected {
            file,
            failure: Some(reason),
        };
        true
    }

    /// Discard the uploaded image and start over
    pub fn clear_uploaded(&mut self) -> bool {
        if !matches!(self.phase, UploadPhase::Uploaded { .. }) {
            debug!(phase = phase_name(&self.phase), "clear_uploaded ignored");
            return false;
        }
        self.bump();
        info!("uploaded image discarded");
        self.phase = UploadPhase::Empty;
        true
    }

    /// Drop the session's work before the form goes away. An upload still
    /// in flight is withdrawn and its completion will be ignored.
    pub fn abandon(&mut self) {
        self.withdraw_in_flight();
        self.bump();
        self.phase = UploadPhase::Empty;
    }

    /// Dismiss the pending toast of an upload nobody waits for anymore
    fn withdraw_in_flight(&mut self) {
        if let UploadPhase::Uploading { file, toast, .. } = &self.phase {
            info!(file = %file.name, "in-flight upload superseded");
            self.notifier.dismiss(*toast);
        }
    }

    /// Move out of `Uploading` if `generation` is the live attempt
    fn take_uploading(&mut self, generation: Generation) -> Option<(CandidateFile, ToastId)> {
        match &self.phase {
            UploadPhase::Uploading {
                file,
                generation: live,
                toast,
            } if *live == generation => Some((file.clone(), *toast)),
            _ => {
                warn!(
                    stale = generation.0,
                    current = self.generation.0,
                    "dropping stale upload completion"
                );
                None
            }
        }
    }

    fn bump(&mut self) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        self.generation
    }
}

fn phase_name(phase: &UploadPhase) -> &'static str {
    match phase {
        UploadPhase::Empty => "empty",
        UploadPhase::Selected { .. } => "selected",
        UploadPhase::Uploading { .. } => "uploading",
        UploadPhase::Uploaded { .. } => "uploaded",
    }
}

impl std::fmt::Debug for UploadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSession")
            .field("phase", &phase_name(&self.phase))
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::testing::{file, RecordingNotifier, StubUploader};
    use crate::collab::toast::{ToastBoard, ToastKind};
    use std::time::{Duration, Instant};

    fn session(uploader: StubUploader) -> (UploadSession, Rc<StubUploader>, Rc<RecordingNotifier>) {
        let uploader = Rc::new(uploader);
        let notifier = Rc::new(RecordingNotifier::default());
        let session = UploadSession::new(uploader.clone(), notifier.clone());
        (session, uploader, notifier)
    }

    #[tokio::test]
    async fn shoe_scenario_uploads_then_clears() {
        let (mut s, uploader, notifier) =
            session(StubUploader::new().reply(Ok("https://cdn/x.png".into())));

        s.select_file(file("shoe.png", 10)).unwrap();
        assert!(matches!(s.phase(), UploadPhase::Selected { .. }));

        let pending = s.begin_upload().expect("upload should start");
        assert!(s.is_uploading());
        assert_eq!(s.outcome(), Some(UploadOutcome::Pending));

        let completion = pending.await;
        assert!(s.on_upload_settled(completion));
        assert_eq!(s.uploaded_url(), Some("https://cdn/x.png"));
        assert_eq!(
            s.outcome(),
            Some(UploadOutcome::Succeeded {
                url: "https://cdn/x.png".into()
            })
        );
        assert_eq!(uploader.call_count(), 1);
        assert_eq!(notifier.pendings(), 1);
        assert_eq!(notifier.successes(), 1);

        assert!(s.clear_uploaded());
        assert_eq!(s.phase(), &UploadPhase::Empty);
        assert_eq!(s.uploaded_url(), None);
    }

    #[test]
    fn latest_selection_wins() {
        let (mut s, _, _) = session(StubUploader::new());
        for name in ["a.png", "b.jpg", "c.webp"] {
            s.select_file(file(name, 1)).unwrap();
        }
        assert_eq!(s.file().map(|f| f.name.as_str()), Some("c.webp"));
    }

    #[test]
    fn batch_keeps_only_first() {
        let (mut s, _, _) = session(StubUploader::new());
        s.select_files(vec![file("first.png", 1), file("second.png", 1)])
            .unwrap();
        assert_eq!(s.file().map(|f| f.name.as_str()), Some("first.png"));
    }

    #[test]
    fn empty_batch_is_rejected_and_state_kept() {
        let (mut s, _, _) = session(StubUploader::new());
        s.select_file(file("keep.png", 1)).unwrap();

        let err = s.select_files(Vec::new()).unwrap_err();
        assert!(matches!(err, FitError::SelectionRejected(RejectReason::NoFile)));
        assert_eq!(s.file().map(|f| f.name.as_str()), Some("keep.png"));
    }

    #[test]
    fn wrong_type_rejected_at_selection() {
        let (mut s, _, _) = session(StubUploader::new());
        let err = s.select_file(file("notes.txt", 1)).unwrap_err();
        assert!(matches!(
            err,
            FitError::SelectionRejected(RejectReason::UnsupportedType { .. })
        ));
        assert_eq!(s.phase(), &UploadPhase::Empty);

        let err = s.select_file(file("no_extension", 1)).unwrap_err();
        assert!(matches!(
            err,
            FitError::SelectionRejected(RejectReason::UnsupportedType { .. })
        ));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let (mut s, _, _) = session(StubUploader::new());
        assert!(s.select_file(file("SHOUTY.PNG", 1)).is_ok());
    }

    #[test]
    fn oversized_file_rejected() {
        let mut uploader = StubUploader::new();
        uploader.types[0].max_file_size = 4;
        let (mut s, _, _) = session(uploader);

        let err = s.select_file(file("big.png", 5)).unwrap_err();
        assert!(matches!(
            err,
            FitError::SelectionRejected(RejectReason::TooLarge { size: 5, limit: 4, .. })
        ));
        assert!(s.select_file(file("ok.png", 4)).is_ok());
    }

    #[test]
    fn begin_upload_needs_a_selection() {
        let (mut s, uploader, notifier) = session(StubUploader::new());
        assert!(s.begin_upload().is_none());
        assert_eq!(s.phase(), &UploadPhase::Empty);
        assert_eq!(uploader.call_count(), 0);
        assert_eq!(notifier.pendings(), 0);
    }

    #[test]
    fn repeated_begin_upload_invokes_once() {
        let (mut s, uploader, notifier) = session(StubUploader::new());
        s.select_file(file("shoe.png", 1)).unwrap();

        assert!(s.begin_upload().is_some());
        assert!(s.begin_upload().is_none());
        assert!(s.begin_upload().is_none());
        assert_eq!(uploader.call_count(), 1);
        assert_eq!(notifier.pendings(), 1);
    }

    #[tokio::test]
    async fn stale_completion_is_dropped() {
        let (mut s, _, notifier) = session(StubUploader::new());
        s.select_file(file("old.png", 1)).unwrap();
        let stale = s.begin_upload().unwrap().await;

        s.select_file(file("new.png", 1)).unwrap();
        assert!(!s.on_upload_settled(stale));

        assert!(matches!(
            s.phase(),
            UploadPhase::Selected { file: f, failure: None } if f.name == "new.png"
        ));
        assert_eq!(notifier.successes(), 0);
    }

    #[tokio::test]
    async fn superseded_upload_leaves_no_pending_toast() {
        let board = Rc::new(ToastBoard::new());
        let mut s = UploadSession::new(Rc::new(StubUploader::new()), board.clone());

        s.select_file(file("old.png", 1)).unwrap();
        let stale = s.begin_upload().unwrap();
        assert_eq!(board.visible()[0].kind, ToastKind::Pending);

        s.select_file(file("new.png", 1)).unwrap();
        assert!(!s.on_upload_settled(stale.await));

        board.expire(Instant::now() + Duration::from_secs(3600));
        assert!(board.is_empty(), "left behind: {:?}", board.visible());
    }

    #[test]
    fn abandon_withdraws_in_flight_upload() {
        let board = Rc::new(ToastBoard::new());
        let mut s = UploadSession::new(Rc::new(StubUploader::new()), board.clone());

        s.select_file(file("shoe.png", 1)).unwrap();
        let _pending = s.begin_upload().unwrap();
        s.abandon();

        assert_eq!(s.phase(), &UploadPhase::Empty);
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn stale_completion_after_reupload_is_dropped() {
        let (mut s, _, _) = session(StubUploader::new());
        s.select_file(file("a.png", 1)).unwrap();
        let first = s.begin_upload().unwrap().await;

        s.select_file(file("b.png", 1)).unwrap();
        let second = s.begin_upload().unwrap();

        assert!(!s.on_upload_settled(first));
        assert!(s.is_uploading());
        assert!(s.on_upload_settled(second.await));
        assert_eq!(s.uploaded_url(), Some("https://cdn/b.png"));
    }

    #[tokio::test]
    async fn failure_keeps_file_for_retry() {
        let (mut s, uploader, notifier) = session(
            StubUploader::new()
                .reply(Err("network down".into()))
                .reply(Ok("https://cdn/retry.png".into())),
        );
        s.select_file(file("retry.png", 1)).unwrap();

        let failed = s.begin_upload().unwrap().await;
        assert!(s.on_upload_settled(failed));
        assert_eq!(s.failure_reason(), Some("network down"));
        assert_eq!(s.file().map(|f| f.name.as_str()), Some("retry.png"));
        assert_eq!(
            s.outcome(),
            Some(UploadOutcome::Failed {
                reason: "network down".into()
            })
        );
        assert_eq!(notifier.failures(), 1);

        let ok = s.begin_upload().expect("retry allowed").await;
        assert!(s.on_upload_settled(ok));
        assert_eq!(s.uploaded_url(), Some("https://cdn/retry.png"));
        assert_eq!(uploader.call_count(), 2);
    }

    #[tokio::test]
    async fn new_selection_clears_failure() {
        let (mut s, _, _) = session(StubUploader::new().reply(Err("nope".into())));
        s.select_file(file("a.png", 1)).unwrap();
        let failed = s.begin_upload().unwrap().await;
        s.on_upload_settled(failed);
        assert!(s.failure_reason().is_some());

        s.select_file(file("b.png", 1)).unwrap();
        assert_eq!(s.failure_reason(), None);
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn clear_only_from_uploaded() {
        let (mut s, _, _) = session(StubUploader::new());
        assert!(!s.clear_uploaded());
        s.select_file(file("a.png", 1)).unwrap();
        assert!(!s.clear_uploaded());
        assert!(s.file().is_some());
    }

    #[tokio::test]
    async fn selecting_after_upload_drops_url() {
        let (mut s, _, _) = session(StubUploader::new());
        s.select_file(file("a.png", 1)).unwrap();
        let done = s.begin_upload().unwrap().await;
        s.on_upload_settled(done);
        assert!(s.uploaded_url().is_some());

        s.select_file(file("b.png", 1)).unwrap();
        assert_eq!(s.uploaded_url(), None);
        assert!(matches!(s.phase(), UploadPhase::Selected { .. }));
    }

    #[test]
    fn uploading_never_entered_without_file() {
        let (mut s, _, _) = session(StubUploader::new());
        let _ = s.select_file(file("bad.exe", 1));
        assert!(s.begin_upload().is_none());
        assert!(!s.is_uploading());
    }

    #[test]
    fn dialog_filters_follow_permitted_types() {
        let (s, _, _) = session(StubUploader::new());
        let filters = s.accept_filter().dialog_filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].0, "image");
        assert!(filters[0].1.contains(&"png".to_string()));
    }
}
