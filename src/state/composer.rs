/// Fit composer: tags, description and the submit gate
///
/// The composer is not a strict state machine. It only gates one transition,
/// submitting the finished draft, and tracks the outcome of that call so the
/// UI can disable the submit button while a request is outstanding.
use std::rc::Rc;

use tracing::{debug, error, info, warn};

use super::tags::TagSet;
use crate::collab::{FitStore, FormFields, Navigator, Notifier, Pending, ToastId, ToastOutcome};
use crate::error::{FitError, FitResult, RejectReason};

/// What to do when a draft has no uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePolicy {
    /// Submit with an empty `image` field
    #[default]
    Permissive,
    /// Refuse to submit until an upload has succeeded
    RequireImage,
}

impl ImagePolicy {
    pub fn from_require_image(require_image: bool) -> Self {
        if require_image {
            Self::RequireImage
        } else {
            Self::Permissive
        }
    }
}

/// The composite payload, built right before submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitDraft {
    pub description: String,
    pub image_url: Option<String>,
    pub tags: TagSet,
}

impl FitDraft {
    pub fn new(description: impl Into<String>, image_url: Option<&str>, tags: TagSet) -> Self {
        Self {
            description: description.into(),
            image_url: image_url.filter(|url| !url.is_empty()).map(str::to_string),
            tags,
        }
    }

    /// Enforce the image policy
    pub fn check(&self, policy: ImagePolicy) -> FitResult<()> {
        if policy == ImagePolicy::RequireImage && self.image_url.is_none() {
            return Err(FitError::rejected(RejectReason::MissingImage));
        }
        Ok(())
    }

    /// Flat form fields: `description`, `image` (empty when absent), `tags` as JSON
    pub fn to_fields(&self) -> FitResult<FormFields> {
        let mut fields = FormFields::new();
        fields.set("description", self.description.as_str());
        fields.set("image", self.image_url.as_deref().unwrap_or(""));
        fields.set("tags", self.tags.to_json()?);
        Ok(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    InFlight,
    Success,
    Failure { reason: String },
}

/// A settled submission, tagged with its attempt number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCompletion {
    pub attempt: u64,
    pub result: Result<(), String>,
}

pub struct FitComposer {
    description: String,
    tags: TagSet,
    policy: ImagePolicy,
    profile_route: String,
    status: Option<SubmissionResult>,
    /// Attempt number and toast of the outstanding submission
    in_flight: Option<(u64, ToastId)>,
    attempts: u64,
    store: Rc<dyn FitStore>,
    notifier: Rc<dyn Notifier>,
    navigator: Rc<dyn Navigator>,
}

impl FitComposer {
    pub fn new(
        policy: ImagePolicy,
        profile_route: impl Into<String>,
        store: Rc<dyn FitStore>,
        notifier: Rc<dyn Notifier>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self {
            description: String::new(),
            tags: TagSet::new(),
            policy,
            profile_route: profile_route.into(),
            status: None,
            in_flight: None,
            attempts: 0,
            store,
            notifier,
            navigator,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        let added = self.tags.add(tag);
        if added {
            debug!(tag, "tag added");
        }
        added
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.tags.remove(tag);
        if removed {
            debug!(tag, "tag removed");
        }
        removed
    }

    pub fn policy(&self) -> ImagePolicy {
        self.policy
    }

    pub fn status(&self) -> Option<&SubmissionResult> {
        self.status.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Build the draft from current state and hand it to the store.
    ///
    /// Returns the completion future; the shell feeds it back through
    /// `on_submit_settled`.
    pub fn submit(&mut self, image_url: Option<&str>) -> FitResult<Pending<SubmitCompletion>> {
        if self.in_flight.is_some() {
            debug!("submit ignored, request outstanding");
            return Err(FitError::SubmissionInFlight);
        }

        let draft = FitDraft::new(self.description.clone(), image_url, self.tags.clone());
        if let Err(err) = draft.check(self.policy) {
            warn!(%err, "submission blocked");
            self.notifier.failure(&err.to_string());
            return Err(err);
        }
        let fields = draft.to_fields()?;

        self.attempts += 1;
        let attempt = self.attempts;
        let toast = self.notifier.pending("Creating fit...");
        info!(
            attempt,
            tags = draft.tags.len(),
            has_image = draft.image_url.is_some(),
            "submitting fit"
        );

        let create = self.store.create_fit(fields);
        self.in_flight = Some((attempt, toast));
        self.status = Some(SubmissionResult::InFlight);

        Ok(Box::pin(async move {
            SubmitCompletion {
                attempt,
                result: create.await,
            }
        }))
    }

    /// Apply a settled submission; returns false if it was stale
    pub fn on_submit_settled(&mut self, completion: SubmitCompletion) -> bool {
        let toast = match self.in_flight {
            Some((attempt, toast)) if attempt == completion.attempt => toast,
            _ => {
                warn!(attempt = completion.attempt, "dropping stale submit completion");
                return false;
            }
        };
        self.in_flight = None;

        match completion.result {
            Ok(()) => {
                info!(attempt = completion.attempt, "fit created");
                self.notifier.resolve(
                    toast,
                    ToastOutcome::Success("Fit created successfully!".to_string()),
                );
                self.status = Some(SubmissionResult::Success);
                self.navigator.navigate_to(&self.profile_route);
            }
            Err(reason) => {
                let err = FitError::SubmissionFailed {
                    reason: reason.clone(),
                };
                error!(attempt = completion.attempt, %err, "fit not created");
                self.notifier.resolve(
                    toast,
                    ToastOutcome::Failure("Failed to create fit. Please try again.".to_string()),
                );
                self.status = Some(SubmissionResult::Failure { reason });
            }
        }
        true
    }
}

impl std::fmt::Debug for FitComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitComposer")
            .field("description", &self.description)
            .field("tags", &self.tags)
            .field("policy", &self.policy)
            .field("status", &self.status)
            .finish()
    }
}
