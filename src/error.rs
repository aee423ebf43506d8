/// Error taxonomy for the fit composer
///
/// Core failures (selection, upload, submission) are recovered locally by
/// the state machines and surfaced as notifications. The remaining variants
/// cover the ambient layers: settings, file IO, JSON and the SQLite catalog.
use thiserror::Error;

pub type FitResult<T> = Result<T, FitError>;

/// Why a selection (or an image-less submission) was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The picker returned an empty batch
    NoFile,
    /// Extension not in the uploader's permitted types
    UnsupportedType { name: String },
    /// File exceeds the per-type size limit
    TooLarge { name: String, size: u64, limit: u64 },
    /// Submission attempted without an uploaded image under `RequireImage`
    MissingImage,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NoFile => write!(f, "no file selected"),
            RejectReason::UnsupportedType { name } => {
                write!(f, "{} is not a permitted file type", name)
            }
            RejectReason::TooLarge { name, size, limit } => {
                write!(f, "{} is {} bytes, limit is {} bytes", name, size, limit)
            }
            RejectReason::MissingImage => write!(f, "upload an image before submitting"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FitError {
    #[error("selection rejected: {0}")]
    SelectionRejected(RejectReason),

    #[error("upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("submission failed: {reason}")]
    SubmissionFailed { reason: String },

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl FitError {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::SelectionRejected(reason)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(FitError::rejected(RejectReason::NoFile)
            .to_string()
            .starts_with("selection rejected:"));
        assert!(FitError::UploadFailed { reason: "x".into() }
            .to_string()
            .contains("upload failed: x"));
        assert!(FitError::SubmissionFailed { reason: "x".into() }
            .to_string()
            .contains("submission failed: x"));
        assert!(FitError::config("bad").to_string().contains("configuration error: bad"));
    }

    #[test]
    fn too_large_mentions_limit() {
        let reason = RejectReason::TooLarge {
            name: "huge.png".into(),
            size: 10,
            limit: 4,
        };
        let text = reason.to_string();
        assert!(text.contains("huge.png"));
        assert!(text.contains("limit is 4 bytes"));
    }

    #[test]
    fn io_errors_convert() {
        let err: FitError = std::io::Error::other("boom").into();
        assert!(err.to_string().contains("boom"));
    }
}
