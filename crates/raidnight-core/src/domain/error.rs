//! Domain-level error taxonomy for raidnight.

/// Failure reported by a fetch collaborator (report API, score source).
///
/// Transient failures are the ones a collaborator already retried; by the
/// time one reaches the builder the retry budget is spent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("transient failure fetching {resource} after {attempts} attempt(s): {reason}")]
    Transient {
        resource: String,
        attempts: u32,
        reason: String,
    },

    #[error("permanent failure fetching {resource}: {reason}")]
    Permanent { resource: String, reason: String },
}

impl FetchError {
    pub fn transient(resource: impl Into<String>, attempts: u32, reason: impl Into<String>) -> Self {
        FetchError::Transient {
            resource: resource.into(),
            attempts,
            reason: reason.into(),
        }
    }

    pub fn permanent(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        FetchError::Permanent {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }
}

/// Raidnight domain errors.
#[derive(Debug, thiserror::Error)]
pub enum RaidnightError {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Zone id or release date lookup miss.
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("unknown difficulty tier: {0}")]
    UnknownDifficulty(u8),

    #[error("unknown difficulty: {0}")]
    UnknownDifficultyName(String),

    #[error("malformed snapshot {path}: {reason}")]
    MalformedSnapshot { path: String, reason: String },

    #[error("malformed report {report}: {reason}")]
    MalformedReport { report: String, reason: String },

    #[error("unknown ranking metric: {0}")]
    UnknownMetric(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for raidnight domain operations.
pub type Result<T> = std::result::Result<T, RaidnightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_kinds_are_distinguishable() {
        let transient = FetchError::transient("report/fights/abc", 6, "503 Service Unavailable");
        let permanent = FetchError::permanent("report/fights/abc", "404 Not Found");
        assert!(transient.is_transient());
        assert!(!permanent.is_transient());
        assert!(transient.to_string().contains("after 6 attempt(s)"));
    }

    #[test]
    fn fetch_error_converts_into_domain_error() {
        let err: RaidnightError = FetchError::permanent("tables/deaths", "bad key").into();
        assert!(matches!(err, RaidnightError::Fetch(_)));
        assert!(err.to_string().contains("tables/deaths"));
    }

    #[test]
    fn malformed_snapshot_names_the_file() {
        let err = RaidnightError::MalformedSnapshot {
            path: "Antorus-Heroic-18-01-10(abc).json".to_string(),
            reason: "missing field `wipes`".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Antorus-Heroic-18-01-10(abc).json"));
        assert!(msg.contains("wipes"));
    }
}
