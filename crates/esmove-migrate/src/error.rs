//! Error types for Elasticsearch migration

use esmove_common::kube_utils::is_not_found;
use esmove_common::poll::PollError;
use thiserror::Error;

/// Errors from a migration run
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Kubernetes API error
    #[error("kube error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// A resource required by the migration does not exist
    #[error("{kind} {name} not found")]
    NotFound {
        /// Kubernetes kind
        kind: String,
        /// Object name, `namespace/name` for namespaced kinds
        name: String,
    },

    /// The Elasticsearch cluster has no PersistentVolumeClaim
    #[error("no PVC found for Elasticsearch {namespace}/{name}")]
    NoClaims {
        /// Elasticsearch namespace
        namespace: String,
        /// Elasticsearch name
        name: String,
    },

    /// A PersistentVolumeClaim is not bound to any volume
    #[error("PVC {namespace}/{name} has no spec.volumeName")]
    ClaimWithoutVolume {
        /// PVC namespace
        namespace: String,
        /// PVC name
        name: String,
    },

    /// A PersistentVolume carries no claim reference to rebind with
    #[error("spec.claimRef is nil on PV {name}")]
    VolumeWithoutClaimRef {
        /// PV name
        name: String,
    },

    /// An object is missing metadata the migration relies on
    #[error("invalid {kind}: {message}")]
    InvalidObject {
        /// Kubernetes kind
        kind: String,
        /// Description of what is missing
        message: String,
    },

    /// Recreation failed after some volumes were already created on the target
    #[error("recreation failed after creating PVs {created:?} in target cluster: {source}")]
    PartialRecreate {
        /// PVs that exist in the target cluster and were not cleaned up
        created: Vec<String>,
        /// Error that stopped the recreation
        #[source]
        source: Box<MigrateError>,
    },

    /// A poll ran out of attempts
    #[error("{description}: not done after {attempts} attempts")]
    Timeout {
        /// What was being waited for
        description: String,
        /// Number of attempts made
        attempts: u32,
    },

    /// The target cluster reports a different cluster UUID than the source
    #[error("expected cluster UUID {expected}, got {actual}")]
    IdentityMismatch {
        /// UUID recorded on the source Elasticsearch
        expected: String,
        /// UUID reported on the target Elasticsearch
        actual: String,
    },

    /// The migration was cancelled
    #[error("migration cancelled during {during}")]
    Cancelled {
        /// Step or wait that was interrupted
        during: String,
    },
}

impl MigrateError {
    /// Create a not found error
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an invalid object error
    pub fn invalid_object(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidObject {
            kind: kind.into(),
            message: msg.into(),
        }
    }

    /// Check if this error means the object does not exist.
    ///
    /// Only deletion and polling paths may treat this as a non-error.
    pub fn is_not_found(&self) -> bool {
        match self {
            MigrateError::Kube { source } => is_not_found(source),
            MigrateError::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this error is a poll budget running out
    pub fn is_timeout(&self) -> bool {
        matches!(self, MigrateError::Timeout { .. })
    }
}

impl From<PollError<MigrateError>> for MigrateError {
    fn from(err: PollError<MigrateError>) -> Self {
        match err {
            PollError::Exhausted {
                description,
                attempts,
            } => MigrateError::Timeout {
                description,
                attempts,
            },
            PollError::Cancelled { description } => MigrateError::Cancelled {
                during: description,
            },
            PollError::Check(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> MigrateError {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "test".to_string(),
            reason: "Test".to_string(),
            code,
        })
        .into()
    }

    #[test]
    fn test_error_display() {
        let err = MigrateError::NoClaims {
            namespace: "ns".to_string(),
            name: "es1".to_string(),
        };
        assert_eq!(err.to_string(), "no PVC found for Elasticsearch ns/es1");

        let err = MigrateError::ClaimWithoutVolume {
            namespace: "ns".to_string(),
            name: "data-es1-0".to_string(),
        };
        assert_eq!(err.to_string(), "PVC ns/data-es1-0 has no spec.volumeName");

        let err = MigrateError::IdentityMismatch {
            expected: "uuid-123".to_string(),
            actual: "uuid-999".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "expected cluster UUID uuid-123, got uuid-999"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(api_error(404).is_not_found());
        assert!(MigrateError::not_found("Elasticsearch", "ns/es1").is_not_found());

        assert!(!api_error(409).is_not_found());
        assert!(!api_error(500).is_not_found());
        assert!(!MigrateError::Timeout {
            description: "pods".to_string(),
            attempts: 30
        }
        .is_not_found());
    }

    #[test]
    fn poll_errors_map_onto_the_taxonomy() {
        let err: MigrateError = PollError::<MigrateError>::Exhausted {
            description: "pods running".to_string(),
            attempts: 30,
        }
        .into();
        assert!(err.is_timeout());

        let err: MigrateError = PollError::<MigrateError>::Cancelled {
            description: "pods running".to_string(),
        }
        .into();
        assert!(matches!(err, MigrateError::Cancelled { .. }));

        let err: MigrateError = PollError::Check(MigrateError::IdentityMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        })
        .into();
        assert!(matches!(err, MigrateError::IdentityMismatch { .. }));
    }

    #[test]
    fn partial_recreate_lists_created_volumes() {
        let err = MigrateError::PartialRecreate {
            created: vec!["pv-1".to_string()],
            source: Box::new(api_error(500)),
        };
        assert!(err.to_string().starts_with(
            "recreation failed after creating PVs [\"pv-1\"] in target cluster"
        ));
    }
}
