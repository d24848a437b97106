//! Error types shared by the esmove crates
//!
//! These cover client construction and connectivity. Migration-specific
//! failures live in `esmove_migrate::MigrateError`.

use thiserror::Error;

/// Errors raised while building or probing a cluster client
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Kubeconfig could not be read or the context could not be resolved
    #[error("kubeconfig error for context {context}: {message}")]
    Kubeconfig {
        /// Kubeconfig context being resolved
        context: String,
        /// Description of what failed
        message: String,
    },

    /// Cluster is unreachable or does not serve the Elasticsearch API
    #[error("cluster {context} is not reachable: {message}")]
    Connectivity {
        /// Kubeconfig context of the cluster
        context: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create a kubeconfig error for the given context
    pub fn kubeconfig(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Kubeconfig {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Create a connectivity error for the given context
    pub fn connectivity(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connectivity {
            context: context.into(),
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kubeconfig_error_names_the_context() {
        let err = Error::kubeconfig("prod-eu", "context not found");
        assert_eq!(
            err.to_string(),
            "kubeconfig error for context prod-eu: context not found"
        );
    }

    #[test]
    fn connectivity_error_names_the_context() {
        let err = Error::connectivity("staging", "connection refused");
        assert_eq!(
            err.to_string(),
            "cluster staging is not reachable: connection refused"
        );
    }

    #[test]
    fn kube_errors_convert() {
        let kube_err = kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        });
        let err: Error = kube_err.into();
        assert!(matches!(err, Error::Kube { .. }));
    }
}
