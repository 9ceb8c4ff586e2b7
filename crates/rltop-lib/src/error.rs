//! Error types for the rltop library

use thiserror::Error;

/// Errors surfaced by the library
#[derive(Debug, Error)]
pub enum RltopError {
    /// A request to the Kubernetes API server failed
    #[error("failed to fetch {context}: {source}")]
    Kube {
        context: &'static str,
        #[source]
        source: kube::Error,
    },

    /// The metrics.k8s.io API group is not served by the cluster
    #[error("metrics API (metrics.k8s.io) not available in the cluster\nPlease ensure metrics-server is installed in your cluster")]
    MetricsApiUnavailable,

    /// A Kubernetes quantity string could not be parsed
    #[error("invalid quantity {0:?}")]
    InvalidQuantity(String),

    /// An unknown sort key was requested
    #[error("invalid sort key {0:?}: the field can be either 'cpu' or 'memory'")]
    InvalidSortKey(String),
}

impl RltopError {
    pub(crate) fn kube(context: &'static str) -> impl FnOnce(kube::Error) -> Self {
        move |source| Self::Kube { context, source }
    }
}

pub type Result<T> = std::result::Result<T, RltopError>;
