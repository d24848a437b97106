//! Common types for esmove: the Elasticsearch resource, errors, kube client
//! helpers and the cancellable poll primitive.

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod kube_utils;
pub mod poll;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
