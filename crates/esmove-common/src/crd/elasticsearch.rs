//! ECK Elasticsearch resource
//!
//! esmove never interprets the Elasticsearch spec. Spec and status are kept as
//! opaque JSON maps so every field written by the user survives the copy to
//! the target cluster, including fields added by newer ECK versions.

use std::collections::BTreeMap;

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label ECK puts on every Pod and PVC of an Elasticsearch cluster.
/// The value is the Elasticsearch resource name.
pub const CLUSTER_NAME_LABEL: &str = "elasticsearch.k8s.elastic.co/cluster-name";

/// Annotation ECK writes on the Elasticsearch resource once the cluster has
/// bootstrapped. The value is the Elasticsearch cluster UUID.
pub const CLUSTER_UUID_ANNOTATION: &str = "elasticsearch.k8s.elastic.co/cluster-uuid";

/// Elasticsearch spec, kept verbatim
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "elasticsearch.k8s.elastic.co",
    version = "v1",
    kind = "Elasticsearch",
    plural = "elasticsearches",
    shortname = "es",
    namespaced,
    status = "ElasticsearchStatus"
)]
pub struct ElasticsearchSpec {
    /// All spec fields (version, nodeSets, http, ...)
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Elasticsearch status, kept verbatim
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct ElasticsearchStatus {
    /// All status fields (phase, health, availableNodes, ...)
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Elasticsearch {
    /// Cluster UUID reported by ECK, if the cluster has bootstrapped.
    ///
    /// An empty annotation value counts as absent.
    pub fn cluster_uuid(&self) -> Option<&str> {
        self.annotations()
            .get(CLUSTER_UUID_ANNOTATION)
            .map(String::as_str)
            .filter(|uuid| !uuid.is_empty())
    }

    /// Label selector matching the Pods and PVCs of this cluster
    pub fn cluster_selector(&self) -> String {
        cluster_selector(&self.name_any())
    }
}

/// Label selector matching the Pods and PVCs of the named cluster
pub(crate) fn cluster_selector(name: &str) -> String {
    format!("{}={}", CLUSTER_NAME_LABEL, name)
}
