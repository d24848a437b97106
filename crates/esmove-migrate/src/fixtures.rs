//! Object builders shared by the step tests

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use k8s_openapi::api::core::v1::{
    ObjectReference, PersistentVolume, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeSpec, PersistentVolumeStatus, Pod, PodStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference, Time};

use esmove_common::crd::{
    Elasticsearch, ElasticsearchSpec, ElasticsearchStatus, CLUSTER_NAME_LABEL,
    CLUSTER_UUID_ANNOTATION,
};
use esmove_common::poll::PollConfig;

use crate::client::MockClusterClient;
use crate::context::{ElasticsearchRef, MigrationConfig, MigrationContext};
use crate::error::MigrateError;

pub(crate) const NS: &str = "ns";
pub(crate) const ES_NAME: &str = "es1";

fn labels() -> Option<BTreeMap<String, String>> {
    Some(BTreeMap::from([(
        CLUSTER_NAME_LABEL.to_string(),
        ES_NAME.to_string(),
    )]))
}

/// Elasticsearch as read back from a live cluster
pub(crate) fn elasticsearch(uuid: Option<&str>) -> Elasticsearch {
    let mut es = Elasticsearch::new(ES_NAME, ElasticsearchSpec::default());
    es.metadata = ObjectMeta {
        name: Some(ES_NAME.to_string()),
        namespace: Some(NS.to_string()),
        uid: Some("es-uid".to_string()),
        resource_version: Some("1001".to_string()),
        creation_timestamp: Some(Time(Default::default())),
        annotations: uuid.map(|u| {
            BTreeMap::from([(CLUSTER_UUID_ANNOTATION.to_string(), u.to_string())])
        }),
        owner_references: Some(vec![OwnerReference {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
            name: "owner".to_string(),
            uid: "owner-uid".to_string(),
            ..Default::default()
        }]),
        ..Default::default()
    };
    es.spec
        .fields
        .insert("version".to_string(), serde_json::json!("8.15.0"));
    es.status = Some(ElasticsearchStatus {
        fields: BTreeMap::from([("phase".to_string(), serde_json::json!("Ready"))]),
    });
    es
}

pub(crate) fn pod(name: &str, phase: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NS.to_string()),
            labels: labels(),
            ..Default::default()
        },
        status: Some(PodStatus {
            phase: Some(phase.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn pvc(name: &str, volume: Option<&str>) -> PersistentVolumeClaim {
    PersistentVolumeClaim {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NS.to_string()),
            labels: labels(),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            volume_name: volume.map(str::to_string),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn pv(name: &str, policy: &str, claim: Option<&str>) -> PersistentVolume {
    PersistentVolume {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            uid: Some(format!("{}-uid", name)),
            resource_version: Some("2002".to_string()),
            creation_timestamp: Some(Time(Default::default())),
            ..Default::default()
        },
        spec: Some(PersistentVolumeSpec {
            persistent_volume_reclaim_policy: Some(policy.to_string()),
            claim_ref: claim.map(|c| ObjectReference {
                kind: Some("PersistentVolumeClaim".to_string()),
                api_version: Some("v1".to_string()),
                namespace: Some(NS.to_string()),
                name: Some(c.to_string()),
                uid: Some(format!("{}-uid", c)),
                resource_version: Some("3003".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        status: Some(PersistentVolumeStatus {
            phase: Some("Bound".to_string()),
            ..Default::default()
        }),
    }
}

pub(crate) fn api_error(code: u16) -> MigrateError {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("HTTP {}", code),
        reason: if code == 404 { "NotFound" } else { "InternalError" }.to_string(),
        code,
    })
    .into()
}

pub(crate) fn fast_poll(max_attempts: u32) -> PollConfig {
    PollConfig::new(Duration::from_millis(1), max_attempts)
}

pub(crate) fn context(source: MockClusterClient, target: MockClusterClient) -> MigrationContext {
    let config = MigrationConfig::new(ElasticsearchRef::new(NS, ES_NAME)).with_poll(fast_poll(3));
    MigrationContext::new(Arc::new(source), Arc::new(target), config)
}
