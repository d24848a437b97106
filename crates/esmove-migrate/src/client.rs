//! Cluster endpoint abstraction
//!
//! A migration talks to two clusters: the source it moves away from and the
//! target it moves to. Both are reached through [`ClusterClient`], so tests
//! can swap either side for a mock or an in-memory fake.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim, Pod};
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use kube::{Client, ResourceExt};
#[cfg(test)]
use mockall::automock;

use esmove_common::crd::Elasticsearch;

use crate::error::MigrateError;

/// Operations the migration performs against one cluster.
///
/// Getters return `Ok(None)` for absent objects. Deleters return the API
/// error untouched, callers decide whether "not found" is acceptable.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Get an Elasticsearch resource
    async fn get_elasticsearch(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Elasticsearch>, MigrateError>;

    /// Create an Elasticsearch resource
    async fn create_elasticsearch(&self, es: &Elasticsearch) -> Result<(), MigrateError>;

    /// Delete an Elasticsearch resource
    async fn delete_elasticsearch(&self, namespace: &str, name: &str) -> Result<(), MigrateError>;

    /// List Pods matching a label selector
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>, MigrateError>;

    /// Get a Pod
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, MigrateError>;

    /// Delete a Pod immediately, skipping its grace period and preStop hook
    async fn force_delete_pod(&self, namespace: &str, name: &str) -> Result<(), MigrateError>;

    /// List PersistentVolumeClaims matching a label selector
    async fn list_pvcs(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, MigrateError>;

    /// Get a PersistentVolume
    async fn get_pv(&self, name: &str) -> Result<Option<PersistentVolume>, MigrateError>;

    /// Replace a PersistentVolume with a full object update
    async fn replace_pv(&self, pv: &PersistentVolume) -> Result<(), MigrateError>;

    /// Create a PersistentVolume
    async fn create_pv(&self, pv: &PersistentVolume) -> Result<(), MigrateError>;

    /// Delete a PersistentVolume object
    async fn delete_pv(&self, name: &str) -> Result<(), MigrateError>;
}

/// [`ClusterClient`] backed by a kube-rs client
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Wrap a kube client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn get_elasticsearch(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Elasticsearch>, MigrateError> {
        let api: Api<Elasticsearch> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn create_elasticsearch(&self, es: &Elasticsearch) -> Result<(), MigrateError> {
        let namespace = es.namespace().ok_or_else(|| {
            MigrateError::invalid_object(
                "Elasticsearch",
                format!("{} has no namespace", es.name_any()),
            )
        })?;
        let api: Api<Elasticsearch> = Api::namespaced(self.client.clone(), &namespace);
        api.create(&PostParams::default(), es).await?;
        Ok(())
    }

    async fn delete_elasticsearch(&self, namespace: &str, name: &str) -> Result<(), MigrateError> {
        let api: Api<Elasticsearch> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>, MigrateError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default().labels(selector)).await?;
        Ok(pods.items)
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, MigrateError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn force_delete_pod(&self, namespace: &str, name: &str) -> Result<(), MigrateError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = DeleteParams {
            grace_period_seconds: Some(0),
            ..Default::default()
        };
        api.delete(name, &params).await?;
        Ok(())
    }

    async fn list_pvcs(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<PersistentVolumeClaim>, MigrateError> {
        let api: Api<PersistentVolumeClaim> = Api::namespaced(self.client.clone(), namespace);
        let pvcs = api.list(&ListParams::default().labels(selector)).await?;
        Ok(pvcs.items)
    }

    async fn get_pv(&self, name: &str) -> Result<Option<PersistentVolume>, MigrateError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        Ok(api.get_opt(name).await?)
    }

    async fn replace_pv(&self, pv: &PersistentVolume) -> Result<(), MigrateError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        api.replace(&pv.name_any(), &PostParams::default(), pv).await?;
        Ok(())
    }

    async fn create_pv(&self, pv: &PersistentVolume) -> Result<(), MigrateError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        api.create(&PostParams::default(), pv).await?;
        Ok(())
    }

    async fn delete_pv(&self, name: &str) -> Result<(), MigrateError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}
