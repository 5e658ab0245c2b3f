//! HTTP implementation of the remote store interface.
//!
//! Talks JSON to `/users/{owner}/{collection}[/{id}]` with bearer
//! authentication. The request timeout here is the only bound on a remote
//! call; the sync manager does not impose its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    GoalPayload, MealPayload, RemoteError, RemoteStore, WeightLogPayload, WorkoutPayload,
};
use crate::models::EntityKind;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Deserialize)]
struct CreatedResponse {
    id: String,
}

/// Remote store client backed by the fitness service's REST API.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(server_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: server_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn server_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, owner: &str, kind: EntityKind) -> String {
        format!("{}/users/{}/{}", self.base_url, owner, kind.collection())
    }

    fn record_url(&self, owner: &str, kind: EntityKind, id: &str) -> String {
        format!("{}/{}", self.collection_url(owner, kind), id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn post_create<P: Serialize + Sync>(
        &self,
        owner: &str,
        kind: EntityKind,
        payload: &P,
    ) -> Result<String, RemoteError> {
        let response = self
            .authorize(self.client.post(self.collection_url(owner, kind)))
            .json(payload)
            .send()
            .await
            .map_err(|e| RemoteError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }

        let created: CreatedResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        Ok(created.id)
    }

    async fn put_update<P: Serialize + Sync>(
        &self,
        owner: &str,
        kind: EntityKind,
        id: &str,
        payload: &P,
    ) -> Result<(), RemoteError> {
        let response = self
            .authorize(self.client.put(self.record_url(owner, kind, id)))
            .json(payload)
            .send()
            .await
            .map_err(|e| RemoteError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    async fn send_delete(
        &self,
        owner: &str,
        kind: EntityKind,
        id: &str,
    ) -> Result<(), RemoteError> {
        let response = self
            .authorize(self.client.delete(self.record_url(owner, kind, id)))
            .send()
            .await
            .map_err(|e| RemoteError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create_workout(
        &self,
        owner: &str,
        payload: &WorkoutPayload,
    ) -> Result<String, RemoteError> {
        self.post_create(owner, EntityKind::Workout, payload).await
    }

    async fn update_workout(
        &self,
        owner: &str,
        id: &str,
        payload: &WorkoutPayload,
    ) -> Result<(), RemoteError> {
        self.put_update(owner, EntityKind::Workout, id, payload).await
    }

    async fn delete_workout(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
        self.send_delete(owner, EntityKind::Workout, id).await
    }

    async fn create_meal(
        &self,
        owner: &str,
        payload: &MealPayload,
    ) -> Result<String, RemoteError> {
        self.post_create(owner, EntityKind::Meal, payload).await
    }

    async fn update_meal(
        &self,
        owner: &str,
        id: &str,
        payload: &MealPayload,
    ) -> Result<(), RemoteError> {
        self.put_update(owner, EntityKind::Meal, id, payload).await
    }

    async fn delete_meal(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
        self.send_delete(owner, EntityKind::Meal, id).await
    }

    async fn create_goal(
        &self,
        owner: &str,
        payload: &GoalPayload,
    ) -> Result<String, RemoteError> {
        self.post_create(owner, EntityKind::Goal, payload).await
    }

    async fn update_goal(
        &self,
        owner: &str,
        id: &str,
        payload: &GoalPayload,
    ) -> Result<(), RemoteError> {
        self.put_update(owner, EntityKind::Goal, id, payload).await
    }

    async fn delete_goal(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
        self.send_delete(owner, EntityKind::Goal, id).await
    }

    async fn create_weight_log(
        &self,
        owner: &str,
        payload: &WeightLogPayload,
    ) -> Result<String, RemoteError> {
        self.post_create(owner, EntityKind::WeightLog, payload).await
    }

    async fn update_weight_log(
        &self,
        owner: &str,
        id: &str,
        payload: &WeightLogPayload,
    ) -> Result<(), RemoteError> {
        self.put_update(owner, EntityKind::WeightLog, id, payload).await
    }

    async fn delete_weight_log(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
        self.send_delete(owner, EntityKind::WeightLog, id).await
    }
}

/// Checks whether the remote server is reachable (fast fail).
pub async fn check_remote(server_url: &str) -> bool {
    let url = format!("{}/health", server_url.trim_end_matches('/'));

    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client.get(&url).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
