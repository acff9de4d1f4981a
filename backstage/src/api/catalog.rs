//! Catalog entity lookups

use super::entity::{Entity, EntityKind, EntityResponse};
use super::error::ApiError;
use crate::api::Client;
use reqwest::StatusCode;
use tfplug::Context;

/// Catalog API providing entity lookups
pub struct CatalogApi<'a> {
    client: &'a Client,
}

impl<'a> CatalogApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Lookups for one entity kind
    pub fn entities(&self, kind: EntityKind) -> EntitiesApi<'a> {
        EntitiesApi::new(self.client, kind)
    }
}

/// By-name lookups of a single entity kind
pub struct EntitiesApi<'a> {
    client: &'a Client,
    kind: EntityKind,
}

impl<'a> EntitiesApi<'a> {
    pub fn new(client: &'a Client, kind: EntityKind) -> Self {
        Self { client, kind }
    }

    fn path(&self, name: &str, namespace: &str) -> String {
        format!(
            "/api/catalog/entities/by-name/{}/{}/{}",
            self.kind.path_segment(),
            urlencoding::encode(namespace),
            urlencoding::encode(name)
        )
    }

    /// Fetch one entity. An empty `namespace` means the client's default.
    /// Exactly one request is made; nothing is retried.
    pub async fn get(
        &self,
        ctx: &Context,
        name: &str,
        namespace: &str,
    ) -> Result<EntityResponse, ApiError> {
        let namespace = if namespace.is_empty() {
            self.client.default_namespace()
        } else {
            namespace
        };

        let (status, body) = self.client.get_raw(ctx, &self.path(name, namespace)).await?;

        if status != StatusCode::OK {
            return Ok(EntityResponse {
                status,
                entity: None,
            });
        }

        let entity = serde_json::from_str::<Entity>(&body).map_err(|e| {
            tracing::error!("Failed to deserialize entity: {}, body: {}", e, body);
            ApiError::ParseError(format!("{} {}/{}: {}", self.kind, namespace, name, e))
        })?;

        Ok(EntityResponse {
            status,
            entity: Some(entity),
        })
    }
}
