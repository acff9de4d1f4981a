//! Fallback-merge read protocol
//!
//! A read ends in exactly one of three ways: the live entity becomes the
//! state, the user's fallback replica becomes the state, or the read fails.
//! The two sources are never merged field by field.

use super::kinds::{KindDescriptor, FALLBACK_API_VERSION, FALLBACK_ID};
use super::model::{DataSourceModel, EntityModel};
use super::projector::project;
use crate::api::{ApiError, Entity, EntityResponse};
use reqwest::StatusCode;
use tfplug::types::Diagnostic;

/// Result of the single catalog call made by a read
#[derive(Debug)]
pub enum FetchOutcome {
    /// The call succeeded with `200 OK` and the entity was decoded
    Live(Entity),
    /// Anything else; carries the cause shown to the user
    Failed(String),
}

impl FetchOutcome {
    pub fn from_response(result: Result<EntityResponse, ApiError>) -> Self {
        match result {
            Ok(EntityResponse {
                status,
                entity: Some(entity),
            }) if status == StatusCode::OK => FetchOutcome::Live(entity),
            Ok(EntityResponse { status, .. }) if status == StatusCode::OK => {
                FetchOutcome::Failed("catalog returned no entity".to_string())
            }
            Ok(response) => FetchOutcome::Failed(response.status.to_string()),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum Resolution {
    Live(DataSourceModel),
    Fallback {
        model: DataSourceModel,
        warning: Diagnostic,
    },
    Failed(Diagnostic),
}

pub fn resolve(
    descriptor: &KindDescriptor,
    mut model: DataSourceModel,
    outcome: FetchOutcome,
) -> Resolution {
    match outcome {
        FetchOutcome::Live(entity) => {
            let projected = project(descriptor, &entity);
            model.entity = EntityModel {
                name: model.entity.name.take(),
                namespace: model.entity.namespace.take(),
                ..projected
            };
            Resolution::Live(model)
        }
        FetchOutcome::Failed(cause) => {
            let kind = descriptor.kind_literal();
            let summary = format!("Error reading Backstage {} kind", kind);
            let detail = format!(
                "Could not read Backstage {} kind {}/{}: {}",
                kind,
                model.entity.namespace.as_deref().unwrap_or_default(),
                model.entity.name.as_deref().unwrap_or_default(),
                cause
            );

            let Some(fallback) = model.fallback.as_mut() else {
                tracing::error!("{}", detail);
                return Resolution::Failed(Diagnostic::error(summary, detail));
            };

            fallback.id.get_or_insert_with(|| FALLBACK_ID.to_string());
            fallback
                .api_version
                .get_or_insert_with(|| FALLBACK_API_VERSION.to_string());
            fallback.kind.get_or_insert_with(|| kind.to_string());
            model.entity = fallback.clone();

            tracing::warn!("{}; using configured fallback", detail);
            Resolution::Fallback {
                model,
                warning: Diagnostic::warning(summary, detail),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::entity::EntityMetadata;
    use crate::data_sources::kinds::{GROUP, SYSTEM};
    use crate::data_sources::model::MetadataModel;
    use tfplug::types::DiagnosticSeverity;

    fn request(fallback: Option<EntityModel>) -> DataSourceModel {
        DataSourceModel {
            entity: EntityModel {
                name: Some("example-group".to_string()),
                namespace: Some("example-namespace".to_string()),
                ..Default::default()
            },
            fallback,
        }
    }

    fn fallback() -> EntityModel {
        EntityModel {
            name: Some("replica".to_string()),
            namespace: Some("replica-ns".to_string()),
            metadata: Some(MetadataModel {
                title: Some("Replica".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn live_entity() -> Entity {
        Entity {
            api_version: "backstage.io/v1alpha1".to_string(),
            kind: "Group".to_string(),
            metadata: EntityMetadata {
                uid: "live-uid".to_string(),
                name: "example-group".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn live_entity_overrides_fallback() {
        let resolution = resolve(
            &GROUP,
            request(Some(fallback())),
            FetchOutcome::Live(live_entity()),
        );

        let model = match resolution {
            Resolution::Live(model) => model,
            other => panic!("Expected live resolution, got {:?}", other),
        };
        assert_eq!(model.entity.id.as_deref(), Some("live-uid"));
        assert_eq!(model.entity.name.as_deref(), Some("example-group"));
        assert_eq!(model.entity.namespace.as_deref(), Some("example-namespace"));
        assert_eq!(model.entity.metadata.unwrap().title.as_deref(), Some(""));
        assert_eq!(model.fallback, Some(fallback()));
    }

    #[test]
    fn failure_without_fallback_is_fatal() {
        let resolution = resolve(
            &GROUP,
            request(None),
            FetchOutcome::Failed("connection refused".to_string()),
        );

        let diag = match resolution {
            Resolution::Failed(diag) => diag,
            other => panic!("Expected failure, got {:?}", other),
        };
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "Error reading Backstage Group kind");
        assert_eq!(
            diag.detail,
            "Could not read Backstage Group kind example-namespace/example-group: connection refused"
        );
    }

    #[test]
    fn failure_with_fallback_back_fills_identity() {
        let resolution = resolve(
            &SYSTEM,
            request(Some(fallback())),
            FetchOutcome::Failed("404 Not Found".to_string()),
        );

        let (model, warning) = match resolution {
            Resolution::Fallback { model, warning } => (model, warning),
            other => panic!("Expected fallback, got {:?}", other),
        };
        assert_eq!(warning.severity, DiagnosticSeverity::Warning);
        assert_eq!(warning.summary, "Error reading Backstage System kind");
        assert!(warning.detail.ends_with(": 404 Not Found"));

        assert_eq!(model.entity.id.as_deref(), Some(FALLBACK_ID));
        assert_eq!(model.entity.api_version.as_deref(), Some(FALLBACK_API_VERSION));
        assert_eq!(model.entity.kind.as_deref(), Some("System"));
        assert_eq!(model.entity.name.as_deref(), Some("replica"));
        assert_eq!(model.entity.namespace.as_deref(), Some("replica-ns"));
        assert_eq!(
            model.entity.metadata.as_ref().unwrap().title.as_deref(),
            Some("Replica")
        );
        assert_eq!(model.fallback.as_ref(), Some(&model.entity));
    }

    #[test]
    fn explicit_fallback_identity_is_kept() {
        let explicit = EntityModel {
            id: Some("abc".to_string()),
            api_version: Some("v2".to_string()),
            kind: Some("Team".to_string()),
            ..fallback()
        };

        let resolution = resolve(
            &GROUP,
            request(Some(explicit)),
            FetchOutcome::Failed("timeout".to_string()),
        );

        let model = match resolution {
            Resolution::Fallback { model, .. } => model,
            other => panic!("Expected fallback, got {:?}", other),
        };
        assert_eq!(model.entity.id.as_deref(), Some("abc"));
        assert_eq!(model.entity.api_version.as_deref(), Some("v2"));
        assert_eq!(model.entity.kind.as_deref(), Some("Team"));
    }

    #[test]
    fn non_ok_status_and_errors_are_failures() {
        let outcome = FetchOutcome::from_response(Ok(EntityResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            entity: None,
        }));
        assert!(matches!(outcome, FetchOutcome::Failed(ref cause) if cause == "503 Service Unavailable"));

        let outcome = FetchOutcome::from_response(Ok(EntityResponse {
            status: StatusCode::OK,
            entity: None,
        }));
        assert!(matches!(outcome, FetchOutcome::Failed(_)));

        let outcome = FetchOutcome::from_response(Err(ApiError::Cancelled));
        assert!(matches!(outcome, FetchOutcome::Failed(ref cause) if cause.contains("cancelled")));

        let outcome = FetchOutcome::from_response(Ok(EntityResponse {
            status: StatusCode::OK,
            entity: Some(live_entity()),
        }));
        assert!(matches!(outcome, FetchOutcome::Live(_)));
    }

    #[test]
    fn unavailable_catalog_with_fallback_only_warns() {
        let outcome = FetchOutcome::from_response(Ok(EntityResponse {
            status: StatusCode::SERVICE_UNAVAILABLE,
            entity: None,
        }));

        match resolve(&GROUP, request(Some(fallback())), outcome) {
            Resolution::Fallback { warning, .. } => {
                assert!(!warning.is_error());
                assert!(warning.detail.contains("503 Service Unavailable"));
            }
            other => panic!("Expected fallback, got {:?}", other),
        }
    }
}
