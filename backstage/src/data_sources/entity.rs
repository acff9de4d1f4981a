//! Generic entity data source
//!
//! One implementation serves every kind; the [`KindDescriptor`] selects the
//! kind literal, type name and spec fields.

use super::engine::{resolve, FetchOutcome, Resolution};
use super::kinds::KindDescriptor;
use super::model::DataSourceModel;
use super::schema::data_source_schema;
use crate::BackstageProviderData;
use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::Schema;
use tfplug::types::{has_errors, Diagnostic};

pub struct EntityDataSource {
    descriptor: &'static KindDescriptor,
    type_name: String,
    schema: Schema,
    provider_data: Option<BackstageProviderData>,
}

impl EntityDataSource {
    pub fn new(descriptor: &'static KindDescriptor) -> Self {
        Self {
            descriptor,
            type_name: descriptor.type_name(),
            schema: data_source_schema(descriptor),
            provider_data: None,
        }
    }
}

#[async_trait]
impl DataSource for EntityDataSource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name.clone(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: self.schema.clone(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: self.schema.validate(&request.config),
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let diagnostics = self.schema.validate(&request.config);
        if has_errors(&diagnostics) {
            return ReadDataSourceResponse::failed(diagnostics);
        }

        let mut model = match DataSourceModel::from_config(&request.config, self.descriptor) {
            Ok(model) => model,
            Err(e) => {
                return ReadDataSourceResponse::failed(vec![Diagnostic::error(
                    "Invalid configuration",
                    e.to_string(),
                )])
            }
        };

        let Some(provider_data) = &self.provider_data else {
            return ReadDataSourceResponse::failed(vec![Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )]);
        };
        let client = &provider_data.client;

        let Some(name) = model.entity.name.clone() else {
            return ReadDataSourceResponse::failed(vec![Diagnostic::error(
                "Missing required argument",
                "The argument \"name\" is required",
            )]);
        };
        let namespace = model
            .entity
            .namespace
            .get_or_insert_with(|| client.default_namespace().to_string())
            .clone();

        tracing::debug!(
            "Getting {} kind {}/{} from Backstage API",
            self.descriptor.kind_literal(),
            namespace,
            name
        );
        let result = client
            .catalog()
            .entities(self.descriptor.kind)
            .get(&ctx, &name, &namespace)
            .await;

        match resolve(self.descriptor, model, FetchOutcome::from_response(result)) {
            Resolution::Live(model) => ReadDataSourceResponse {
                state: model.to_state(self.descriptor),
                diagnostics,
            },
            Resolution::Fallback { model, warning } => {
                let mut diagnostics = diagnostics;
                diagnostics.push(warning);
                ReadDataSourceResponse {
                    state: model.to_state(self.descriptor),
                    diagnostics,
                }
            }
            Resolution::Failed(error) => {
                let mut diagnostics = diagnostics;
                diagnostics.push(error);
                ReadDataSourceResponse::failed(diagnostics)
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for EntityDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        match request.provider_data {
            Some(data) => match data.downcast_ref::<BackstageProviderData>() {
                Some(provider_data) => {
                    self.provider_data = Some(provider_data.clone());
                    tracing::debug!("Configured {} with provider data", self.type_name);
                }
                None => {
                    tracing::error!("Failed to downcast provider data to BackstageProviderData");
                    diagnostics.push(Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract BackstageProviderData from provider data",
                    ));
                }
            },
            None => {
                tracing::warn!("No provider data provided to {}", self.type_name);
                diagnostics.push(Diagnostic::error(
                    "No provider data",
                    "No provider data was provided to the data source",
                ));
            }
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::Client;
    use crate::data_sources::kinds::{DOMAIN, GROUP};
    use mockito::Server;
    use std::sync::Arc;
    use tfplug::types::{AttributePath, ClientCapabilities, DynamicValue};

    fn read_request(config: serde_json::Value) -> ReadDataSourceRequest {
        ReadDataSourceRequest {
            type_name: "backstage_group".to_string(),
            config: DynamicValue::decode_json(config.to_string().as_bytes()).unwrap(),
            provider_meta: None,
            client_capabilities: ClientCapabilities::default(),
        }
    }

    async fn configured(descriptor: &'static KindDescriptor, url: &str) -> EntityDataSource {
        let mut data_source = EntityDataSource::new(descriptor);
        let response = data_source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(Arc::new(BackstageProviderData::new(
                        Client::new(url, None).unwrap(),
                    ))),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        data_source
    }

    #[tokio::test]
    async fn metadata_and_schema_use_descriptor() {
        let data_source = EntityDataSource::new(&DOMAIN);
        assert_eq!(data_source.type_name(), "backstage_domain");

        let metadata = data_source
            .metadata(Context::new(), DataSourceMetadataRequest)
            .await;
        assert_eq!(metadata.type_name, "backstage_domain");

        let schema = data_source
            .schema(Context::new(), DataSourceSchemaRequest)
            .await;
        assert!(schema.schema.attribute("fallback").is_some());
    }

    #[tokio::test]
    async fn configure_rejects_foreign_provider_data() {
        let mut data_source = EntityDataSource::new(&GROUP);

        let response = data_source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: Some(Arc::new("not provider data".to_string())),
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "Invalid provider data");

        let response = data_source
            .configure(
                Context::new(),
                ConfigureDataSourceRequest {
                    provider_data: None,
                },
            )
            .await;
        assert_eq!(response.diagnostics[0].summary, "No provider data");
    }

    #[tokio::test]
    async fn read_without_configuration_fails() {
        let data_source = EntityDataSource::new(&GROUP);

        let response = data_source
            .read(Context::new(), read_request(serde_json::json!({"name": "g"})))
            .await;
        assert!(response.state.is_null());
        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }

    #[tokio::test]
    async fn invalid_names_fail_before_any_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let data_source = configured(&GROUP, &server.url()).await;
        let response = data_source
            .read(
                Context::new(),
                read_request(serde_json::json!({
                    "name": "a b",
                    "fallback": {"name": "fine"}
                })),
            )
            .await;

        assert!(response.state.is_null());
        assert!(has_errors(&response.diagnostics));
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("name"))
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_defaults_namespace_from_client() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/catalog/entities/by-name/domain/default/payments")
            .with_body(r#"{"apiVersion":"backstage.io/v1alpha1","kind":"Domain","metadata":{"uid":"d-1","name":"payments","namespace":"default"},"spec":{"owner":"team-a"}}"#)
            .create_async()
            .await;

        let data_source = configured(&DOMAIN, &server.url()).await;
        let response = data_source
            .read(
                Context::new(),
                read_request(serde_json::json!({"name": "payments"})),
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state = &response.state;
        assert_eq!(
            state.get_string(&AttributePath::new("namespace")).unwrap(),
            "default"
        );
        assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "d-1");
        assert_eq!(
            state
                .get_string(&AttributePath::new("spec").attribute("owner"))
                .unwrap(),
            "team-a"
        );
        assert!(state.get(&AttributePath::new("fallback")).unwrap().is_null());
        mock.assert_async().await;
    }
}
