//! Terraform data sources for the Backstage Software Catalog

pub mod api;
pub mod config;
pub mod data_sources;
pub mod provider_data;

pub use provider_data::BackstageProviderData;

use async_trait::async_trait;
use config::ProviderConfig;
use data_sources::{EntityDataSource, KINDS};
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse,
};
use tfplug::types::{has_errors, Diagnostic};

#[derive(Default)]
pub struct BackstageProvider {
    provider_data: Option<BackstageProviderData>,
}

impl BackstageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider_data(&self) -> Option<&BackstageProviderData> {
        self.provider_data.as_ref()
    }
}

#[async_trait]
impl Provider for BackstageProvider {
    fn type_name(&self) -> &str {
        data_sources::kinds::TYPE_NAME_PREFIX
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: config::provider_schema(),
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        tfplug::logging::init_from_env();
        tracing::debug!(
            "Configuring Backstage provider for Terraform {}",
            request.terraform_version
        );

        let diagnostics = config::provider_schema().validate(&request.config);
        if has_errors(&diagnostics) {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        let settings = match ProviderConfig::from_config(&request.config) {
            Ok(settings) => settings,
            Err(diagnostics) => {
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        };

        match api::Client::with_config(settings.client_config()) {
            Ok(client) => {
                tracing::debug!("Backstage client created for {}", client.base_url());
                let data = BackstageProviderData::new(client);
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(data)),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Unable to create Backstage API client",
                    format!("Failed to create API client: {}", e),
                )],
                provider_data: None,
            },
        }
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        KINDS
            .iter()
            .map(|&descriptor| {
                let factory: DataSourceFactory = Box::new(move || {
                    Box::new(EntityDataSource::new(descriptor)) as Box<dyn DataSourceWithConfigure>
                });
                (descriptor.type_name(), factory)
            })
            .collect()
    }
}
