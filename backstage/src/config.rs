//! Provider configuration
//!
//! Values set in the provider block win over environment variables.

use crate::api::{ClientConfig, DEFAULT_NAMESPACE};
use std::sync::Arc;
use std::time::Duration;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::NumberRangeValidator;

pub const ENV_BASE_URL: &str = "BACKSTAGE_BASE_URL";
pub const ENV_TOKEN: &str = "BACKSTAGE_TOKEN";
pub const ENV_DEFAULT_NAMESPACE: &str = "BACKSTAGE_DEFAULT_NAMESPACE";
pub const ENV_INSECURE: &str = "BACKSTAGE_INSECURE";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const MAX_TIMEOUT_SECONDS: u64 = 3600;

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub default_namespace: String,
    pub insecure: bool,
    pub timeout_seconds: u64,
}

impl ProviderConfig {
    /// Decode the provider block, falling back to the environment
    pub fn from_config(config: &DynamicValue) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = vec![];

        let base_url = string_setting(config, "base_url", ENV_BASE_URL, &mut diagnostics);
        let token = string_setting(config, "token", ENV_TOKEN, &mut diagnostics);
        let default_namespace = string_setting(
            config,
            "default_namespace",
            ENV_DEFAULT_NAMESPACE,
            &mut diagnostics,
        )
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let insecure = config.value.attr("insecure").as_bool().unwrap_or_else(|| {
            env_setting(ENV_INSECURE)
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(false)
        });

        let timeout_seconds = match config.value.attr("timeout_seconds").as_number() {
            Some(n) if n.fract() == 0.0 && (1.0..=MAX_TIMEOUT_SECONDS as f64).contains(&n) => {
                n as u64
            }
            Some(n) => {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid timeout",
                        format!(
                            "timeout_seconds must be a whole number between 1 and {}, got {}",
                            MAX_TIMEOUT_SECONDS, n
                        ),
                    )
                    .with_attribute(AttributePath::new("timeout_seconds")),
                );
                DEFAULT_TIMEOUT_SECONDS
            }
            None => DEFAULT_TIMEOUT_SECONDS,
        };

        let Some(base_url) = base_url else {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Backstage base URL",
                    format!(
                        "base_url is required (set in provider config or {} env var)",
                        ENV_BASE_URL
                    ),
                )
                .with_attribute(AttributePath::new("base_url")),
            );
            return Err(diagnostics);
        };

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        Ok(Self {
            base_url,
            token,
            default_namespace,
            insecure,
            timeout_seconds,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url.clone())
            .with_default_namespace(self.default_namespace.clone())
            .with_insecure(self.insecure)
            .with_request_timeout(Duration::from_secs(self.timeout_seconds));
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        config
    }
}

fn env_setting(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn string_setting(
    config: &DynamicValue,
    attribute: &str,
    env: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let path = AttributePath::new(attribute);
    match config.get_optional_string(&path) {
        Ok(Some(value)) => Some(value),
        Ok(None) => env_setting(env),
        Err(e) => {
            diagnostics.push(
                Diagnostic::error("Invalid provider configuration", format!("{}: {}", path, e))
                    .with_attribute(path),
            );
            None
        }
    }
}

pub fn provider_schema() -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description("Interact with the Backstage Software Catalog.")
        .attribute(
            AttributeBuilder::string("base_url")
                .description(&format!(
                    "Base URL of the Backstage instance, e.g. https://backstage.example.com. May also be provided via the {} environment variable.",
                    ENV_BASE_URL
                ))
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::string("token")
                .description(&format!(
                    "Bearer token used to authenticate against the catalog API. May also be provided via the {} environment variable.",
                    ENV_TOKEN
                ))
                .optional()
                .sensitive()
                .build(),
        )
        .attribute(
            AttributeBuilder::string("default_namespace")
                .description(&format!(
                    "Namespace used when a data source does not set one. Defaults to `{}`. May also be provided via the {} environment variable.",
                    DEFAULT_NAMESPACE, ENV_DEFAULT_NAMESPACE
                ))
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("insecure", AttributeType::Bool)
                .description("Accept invalid TLS certificates.")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::new("timeout_seconds", AttributeType::Number)
                .description(&format!(
                    "Timeout for a single catalog request, in whole seconds between 1 and {}. Defaults to {}.",
                    MAX_TIMEOUT_SECONDS, DEFAULT_TIMEOUT_SECONDS
                ))
                .optional()
                .validator(Arc::new(NumberRangeValidator {
                    min: Some(1.0),
                    max: Some(MAX_TIMEOUT_SECONDS as f64),
                }))
                .build(),
        )
        .build()
}
