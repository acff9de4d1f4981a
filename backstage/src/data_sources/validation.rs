//! Catalog object-name validation for `name` and `namespace`

use regex::Regex;
use std::sync::{Arc, OnceLock};
use tfplug::schema::Validator;
use tfplug::validator::{StringLengthValidator, StringPatternValidator};

pub const ENTITY_NAME_PATTERN: &str = r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$";
pub const ENTITY_NAME_MIN_LENGTH: usize = 1;
pub const ENTITY_NAME_MAX_LENGTH: usize = 63;

fn entity_name_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::disallowed_methods)]
    PATTERN.get_or_init(|| Regex::new(ENTITY_NAME_PATTERN).expect("entity name pattern compiles"))
}

/// Validators attached to every `name` and `namespace` attribute
pub fn entity_name_validators() -> Vec<Arc<dyn Validator>> {
    vec![
        Arc::new(StringLengthValidator::between(
            ENTITY_NAME_MIN_LENGTH,
            ENTITY_NAME_MAX_LENGTH,
        )),
        Arc::new(StringPatternValidator {
            pattern: entity_name_regex().clone(),
            description: "must follow Backstage format restrictions".to_string(),
        }),
    ]
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use tfplug::schema::ValidatorRequest;
    use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

    fn check(value: &str) -> Vec<Diagnostic> {
        entity_name_validators()
            .iter()
            .flat_map(|v| {
                v.validate(ValidatorRequest {
                    config_value: DynamicValue::new(Dynamic::from(value)),
                    path: AttributePath::new("name"),
                })
                .diagnostics
            })
            .collect()
    }

    #[test]
    fn accepts_catalog_names() {
        assert!(check("a").is_empty());
        assert!(check("example-group").is_empty());
        assert!(check("team_a.v2").is_empty());
        assert!(check(&"a".repeat(63)).is_empty());
    }

    #[test]
    fn rejects_empty_name() {
        let diags = check("");
        assert!(!diags.is_empty());
        assert!(diags.iter().all(Diagnostic::is_error));
        assert!(diags.iter().any(|d| d.summary.contains("minimum length")));
    }

    #[test]
    fn rejects_names_longer_than_63_characters() {
        let diags = check(&"a".repeat(64));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("maximum length of 63"));
    }

    #[test]
    fn rejects_names_outside_the_pattern() {
        for bad in ["a b", "-leading", "trailing-", "_x", "x.", "ä"] {
            let diags = check(bad);
            assert_eq!(diags.len(), 1, "{}", bad);
            assert_eq!(
                diags[0].summary,
                "name must follow Backstage format restrictions"
            );
            assert_eq!(diags[0].attribute, Some(AttributePath::new("name")));
        }
    }
}
