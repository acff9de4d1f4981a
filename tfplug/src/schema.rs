//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining provider and data
//! source schemas, including attribute types, nested attributes and
//! validation.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::BTreeMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
/// This must match Terraform's type system exactly
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),                // Ordered, allows duplicates
    Set(Box<AttributeType>),                 // Unordered, no duplicates
    Map(Box<AttributeType>),                 // String keys only
    Object(BTreeMap<String, AttributeType>), // Fixed structure
}

/// Schema is returned by providers and data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64, // Increment when schema changes require migration
    pub block: Block, // Root block containing all attributes
}

impl Schema {
    /// Find a top-level attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.iter().find(|a| a.name == name)
    }

    /// Check a configuration against the schema: required attributes must be
    /// present and every attribute validator runs on its (non-null) value.
    /// Nested attributes are checked only when their parent object is set.
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        validate_attributes(
            &self.block.attributes,
            &config.value,
            &AttributePath::root(),
            &mut diagnostics,
        );
        diagnostics
    }
}

fn validate_attributes(
    attributes: &[Attribute],
    object: &Dynamic,
    path: &AttributePath,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for attribute in attributes {
        let attribute_path = path.clone().attribute(&attribute.name);
        let value = object.attr(&attribute.name);

        if matches!(value, Dynamic::Unknown) {
            continue;
        }

        if value.is_null() {
            if attribute.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required", attribute_path),
                    )
                    .with_attribute(attribute_path),
                );
            }
            continue;
        }

        for validator in &attribute.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: DynamicValue::new(value.clone()),
                path: attribute_path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }

        if let Some(nested) = &attribute.nested_type {
            match nested.nesting {
                ObjectNestingMode::Single => {
                    validate_attributes(&nested.attributes, value, &attribute_path, diagnostics)
                }
                ObjectNestingMode::List | ObjectNestingMode::Set => {
                    for (idx, element) in value.as_list().unwrap_or_default().iter().enumerate() {
                        validate_attributes(
                            &nested.attributes,
                            element,
                            &attribute_path.clone().index(idx as i64),
                            diagnostics,
                        );
                    }
                }
                ObjectNestingMode::Map => {
                    for (key, element) in value.as_map().into_iter().flatten() {
                        validate_attributes(
                            &nested.attributes,
                            element,
                            &attribute_path.clone().key(key),
                            diagnostics,
                        );
                    }
                }
                ObjectNestingMode::Invalid => {}
            }
        }
    }
}

/// Block represents a configuration block
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub description: String,
    pub description_kind: StringKind,
    pub deprecated: bool,
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub nested_type: Option<NestedType>,
    pub deprecated: bool,
}

// Manual Debug implementation since validators don't implement Debug
impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field("nested_type", &self.nested_type)
            .field("deprecated", &self.deprecated)
            .finish()
    }
}

/// NestedType for attributes with nested structures
#[derive(Debug, Clone)]
pub struct NestedType {
    pub attributes: Vec<Attribute>,
    pub nesting: ObjectNestingMode,
}

impl NestedType {
    pub fn single(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::Single,
        }
    }

    pub fn list(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            nesting: ObjectNestingMode::List,
        }
    }

    /// The value type implied by the nested attributes and nesting mode
    pub fn value_type(&self) -> AttributeType {
        let object = AttributeType::Object(
            self.attributes
                .iter()
                .map(|a| (a.name.clone(), a.r#type.clone()))
                .collect(),
        );
        match self.nesting {
            ObjectNestingMode::List => AttributeType::List(Box::new(object)),
            ObjectNestingMode::Set => AttributeType::Set(Box::new(object)),
            ObjectNestingMode::Map => AttributeType::Map(Box::new(object)),
            ObjectNestingMode::Single | ObjectNestingMode::Invalid => object,
        }
    }
}

/// ObjectNestingMode for nested attribute objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectNestingMode {
    Invalid,
    Single,
    List,
    Set,
    Map,
}

/// StringKind represents the format of string values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringKind {
    Plain,
    Markdown,
}

/// Validator performs validation on attribute values during planning
/// Implement this for custom validation logic
pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;
    /// Perform validation
    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse;
}

/// Request for validators
pub struct ValidatorRequest {
    pub config_value: DynamicValue,
    pub path: AttributePath,
}

/// Response from validators
pub struct ValidatorResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// AttributeBuilder provides fluent API for building attributes
/// Use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    /// Create a new attribute builder
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                nested_type: None,
                deprecated: false,
            },
        }
    }

    /// Shorthand for a string attribute
    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    /// Attribute whose value is described by nested attributes
    pub fn nested(name: &str, nested: NestedType) -> Self {
        Self::new(name, nested.value_type()).nested_type(nested)
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    /// Mark as computed
    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.attribute.deprecated = true;
        self
    }

    /// Add validator
    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.attribute.validators.push(validator);
        self
    }

    /// Set nested type
    pub fn nested_type(mut self, nested: NestedType) -> Self {
        self.attribute.r#type = nested.value_type();
        self.attribute.nested_type = Some(nested);
        self
    }

    /// Finalize the attribute
    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block {
                    version: 0,
                    attributes: Vec::new(),
                    description: String::new(),
                    description_kind: StringKind::Plain,
                    deprecated: false,
                },
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    /// Add attribute
    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    /// Set description
    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    /// Set description kind
    pub fn description_kind(mut self, kind: StringKind) -> Self {
        self.schema.block.description_kind = kind;
        self
    }

    /// Mark as deprecated
    pub fn deprecated(mut self) -> Self {
        self.schema.block.deprecated = true;
        self
    }

    /// Finalize the schema
    pub fn build(self) -> Schema {
        self.schema
    }
}

impl std::default::Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectValue(&'static str);

    impl Validator for RejectValue {
        fn description(&self) -> String {
            format!("must not be {}", self.0)
        }

        fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
            let mut diagnostics = vec![];
            if request.config_value.value.as_str() == Some(self.0) {
                diagnostics.push(
                    Diagnostic::error("Rejected value", self.description())
                        .with_attribute(request.path),
                );
            }
            ValidatorResponse { diagnostics }
        }
    }

    fn config(value: Dynamic) -> DynamicValue {
        DynamicValue::new(value)
    }

    fn object(entries: &[(&str, Dynamic)]) -> Dynamic {
        Dynamic::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::string("name")
            .description("The name of the entity")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the entity");
    }

    #[test]
    fn schema_builder_creates_schema_with_attributes() {
        let schema = SchemaBuilder::new()
            .version(1)
            .description("Test data source schema")
            .attribute(AttributeBuilder::string("id").computed().build())
            .attribute(AttributeBuilder::string("name").required().build())
            .build();

        assert_eq!(schema.version, 1);
        assert_eq!(schema.block.attributes.len(), 2);
        assert_eq!(schema.block.description, "Test data source schema");
        assert!(schema.attribute("id").unwrap().computed);
    }

    #[test]
    fn nested_list_attribute_derives_its_type() {
        let attr = AttributeBuilder::nested(
            "links",
            NestedType::list(vec![
                AttributeBuilder::string("url").computed().build(),
                AttributeBuilder::string("title").computed().build(),
            ]),
        )
        .computed()
        .build();

        match &attr.r#type {
            AttributeType::List(inner) => match inner.as_ref() {
                AttributeType::Object(fields) => {
                    assert_eq!(fields.len(), 2);
                    assert!(matches!(fields.get("url"), Some(AttributeType::String)));
                }
                other => panic!("Expected Object element, got {:?}", other),
            },
            other => panic!("Expected List type, got {:?}", other),
        }
    }

    #[test]
    fn validate_reports_missing_required_attribute() {
        let schema = SchemaBuilder::new()
            .attribute(AttributeBuilder::string("name").required().build())
            .build();

        let diags = schema.validate(&config(object(&[])));
        assert_eq!(diags.len(), 1);
        assert!(diags[0].is_error());
        assert_eq!(diags[0].attribute, Some(AttributePath::new("name")));
    }

    #[test]
    fn validate_runs_validators_on_nested_single_attributes_only_when_set() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::nested(
                    "fallback",
                    NestedType::single(vec![AttributeBuilder::string("name")
                        .required()
                        .validator(Arc::new(RejectValue("bad")))
                        .build()]),
                )
                .optional()
                .build(),
            )
            .build();

        assert!(schema.validate(&config(object(&[]))).is_empty());

        let diags = schema.validate(&config(object(&[(
            "fallback",
            object(&[("name", Dynamic::from("bad"))]),
        )])));
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].attribute,
            Some(AttributePath::new("fallback").attribute("name"))
        );

        let diags = schema.validate(&config(object(&[("fallback", object(&[]))])));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Missing required argument");
    }

    #[test]
    fn validate_skips_unknown_values() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::string("name")
                    .required()
                    .validator(Arc::new(RejectValue("bad")))
                    .build(),
            )
            .build();

        let diags = schema.validate(&config(object(&[("name", Dynamic::Unknown)])));
        assert!(diags.is_empty());
    }
}
