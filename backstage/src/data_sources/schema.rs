//! Schema shared by every entity data source
//!
//! The top-level entity attributes are computed; the `fallback` block repeats
//! them as optional attributes so users can describe a static replica.

use super::kinds::{KindDescriptor, SpecShape, PROFILE_FIELDS};
use super::validation::entity_name_validators;
use tfplug::schema::{
    Attribute, AttributeBuilder, AttributeType, NestedType, Schema, SchemaBuilder, StringKind,
};

const DESCRIPTION_ID: &str = "The unique ID of the entity, assigned by the catalog.";
const DESCRIPTION_NAME: &str = "The name of the entity. Must be unique within the catalog at any given point in time, for any given namespace and kind.";
const DESCRIPTION_NAMESPACE: &str = "The namespace that the entity belongs to. Defaults to `default`.";
const DESCRIPTION_API_VERSION: &str = "Version of specification format for this particular entity.";
const DESCRIPTION_KIND: &str = "High-level entity type.";
const DESCRIPTION_METADATA: &str = "Metadata fields common to all versions/kinds of entity.";
const DESCRIPTION_RELATIONS: &str = "Relations that this entity has with other entities.";
const DESCRIPTION_SPEC: &str = "The specification data describing the entity itself.";

/// Whether an attribute is filled in by the provider or by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Computed,
    Optional,
}

fn with_mode(builder: AttributeBuilder, mode: Mode) -> AttributeBuilder {
    match mode {
        Mode::Computed => builder.computed(),
        Mode::Optional => builder.optional(),
    }
}

fn string(name: &str, description: &str, mode: Mode) -> Attribute {
    with_mode(AttributeBuilder::string(name).description(description), mode).build()
}

fn name_attribute(name: &str, description: &str, required: bool) -> Attribute {
    let mut builder = AttributeBuilder::string(name).description(description);
    builder = if required {
        builder.required()
    } else {
        builder.optional()
    };
    for validator in entity_name_validators() {
        builder = builder.validator(validator);
    }
    builder.build()
}

fn metadata_attribute(mode: Mode) -> Attribute {
    let links = with_mode(
        AttributeBuilder::nested(
            "links",
            NestedType::list(vec![
                string("url", "A url in a standard uri format.", mode),
                string("title", "A user friendly display name for the link.", mode),
                string("icon", "A key representing a visual icon to be displayed in the UI.", mode),
                string("type", "An optional value to categorize links into specific groups.", mode),
            ]),
        )
        .description("A list of external hyperlinks related to the entity."),
        mode,
    )
    .build();

    with_mode(
        AttributeBuilder::nested(
            "metadata",
            NestedType::single(vec![
                string("uid", DESCRIPTION_ID, mode),
                string("etag", "An opaque string that changes for each update operation.", mode),
                string("name", DESCRIPTION_NAME, mode),
                string("namespace", DESCRIPTION_NAMESPACE, mode),
                string("title", "A display name of the entity, to be presented in user interfaces.", mode),
                string("description", "A human readable description of the entity.", mode),
                with_mode(
                    AttributeBuilder::new("labels", AttributeType::Map(Box::new(AttributeType::String)))
                        .description("Key/value pairs of identifying information attached to the entity."),
                    mode,
                )
                .build(),
                with_mode(
                    AttributeBuilder::new(
                        "annotations",
                        AttributeType::Map(Box::new(AttributeType::String)),
                    )
                    .description("Key/value pairs of non-identifying auxiliary information attached to the entity."),
                    mode,
                )
                .build(),
                with_mode(
                    AttributeBuilder::new("tags", AttributeType::List(Box::new(AttributeType::String)))
                        .description("A list of single-valued strings, to for example classify catalog entities in various ways."),
                    mode,
                )
                .build(),
                links,
            ]),
        )
        .description(DESCRIPTION_METADATA),
        mode,
    )
    .build()
}

fn relations_attribute(mode: Mode) -> Attribute {
    let target = with_mode(
        AttributeBuilder::nested(
            "target",
            NestedType::single(vec![
                string("kind", "Kind of the target entity.", mode),
                string("name", "Name of the target entity.", mode),
                string("namespace", "Namespace of the target entity.", mode),
            ]),
        )
        .description("The entity of the target of this relation."),
        mode,
    )
    .build();

    with_mode(
        AttributeBuilder::nested(
            "relations",
            NestedType::list(vec![
                string("type", "The type of relation.", mode),
                string("target_ref", "The entity ref of the target of this relation.", mode),
                target,
            ]),
        )
        .description(DESCRIPTION_RELATIONS),
        mode,
    )
    .build()
}

fn spec_attribute(descriptor: &KindDescriptor, mode: Mode) -> Attribute {
    let fields = descriptor
        .spec_fields
        .iter()
        .map(|field| match field.shape {
            SpecShape::Text => string(field.attribute, field.description, mode),
            SpecShape::TextList => with_mode(
                AttributeBuilder::new(
                    field.attribute,
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .description(field.description),
                mode,
            )
            .build(),
            SpecShape::Profile => with_mode(
                AttributeBuilder::nested(
                    field.attribute,
                    NestedType::single(
                        PROFILE_FIELDS
                            .iter()
                            .map(|(attribute, _, description)| string(attribute, description, mode))
                            .collect(),
                    ),
                )
                .description(field.description),
                mode,
            )
            .build(),
        })
        .collect();

    with_mode(
        AttributeBuilder::nested("spec", NestedType::single(fields)).description(DESCRIPTION_SPEC),
        mode,
    )
    .build()
}

/// Attributes of one entity, top level or fallback
fn entity_attributes(descriptor: &KindDescriptor, mode: Mode) -> Vec<Attribute> {
    vec![
        string("id", DESCRIPTION_ID, mode),
        name_attribute("name", DESCRIPTION_NAME, mode == Mode::Computed),
        name_attribute("namespace", DESCRIPTION_NAMESPACE, false),
        string("api_version", DESCRIPTION_API_VERSION, mode),
        string("kind", DESCRIPTION_KIND, mode),
        metadata_attribute(mode),
        relations_attribute(mode),
        spec_attribute(descriptor, mode),
    ]
}

pub fn data_source_schema(descriptor: &KindDescriptor) -> Schema {
    let kind = descriptor.kind_literal();

    let fallback = AttributeBuilder::nested(
        "fallback",
        NestedType::single(entity_attributes(descriptor, Mode::Optional)),
    )
    .description(&format!(
        "A complete replica of the `{}` as it would exist in backstage. Set this to provide a fallback in case the Backstage instance is not functioning, is down, or is unreliable.",
        kind
    ))
    .optional()
    .build();

    let mut builder = SchemaBuilder::new()
        .version(0)
        .description(&format!(
            "Use this data source to get a specific [{} entity](https://backstage.io/docs/features/software-catalog/descriptor-format#{}) from Backstage Software Catalog.",
            kind, descriptor.docs_anchor
        ))
        .description_kind(StringKind::Markdown);

    for attribute in entity_attributes(descriptor, Mode::Computed) {
        builder = builder.attribute(attribute);
    }

    builder.attribute(fallback).build()
}
