//! Projection of a fetched catalog entity into the data source model

use super::kinds::{KindDescriptor, SpecShape, PROFILE_FIELDS};
use super::model::{
    EntityModel, LinkModel, MetadataModel, ProfileModel, RelationModel, RelationTargetModel,
    SpecModel, SpecValue,
};
use crate::api::entity::{Entity, EntityMetadata};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Build the computed part of the state from a live entity. `name` and
/// `namespace` are left unset; they stay as requested.
pub fn project(descriptor: &KindDescriptor, entity: &Entity) -> EntityModel {
    let relations = if entity.relations.is_empty() {
        None
    } else {
        Some(
            entity
                .relations
                .iter()
                .map(|r| RelationModel {
                    relation_type: Some(r.relation_type.clone()),
                    target_ref: Some(r.target_ref.clone()),
                    target: Some(RelationTargetModel {
                        kind: Some(r.target.kind.clone()),
                        name: Some(r.target.name.clone()),
                        namespace: Some(r.target.namespace.clone()),
                    }),
                })
                .collect(),
        )
    };

    EntityModel {
        id: Some(entity.metadata.uid.clone()),
        name: None,
        namespace: None,
        api_version: Some(entity.api_version.clone()),
        kind: Some(entity.kind.clone()),
        metadata: Some(project_metadata(&entity.metadata)),
        relations,
        spec: Some(project_spec(descriptor, entity.spec.as_ref())),
    }
}

fn project_metadata(metadata: &EntityMetadata) -> MetadataModel {
    let tags = (!metadata.tags.is_empty()).then(|| metadata.tags.clone());
    let links = (!metadata.links.is_empty()).then(|| {
        metadata
            .links
            .iter()
            .map(|l| LinkModel {
                url: Some(l.url.clone()),
                title: Some(l.title.clone()),
                icon: Some(l.icon.clone()),
                link_type: Some(l.link_type.clone()),
            })
            .collect()
    });

    MetadataModel {
        uid: Some(metadata.uid.clone()),
        etag: Some(metadata.etag.clone()),
        name: Some(metadata.name.clone()),
        namespace: Some(metadata.namespace.clone()),
        title: Some(metadata.title.clone()),
        description: Some(metadata.description.clone()),
        labels: Some(metadata.labels.clone().unwrap_or_default()),
        annotations: Some(metadata.annotations.clone().unwrap_or_default()),
        tags,
        links,
    }
}

fn project_spec(descriptor: &KindDescriptor, spec: Option<&Map<String, Value>>) -> SpecModel {
    let mut fields = BTreeMap::new();

    for field in descriptor.spec_fields {
        let raw = spec.and_then(|s| s.get(field.json_key));
        let value = match field.shape {
            SpecShape::Text => Some(SpecValue::Text(text(raw))),
            SpecShape::TextList => text_list(raw).map(SpecValue::TextList),
            SpecShape::Profile => match raw {
                Some(Value::Object(profile)) => {
                    let [display_name, email, picture] =
                        PROFILE_FIELDS.map(|(_, key, _)| Some(text(profile.get(key))));
                    Some(SpecValue::Profile(ProfileModel {
                        display_name,
                        email,
                        picture,
                    }))
                }
                _ => None,
            },
        };

        if let Some(value) = value {
            fields.insert(field.attribute.to_string(), value);
        }
    }

    SpecModel(fields)
}

/// Missing and null become the empty string; non-string values are rendered
/// as compact JSON
fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Null when the catalog has no entries
fn text_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => {
            Some(items.iter().map(|item| text(Some(item))).collect())
        }
        Some(Value::String(s)) => Some(vec![s.clone()]),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::data_sources::kinds::{API, GROUP, USER};

    fn entity(value: serde_json::Value) -> Entity {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn projects_identity_and_keeps_request_name_unset() {
        let model = project(
            &GROUP,
            &entity(serde_json::json!({
                "apiVersion": "backstage.io/v1alpha1",
                "kind": "Group",
                "metadata": {"uid": "g-1", "name": "example-group", "namespace": "example-namespace"}
            })),
        );

        assert_eq!(model.id.as_deref(), Some("g-1"));
        assert_eq!(model.kind.as_deref(), Some("Group"));
        assert_eq!(model.api_version.as_deref(), Some("backstage.io/v1alpha1"));
        assert_eq!(model.name, None);
        assert_eq!(model.namespace, None);
    }

    #[test]
    fn labels_and_annotations_are_always_maps() {
        let model = project(
            &GROUP,
            &entity(serde_json::json!({"metadata": {"name": "g", "labels": {"tier": "gold"}}})),
        );

        let metadata = model.metadata.unwrap();
        assert_eq!(metadata.labels.unwrap()["tier"], "gold");
        assert_eq!(metadata.annotations, Some(BTreeMap::new()));
        assert_eq!(metadata.title.as_deref(), Some(""));
    }

    #[test]
    fn tags_links_and_relations_are_null_when_absent() {
        let model = project(&GROUP, &entity(serde_json::json!({"metadata": {"name": "g"}})));

        let metadata = model.metadata.unwrap();
        assert_eq!(metadata.tags, None);
        assert_eq!(metadata.links, None);
        assert_eq!(model.relations, None);
    }

    #[test]
    fn relations_keep_source_order() {
        let model = project(
            &GROUP,
            &entity(serde_json::json!({
                "metadata": {"name": "g"},
                "relations": [
                    {"type": "hasMember", "targetRef": "user:default/zoe", "target": {"kind": "user", "namespace": "default", "name": "zoe"}},
                    {"type": "hasMember", "targetRef": "user:default/alice", "target": {"kind": "user", "namespace": "default", "name": "alice"}},
                    {"type": "childOf", "targetRef": "group:default/root", "target": {"kind": "group", "namespace": "default", "name": "root"}}
                ]
            })),
        );

        let refs: Vec<String> = model
            .relations
            .unwrap()
            .into_iter()
            .map(|r| r.target_ref.unwrap())
            .collect();
        assert_eq!(
            refs,
            vec!["user:default/zoe", "user:default/alice", "group:default/root"]
        );
    }

    #[test]
    fn spec_fields_follow_descriptor() {
        let model = project(
            &GROUP,
            &entity(serde_json::json!({
                "metadata": {"name": "g"},
                "spec": {
                    "type": "team",
                    "profile": {"displayName": "Example Group", "email": "group@example.com"},
                    "children": [],
                    "members": ["zoe", "alice"]
                }
            })),
        );

        let spec = model.spec.unwrap();
        assert_eq!(spec.text("type"), Some("team"));
        assert_eq!(spec.text("parent"), Some(""));
        assert_eq!(spec.text_list("children"), None);
        assert_eq!(spec.text_list("members").unwrap(), ["zoe", "alice"]);
        assert_eq!(
            spec.get("profile"),
            Some(&SpecValue::Profile(ProfileModel {
                display_name: Some("Example Group".to_string()),
                email: Some("group@example.com".to_string()),
                picture: Some(String::new()),
            }))
        );
    }

    #[test]
    fn inline_definitions_are_rendered_as_json() {
        let model = project(
            &API,
            &entity(serde_json::json!({
                "metadata": {"name": "petstore"},
                "spec": {"type": "openapi", "definition": {"openapi": "3.0.0"}}
            })),
        );

        let spec = model.spec.unwrap();
        assert_eq!(spec.text("definition"), Some(r#"{"openapi":"3.0.0"}"#));
        assert_eq!(spec.text("system"), Some(""));
    }

    #[test]
    fn missing_spec_and_profile() {
        let model = project(&USER, &entity(serde_json::json!({"metadata": {"name": "u"}})));

        let spec = model.spec.unwrap();
        assert_eq!(spec.get("profile"), None);
        assert_eq!(spec.text_list("member_of"), None);
    }
}
