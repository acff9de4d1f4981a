//! Catalog entity wire model
//!
//! Mirrors the JSON returned by `GET /api/catalog/entities/by-name/...`.
//! Scalar strings default to empty when the catalog omits them; labels and
//! annotations keep the difference between absent and empty.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Entity kinds exposed as data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Api,
    Component,
    Domain,
    Group,
    Location,
    Resource,
    System,
    User,
}

impl EntityKind {
    /// The `kind` literal used by the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Api => "API",
            EntityKind::Component => "Component",
            EntityKind::Domain => "Domain",
            EntityKind::Group => "Group",
            EntityKind::Location => "Location",
            EntityKind::Resource => "Resource",
            EntityKind::System => "System",
            EntityKind::User => "User",
        }
    }

    /// Lower-case form used in by-name URLs
    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityKind::Api => "api",
            EntityKind::Component => "component",
            EntityKind::Domain => "domain",
            EntityKind::Group => "group",
            EntityKind::Location => "location",
            EntityKind::Resource => "resource",
            EntityKind::System => "system",
            EntityKind::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: EntityMetadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relations: Vec<EntityRelation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<EntityLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityLink {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "type", default)]
    pub link_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRelation {
    #[serde(rename = "type", default)]
    pub relation_type: String,
    #[serde(default)]
    pub target_ref: String,
    #[serde(default)]
    pub target: EntityRelationTarget,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRelationTarget {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

/// Response of a by-name lookup. `entity` is decoded only for `200 OK`.
#[derive(Debug, Clone)]
pub struct EntityResponse {
    pub status: reqwest::StatusCode,
    pub entity: Option<Entity>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_group_entity() {
        let body = r#"{
            "apiVersion": "backstage.io/v1alpha1",
            "kind": "Group",
            "metadata": {
                "uid": "7a1f0c3e",
                "etag": "abc",
                "name": "example-group",
                "namespace": "example-namespace",
                "labels": {"tier": "gold"},
                "tags": ["platform"],
                "links": [{"url": "https://example.com", "title": "Home", "type": "website"}]
            },
            "relations": [
                {"type": "hasMember", "targetRef": "user:default/alice",
                 "target": {"kind": "user", "namespace": "default", "name": "alice"}}
            ],
            "spec": {"type": "team", "children": [], "members": ["alice", "bob"]}
        }"#;

        let entity: Entity = serde_json::from_str(body).unwrap();
        assert_eq!(entity.kind, "Group");
        assert_eq!(entity.metadata.uid, "7a1f0c3e");
        assert_eq!(entity.metadata.title, "");
        assert_eq!(entity.metadata.annotations, None);
        assert_eq!(entity.metadata.links[0].link_type, "website");
        assert_eq!(entity.metadata.links[0].icon, "");
        assert_eq!(entity.relations[0].target_ref, "user:default/alice");
        assert_eq!(entity.relations[0].target.name, "alice");
        assert_eq!(
            entity.spec.unwrap()["members"],
            serde_json::json!(["alice", "bob"])
        );
    }

    #[test]
    fn tolerates_null_collections() {
        let body = r#"{"apiVersion":"v1","kind":"System","metadata":{"name":"s","tags":null,"links":null,"labels":null},"relations":null,"spec":null}"#;

        let entity: Entity = serde_json::from_str(body).unwrap();
        assert!(entity.relations.is_empty());
        assert!(entity.metadata.tags.is_empty());
        assert!(entity.metadata.links.is_empty());
        assert_eq!(entity.metadata.labels, None);
        assert_eq!(entity.spec, None);
    }

    #[test]
    fn kind_literals_and_path_segments() {
        assert_eq!(EntityKind::Api.as_str(), "API");
        assert_eq!(EntityKind::Api.path_segment(), "api");
        assert_eq!(EntityKind::Group.to_string(), "Group");
        for kind in crate::data_sources::KINDS.iter().map(|d| d.kind) {
            assert_eq!(kind.path_segment(), kind.as_str().to_lowercase());
        }
    }
}
