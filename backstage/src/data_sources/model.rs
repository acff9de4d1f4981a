//! Typed view of a data source's configuration and state
//!
//! The same [`EntityModel`] shape describes the top-level entity and the
//! optional `fallback` replica. Every field is optional because a fallback
//! may leave any of them unset and the computed fields are null in
//! configuration.

use super::kinds::{KindDescriptor, SpecShape, PROFILE_FIELDS};
use std::collections::BTreeMap;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tfplug::{Result, TfplugError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub api_version: Option<String>,
    pub kind: Option<String>,
    pub metadata: Option<MetadataModel>,
    pub relations: Option<Vec<RelationModel>>,
    pub spec: Option<SpecModel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataModel {
    pub uid: Option<String>,
    pub etag: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub labels: Option<BTreeMap<String, String>>,
    pub annotations: Option<BTreeMap<String, String>>,
    pub tags: Option<Vec<String>>,
    pub links: Option<Vec<LinkModel>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkModel {
    pub url: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub link_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationModel {
    pub relation_type: Option<String>,
    pub target_ref: Option<String>,
    pub target: Option<RelationTargetModel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationTargetModel {
    pub kind: Option<String>,
    pub name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileModel {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

/// Value of one spec attribute
#[derive(Debug, Clone, PartialEq)]
pub enum SpecValue {
    Text(String),
    TextList(Vec<String>),
    Profile(ProfileModel),
}

/// Spec attributes keyed by Terraform attribute name. Attributes that are
/// unset are absent from the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecModel(pub BTreeMap<String, SpecValue>);

impl SpecModel {
    pub fn get(&self, attribute: &str) -> Option<&SpecValue> {
        self.0.get(attribute)
    }

    pub fn text(&self, attribute: &str) -> Option<&str> {
        match self.0.get(attribute) {
            Some(SpecValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn text_list(&self, attribute: &str) -> Option<&[String]> {
        match self.0.get(attribute) {
            Some(SpecValue::TextList(l)) => Some(l),
            _ => None,
        }
    }
}

/// Whole configuration / state of an entity data source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSourceModel {
    pub entity: EntityModel,
    pub fallback: Option<EntityModel>,
}

impl DataSourceModel {
    pub fn from_config(config: &DynamicValue, descriptor: &KindDescriptor) -> Result<Self> {
        let root = AttributePath::root();
        let entity = EntityModel::from_dynamic(&config.value, &root, descriptor)?;
        let fallback = match read_object(&config.value, "fallback", &root)? {
            Some(value) => Some(EntityModel::from_dynamic(
                value,
                &root.clone().attribute("fallback"),
                descriptor,
            )?),
            None => None,
        };

        Ok(Self { entity, fallback })
    }

    pub fn to_state(&self, descriptor: &KindDescriptor) -> DynamicValue {
        let mut state = self.entity.to_dynamic(descriptor);
        if let Dynamic::Map(m) = &mut state {
            m.insert(
                "fallback".to_string(),
                self.fallback
                    .as_ref()
                    .map(|f| f.to_dynamic(descriptor))
                    .unwrap_or(Dynamic::Null),
            );
        }
        DynamicValue::new(state)
    }
}

impl EntityModel {
    pub fn from_dynamic(
        value: &Dynamic,
        path: &AttributePath,
        descriptor: &KindDescriptor,
    ) -> Result<Self> {
        let metadata = match read_object(value, "metadata", path)? {
            Some(m) => Some(MetadataModel::from_dynamic(m, &path.clone().attribute("metadata"))?),
            None => None,
        };

        let relations = match read_object_list(value, "relations", path)? {
            Some(items) => {
                let relations_path = path.clone().attribute("relations");
                let relations = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        RelationModel::from_dynamic(item, &relations_path.clone().index(idx as i64))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Some(relations)
            }
            None => None,
        };

        let spec = match read_object(value, "spec", path)? {
            Some(s) => Some(SpecModel::from_dynamic(
                s,
                &path.clone().attribute("spec"),
                descriptor,
            )?),
            None => None,
        };

        Ok(Self {
            id: read_string(value, "id", path)?,
            name: read_string(value, "name", path)?,
            namespace: read_string(value, "namespace", path)?,
            api_version: read_string(value, "api_version", path)?,
            kind: read_string(value, "kind", path)?,
            metadata,
            relations,
            spec,
        })
    }

    pub fn to_dynamic(&self, descriptor: &KindDescriptor) -> Dynamic {
        object([
            ("id", self.id.clone().into()),
            ("name", self.name.clone().into()),
            ("namespace", self.namespace.clone().into()),
            ("api_version", self.api_version.clone().into()),
            ("kind", self.kind.clone().into()),
            (
                "metadata",
                self.metadata
                    .as_ref()
                    .map(MetadataModel::to_dynamic)
                    .unwrap_or(Dynamic::Null),
            ),
            (
                "relations",
                self.relations
                    .as_ref()
                    .map(|r| Dynamic::List(r.iter().map(RelationModel::to_dynamic).collect()))
                    .unwrap_or(Dynamic::Null),
            ),
            (
                "spec",
                self.spec
                    .as_ref()
                    .map(|s| s.to_dynamic(descriptor))
                    .unwrap_or(Dynamic::Null),
            ),
        ])
    }
}

impl MetadataModel {
    fn from_dynamic(value: &Dynamic, path: &AttributePath) -> Result<Self> {
        let links = match read_object_list(value, "links", path)? {
            Some(items) => {
                let links_path = path.clone().attribute("links");
                let links = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        let item_path = links_path.clone().index(idx as i64);
                        Ok(LinkModel {
                            url: read_string(item, "url", &item_path)?,
                            title: read_string(item, "title", &item_path)?,
                            icon: read_string(item, "icon", &item_path)?,
                            link_type: read_string(item, "type", &item_path)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Some(links)
            }
            None => None,
        };

        Ok(Self {
            uid: read_string(value, "uid", path)?,
            etag: read_string(value, "etag", path)?,
            name: read_string(value, "name", path)?,
            namespace: read_string(value, "namespace", path)?,
            title: read_string(value, "title", path)?,
            description: read_string(value, "description", path)?,
            labels: read_string_map(value, "labels", path)?,
            annotations: read_string_map(value, "annotations", path)?,
            tags: read_string_list(value, "tags", path)?,
            links,
        })
    }

    fn to_dynamic(&self) -> Dynamic {
        object([
            ("uid", self.uid.clone().into()),
            ("etag", self.etag.clone().into()),
            ("name", self.name.clone().into()),
            ("namespace", self.namespace.clone().into()),
            ("title", self.title.clone().into()),
            ("description", self.description.clone().into()),
            ("labels", string_map(self.labels.as_ref())),
            ("annotations", string_map(self.annotations.as_ref())),
            ("tags", string_list(self.tags.as_deref())),
            (
                "links",
                self.links
                    .as_ref()
                    .map(|links| {
                        Dynamic::List(
                            links
                                .iter()
                                .map(|l| {
                                    object([
                                        ("url", l.url.clone().into()),
                                        ("title", l.title.clone().into()),
                                        ("icon", l.icon.clone().into()),
                                        ("type", l.link_type.clone().into()),
                                    ])
                                })
                                .collect(),
                        )
                    })
                    .unwrap_or(Dynamic::Null),
            ),
        ])
    }
}

impl RelationModel {
    fn from_dynamic(value: &Dynamic, path: &AttributePath) -> Result<Self> {
        let target = match read_object(value, "target", path)? {
            Some(t) => {
                let target_path = path.clone().attribute("target");
                Some(RelationTargetModel {
                    kind: read_string(t, "kind", &target_path)?,
                    name: read_string(t, "name", &target_path)?,
                    namespace: read_string(t, "namespace", &target_path)?,
                })
            }
            None => None,
        };

        Ok(Self {
            relation_type: read_string(value, "type", path)?,
            target_ref: read_string(value, "target_ref", path)?,
            target,
        })
    }

    fn to_dynamic(&self) -> Dynamic {
        object([
            ("type", self.relation_type.clone().into()),
            ("target_ref", self.target_ref.clone().into()),
            (
                "target",
                self.target
                    .as_ref()
                    .map(|t| {
                        object([
                            ("kind", t.kind.clone().into()),
                            ("name", t.name.clone().into()),
                            ("namespace", t.namespace.clone().into()),
                        ])
                    })
                    .unwrap_or(Dynamic::Null),
            ),
        ])
    }
}

impl SpecModel {
    fn from_dynamic(
        value: &Dynamic,
        path: &AttributePath,
        descriptor: &KindDescriptor,
    ) -> Result<Self> {
        let mut fields = BTreeMap::new();

        for field in descriptor.spec_fields {
            let decoded = match field.shape {
                SpecShape::Text => read_string(value, field.attribute, path)?.map(SpecValue::Text),
                SpecShape::TextList => {
                    read_string_list(value, field.attribute, path)?.map(SpecValue::TextList)
                }
                SpecShape::Profile => match read_object(value, field.attribute, path)? {
                    Some(p) => {
                        let profile_path = path.clone().attribute(field.attribute);
                        Some(SpecValue::Profile(ProfileModel {
                            display_name: read_string(p, "display_name", &profile_path)?,
                            email: read_string(p, "email", &profile_path)?,
                            picture: read_string(p, "picture", &profile_path)?,
                        }))
                    }
                    None => None,
                },
            };

            if let Some(decoded) = decoded {
                fields.insert(field.attribute.to_string(), decoded);
            }
        }

        Ok(Self(fields))
    }

    /// Every attribute the kind declares is emitted; unset ones are null
    fn to_dynamic(&self, descriptor: &KindDescriptor) -> Dynamic {
        let mut out = BTreeMap::new();
        for field in descriptor.spec_fields {
            let value = match self.0.get(field.attribute) {
                Some(SpecValue::Text(s)) => Dynamic::String(s.clone()),
                Some(SpecValue::TextList(l)) => string_list(Some(l.as_slice())),
                Some(SpecValue::Profile(p)) => {
                    let values = [&p.display_name, &p.email, &p.picture];
                    Dynamic::Map(
                        PROFILE_FIELDS
                            .iter()
                            .zip(values)
                            .map(|((attribute, _, _), v)| (attribute.to_string(), v.clone().into()))
                            .collect(),
                    )
                }
                None => Dynamic::Null,
            };
            out.insert(field.attribute.to_string(), value);
        }
        Dynamic::Map(out)
    }
}

fn object<const N: usize>(entries: [(&str, Dynamic); N]) -> Dynamic {
    Dynamic::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn string_list(values: Option<&[String]>) -> Dynamic {
    match values {
        Some(values) => Dynamic::List(values.iter().cloned().map(Dynamic::String).collect()),
        None => Dynamic::Null,
    }
}

fn string_map(values: Option<&BTreeMap<String, String>>) -> Dynamic {
    match values {
        Some(values) => Dynamic::Map(
            values
                .iter()
                .map(|(k, v)| (k.clone(), Dynamic::String(v.clone())))
                .collect(),
        ),
        None => Dynamic::Null,
    }
}

fn mismatch(path: &AttributePath, expected: &str, actual: &Dynamic) -> TfplugError {
    TfplugError::InvalidConfiguration(format!(
        "{}: expected {}, got {}",
        path,
        expected,
        actual.type_name()
    ))
}

fn read_string(value: &Dynamic, name: &str, path: &AttributePath) -> Result<Option<String>> {
    match value.attr(name) {
        Dynamic::Null | Dynamic::Unknown => Ok(None),
        Dynamic::String(s) => Ok(Some(s.clone())),
        other => Err(mismatch(&path.clone().attribute(name), "string", other)),
    }
}

fn read_string_list(value: &Dynamic, name: &str, path: &AttributePath) -> Result<Option<Vec<String>>> {
    match value.attr(name) {
        Dynamic::Null | Dynamic::Unknown => Ok(None),
        Dynamic::List(items) => {
            let list_path = path.clone().attribute(name);
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Dynamic::String(s) => Ok(s.clone()),
                    other => Err(mismatch(&list_path.clone().index(idx as i64), "string", other)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some)
        }
        other => Err(mismatch(&path.clone().attribute(name), "list of string", other)),
    }
}

fn read_string_map(
    value: &Dynamic,
    name: &str,
    path: &AttributePath,
) -> Result<Option<BTreeMap<String, String>>> {
    match value.attr(name) {
        Dynamic::Null | Dynamic::Unknown => Ok(None),
        Dynamic::Map(entries) => {
            let map_path = path.clone().attribute(name);
            entries
                .iter()
                .map(|(k, v)| match v {
                    Dynamic::String(s) => Ok((k.clone(), s.clone())),
                    other => Err(mismatch(&map_path.clone().key(k), "string", other)),
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Some)
        }
        other => Err(mismatch(&path.clone().attribute(name), "map of string", other)),
    }
}

fn read_object<'a>(
    value: &'a Dynamic,
    name: &str,
    path: &AttributePath,
) -> Result<Option<&'a Dynamic>> {
    let attr = value.attr(name);
    match attr {
        Dynamic::Null | Dynamic::Unknown => Ok(None),
        Dynamic::Map(_) => Ok(Some(attr)),
        other => Err(mismatch(&path.clone().attribute(name), "object", other)),
    }
}

fn read_object_list<'a>(
    value: &'a Dynamic,
    name: &str,
    path: &AttributePath,
) -> Result<Option<&'a [Dynamic]>> {
    match value.attr(name) {
        Dynamic::Null | Dynamic::Unknown => Ok(None),
        Dynamic::List(items) => Ok(Some(items.as_slice())),
        other => Err(mismatch(&path.clone().attribute(name), "list of object", other)),
    }
}
