//! Per-kind descriptors
//!
//! Every catalog kind shares the same read logic; what differs is the kind
//! literal, the data source name and the fields of `spec`. A descriptor
//! captures exactly that difference.

use crate::api::EntityKind;

/// `id` given to a fallback entity that does not set one
pub const FALLBACK_ID: &str = "123456789";

/// `api_version` given to a fallback entity that does not set one
pub const FALLBACK_API_VERSION: &str = "backstage.io/v1alpha1";

/// Prefix shared by every data source type name
pub const TYPE_NAME_PREFIX: &str = "backstage";

/// Value shape of a spec field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecShape {
    /// Single string
    Text,
    /// Ordered list of strings
    TextList,
    /// User/group profile object (`display_name`, `email`, `picture`)
    Profile,
}

/// One attribute of the `spec` block and the catalog key it is read from
#[derive(Debug, Clone, Copy)]
pub struct SpecField {
    pub attribute: &'static str,
    pub json_key: &'static str,
    pub shape: SpecShape,
    pub description: &'static str,
}

const fn text(attribute: &'static str, json_key: &'static str, description: &'static str) -> SpecField {
    SpecField {
        attribute,
        json_key,
        shape: SpecShape::Text,
        description,
    }
}

const fn text_list(
    attribute: &'static str,
    json_key: &'static str,
    description: &'static str,
) -> SpecField {
    SpecField {
        attribute,
        json_key,
        shape: SpecShape::TextList,
        description,
    }
}

const fn profile(description: &'static str) -> SpecField {
    SpecField {
        attribute: "profile",
        json_key: "profile",
        shape: SpecShape::Profile,
        description,
    }
}

/// Profile attributes and the catalog keys they are read from
pub const PROFILE_FIELDS: [(&str, &str, &str); 3] = [
    ("display_name", "displayName", "A simple display name to present to users."),
    ("email", "email", "An email where this entity can be reached."),
    ("picture", "picture", "The URL of an image that represents this entity."),
];

#[derive(Debug)]
pub struct KindDescriptor {
    pub kind: EntityKind,
    pub type_suffix: &'static str,
    pub docs_anchor: &'static str,
    pub spec_fields: &'static [SpecField],
}

impl KindDescriptor {
    /// Terraform data source type name, e.g. `backstage_group`
    pub fn type_name(&self) -> String {
        format!("{}_{}", TYPE_NAME_PREFIX, self.type_suffix)
    }

    /// The catalog `kind` literal, e.g. `Group`
    pub fn kind_literal(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn spec_field(&self, attribute: &str) -> Option<&'static SpecField> {
        self.spec_fields.iter().find(|f| f.attribute == attribute)
    }
}

pub static API: KindDescriptor = KindDescriptor {
    kind: EntityKind::Api,
    type_suffix: "api",
    docs_anchor: "kind-api",
    spec_fields: &[
        text("type", "type", "Type of the API definition."),
        text("lifecycle", "lifecycle", "Lifecycle state of the API."),
        text("owner", "owner", "An entity reference to the owner of the API."),
        text(
            "definition",
            "definition",
            "Definition of the API, based on the format defined by the type.",
        ),
        text(
            "system",
            "system",
            "An entity reference to the system that the API belongs to.",
        ),
    ],
};

pub static COMPONENT: KindDescriptor = KindDescriptor {
    kind: EntityKind::Component,
    type_suffix: "component",
    docs_anchor: "kind-component",
    spec_fields: &[
        text("type", "type", "The type of component."),
        text("lifecycle", "lifecycle", "The lifecycle state of the component."),
        text("owner", "owner", "An entity reference to the owner of the component."),
        text(
            "subcomponent_of",
            "subcomponentOf",
            "An entity reference to another component of which the component is a part.",
        ),
        text_list(
            "provides_apis",
            "providesApis",
            "An array of entity references to the APIs that are provided by the component.",
        ),
        text_list(
            "consumes_apis",
            "consumesApis",
            "An array of entity references to the APIs that are consumed by the component.",
        ),
        text_list(
            "depends_on",
            "dependsOn",
            "An array of references to other entities that the component depends on to function.",
        ),
        text(
            "system",
            "system",
            "An entity reference to the system that the component belongs to.",
        ),
    ],
};

pub static DOMAIN: KindDescriptor = KindDescriptor {
    kind: EntityKind::Domain,
    type_suffix: "domain",
    docs_anchor: "kind-domain",
    spec_fields: &[text("owner", "owner", "An entity reference to the owner of the domain.")],
};

pub static GROUP: KindDescriptor = KindDescriptor {
    kind: EntityKind::Group,
    type_suffix: "group",
    docs_anchor: "kind-group",
    spec_fields: &[
        text("type", "type", "The type of group."),
        profile("Optional profile information about the group."),
        text(
            "parent",
            "parent",
            "The immediate parent group in the hierarchy, if any.",
        ),
        text_list(
            "children",
            "children",
            "The immediate child groups of this group in the hierarchy.",
        ),
        text_list(
            "members",
            "members",
            "The users that are direct members of this group.",
        ),
    ],
};

pub static LOCATION: KindDescriptor = KindDescriptor {
    kind: EntityKind::Location,
    type_suffix: "location",
    docs_anchor: "kind-location",
    spec_fields: &[
        text("type", "type", "The single location type that's common to the targets."),
        text("target", "target", "A single target as a string."),
        text_list("targets", "targets", "A list of targets as strings."),
        text(
            "presence",
            "presence",
            "Whether the presence of the location target is required.",
        ),
    ],
};

pub static RESOURCE: KindDescriptor = KindDescriptor {
    kind: EntityKind::Resource,
    type_suffix: "resource",
    docs_anchor: "kind-resource",
    spec_fields: &[
        text("type", "type", "The type of resource."),
        text("owner", "owner", "An entity reference to the owner of the resource."),
        text_list(
            "depends_on",
            "dependsOn",
            "An array of references to other entities that the resource depends on to function.",
        ),
        text_list(
            "dependency_of",
            "dependencyOf",
            "An array of references to other entities that depend on this resource.",
        ),
        text(
            "system",
            "system",
            "An entity reference to the system that the resource belongs to.",
        ),
    ],
};

pub static SYSTEM: KindDescriptor = KindDescriptor {
    kind: EntityKind::System,
    type_suffix: "system",
    docs_anchor: "kind-system",
    spec_fields: &[
        text("owner", "owner", "An entity reference to the owner of the system."),
        text(
            "domain",
            "domain",
            "An entity reference to the domain that the system belongs to.",
        ),
    ],
};

pub static USER: KindDescriptor = KindDescriptor {
    kind: EntityKind::User,
    type_suffix: "user",
    docs_anchor: "kind-user",
    spec_fields: &[
        profile("Optional profile information about the user."),
        text_list(
            "member_of",
            "memberOf",
            "The list of groups that the user is a direct member of.",
        ),
    ],
};

/// All descriptors, in data source registration order
pub static KINDS: [&KindDescriptor; 8] = [
    &API, &COMPONENT, &DOMAIN, &GROUP, &LOCATION, &RESOURCE, &SYSTEM, &USER,
];
