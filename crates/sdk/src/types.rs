//! Core types for Folio hosts.
//!
//! Collections and views are declared by the host application (in code or
//! in YAML/JSON) and handed to the navigation kernel, which merges them with
//! persisted overrides and resolves permissions for the current user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::merge::Merge;

/// A path-addressed collection of records.
///
/// `path` is a "/"-separated string with an odd number of segments:
/// `products`, or `products/{id}/locales` for a subcollection path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub path: String,

    /// Display name. An empty name in an overlay never replaces the base name.
    #[serde(default)]
    pub name: String,

    /// Alternate identifier usable in URLs in place of `path`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Navigation group label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Field schema, keyed by property name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_order: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcollections: Option<Vec<Collection>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<CollectionCallbacks>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsSpec>,

    /// Whether the collection configuration may be edited at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,

    /// Whether the collection may be deleted at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletable: Option<bool>,
}

impl Collection {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            alias: None,
            singular_name: None,
            description: None,
            group: None,
            icon: None,
            properties: BTreeMap::new(),
            property_order: None,
            subcollections: None,
            callbacks: None,
            permissions: None,
            editable: None,
            deletable: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, property: Property) -> Self {
        self.properties.insert(key.into(), property);
        self
    }

    pub fn subcollection(mut self, collection: Collection) -> Self {
        self.subcollections
            .get_or_insert_with(Vec::new)
            .push(collection);
        self
    }

    pub fn permissions(mut self, permissions: impl Into<PermissionsSpec>) -> Self {
        self.permissions = Some(permissions.into());
        self
    }

    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }

    pub fn deletable(mut self, deletable: bool) -> Self {
        self.deletable = Some(deletable);
        self
    }

    /// The identifier used in URLs: the alias when set, otherwise the path.
    pub fn alias_or_path(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }

    /// Deep-merge a partial override on top of this collection.
    pub fn merge_patch(self, patch: CollectionPatch) -> Self {
        let name = patch.name.filter(|n| !n.is_empty());
        Self {
            path: self.path,
            name: name.unwrap_or(self.name),
            alias: self.alias.merge(patch.alias),
            singular_name: self.singular_name.merge(patch.singular_name),
            description: self.description.merge(patch.description),
            group: self.group.merge(patch.group),
            icon: self.icon.merge(patch.icon),
            properties: self.properties.merge(patch.properties.unwrap_or_default()),
            property_order: self.property_order.merge(patch.property_order),
            subcollections: self.subcollections.merge(patch.subcollections),
            callbacks: self.callbacks.merge(patch.callbacks),
            permissions: self.permissions.merge(patch.permissions),
            editable: self.editable.merge(patch.editable),
            deletable: self.deletable.merge(patch.deletable),
        }
    }

    /// Replace every field the patch supplies, without merging nested values.
    ///
    /// Fields the patch leaves as `None` keep their current value.
    pub fn with_overrides(self, patch: CollectionPatch) -> Self {
        Self {
            path: self.path,
            name: patch.name.filter(|n| !n.is_empty()).unwrap_or(self.name),
            alias: patch.alias.or(self.alias),
            singular_name: patch.singular_name.or(self.singular_name),
            description: patch.description.or(self.description),
            group: patch.group.or(self.group),
            icon: patch.icon.or(self.icon),
            properties: patch.properties.unwrap_or(self.properties),
            property_order: patch.property_order.or(self.property_order),
            subcollections: patch.subcollections.or(self.subcollections),
            callbacks: patch.callbacks.or(self.callbacks),
            permissions: patch.permissions.or(self.permissions),
            editable: patch.editable.or(self.editable),
            deletable: patch.deletable.or(self.deletable),
        }
    }
}

impl Merge for Collection {
    fn merge(self, overlay: Self) -> Self {
        let path = overlay.path.clone();
        let merged = self.merge_patch(CollectionPatch::from(overlay));
        Self { path, ..merged }
    }
}

/// A partial collection: every field optional.
///
/// Used for per-user overrides and for the output of override handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Property>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_order: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcollections: Option<Vec<Collection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<CollectionCallbacks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionsSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletable: Option<bool>,
}

impl From<Collection> for CollectionPatch {
    fn from(c: Collection) -> Self {
        Self {
            name: Some(c.name),
            alias: c.alias,
            singular_name: c.singular_name,
            description: c.description,
            group: c.group,
            icon: c.icon,
            properties: Some(c.properties),
            property_order: c.property_order,
            subcollections: c.subcollections,
            callbacks: c.callbacks,
            permissions: c.permissions,
            editable: c.editable,
            deletable: c.deletable,
        }
    }
}

/// Names of host-registered handlers invoked around entity writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionCallbacks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_pre_save: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_save_success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_save_failure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_pre_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

impl Merge for CollectionCallbacks {
    fn merge(self, overlay: Self) -> Self {
        Self {
            on_pre_save: self.on_pre_save.merge(overlay.on_pre_save),
            on_save_success: self.on_save_success.merge(overlay.on_save_success),
            on_save_failure: self.on_save_failure.merge(overlay.on_save_failure),
            on_pre_delete: self.on_pre_delete.merge(overlay.on_pre_delete),
            on_delete: self.on_delete.merge(overlay.on_delete),
        }
    }
}

/// Property data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Date,
    Geopoint,
    Reference,
    Array,
    Map,
}

impl Merge for DataType {
    fn merge(self, overlay: Self) -> Self {
        overlay
    }
}

/// A single field in a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Target collection path for references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Element schema for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of: Option<Box<Property>>,
    /// Nested schema for maps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Property>>,
}

impl Property {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            name: None,
            description: None,
            validation: None,
            enum_values: None,
            hidden: None,
            path: None,
            of: None,
            properties: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.validation.get_or_insert_with(Validation::default).required = Some(true);
        self
    }

    pub fn enum_values(mut self, values: Vec<EnumValue>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn nested(mut self, key: impl Into<String>, property: Property) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), property);
        self
    }
}

impl Merge for Property {
    fn merge(self, overlay: Self) -> Self {
        Self {
            data_type: self.data_type.merge(overlay.data_type),
            name: self.name.merge(overlay.name),
            description: self.description.merge(overlay.description),
            validation: self.validation.merge(overlay.validation),
            enum_values: self.enum_values.merge(overlay.enum_values),
            hidden: self.hidden.merge(overlay.hidden),
            path: self.path.merge(overlay.path),
            of: self.of.merge(overlay.of),
            properties: self.properties.merge(overlay.properties),
        }
    }
}

/// Validation rules attached to a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Merge for Validation {
    fn merge(self, overlay: Self) -> Self {
        Self {
            required: self.required.merge(overlay.required),
            unique: self.unique.merge(overlay.unique),
            min: self.min.merge(overlay.min),
            max: self.max.merge(overlay.max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub id: String,
    pub label: String,
}

impl EnumValue {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Capability flags for a collection.
///
/// Each flag is tri-state: `None` means the descriptor has no opinion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<bool>,
}

impl Permissions {
    /// Every capability granted.
    pub const ALL: Self = Self {
        read: Some(true),
        create: Some(true),
        edit: Some(true),
        delete: Some(true),
    };

    /// Read access only.
    pub const READ_ONLY: Self = Self {
        read: Some(true),
        create: Some(false),
        edit: Some(false),
        delete: Some(false),
    };

    /// No access at all.
    pub const NONE: Self = Self {
        read: Some(false),
        create: Some(false),
        edit: Some(false),
        delete: Some(false),
    };
}

impl Merge for Permissions {
    fn merge(self, overlay: Self) -> Self {
        Self {
            read: self.read.merge(overlay.read),
            create: self.create.merge(overlay.create),
            edit: self.edit.merge(overlay.edit),
            delete: self.delete.merge(overlay.delete),
        }
    }
}

/// How a collection declares its permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionsSpec {
    /// Per-role descriptors, resolved against the current user's roles.
    ByRole { roles: BTreeMap<String, Permissions> },
    /// The same descriptor for every user.
    Fixed(Permissions),
}

impl PermissionsSpec {
    /// The fixed descriptor, unless permissions are role based.
    pub fn as_fixed(&self) -> Option<&Permissions> {
        match self {
            Self::Fixed(p) => Some(p),
            Self::ByRole { .. } => None,
        }
    }
}

impl From<Permissions> for PermissionsSpec {
    fn from(p: Permissions) -> Self {
        Self::Fixed(p)
    }
}

impl Merge for PermissionsSpec {
    fn merge(self, overlay: Self) -> Self {
        match (self, overlay) {
            (Self::Fixed(base), Self::Fixed(overlay)) => Self::Fixed(base.merge(overlay)),
            (Self::ByRole { roles: base }, Self::ByRole { roles: overlay }) => Self::ByRole {
                roles: base.merge(overlay),
            },
            (_, overlay) => overlay,
        }
    }
}

/// Path of a view: either a single route or a list of routes.
///
/// The first element of a list is the canonical navigation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewPath {
    Single(String),
    Multiple(Vec<String>),
}

impl ViewPath {
    /// The path navigation entries link to.
    pub fn canonical(&self) -> &str {
        match self {
            Self::Single(path) => path,
            Self::Multiple(paths) => paths.first().map(String::as_str).unwrap_or_default(),
        }
    }
}

/// A static navigation target not backed by a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub path: ViewPath,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub hide_from_navigation: bool,
}

impl View {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: ViewPath::Single(path.into()),
            name: name.into(),
            description: None,
            group: None,
            hide_from_navigation: false,
        }
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hide_from_navigation = true;
        self
    }
}

/// The authenticated user navigation is resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            roles: Vec::new(),
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
