//! # Association Declarations
//!
//! An [`AssociationDescriptor`] is the immutable declaration of one relation: its
//! [`RelationKind`], the target model, and an optional path template or foreign key.
//! Descriptors live in an [`AssociationRegistry`] owned by the declaring
//! [`ModelType`](crate::framework::ModelType).
//!
//! ## Inheritance
//!
//! A subtype starts from a *snapshot* of its parent's registry ([`AssociationRegistry::inherit`]).
//! The copy is independent: declaring on the subtype never touches the parent's table.

use crate::framework::error::ResourceError;
use crate::framework::record::Record;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cardinality of a declared association, which also decides the derived URI shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// `/{owner_base}/{id}/{relation_plural}`
    OneToMany,
    /// `/{owner_base}/{id}/{relation_singular}`
    OneToOne,
    /// `/{relation_plural}/{foreign_key_value}`
    ManyToOne,
}

impl RelationKind {
    /// Only many-to-one relations resolve through a foreign key.
    pub fn accepts_foreign_key(self) -> bool {
        matches!(self, RelationKind::ManyToOne)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RelationKind::OneToMany => "one-to-many",
            RelationKind::OneToOne => "one-to-one",
            RelationKind::ManyToOne => "many-to-one",
        };
        f.write_str(label)
    }
}

/// An explicit path for an association, overriding the derived shape.
///
/// Literal templates may contain `:attribute` tokens (`"/users/:owner_id/cars"`).
/// Computed templates are evaluated against the owning record first and then
/// interpolated the same way.
#[derive(Clone)]
pub enum PathTemplate {
    Literal(String),
    Computed(Arc<dyn Fn(&Record) -> String + Send + Sync>),
}

impl PathTemplate {
    pub fn computed(f: impl Fn(&Record) -> String + Send + Sync + 'static) -> Self {
        PathTemplate::Computed(Arc::new(f))
    }

    /// Produces the raw (not yet interpolated) template for `record`.
    pub fn render(&self, record: &Record) -> String {
        match self {
            PathTemplate::Literal(template) => template.clone(),
            PathTemplate::Computed(f) => f(record),
        }
    }
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathTemplate::Literal(template) => f.debug_tuple("Literal").field(template).finish(),
            PathTemplate::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for PathTemplate {
    fn from(template: &str) -> Self {
        PathTemplate::Literal(template.to_string())
    }
}

impl From<String> for PathTemplate {
    fn from(template: String) -> Self {
        PathTemplate::Literal(template)
    }
}

/// Declaration of a single relation.
#[derive(Debug, Clone)]
pub struct AssociationDescriptor {
    name: String,
    kind: RelationKind,
    target: String,
    path: Option<PathTemplate>,
    foreign_key: Option<String>,
}

impl AssociationDescriptor {
    /// `target` is the target model's type name (see [`Model::NAME`](crate::framework::Model::NAME)).
    pub fn new(name: impl Into<String>, kind: RelationKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            path: None,
            foreign_key: None,
        }
    }

    pub fn has_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, RelationKind::OneToMany, target)
    }

    pub fn has_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, RelationKind::OneToOne, target)
    }

    pub fn belongs_to(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(name, RelationKind::ManyToOne, target)
    }

    /// Sets an explicit path template; it always wins over the derived shape.
    pub fn path(mut self, path: impl Into<PathTemplate>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the attribute holding the target's id (many-to-one only).
    pub fn foreign_key(mut self, foreign_key: impl Into<String>) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn path_template(&self) -> Option<&PathTemplate> {
        self.path.as_ref()
    }

    pub fn foreign_key_name(&self) -> Option<&str> {
        self.foreign_key.as_deref()
    }

    /// Attribute read for a many-to-one id: the explicit foreign key or `{name}_id`.
    pub fn foreign_key_attribute(&self) -> String {
        self.foreign_key
            .clone()
            .unwrap_or_else(|| format!("{}_id", self.name))
    }

    /// Rejects a foreign key on kinds that cannot use one.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if self.foreign_key.is_some() && !self.kind.accepts_foreign_key() {
            return Err(ResourceError::MissingForeignKey {
                association: self.name.clone(),
                kind: self.kind,
            });
        }
        Ok(())
    }
}

/// Relation name → descriptor table for one model type.
#[derive(Debug, Clone, Default)]
pub struct AssociationRegistry {
    owner: String,
    descriptors: HashMap<String, AssociationDescriptor>,
}

impl AssociationRegistry {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            descriptors: HashMap::new(),
        }
    }

    /// Independent snapshot of this registry for a subtype named `owner`.
    pub fn inherit(&self, owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            descriptors: self.descriptors.clone(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Registers `descriptor`, replacing any earlier declaration of the same name.
    ///
    /// Returns the replaced descriptor, if any.
    pub fn declare(
        &mut self,
        descriptor: AssociationDescriptor,
    ) -> Result<Option<AssociationDescriptor>, ResourceError> {
        descriptor.validate()?;
        Ok(self
            .descriptors
            .insert(descriptor.name.clone(), descriptor))
    }

    pub fn lookup(&self, name: &str) -> Result<&AssociationDescriptor, ResourceError> {
        self.descriptors
            .get(name)
            .ok_or_else(|| ResourceError::UnknownAssociation {
                model: self.owner.clone(),
                association: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssociationDescriptor> {
        self.descriptors.values()
    }
}
