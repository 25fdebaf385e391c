//! # Association Resolver
//!
//! Lazily resolves declared associations for one record at a time and keeps the
//! results in the record's [`AssociationCache`].
//!
//! ## Cache Contract
//!
//! - `get(name, reload = false)` fetches only on a cache miss, so a relation is
//!   fetched at most once per instance.
//! - `get(name, reload = true)` always refetches and overwrites the entry.
//! - A relation whose URI cannot be built yet (no id, no foreign key, missing
//!   template token) is never fetched; `get` hands back whatever is cached, usually
//!   [`Resolved::Absent`].
//! - Nothing expires on its own: the cache lives exactly as long as the record.

use crate::clients::{Fetched, ResourceClient};
use crate::framework::association::RelationKind;
use crate::framework::error::ResourceError;
use crate::framework::model::{Model, ModelType};
use crate::framework::path;
use crate::framework::record::{value_to_segment, Record};
use std::collections::HashMap;
use tracing::{debug, warn};

static ABSENT: Resolved = Resolved::Absent;

/// A cached association value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Resolved {
    /// Fetched (or assigned) and known to be empty.
    #[default]
    Absent,
    One(Record),
    Many(Vec<Record>),
}

impl Resolved {
    pub fn one<T: Model>(value: Option<T>) -> Self {
        match value {
            Some(value) => Resolved::One(value.into_record()),
            None => Resolved::Absent,
        }
    }

    pub fn many<T: Model>(values: Vec<T>) -> Self {
        Resolved::Many(values.into_iter().map(Model::into_record).collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    pub fn as_one(&self) -> Option<&Record> {
        match self {
            Resolved::One(record) => Some(record),
            Resolved::Many(records) => records.first(),
            Resolved::Absent => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Record]> {
        match self {
            Resolved::One(record) => Some(std::slice::from_ref(record)),
            Resolved::Many(records) => Some(records),
            Resolved::Absent => None,
        }
    }

    /// Typed copy of a single-valued association.
    pub fn to_one<T: Model>(&self) -> Option<T> {
        self.as_one().cloned().map(T::from_record)
    }

    /// Typed copy of a collection association; a single object becomes a one-element list.
    pub fn to_many<T: Model>(&self) -> Option<Vec<T>> {
        self.as_many()
            .map(|records| records.iter().cloned().map(T::from_record).collect())
    }
}

impl From<Fetched> for Resolved {
    fn from(fetched: Fetched) -> Self {
        match fetched {
            Fetched::One(attributes) => Resolved::One(Record::from_attributes(attributes)),
            Fetched::Many(items) => {
                Resolved::Many(items.into_iter().map(Record::from_attributes).collect())
            }
            Fetched::Empty => Resolved::Absent,
        }
    }
}

/// Relation name → resolved value, scoped to one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationCache {
    entries: HashMap<String, Resolved>,
}

impl AssociationCache {
    pub fn get(&self, name: &str) -> Option<&Resolved> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Stores `value` under `name`, returning the previous entry.
    pub fn insert(&mut self, name: impl Into<String>, value: Resolved) -> Option<Resolved> {
        self.entries.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves associations of records of one [`ModelType`] through a [`ResourceClient`].
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    model: &'a ModelType,
    client: &'a ResourceClient,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a ModelType, client: &'a ResourceClient) -> Self {
        Self { model, client }
    }

    /// True when every value needed to build the relation's URI is present.
    pub fn can_resolve(&self, record: &Record, name: &str) -> Result<bool, ResourceError> {
        let descriptor = self.model.association(name)?;
        path::is_resolvable(descriptor, self.model, record)
    }

    /// Returns the cached value for `name`, fetching first on a miss or when `reload` is set.
    pub async fn get<'r>(
        &self,
        record: &'r mut Record,
        name: &str,
        reload: bool,
    ) -> Result<&'r Resolved, ResourceError> {
        if !self.can_resolve(record, name)? {
            debug!(model = self.model.name(), association = name, "Not resolvable yet");
            return Ok(record.associations().get(name).unwrap_or(&ABSENT));
        }
        if reload || !record.associations().contains(name) {
            self.fetch(record, name).await?;
        } else {
            debug!(model = self.model.name(), association = name, "Cache hit");
        }
        Ok(record.associations().get(name).unwrap_or(&ABSENT))
    }

    /// Fetches `name` and overwrites its cache entry. A URI that cannot be built yet is a no-op.
    pub async fn fetch(&self, record: &mut Record, name: &str) -> Result<(), ResourceError> {
        let descriptor = self.model.association(name)?;
        let uri = match path::resolve(descriptor, self.model, record) {
            Ok(uri) => uri,
            Err(e) if e.is_unresolved() => {
                debug!(model = self.model.name(), association = name, error = %e, "Fetch deferred");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.load(record, name, descriptor.target(), descriptor.kind(), &uri).await
    }

    /// Unconditionally replaces the cache entry for `name`.
    pub fn set(record: &mut Record, name: &str, value: Resolved) {
        record.associations_mut().insert(name, value);
    }

    /// Resolves `relation` through the `{relation}_id` attribute convention.
    ///
    /// The target is fetched from `target`'s member endpoint. A relation declared on the
    /// model with the same name takes precedence over the convention.
    pub async fn reference<'r>(
        &self,
        record: &'r mut Record,
        relation: &str,
        target: &ModelType,
        reload: bool,
    ) -> Result<&'r Resolved, ResourceError> {
        if self.model.associations().contains(relation) {
            return self.get(record, relation, reload).await;
        }

        if !record.id_relations().iter().any(|implied| implied == relation) {
            return Err(ResourceError::UnknownAssociation {
                model: self.model.name().to_string(),
                association: relation.to_string(),
            });
        }
        let key = format!("{relation}_id");
        let Some(id) = record.attribute(&key).and_then(value_to_segment) else {
            debug!(model = self.model.name(), association = relation, "Not resolvable yet");
            return Ok(record.associations().get(relation).unwrap_or(&ABSENT));
        };

        if reload || !record.associations().contains(relation) {
            let uri = target.member_uri(&id);
            self.load(record, relation, target.name(), RelationKind::ManyToOne, &uri)
                .await?;
        }
        Ok(record.associations().get(relation).unwrap_or(&ABSENT))
    }

    async fn load(
        &self,
        record: &mut Record,
        name: &str,
        target: &str,
        kind: RelationKind,
        uri: &str,
    ) -> Result<(), ResourceError> {
        debug!(model = self.model.name(), association = name, target_type = target, uri, "Fetch");
        let response = self.client.get(uri, None).await?;

        let resolved = if response.is_success() {
            match (kind, response.shape()) {
                // An empty collection is still a fetched collection
                (RelationKind::OneToMany, Fetched::Empty) => Resolved::Many(Vec::new()),
                (_, fetched) => Resolved::from(fetched),
            }
        } else if response.status == 404 {
            Resolved::Absent
        } else {
            if let Some(body) = &response.body {
                record.errors_mut().absorb(body);
            }
            warn!(
                model = self.model.name(),
                association = name,
                status = response.status,
                "Fetch failed"
            );
            return Err(ResourceError::Status {
                status: response.status,
                uri: uri.to_string(),
            });
        };

        Self::set(record, name, resolved);
        Ok(())
    }
}
