//! # Models
//!
//! Two layers make up a remote model:
//!
//! - [`ModelType`] is the per-type metadata: type name, plural, collection endpoint,
//!   savable attributes and the [`AssociationRegistry`]. Build one per type, usually in a
//!   `static LazyLock`, and never mutate it after first use.
//! - [`Model`] is the trait a typed wrapper implements. It only has to hand out its
//!   [`Record`]; every CRUD operation and association lookup comes as a provided method.
//!
//! ## Context Injection
//!
//! Models carry no connection. Every remote operation takes the [`ResourceClient`] as an
//! argument, so one model type can talk to several sites and tests can swap in a mock.
//!
//! ```rust,ignore
//! use remote_model::{Model, ModelType, Record, AssociationDescriptor};
//! use std::sync::LazyLock;
//!
//! static CAR: LazyLock<ModelType> = LazyLock::new(|| {
//!     ModelType::new(Car::NAME)
//!         .declare_all(Car::association_descriptors())
//!         .expect("valid associations")
//! });
//!
//! impl Model for Car {
//!     const NAME: &'static str = "car";
//!     fn model_type() -> &'static ModelType { &CAR }
//!     // from_record / record / record_mut / into_record
//! }
//!
//! let mut car = Car::find(&client, 7).await?.unwrap();
//! let wheels = car.wheels(&client, false).await?;
//! ```

use crate::clients::ResourceClient;
use crate::framework::association::{AssociationDescriptor, AssociationRegistry};
use crate::framework::error::ResourceError;
use crate::framework::inflect::pluralize;
use crate::framework::persistence;
use crate::framework::record::{value_to_segment, Attributes, Errors, Record};
use crate::framework::resolver::Resolver;
use async_trait::async_trait;
use heck::ToSnakeCase;
use serde_json::Value;

// =============================================================================
// 1. TYPE METADATA
// =============================================================================

/// Per-type metadata shared by every instance of a model.
#[derive(Debug, Clone)]
pub struct ModelType {
    name: String,
    plural: String,
    uri: Option<String>,
    savable: Option<Vec<String>>,
    associations: AssociationRegistry,
}

impl ModelType {
    /// `name` is normalized to snake_case (`"SportsCar"` → `sports_car`).
    pub fn new(name: &str) -> Self {
        let name = name.to_snake_case();
        Self {
            plural: pluralize(&name),
            associations: AssociationRegistry::new(name.clone()),
            name,
            uri: None,
            savable: None,
        }
    }

    /// A subtype starting from a snapshot of `parent`'s associations.
    ///
    /// Only associations carry over; endpoint and savable attributes are the subtype's own.
    pub fn inherit(parent: &ModelType, name: &str) -> Self {
        let mut model = Self::new(name);
        model.associations = parent.associations.inherit(model.name.clone());
        model
    }

    /// Overrides the collection endpoint (default `/{plural}`).
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        self.uri = Some(uri.trim_end_matches('/').to_string());
        self
    }

    /// Restricts the attributes sent on update.
    pub fn with_savable<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.savable = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn declare(mut self, descriptor: AssociationDescriptor) -> Result<Self, ResourceError> {
        self.associations.declare(descriptor)?;
        Ok(self)
    }

    pub fn declare_all(
        mut self,
        descriptors: impl IntoIterator<Item = AssociationDescriptor>,
    ) -> Result<Self, ResourceError> {
        for descriptor in descriptors {
            self.associations.declare(descriptor)?;
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// Collection endpoint, e.g. `/cars`.
    pub fn base_uri(&self) -> String {
        self.uri
            .clone()
            .unwrap_or_else(|| format!("/{}", self.plural))
    }

    /// Member endpoint, e.g. `/cars/7`.
    pub fn member_uri(&self, id: &str) -> String {
        format!("{}/{id}", self.base_uri())
    }

    pub fn savable(&self) -> Option<&[String]> {
        self.savable.as_deref()
    }

    pub fn associations(&self) -> &AssociationRegistry {
        &self.associations
    }

    pub fn associations_mut(&mut self) -> &mut AssociationRegistry {
        &mut self.associations
    }

    pub fn association(&self, name: &str) -> Result<&AssociationDescriptor, ResourceError> {
        self.associations.lookup(name)
    }
}

// =============================================================================
// 2. THE MODEL TRAIT
// =============================================================================

/// A typed view over a [`Record`] of one [`ModelType`].
///
/// Implementors supply the four record accessors; everything else is provided.
/// Use [`remote_associations!`](crate::remote_associations) to generate typed
/// association getters and setters.
#[async_trait]
pub trait Model: Sized + Send + Sync + 'static {
    /// Type name, also used as the association target name.
    const NAME: &'static str;

    fn model_type() -> &'static ModelType;

    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn into_record(self) -> Record;

    // --- Instance state ---

    /// An unsaved instance holding `attributes`.
    fn build(attributes: Attributes) -> Self {
        Self::from_record(Record::from_attributes(attributes))
    }

    fn id(&self) -> Option<&Value> {
        self.record().id()
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.record().attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.record_mut().set_attribute(name, value);
    }

    fn is_new_record(&self) -> bool {
        self.record().is_new_record()
    }

    fn errors(&self) -> &Errors {
        self.record().errors()
    }

    fn cache_key(&self) -> String {
        persistence::cache_key(Self::model_type(), self.record())
    }

    // --- Type-level operations ---

    /// `None` when the service answers 404.
    async fn find<I>(client: &ResourceClient, id: I) -> Result<Option<Self>, ResourceError>
    where
        I: Into<Value> + Send,
    {
        let id: Value = id.into();
        let Some(id) = value_to_segment(&id) else {
            return Ok(None);
        };
        let record = Self::model_type().find(client, &id).await?;
        Ok(record.map(Self::from_record))
    }

    async fn all(client: &ResourceClient) -> Result<Vec<Self>, ResourceError> {
        let records = Self::model_type().all(client).await?;
        Ok(records.into_iter().map(Self::from_record).collect())
    }

    /// Collection GET with `params` as the query string.
    async fn find_where(client: &ResourceClient, params: Value) -> Result<Vec<Self>, ResourceError> {
        let records = Self::model_type().find_where(client, params).await?;
        Ok(records.into_iter().map(Self::from_record).collect())
    }

    async fn search(client: &ResourceClient, params: Value) -> Result<Vec<Self>, ResourceError> {
        Self::find_where(client, params).await
    }

    /// Builds and saves an instance. Check [`Model::errors`] when it stays new.
    async fn create(client: &ResourceClient, attributes: Attributes) -> Result<Self, ResourceError> {
        let record = Self::model_type().create(client, attributes).await?;
        Ok(Self::from_record(record))
    }

    async fn destroy_id<I>(client: &ResourceClient, id: I) -> Result<bool, ResourceError>
    where
        I: Into<Value> + Send,
    {
        let id: Value = id.into();
        match value_to_segment(&id) {
            Some(id) => Self::model_type().destroy(client, &id).await,
            None => Ok(false),
        }
    }

    /// First match for `params`, or an unsaved instance holding them.
    async fn find_or_initialize(
        client: &ResourceClient,
        params: Attributes,
    ) -> Result<Self, ResourceError> {
        let record = Self::model_type().find_or_initialize(client, params).await?;
        Ok(Self::from_record(record))
    }

    /// First match for `params`, or a freshly created instance.
    async fn find_or_create(client: &ResourceClient, params: Attributes) -> Result<Self, ResourceError> {
        let mut found = Self::find_or_initialize(client, params).await?;
        if found.is_new_record() {
            found.save(client).await?;
        }
        Ok(found)
    }

    // --- Instance persistence ---

    async fn save(&mut self, client: &ResourceClient) -> Result<bool, ResourceError> {
        persistence::save(Self::model_type(), client, self.record_mut()).await
    }

    /// Merges `attributes` and saves.
    async fn update_attributes(
        &mut self,
        client: &ResourceClient,
        attributes: Attributes,
    ) -> Result<bool, ResourceError> {
        self.record_mut().merge_attributes(attributes);
        self.save(client).await
    }

    async fn destroy(&self, client: &ResourceClient) -> Result<bool, ResourceError> {
        persistence::destroy(Self::model_type(), client, self.record()).await
    }

    async fn reload(&mut self, client: &ResourceClient) -> Result<(), ResourceError> {
        persistence::reload(Self::model_type(), client, self.record_mut()).await
    }

    // --- Associations ---

    /// Resolves `relation` through its `{relation}_id` attribute against `T`'s endpoint.
    async fn reference<T: Model>(
        &mut self,
        client: &ResourceClient,
        relation: &str,
        reload: bool,
    ) -> Result<Option<T>, ResourceError> {
        let resolver = Resolver::new(Self::model_type(), client);
        let resolved = resolver
            .reference(self.record_mut(), relation, T::model_type(), reload)
            .await?;
        Ok(resolved.to_one::<T>())
    }
}
