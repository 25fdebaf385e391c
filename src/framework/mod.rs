//! The association and persistence engine.
//!
//! # Main Components
//!
//! - [`ModelType`] / [`Model`] - per-type metadata and the typed model trait
//! - [`AssociationDescriptor`] / [`AssociationRegistry`] - declared relations
//! - [`path`] - URI derivation and `:token` interpolation
//! - [`Resolver`] - lazy, cached association fetching
//! - [`persistence`] - save / destroy / reload and collection finders
//! - [`ResourceError`] - the crate-wide error type
//!
//! # Testing
//!
//! See the [`mock`] module for a scripted connection.

mod macros;

pub mod association;
pub mod error;
pub mod inflect;
pub mod mock;
pub mod model;
pub mod path;
pub mod persistence;
pub mod record;
pub mod resolver;

pub use association::{AssociationDescriptor, AssociationRegistry, PathTemplate, RelationKind};
pub use error::ResourceError;
pub use model::{Model, ModelType};
pub use persistence::SavePlan;
pub use record::{Attributes, Errors, Record};
pub use resolver::{AssociationCache, Resolved, Resolver};
