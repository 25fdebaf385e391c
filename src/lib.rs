#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Remote Model
//!
//! > **Lazy, cached associations between local models and remote REST resources.**
//!
//! This crate lets a local object model declare relationships to resources living on a
//! remote HTTP service and resolves them on demand. Each relation is fetched at most
//! once per instance unless explicitly reloaded.
//!
//! ## 🏗️ Design Philosophy
//!
//! The HTTP transport is a commodity. The interesting part is the **association
//! engine**: turning a declared relation plus instance state into a concrete URI,
//! deciding whether a cached value is still good, materializing the response into
//! typed models, and folding failures back into the owner's error collection.
//!
//! ## 🚀 Core Concepts
//!
//! ### Relation Kinds
//!
//! | Declaration              | Kind      | Derived URI                  |
//! |--------------------------|-----------|------------------------------|
//! | `has_many wheels: Wheel` | OneToMany | `/cars/7/wheels`             |
//! | `has_one engine: Engine` | OneToOne  | `/cars/7/engine`             |
//! | `belongs_to brand: Brand`| ManyToOne | `/brands/{brand_id}`         |
//!
//! An explicit `path: "/fleet/:id/items"` always wins over the derived shape; every
//! `:token` is read from the owner's attributes.
//!
//! ### Not Yet Fetchable
//! An unsaved car has no id, so `/cars/?/wheels` cannot be built. The getter then
//! returns whatever was assigned locally (usually nothing) and makes no request.
//!
//! ### Mocking: Testing without a Server
//! [`MockConnection`](framework::mock::MockConnection) answers requests from a queue of
//! expectations. See the [`framework::mock`] module.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Every operation returns [`ResourceError`]. Server-side validation failures are *not*
//! errors: `save` returns `false` and the messages land in [`Errors`].
//!
//! ### 2. Context Injection
//! Models never own a connection. The [`ResourceClient`] is passed to every remote call
//! ("late binding"), so the same model types work against several sites.
//!
//! ### 3. Concurrency Model
//! One logical caller per instance. Operations are `async` and complete their single
//! remote call before returning: no background prefetch and no retries.
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields (`model`, `association`, `uri`, `status`).
//! See [`runtime::setup_tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: registry, path builder, resolver and persistence state machine.
//! - **Key items**: [`Model`], [`ModelType`], [`Resolver`], [`AssociationDescriptor`].
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: the [`Connection`](clients::Connection) seam, the reqwest-backed
//!   [`HttpConnection`](clients::HttpConnection) and the [`ResourceClient`].
//!
//! ### 3. The Environment ([`runtime`])
//! - **Role**: [`SiteConfig`] and logging setup.
//!
//! ## 🚀 Quick Start
//!
//! ```rust,ignore
//! use remote_model::{remote_associations, Model, ModelType, Record, ResourceClient, SiteConfig};
//! use std::sync::LazyLock;
//!
//! #[derive(Debug, Clone)]
//! pub struct Car(Record);
//!
//! remote_associations! {
//!     impl Car {
//!         has_many wheels: Wheel;
//!         belongs_to brand: Brand;
//!     }
//! }
//!
//! static CAR: LazyLock<ModelType> = LazyLock::new(|| {
//!     ModelType::new(Car::NAME)
//!         .declare_all(Car::association_descriptors())
//!         .expect("valid associations")
//! });
//!
//! let client = ResourceClient::http(SiteConfig::from_env()?);
//! let mut car = Car::find(&client, 7).await?.expect("car 7");
//! // `CarAssociations` is generated next to `Car`
//! let wheels = car.wheels(&client, false).await?.unwrap_or_default();
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! RUST_LOG=remote_model=debug cargo test
//! ```

pub mod clients;
pub mod framework;
pub mod runtime;

#[doc(hidden)]
pub use async_trait;
#[doc(hidden)]
pub use paste;

pub use clients::{Connection, HttpConnection, ResourceClient, Response};
pub use framework::{
    AssociationDescriptor, Attributes, Errors, Model, ModelType, PathTemplate, Record,
    RelationKind, Resolved, Resolver, ResourceError,
};
pub use runtime::{setup_tracing, SiteConfig};
