//! # Observability & Tracing
//!
//! Every layer logs through `tracing` with structured fields. [`setup_tracing`] installs a
//! compact subscriber that hides module paths (`with_target(false)`); the `model` and
//! `association` fields already say where a line comes from.
//!
//! ## What Gets Traced
//!
//! - **Requests**: one `send` span per request carrying `method` and `uri`
//! - **Associations**: fetches, cache hits, deferred (not yet fetchable) relations, failures
//! - **Persistence**: saves, rejected saves with their error count, destroys
//! - **Authentication**: responses matching the site's auth-exception signature
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=remote_model=debug`**:
//!
//! ```text
//! DEBUG send: Sending request method=Get uri="/cars/7"
//! DEBUG send: Response status=200
//! DEBUG Fetch model="car" association="wheels" target_type="wheel" uri="/cars/7/wheels"
//! DEBUG send: Sending request method=Get uri="/cars/7/wheels"
//! DEBUG Cache hit model="car" association="wheels"
//! DEBUG Save model="car" method=PUT uri=/cars/7
//!  WARN Save rejected model="car" status=422 errors=1
//! ```

/// Initializes the tracing/logging infrastructure.
///
/// Filtering follows `RUST_LOG`:
/// - `RUST_LOG=info` - saves, destroys and failures
/// - `RUST_LOG=remote_model=debug` - every request, cache hit and deferred fetch
///
/// Safe to call more than once; only the first call installs a subscriber.
///
/// ```ignore
/// setup_tracing();
/// let car = Car::find(&client, 7).await?;
/// ```
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
