//! The resource lifecycle client.

use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::error::{LifecycleError, LifecycleResult};
use crate::pager::ResourcePager;
use crate::resource::Resource;
use crate::retry::RetryingControlPlane;
use crate::wait::WaitOptions;
use sagekit_abstraction::{from_payload, to_payload, ControlPlane, Payload};
use sagekit_resources::{AttributeUpdate, ListFilters, ResourceKind, ResourceSchema};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle operations over one resource type.
///
/// Every operation is a blocking round trip through the transport. The
/// client keeps no per-resource state; snapshots live in the handles.
pub struct ResourceClient<K: ResourceKind> {
    transport: Arc<dyn ControlPlane>,
    pub(crate) clock: Arc<dyn Clock>,
    wait_defaults: WaitOptions,
    page_size: Option<u32>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> ResourceClient<K> {
    /// Client over `transport` with the system clock and default wait options.
    pub fn new(transport: Arc<dyn ControlPlane>) -> Self {
        Self {
            transport,
            clock: Arc::new(SystemClock),
            wait_defaults: WaitOptions::default(),
            page_size: None,
            _kind: PhantomData,
        }
    }

    /// Client configured from `config`, with throttling retries wrapped around `transport`.
    pub fn from_config(transport: Arc<dyn ControlPlane>, config: &ClientConfig) -> LifecycleResult<Self> {
        Self::from_config_with_clock(transport, config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        transport: Arc<dyn ControlPlane>,
        config: &ClientConfig,
        clock: Arc<dyn Clock>,
    ) -> LifecycleResult<Self> {
        config.validate()?;
        let retrying =
            RetryingControlPlane::new(transport, config.retry.to_policy()).with_clock(clock.clone());
        Ok(Self {
            transport: Arc::new(retrying),
            clock,
            wait_defaults: config.wait.to_options(),
            page_size: config.list.page_size,
            _kind: PhantomData,
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_wait_defaults(mut self, options: WaitOptions) -> Self {
        self.wait_defaults = options;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        K::schema()
    }

    pub fn wait_defaults(&self) -> &WaitOptions {
        &self.wait_defaults
    }

    pub(crate) fn call(&self, operation: &str, payload: Payload) -> LifecycleResult<Payload> {
        debug!(operation = %operation, "Executing control-plane operation");
        self.transport.execute(operation, payload).map_err(|err| {
            debug!(operation = %operation, error = %err, "Control-plane operation failed");
            LifecycleError::from(err)
        })
    }

    fn identifier_payload(name: &str) -> Payload {
        let mut payload = Payload::new();
        payload.insert(K::schema().identifier.to_string(), name.into());
        payload
    }

    /// Creates a resource from a fully-formed specification.
    ///
    /// The spec is validated locally first; a missing or malformed section
    /// fails with a validation error and nothing is sent. The returned handle
    /// holds the name plus whatever the create call returned (typically the
    /// ARN) and is immediately usable for `refresh` and `wait`.
    pub fn create(&self, spec: &K::CreateSpec) -> LifecycleResult<Resource<K>> {
        let schema = K::schema();
        K::validate_create(spec)?;
        let payload = to_payload(spec).map_err(|e| LifecycleError::Validation(e.to_string()))?;
        schema.check_required(&payload)?;

        let name = K::create_name(spec).to_string();
        let response = self.call(schema.operations.create, payload)?;

        let mut seed = Self::identifier_payload(&name);
        seed.extend(response);
        let snapshot = from_payload(seed).map_err(|e| LifecycleError::malformed(schema.operations.create, e))?;
        let handle = Resource::new(name, snapshot);

        let arn = handle.arn().unwrap_or_else(|| "-".to_string());
        info!(resource = schema.type_name, name = %handle.name(), arn = %arn, "Created resource");
        Ok(handle)
    }

    fn describe(&self, name: &str) -> LifecycleResult<K::Snapshot> {
        let schema = K::schema();
        if name.trim().is_empty() {
            return Err(LifecycleError::Validation(format!("{} name must not be empty", schema.type_name)));
        }
        let response = self.call(schema.operations.describe, Self::identifier_payload(name))?;
        from_payload(response).map_err(|e| LifecycleError::malformed(schema.operations.describe, e))
    }

    /// Fetches the full current snapshot of an existing resource.
    pub fn get(&self, name: &str) -> LifecycleResult<Resource<K>> {
        let snapshot = self.describe(name)?;
        Ok(Resource::new(name.to_string(), snapshot))
    }

    /// Re-reads the resource and overwrites the handle's snapshot in place.
    pub fn refresh(&self, handle: &mut Resource<K>) -> LifecycleResult<()> {
        let snapshot = self.describe(handle.name())?;
        handle.replace_snapshot(snapshot);
        Ok(())
    }

    /// Lazily lists resources, following pagination cursors on demand.
    ///
    /// No request is sent until the pager is first advanced.
    pub fn get_all(&self, filters: &ListFilters) -> ResourcePager<K> {
        let mut filters = filters.clone();
        if filters.max_results.is_none() {
            filters.max_results = self.page_size;
        }
        ResourcePager::new(self.transport.clone(), filters.to_payload())
    }

    /// Changes attributes the control plane allows to change after creation.
    ///
    /// Unknown or immutable attributes fail with a validation error before
    /// any remote call. Rejections from the control plane are returned as-is.
    pub fn update(&self, handle: &mut Resource<K>, update: &AttributeUpdate) -> LifecycleResult<()> {
        let schema = K::schema();
        let mut payload = update.to_payload(schema)?;
        payload.insert(schema.identifier.to_string(), handle.name().into());

        let response = self.call(schema.operations.update, payload)?;
        let partial = from_payload(response).map_err(|e| LifecycleError::malformed(schema.operations.update, e))?;
        handle.merge_snapshot(partial);

        info!(
            resource = schema.type_name,
            name = %handle.name(),
            attributes = ?update.keys().collect::<Vec<_>>(),
            "Updated resource"
        );
        Ok(())
    }

    /// Requests that the resource stop. Errors from the control plane are not suppressed.
    pub fn stop(&self, handle: &Resource<K>) -> LifecycleResult<()> {
        let schema = K::schema();
        self.call(schema.operations.stop, Self::identifier_payload(handle.name()))?;
        info!(resource = schema.type_name, name = %handle.name(), "Stop requested");
        Ok(())
    }

    /// Deletes the resource. Errors from the control plane are not suppressed.
    pub fn delete(&self, handle: &Resource<K>) -> LifecycleResult<()> {
        let schema = K::schema();
        self.call(schema.operations.delete, Self::identifier_payload(handle.name()))?;
        info!(resource = schema.type_name, name = %handle.name(), "Deleted resource");
        Ok(())
    }
}

impl<K: ResourceKind> Clone for ResourceClient<K> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            clock: self.clock.clone(),
            wait_defaults: self.wait_defaults.clone(),
            page_size: self.page_size,
            _kind: PhantomData,
        }
    }
}
