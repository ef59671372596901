use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ControllerMetaDescriptor, DescriptorBuilder};
use crate::controller::Controller;
use crate::error::MonoRailError;

/// Produces the [`ControllerMetaDescriptor`] for a controller instance.
///
/// Must be idempotent per controller type: repeated calls return equivalent
/// descriptors. Introspection failures surface as
/// [`MonoRailError::DescriptorResolution`], never as a partial descriptor.
pub trait DescriptorResolver: Send + Sync {
    fn build_descriptor(
        &self,
        controller: &dyn Controller,
    ) -> Result<Arc<ControllerMetaDescriptor>, MonoRailError>;
}

/// Resolver driven by [`Controller::describe`], with a per-type cache.
///
/// The cache is the only state shared between concurrent selections. Population
/// is insert-if-absent: two requests racing on a cold entry may both build a
/// descriptor, but only the first insert is kept and both callers return it.
pub struct DefaultDescriptorResolver {
    /// Cache keyed by [`Controller::descriptor_key`]
    cache: DashMap<String, Arc<ControllerMetaDescriptor>>,
    /// Whether the cache is enabled (`descriptors.cache` in config)
    enabled: bool,
}

impl Default for DefaultDescriptorResolver {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DefaultDescriptorResolver {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        info!(enabled = enabled, "Initializing controller descriptor cache");
        Self {
            cache: DashMap::new(),
            enabled,
        }
    }

    /// Number of cached descriptors.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached descriptor.
    pub fn clear(&self) {
        let evicted = self.cache.len();
        self.cache.clear();
        info!(evicted = evicted, "Controller descriptor cache cleared");
    }

    fn describe(controller: &dyn Controller) -> Result<ControllerMetaDescriptor, MonoRailError> {
        let type_name = controller.type_name();
        let mut builder = DescriptorBuilder::new(type_name);
        controller.describe(&mut builder).map_err(|e| match e {
            MonoRailError::DescriptorResolution { .. } => e,
            other => MonoRailError::DescriptorResolution {
                controller: type_name.to_string(),
                reason: other.to_string(),
            },
        })?;
        builder.build()
    }
}

impl DescriptorResolver for DefaultDescriptorResolver {
    fn build_descriptor(
        &self,
        controller: &dyn Controller,
    ) -> Result<Arc<ControllerMetaDescriptor>, MonoRailError> {
        if !self.enabled {
            return Self::describe(controller).map(Arc::new);
        }

        let key = controller.descriptor_key();

        if let Some(cached) = self.cache.get(key.as_ref()) {
            debug!(cache_key = %key, "Descriptor cache hit");
            return Ok(Arc::clone(cached.value()));
        }

        let built = Arc::new(Self::describe(controller)?);
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(|| Arc::clone(&built));
        let descriptor = Arc::clone(entry.value());
        drop(entry);

        info!(
            cache_key = %key,
            controller = %descriptor.controller.name,
            area = %descriptor.controller.area,
            actions = descriptor.actions().len(),
            sessionless = descriptor.controller.is_sessionless,
            "Controller descriptor built and cached"
        );
        Ok(descriptor)
    }
}
