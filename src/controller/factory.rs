use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Controller;
use crate::error::MonoRailError;

/// Instantiates (or retrieves) the controller for an area/name pair.
///
/// The strategy is opaque to the dispatcher. Unknown controllers must fail with
/// [`MonoRailError::ControllerNotFound`]; no fallback resolution is attempted.
pub trait ControllerFactory: Send + Sync {
    fn create_controller(
        &self,
        area: &str,
        name: &str,
    ) -> Result<Arc<dyn Controller>, MonoRailError>;
}

/// Constructor stored in the [`DefaultControllerFactory`] registry.
pub type ControllerConstructor = Arc<dyn Fn() -> Arc<dyn Controller> + Send + Sync>;

/// Registry-backed controller factory.
///
/// Area and name are matched case-insensitively. Populate it at startup; it is
/// read-only once shared with the handler factory.
#[derive(Clone, Default)]
pub struct DefaultControllerFactory {
    constructors: HashMap<(String, String), ControllerConstructor>,
}

impl DefaultControllerFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(area: &str, name: &str) -> (String, String) {
        (area.to_ascii_lowercase(), name.to_ascii_lowercase())
    }

    /// Register a constructor invoked once per request.
    ///
    /// **IMPORTANT**: a constructor already registered for the same area/name is
    /// replaced.
    pub fn register<F>(&mut self, area: &str, name: &str, constructor: F)
    where
        F: Fn() -> Arc<dyn Controller> + Send + Sync + 'static,
    {
        let key = Self::key(area, name);
        if self.constructors.remove(&key).is_some() {
            warn!(
                area = %area,
                controller = %name,
                "Replaced existing controller registration"
            );
        }
        self.constructors.insert(key, Arc::new(constructor));
        info!(
            area = %area,
            controller = %name,
            total_controllers = self.constructors.len(),
            "Controller registered"
        );
    }

    /// Register a shared instance handed out for every request.
    pub fn register_instance(&mut self, area: &str, name: &str, controller: Arc<dyn Controller>) {
        self.register(area, name, move || Arc::clone(&controller));
    }

    #[must_use]
    pub fn contains(&self, area: &str, name: &str) -> bool {
        self.constructors.contains_key(&Self::key(area, name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl ControllerFactory for DefaultControllerFactory {
    fn create_controller(
        &self,
        area: &str,
        name: &str,
    ) -> Result<Arc<dyn Controller>, MonoRailError> {
        match self.constructors.get(&Self::key(area, name)) {
            Some(constructor) => {
                debug!(area = %area, controller = %name, "Controller created");
                Ok(constructor())
            }
            None => {
                warn!(
                    area = %area,
                    controller = %name,
                    registered = self.constructors.len(),
                    "Controller not found"
                );
                Err(MonoRailError::ControllerNotFound {
                    area: area.to_string(),
                    name: name.to_string(),
                })
            }
        }
    }
}
