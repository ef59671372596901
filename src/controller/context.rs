use http::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use ulid::Ulid;

use crate::descriptor::{ActionDescriptor, ActionMap, ControllerMetaDescriptor};
use crate::error::MonoRailError;
use crate::routing::{Items, RequestContext, RouteMatch};

/// Header carrying a caller-supplied request id (ULID).
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Engine-level state for one request, carried by the selected handler.
#[derive(Debug, Clone)]
pub struct EngineContext {
    /// Request id for log correlation; taken from [`REQUEST_ID_HEADER`] when valid
    pub request_id: Ulid,
    pub method: Method,
    pub url_path: String,
    /// Physical path the host translated the URL to (may be empty)
    pub path_translated: String,
    /// Snapshot of the request item bag
    pub items: Items,
}

impl EngineContext {
    /// Build the engine context for a request about to be dispatched.
    #[must_use]
    pub fn from_request(
        request: &RequestContext,
        method: &Method,
        url_path: &str,
        path_translated: &str,
    ) -> Self {
        let request_id = request
            .header(REQUEST_ID_HEADER)
            .and_then(|s| Ulid::from_string(s).ok())
            .unwrap_or_else(Ulid::new);
        Self {
            request_id,
            method: method.clone(),
            url_path: url_path.to_string(),
            path_translated: path_translated.to_string(),
            items: request.items().clone(),
        }
    }
}

/// Per-request execution state of a controller.
///
/// Owned by the request. Shares the [`ControllerMetaDescriptor`] (and therefore
/// its action map) with the resolver rather than copying it.
#[derive(Debug, Clone)]
pub struct ControllerContext {
    area: String,
    name: String,
    action: String,
    descriptor: Arc<ControllerMetaDescriptor>,
    route_match: Arc<RouteMatch>,
    layout_names: Option<Vec<String>>,
    property_bag: Map<String, Value>,
}

impl ControllerContext {
    #[must_use]
    pub fn new(
        area: impl Into<String>,
        name: impl Into<String>,
        action: impl Into<String>,
        descriptor: Arc<ControllerMetaDescriptor>,
        route_match: Arc<RouteMatch>,
    ) -> Self {
        Self {
            area: area.into(),
            name: name.into(),
            action: action.into(),
            descriptor,
            route_match,
            layout_names: None,
            property_bag: Map::new(),
        }
    }

    #[must_use]
    pub fn area(&self) -> &str {
        &self.area
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub fn descriptor(&self) -> &Arc<ControllerMetaDescriptor> {
        &self.descriptor
    }

    /// The action map of the descriptor this context was created with.
    #[must_use]
    pub fn actions(&self) -> &ActionMap {
        self.descriptor.actions()
    }

    /// Descriptor of the resolved action, if the controller declared it.
    #[must_use]
    pub fn action_descriptor(&self) -> Option<&ActionDescriptor> {
        self.descriptor.action(&self.action)
    }

    #[must_use]
    pub fn route_match(&self) -> &Arc<RouteMatch> {
        &self.route_match
    }

    /// Layouts applied when rendering, outermost first. `None` renders bare.
    #[must_use]
    pub fn layout_names(&self) -> Option<&[String]> {
        self.layout_names.as_deref()
    }

    pub fn set_layout_names(&mut self, layouts: Option<Vec<String>>) {
        self.layout_names = layouts;
    }

    /// Swap the layouts, returning the previous ones.
    pub fn replace_layout_names(&mut self, layouts: Option<Vec<String>>) -> Option<Vec<String>> {
        std::mem::replace(&mut self.layout_names, layouts)
    }

    /// Values exposed to views.
    #[must_use]
    pub fn property_bag(&self) -> &Map<String, Value> {
        &self.property_bag
    }

    pub fn property_bag_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.property_bag
    }
}

/// Builds the [`ControllerContext`] for a resolved controller action.
///
/// Construction only: no side effects beyond allocating the context. The
/// returned context must carry `descriptor` itself, not a copy.
pub trait ControllerContextFactory: Send + Sync {
    fn create(
        &self,
        area: &str,
        controller_name: &str,
        action_name: &str,
        descriptor: Arc<ControllerMetaDescriptor>,
        route_match: Arc<RouteMatch>,
    ) -> Result<ControllerContext, MonoRailError>;
}

/// Context factory seeding layouts from the controller's declared layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultControllerContextFactory;

impl ControllerContextFactory for DefaultControllerContextFactory {
    fn create(
        &self,
        area: &str,
        controller_name: &str,
        action_name: &str,
        descriptor: Arc<ControllerMetaDescriptor>,
        route_match: Arc<RouteMatch>,
    ) -> Result<ControllerContext, MonoRailError> {
        let layouts = &descriptor.controller.layouts;
        let layout_names = (!layouts.is_empty()).then(|| layouts.clone());

        let mut context =
            ControllerContext::new(area, controller_name, action_name, descriptor, route_match);
        context.set_layout_names(layout_names);

        debug!(
            area = %area,
            controller = %controller_name,
            action = %action_name,
            layouts = ?context.layout_names(),
            "Controller context created"
        );
        Ok(context)
    }
}
