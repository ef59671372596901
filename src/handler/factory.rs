use http::Method;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{Handler, HandlerKind, HandlerState, DEFAULT_ASYNC_STACK_SIZE};
use crate::controller::{
    ControllerContext, ControllerContextFactory, ControllerFactory, EngineContext,
};
use crate::descriptor::{ActionDescriptor, ControllerMetaDescriptor, DescriptorResolver};
use crate::error::MonoRailError;
use crate::routing::RequestContext;

/// Selects the handler variant for each request.
///
/// The three collaborators are injected at construction and never change
/// afterwards, so one factory can serve every request concurrently. Selection
/// itself holds no state between calls.
#[derive(Clone)]
pub struct HandlerFactory {
    controller_factory: Arc<dyn ControllerFactory>,
    descriptor_resolver: Arc<dyn DescriptorResolver>,
    context_factory: Arc<dyn ControllerContextFactory>,
    stack_size: usize,
}

impl HandlerFactory {
    #[must_use]
    pub fn new(
        controller_factory: Arc<dyn ControllerFactory>,
        descriptor_resolver: Arc<dyn DescriptorResolver>,
        context_factory: Arc<dyn ControllerContextFactory>,
    ) -> Self {
        Self {
            controller_factory,
            descriptor_resolver,
            context_factory,
            stack_size: DEFAULT_ASYNC_STACK_SIZE,
        }
    }

    /// Stack size handed to async handlers for their begin-phase coroutine.
    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    /// Resolve the controller for the routed request and pick its handler.
    ///
    /// # Errors
    ///
    /// - [`MonoRailError::RouteMatchMissing`] if routing has not stored a match
    /// - [`MonoRailError::RouteParameterMissing`] if the match names no
    ///   controller or action
    /// - whatever the controller factory, descriptor resolver or context
    ///   factory report, unchanged
    pub fn get_handler(
        &self,
        request: &RequestContext,
        method: &Method,
        url_path: &str,
        path_translated: &str,
    ) -> Result<Handler, MonoRailError> {
        let route_match = request.route_match().ok_or_else(|| {
            error!(
                method = %method,
                url_path = %url_path,
                "No route match in request context - routing must run before dispatch"
            );
            MonoRailError::RouteMatchMissing
        })?;

        let area = route_match.area();
        let controller_name = route_match
            .controller()
            .ok_or(MonoRailError::RouteParameterMissing {
                parameter: "controller",
            })?;
        let action_name = route_match
            .action()
            .ok_or(MonoRailError::RouteParameterMissing { parameter: "action" })?;

        debug!(
            area = %area,
            controller = %controller_name,
            action = %action_name,
            url_path = %url_path,
            "Resolving handler"
        );

        let controller = self
            .controller_factory
            .create_controller(area, controller_name)?;
        let descriptor = self.descriptor_resolver.build_descriptor(controller.as_ref())?;
        let controller_context = self.context_factory.create(
            area,
            controller_name,
            action_name,
            Arc::clone(&descriptor),
            Arc::clone(&route_match),
        )?;

        let kind = Self::select_kind(&descriptor, &controller_context, action_name);
        let engine_context = EngineContext::from_request(request, method, url_path, path_translated);

        info!(
            request_id = %engine_context.request_id,
            area = %area,
            controller = %controller_name,
            action = %action_name,
            handler = %kind,
            "Handler selected"
        );

        Ok(Handler::new(
            kind,
            HandlerState {
                controller,
                controller_context,
                engine_context,
                stack_size: self.stack_size,
            },
        ))
    }

    /// Session policy comes from the controller descriptor. The action kind
    /// comes from the context's action map; an action the map does not know
    /// dispatches synchronously and is checked when it is invoked.
    #[must_use]
    pub fn select_kind(
        descriptor: &ControllerMetaDescriptor,
        context: &ControllerContext,
        action_name: &str,
    ) -> HandlerKind {
        let is_async = context
            .actions()
            .get(action_name)
            .is_some_and(ActionDescriptor::is_async);
        HandlerKind::select(descriptor.is_sessionless(), is_async)
    }
}
