//! # Controller Module
//!
//! Controllers, the factory that instantiates them, and the per-request
//! contexts they execute against.
//!
//! ## Overview
//!
//! - [`Controller`] - a unit of request-handling logic identified by area + name.
//!   Controllers declare their actions through [`Controller::describe`] and run
//!   them through [`Controller::process`] (synchronous actions) or
//!   [`Controller::begin_process`] / [`Controller::end_process`] (async pairs).
//! - [`ControllerFactory`] - `(area, name) -> controller`. The default
//!   [`DefaultControllerFactory`] is a registry of constructors.
//! - [`ControllerContextFactory`] - builds the [`ControllerContext`] bound to the
//!   resolved action.
//! - [`EngineContext`] - request-scoped engine state handed to handlers.
//!
//! ## Example
//!
//! ```rust
//! use monorail::controller::{Controller, ControllerContext, DefaultControllerFactory, EngineContext};
//! use monorail::descriptor::DescriptorBuilder;
//! use monorail::handler::HandlerResponse;
//! use monorail::MonoRailError;
//! use std::sync::Arc;
//!
//! struct HomeController;
//!
//! impl Controller for HomeController {
//!     fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
//!         builder.name("home").action("index");
//!         Ok(())
//!     }
//!
//!     fn process(
//!         &self,
//!         _engine: &EngineContext,
//!         context: &mut ControllerContext,
//!     ) -> Result<HandlerResponse, MonoRailError> {
//!         Ok(HandlerResponse::text(200, format!("hello from {}", context.action())))
//!     }
//! }
//!
//! let mut factory = DefaultControllerFactory::new();
//! factory.register("", "home", || Arc::new(HomeController));
//! ```

mod context;
mod factory;

pub use context::{
    ControllerContext, ControllerContextFactory, DefaultControllerContextFactory, EngineContext,
    REQUEST_ID_HEADER,
};
pub use factory::{ControllerConstructor, ControllerFactory, DefaultControllerFactory};

use std::borrow::Cow;

use crate::descriptor::DescriptorBuilder;
use crate::error::MonoRailError;
use crate::handler::HandlerResponse;

/// Request-handling logic for one area/name pair.
///
/// Implementations must be `Send + Sync`: one instance may serve concurrent
/// requests, and async actions run their begin phase on a coroutine.
pub trait Controller: Send + Sync + 'static {
    /// Declare the controller's name, area, session policy, layouts and actions.
    ///
    /// Returning an error makes descriptor resolution fail for this controller.
    fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError>;

    /// Execute a synchronous action.
    fn process(
        &self,
        engine: &EngineContext,
        context: &mut ControllerContext,
    ) -> Result<HandlerResponse, MonoRailError>;

    /// Begin phase of an async action. Runs on a dedicated coroutine.
    fn begin_process(
        &self,
        _engine: &EngineContext,
        context: &mut ControllerContext,
    ) -> Result<(), MonoRailError> {
        Err(MonoRailError::ActionFailed {
            action: context.action().to_string(),
            reason: format!("{} does not implement async actions", self.type_name()),
        })
    }

    /// End phase of an async action. Runs after the begin phase completed.
    fn end_process(
        &self,
        _engine: &EngineContext,
        context: &mut ControllerContext,
    ) -> Result<HandlerResponse, MonoRailError> {
        Err(MonoRailError::ActionFailed {
            action: context.action().to_string(),
            reason: format!("{} does not implement async actions", self.type_name()),
        })
    }

    /// Rust type name of the implementation, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Key under which the descriptor for this controller is cached.
    ///
    /// Defaults to the type name. Controllers whose descriptor depends on
    /// instance data (one type serving several controllers) must override it.
    fn descriptor_key(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.type_name())
    }
}
