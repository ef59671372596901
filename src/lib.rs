//! # MonoRail
//!
//! **MonoRail** is the handler-selection core of an MVC web framework: once
//! routing has matched a request to an area, controller and action, MonoRail
//! instantiates the controller, looks up its metadata, binds a per-request
//! context and picks one of four handler variants to run it.
//!
//! ## Overview
//!
//! Two independent facts decide the variant:
//!
//! - is the controller **sessionless** (declared on the controller), and
//! - is the requested action an **async action pair** (declared per action).
//!
//! | sessionless | async pair | handler |
//! |-------------|------------|---------|
//! | no  | no  | `Standard` |
//! | no  | yes | `Async` |
//! | yes | no  | `Sessionless` |
//! | yes | yes | `AsyncSessionless` |
//!
//! An action the controller does not declare is dispatched synchronously.
//!
//! ## Architecture
//!
//! - **[`routing`]** - route match and request context the host hands in
//! - **[`controller`]** - the [`Controller`](controller::Controller) trait,
//!   controller factory and per-request contexts
//! - **[`descriptor`]** - controller metadata and the caching resolver
//! - **[`handler`]** - [`HandlerFactory`](handler::HandlerFactory), the four
//!   handler variants and their execution on `may` coroutines
//! - **[`views`]** - view engine seam and a `minijinja` implementation
//! - **[`mail`]** - email messages rendered from templates
//! - **[`config`]**, **[`logging`]**, **[`manifest`]**, **[`cli`]** - runtime
//!   configuration, structured logging, YAML-declared controllers and the
//!   `monorail` command line
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use monorail::controller::{
//!     Controller, ControllerContext, DefaultControllerContextFactory, DefaultControllerFactory,
//!     EngineContext,
//! };
//! use monorail::descriptor::{DefaultDescriptorResolver, DescriptorBuilder};
//! use monorail::handler::{HandlerFactory, HandlerKind, HandlerResponse};
//! use monorail::routing::{RequestContext, RouteMatch};
//! use monorail::MonoRailError;
//! use std::sync::Arc;
//!
//! struct ReportsController;
//!
//! impl Controller for ReportsController {
//!     fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
//!         builder.name("reports").sessionless(true).action("index").async_action("export");
//!         Ok(())
//!     }
//!
//!     fn process(
//!         &self,
//!         _engine: &EngineContext,
//!         _context: &mut ControllerContext,
//!     ) -> Result<HandlerResponse, MonoRailError> {
//!         Ok(HandlerResponse::text(200, "reports"))
//!     }
//! }
//!
//! let mut controllers = DefaultControllerFactory::new();
//! controllers.register("", "reports", || Arc::new(ReportsController));
//!
//! let factory = HandlerFactory::new(
//!     Arc::new(controllers),
//!     Arc::new(DefaultDescriptorResolver::default()),
//!     Arc::new(DefaultControllerContextFactory),
//! );
//!
//! let mut request = RequestContext::new(Method::GET, "/reports/export");
//! request.set_route_match(
//!     RouteMatch::new()
//!         .with_param("controller", "reports")
//!         .with_param("action", "export"),
//! );
//!
//! let handler = factory
//!     .get_handler(&request, &Method::GET, "/reports/export", "")
//!     .expect("controller is registered");
//! assert_eq!(handler.kind(), HandlerKind::AsyncSessionless);
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod descriptor;
mod error;
pub mod handler;
pub mod logging;
pub mod mail;
pub mod manifest;
pub mod routing;
pub mod views;

pub use error::MonoRailError;
