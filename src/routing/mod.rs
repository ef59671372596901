//! # Routing Module
//!
//! Routing itself (matching a URL against route rules) happens upstream of this
//! crate. This module holds what routing leaves behind for the dispatcher:
//!
//! - [`RouteMatch`] - the named parameters extracted from the URL
//!   (at minimum `area`, `controller` and `action`)
//! - [`RequestContext`] - the per-request state the host hands to the
//!   [`HandlerFactory`](crate::handler::HandlerFactory), with an item bag where
//!   the route match is stored under [`ROUTE_MATCH_KEY`]
//!
//! ## Example
//!
//! ```rust
//! use monorail::routing::{RequestContext, RouteMatch};
//! use http::Method;
//!
//! let route_match = RouteMatch::new()
//!     .with_param("controller", "home")
//!     .with_param("action", "index");
//!
//! let mut request = RequestContext::new(Method::GET, "/home/index");
//! request.set_route_match(route_match);
//!
//! let stored = request.route_match().expect("stored above");
//! assert_eq!(stored.controller(), Some("home"));
//! assert_eq!(stored.area(), "");
//! ```

mod request;
mod route_match;

pub use request::{Items, RequestContext, ROUTE_MATCH_KEY};
pub use route_match::{ParamVec, RouteMatch, MAX_INLINE_PARAMS};
