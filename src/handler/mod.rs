//! # Handler Module
//!
//! The handler selection core: given a routed request, decide which of four
//! handler variants processes it.
//!
//! ## Selection
//!
//! [`HandlerFactory::get_handler`] runs these steps, in order:
//!
//! 1. read the [`RouteMatch`](crate::routing::RouteMatch) routing stored in the
//!    request context (area, controller, action)
//! 2. ask the [`ControllerFactory`](crate::controller::ControllerFactory) for the controller
//! 3. ask the [`DescriptorResolver`](crate::descriptor::DescriptorResolver) for its descriptor
//! 4. ask the [`ControllerContextFactory`](crate::controller::ControllerContextFactory)
//!    for a context bound to the action
//! 5. combine two independent predicates into a [`HandlerKind`]:
//!
//! | sessionless | async action pair | handler |
//! |-------------|-------------------|---------|
//! | no          | no                | [`Handler::Standard`] |
//! | no          | yes               | [`Handler::Async`] |
//! | yes         | no                | [`Handler::Sessionless`] |
//! | yes         | yes               | [`Handler::AsyncSessionless`] |
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as HTTP host
//!     participant HF as HandlerFactory
//!     participant CF as ControllerFactory
//!     participant DR as DescriptorResolver
//!     participant CCF as ControllerContextFactory
//!
//!     Host->>HF: get_handler(request, method, path, translated)
//!     HF->>HF: route match from request items
//!     alt No route match
//!         HF-->>Host: RouteMatchMissing
//!     end
//!     HF->>CF: create_controller(area, name)
//!     alt Unknown controller
//!         CF-->>Host: ControllerNotFound
//!     end
//!     HF->>DR: build_descriptor(controller)
//!     HF->>CCF: create(area, name, action, descriptor, route match)
//!     HF->>HF: select(sessionless, is_async)
//!     HF-->>Host: Handler
//!     Host->>Host: handler.execute()
//! ```
//!
//! An action missing from the descriptor's action map is dispatched
//! synchronously; whether it exists is checked when the controller runs it.
//!
//! ## Execution
//!
//! Selection never executes anything. [`Handler::execute`] runs the action:
//! synchronous variants call [`Controller::process`](crate::controller::Controller::process);
//! async variants run the begin phase on a `may` coroutine and the end phase on
//! the caller once the begin phase reported back.

mod factory;
mod response;
mod variants;

pub use factory::HandlerFactory;
pub use response::{HandlerResponse, HeaderVec, MAX_INLINE_HEADERS};
pub use variants::{Handler, HandlerKind, HandlerState, DEFAULT_ASYNC_STACK_SIZE};
