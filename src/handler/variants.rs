use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::HandlerResponse;
use crate::controller::{Controller, ControllerContext, EngineContext};
use crate::error::MonoRailError;

/// Default stack size for the coroutine running an async action's begin phase.
pub const DEFAULT_ASYNC_STACK_SIZE: usize = 0x10000;

/// The four handler variants, one per (session policy, action kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Session-bound, synchronous action
    Standard,
    /// Session-bound, async action pair
    Async,
    /// Sessionless controller, synchronous action
    Sessionless,
    /// Sessionless controller, async action pair
    AsyncSessionless,
}

impl HandlerKind {
    /// Pure selection over the two independent predicates.
    #[must_use]
    pub const fn select(sessionless: bool, is_async: bool) -> Self {
        match (sessionless, is_async) {
            (false, false) => HandlerKind::Standard,
            (false, true) => HandlerKind::Async,
            (true, false) => HandlerKind::Sessionless,
            (true, true) => HandlerKind::AsyncSessionless,
        }
    }

    #[must_use]
    pub const fn requires_session(self) -> bool {
        matches!(self, HandlerKind::Standard | HandlerKind::Async)
    }

    #[must_use]
    pub const fn is_async(self) -> bool {
        matches!(self, HandlerKind::Async | HandlerKind::AsyncSessionless)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HandlerKind::Standard => "standard",
            HandlerKind::Async => "async",
            HandlerKind::Sessionless => "sessionless",
            HandlerKind::AsyncSessionless => "async_sessionless",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a handler needs to execute the resolved action later.
pub struct HandlerState {
    pub controller: Arc<dyn Controller>,
    pub controller_context: ControllerContext,
    pub engine_context: EngineContext,
    /// Stack size for the async begin-phase coroutine
    pub stack_size: usize,
}

impl fmt::Debug for HandlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerState")
            .field("controller", &self.controller.type_name())
            .field("controller_context", &self.controller_context)
            .field("engine_context", &self.engine_context)
            .field("stack_size", &self.stack_size)
            .finish()
    }
}

/// Terminal object returned to the HTTP layer.
///
/// Selected once per request by the
/// [`HandlerFactory`](super::HandlerFactory) and run through
/// [`execute`](Handler::execute). Selection never executes anything.
#[derive(Debug)]
pub enum Handler {
    Standard(HandlerState),
    Async(HandlerState),
    Sessionless(HandlerState),
    AsyncSessionless(HandlerState),
}

impl Handler {
    #[must_use]
    pub fn new(kind: HandlerKind, state: HandlerState) -> Self {
        match kind {
            HandlerKind::Standard => Handler::Standard(state),
            HandlerKind::Async => Handler::Async(state),
            HandlerKind::Sessionless => Handler::Sessionless(state),
            HandlerKind::AsyncSessionless => Handler::AsyncSessionless(state),
        }
    }

    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Standard(_) => HandlerKind::Standard,
            Handler::Async(_) => HandlerKind::Async,
            Handler::Sessionless(_) => HandlerKind::Sessionless,
            Handler::AsyncSessionless(_) => HandlerKind::AsyncSessionless,
        }
    }

    #[must_use]
    pub fn state(&self) -> &HandlerState {
        match self {
            Handler::Standard(s)
            | Handler::Async(s)
            | Handler::Sessionless(s)
            | Handler::AsyncSessionless(s) => s,
        }
    }

    #[must_use]
    pub fn into_state(self) -> HandlerState {
        match self {
            Handler::Standard(s)
            | Handler::Async(s)
            | Handler::Sessionless(s)
            | Handler::AsyncSessionless(s) => s,
        }
    }

    /// Whether the host must attach session state before executing.
    #[must_use]
    pub fn requires_session(&self) -> bool {
        self.kind().requires_session()
    }

    #[must_use]
    pub fn controller_context(&self) -> &ControllerContext {
        &self.state().controller_context
    }

    /// Run the resolved action and produce the response.
    ///
    /// Controller errors become error responses with the error's status code;
    /// controller panics are caught and become 500 responses.
    #[must_use]
    pub fn execute(self) -> HandlerResponse {
        let kind = self.kind();
        let state = self.into_state();
        let request_id = state.engine_context.request_id;
        let controller = state.controller_context.name().to_string();
        let action = state.controller_context.action().to_string();

        info!(
            request_id = %request_id,
            handler = %kind,
            controller = %controller,
            action = %action,
            "Handler execution start"
        );
        let start = Instant::now();

        let response = if kind.is_async() {
            execute_async(state)
        } else {
            execute_sync(state)
        };

        info!(
            request_id = %request_id,
            handler = %kind,
            controller = %controller,
            action = %action,
            status = response.status,
            execution_time_ms = start.elapsed().as_millis() as u64,
            "Handler execution complete"
        );
        response
    }
}

type PhaseOutcome<T> = std::thread::Result<Result<T, MonoRailError>>;

fn execute_sync(state: HandlerState) -> HandlerResponse {
    let HandlerState {
        controller,
        mut controller_context,
        engine_context,
        ..
    } = state;

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        controller.process(&engine_context, &mut controller_context)
    }));
    settle(&engine_context, &controller_context, "process", outcome)
}

fn execute_async(state: HandlerState) -> HandlerResponse {
    let HandlerState {
        controller,
        controller_context,
        engine_context,
        stack_size,
    } = state;

    let request_id = engine_context.request_id;
    let action = controller_context.action().to_string();
    let (tx, rx) = mpsc::channel::<(PhaseOutcome<()>, ControllerContext)>();

    let begin_controller = Arc::clone(&controller);
    let begin_engine = engine_context.clone();
    let mut begin_context = controller_context;

    // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may runtime.
    // The closure owns everything it touches (Send + 'static) and reports back
    // through the channel, never by unwinding across the coroutine boundary.
    let spawn_result = unsafe {
        coroutine::Builder::new()
            .stack_size(stack_size)
            .spawn(move || {
                debug!(
                    request_id = %begin_engine.request_id,
                    action = %begin_context.action(),
                    "Async action begin phase start"
                );
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    begin_controller.begin_process(&begin_engine, &mut begin_context)
                }));
                let _ = tx.send((outcome, begin_context));
            })
    };

    if let Err(e) = spawn_result {
        error!(
            request_id = %request_id,
            action = %action,
            stack_size = stack_size,
            error = %e,
            "Failed to spawn async action coroutine - CRITICAL"
        );
        return HandlerResponse::error(503, "Unable to schedule async action");
    }

    let (begin_outcome, mut controller_context) = match rx.recv() {
        Ok(received) => received,
        Err(e) => {
            error!(
                request_id = %request_id,
                action = %action,
                error = %e,
                "Async action coroutine exited without reporting"
            );
            return HandlerResponse::error(503, "Async action did not complete");
        }
    };

    match begin_outcome {
        Ok(Ok(())) => {
            debug!(request_id = %request_id, action = %action, "Async action begin phase complete");
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                controller.end_process(&engine_context, &mut controller_context)
            }));
            settle(&engine_context, &controller_context, "end_process", outcome)
        }
        Ok(Err(e)) => settle(&engine_context, &controller_context, "begin_process", Ok(Err(e))),
        Err(panic) => settle(&engine_context, &controller_context, "begin_process", Err(panic)),
    }
}

fn settle(
    engine: &EngineContext,
    context: &ControllerContext,
    phase: &'static str,
    outcome: PhaseOutcome<HandlerResponse>,
) -> HandlerResponse {
    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            error!(
                request_id = %engine.request_id,
                controller = %context.name(),
                action = %context.action(),
                phase = phase,
                error = %e,
                "Controller action failed"
            );
            HandlerResponse::error(e.status_code(), &e.to_string())
        }
        Err(panic) => {
            let panic_message = panic_message(panic.as_ref());
            error!(
                request_id = %engine.request_id,
                controller = %context.name(),
                action = %context.action(),
                phase = phase,
                panic_message = %panic_message,
                "Controller panicked - CRITICAL"
            );
            HandlerResponse::error(500, &format!("Controller panicked: {panic_message}"))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_covers_all_four_variants() {
        assert_eq!(HandlerKind::select(false, false), HandlerKind::Standard);
        assert_eq!(HandlerKind::select(false, true), HandlerKind::Async);
        assert_eq!(HandlerKind::select(true, false), HandlerKind::Sessionless);
        assert_eq!(HandlerKind::select(true, true), HandlerKind::AsyncSessionless);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(HandlerKind::Standard.requires_session());
        assert!(HandlerKind::Async.requires_session());
        assert!(!HandlerKind::Sessionless.requires_session());
        assert!(!HandlerKind::AsyncSessionless.requires_session());

        assert!(HandlerKind::AsyncSessionless.is_async());
        assert!(!HandlerKind::Sessionless.is_async());
        assert_eq!(HandlerKind::AsyncSessionless.to_string(), "async_sessionless");
    }

    #[test]
    fn test_panic_message_payloads() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
