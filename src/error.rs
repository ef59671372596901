use std::fmt;

/// Errors raised while selecting or executing a request handler, and by the
/// email template service.
///
/// Every variant is fatal to the request that produced it. Nothing in this
/// crate retries or substitutes a fallback handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonoRailError {
    /// No route match was stored in the request context.
    ///
    /// Signals that the handler factory was invoked before routing ran.
    RouteMatchMissing,
    /// The route match exists but lacks a parameter the dispatcher needs.
    RouteParameterMissing {
        /// Name of the missing parameter (`controller` or `action`)
        parameter: &'static str,
    },
    /// The controller factory has no controller for the area/name pair.
    ControllerNotFound {
        /// Area the lookup was made in (may be empty)
        area: String,
        /// Controller name
        name: String,
    },
    /// The controller could not be introspected into a descriptor.
    DescriptorResolution {
        /// Type name of the controller being described
        controller: String,
        /// What went wrong
        reason: String,
    },
    /// The requested email template does not exist.
    TemplateNotFound {
        /// Normalized template path
        template: String,
    },
    /// The view engine failed to render a template.
    ViewRendering {
        /// Template path
        template: String,
        /// Rendering failure reported by the engine
        reason: String,
    },
    /// A mail header carried something that is not an email address.
    InvalidMailAddress {
        /// The offending value
        address: String,
    },
    /// A controller action failed during execution.
    ActionFailed {
        /// Action name
        action: String,
        /// Failure reported by the controller
        reason: String,
    },
    /// Configuration could not be loaded or is invalid.
    Config(String),
}

impl MonoRailError {
    /// `true` for errors caused by routing state rather than by the controller
    /// or its collaborators.
    #[must_use]
    pub fn is_routing_state(&self) -> bool {
        matches!(
            self,
            MonoRailError::RouteMatchMissing | MonoRailError::RouteParameterMissing { .. }
        )
    }

    /// HTTP status the host should answer with when this error ends a request.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            MonoRailError::ControllerNotFound { .. } | MonoRailError::TemplateNotFound { .. } => {
                404
            }
            _ => 500,
        }
    }
}

impl fmt::Display for MonoRailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonoRailError::RouteMatchMissing => write!(
                f,
                "No route match found in the request context. \
                Routing must run before a handler is requested."
            ),
            MonoRailError::RouteParameterMissing { parameter } => {
                write!(f, "Route match has no '{}' parameter", parameter)
            }
            MonoRailError::ControllerNotFound { area, name } => {
                if area.is_empty() {
                    write!(f, "Controller not found: {}", name)
                } else {
                    write!(f, "Controller not found: {}/{}", area, name)
                }
            }
            MonoRailError::DescriptorResolution { controller, reason } => write!(
                f,
                "Could not build descriptor for controller '{}': {}",
                controller, reason
            ),
            MonoRailError::TemplateNotFound { template } => {
                write!(f, "Template for e-mail doesn't exist: {}", template)
            }
            MonoRailError::ViewRendering { template, reason } => {
                write!(f, "Failed to render view '{}': {}", template, reason)
            }
            MonoRailError::InvalidMailAddress { address } => {
                write!(f, "Invalid mail address '{}'", address)
            }
            MonoRailError::ActionFailed { action, reason } => {
                write!(f, "Action '{}' failed: {}", action, reason)
            }
            MonoRailError::Config(reason) => write!(f, "Configuration error: {}", reason),
        }
    }
}

impl std::error::Error for MonoRailError {}
