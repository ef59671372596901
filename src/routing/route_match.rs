use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of route parameters before heap allocation.
/// MVC routes rarely carry more than area/controller/action plus an id or two.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated route parameter storage.
///
/// Param names use `Arc<str>` because they come from the route rule (known at
/// startup) and are cloned into every match; values are per-request URL data.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

const AREA: &str = "area";
const CONTROLLER: &str = "controller";
const ACTION: &str = "action";

/// Result of matching an incoming URL against a routing rule.
///
/// Created by routing (upstream of this crate) and read once per request by the
/// [`HandlerFactory`](crate::handler::HandlerFactory). Treated as immutable once
/// stored in the [`RequestContext`](super::RequestContext).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    /// Name of the rule that matched, if the rule was named
    name: Option<String>,
    /// Parameters extracted from the URL
    params: ParamVec,
}

impl RouteMatch {
    /// Create an empty match with no parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty match for a named rule.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            params: ParamVec::new(),
        }
    }

    /// Builder-style parameter insertion.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((Arc::from(name), value.into()));
        self
    }

    /// Name of the matched rule.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get a route parameter by name.
    ///
    /// Uses "last write wins" semantics when a rule yields the same name twice.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Area the controller lives in; the root area is the empty string.
    #[must_use]
    pub fn area(&self) -> &str {
        self.get(AREA).unwrap_or("")
    }

    #[must_use]
    pub fn controller(&self) -> Option<&str> {
        self.get(CONTROLLER)
    }

    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.get(ACTION)
    }

    /// All parameters in match order.
    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// Convert params to a HashMap (allocates; prefer [`get`](Self::get)).
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}
