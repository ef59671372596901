use http::{HeaderMap, Method};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::RouteMatch;

/// Well-known item key under which routing stores the [`RouteMatch`].
pub const ROUTE_MATCH_KEY: &str = "monorail.route_match";

/// Per-request bag of values shared between the host, routing and handlers.
///
/// Values are stored as `Arc<dyn Any>` so they can be handed to handler
/// coroutines without copying.
#[derive(Clone, Default)]
pub struct Items {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Items {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under the same key.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Store an already shared value.
    pub fn insert_arc<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: Arc<T>) {
        self.values.insert(key.into(), value);
    }

    /// Fetch a value by key, if present and of type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.values
            .get(key)
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// The host's view of an in-flight HTTP request.
///
/// Only what the dispatcher needs is modelled: method, path, headers and the
/// item bag carrying the route match.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path: String,
    headers: HeaderMap,
    items: Items,
}

impl RequestContext {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            items: Items::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string (names are case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    /// The route match stored by routing under [`ROUTE_MATCH_KEY`].
    #[must_use]
    pub fn route_match(&self) -> Option<Arc<RouteMatch>> {
        self.items.get::<RouteMatch>(ROUTE_MATCH_KEY)
    }

    pub fn set_route_match(&mut self, route_match: RouteMatch) {
        self.items.insert(ROUTE_MATCH_KEY, route_match);
    }
}
