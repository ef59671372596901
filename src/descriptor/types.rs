use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::MonoRailError;

/// Static metadata about a controller type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerDescriptor {
    /// Rust type name of the controller implementation
    pub type_name: String,
    /// Controller name as addressed by routing
    pub name: String,
    /// Area the controller lives in (empty for the root area)
    pub area: String,
    /// Requests to this controller do not take part in session state
    pub is_sessionless: bool,
    /// Layouts applied to this controller's views unless an action overrides them
    pub layouts: Vec<String>,
}

impl ControllerDescriptor {
    #[must_use]
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        area: impl Into<String>,
        is_sessionless: bool,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            area: area.into(),
            is_sessionless,
            layouts: Vec::new(),
        }
    }
}

/// Marker for an action executed in begin/execute/end phases rather than as a
/// single synchronous call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsyncActionPair {
    /// Action name as addressed by routing
    pub action: String,
    /// Name of the begin phase
    pub begin: String,
    /// Name of the end phase
    pub end: String,
}

impl AsyncActionPair {
    #[must_use]
    pub fn new(action: impl Into<String>, begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            begin: begin.into(),
            end: end.into(),
        }
    }

    /// Pair using the `begin_<action>` / `end_<action>` naming convention.
    #[must_use]
    pub fn conventional(action: &str) -> Self {
        Self::new(action, format!("begin_{action}"), format!("end_{action}"))
    }
}

/// Per-action metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDescriptor {
    /// Plain synchronous action
    Sync { name: String },
    /// Asynchronous begin/end action
    Async(AsyncActionPair),
}

impl ActionDescriptor {
    #[must_use]
    pub fn sync(name: impl Into<String>) -> Self {
        ActionDescriptor::Sync { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ActionDescriptor::Sync { name } => name,
            ActionDescriptor::Async(pair) => &pair.action,
        }
    }

    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, ActionDescriptor::Async(_))
    }
}

/// Shared, immutable action-name to action-descriptor mapping.
pub type ActionMap = Arc<HashMap<String, ActionDescriptor>>;

/// A [`ControllerDescriptor`] plus its per-action metadata.
///
/// Built once per controller type and shared by `Arc`. The action map is itself
/// behind an `Arc` so the controller context can carry the very same mapping
/// routing resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerMetaDescriptor {
    pub controller: ControllerDescriptor,
    actions: ActionMap,
}

impl ControllerMetaDescriptor {
    /// Descriptor with no known actions.
    #[must_use]
    pub fn new(controller: ControllerDescriptor) -> Self {
        Self {
            controller,
            actions: Arc::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_actions(controller: ControllerDescriptor, actions: Vec<ActionDescriptor>) -> Self {
        let actions = actions
            .into_iter()
            .map(|a| (a.name().to_string(), a))
            .collect();
        Self {
            controller,
            actions: Arc::new(actions),
        }
    }

    #[must_use]
    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Case-sensitive lookup of an action by the name routing resolved.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&ActionDescriptor> {
        self.actions.get(name)
    }

    #[must_use]
    pub fn is_sessionless(&self) -> bool {
        self.controller.is_sessionless
    }
}

/// Collects what a controller declares about itself in
/// [`Controller::describe`](crate::controller::Controller::describe).
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    type_name: String,
    name: Option<String>,
    area: String,
    sessionless: bool,
    layouts: Vec<String>,
    actions: Vec<ActionDescriptor>,
}

impl DescriptorBuilder {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            area: String::new(),
            sessionless: false,
            layouts: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn area(&mut self, area: impl Into<String>) -> &mut Self {
        self.area = area.into();
        self
    }

    pub fn sessionless(&mut self, sessionless: bool) -> &mut Self {
        self.sessionless = sessionless;
        self
    }

    pub fn layout(&mut self, layout: impl Into<String>) -> &mut Self {
        self.layouts.push(layout.into());
        self
    }

    pub fn action(&mut self, name: impl Into<String>) -> &mut Self {
        self.actions.push(ActionDescriptor::sync(name));
        self
    }

    /// Declare an async action with conventional begin/end phase names.
    pub fn async_action(&mut self, name: &str) -> &mut Self {
        self.actions
            .push(ActionDescriptor::Async(AsyncActionPair::conventional(name)));
        self
    }

    pub fn async_pair(&mut self, pair: AsyncActionPair) -> &mut Self {
        self.actions.push(ActionDescriptor::Async(pair));
        self
    }

    /// Validate and freeze the declaration.
    ///
    /// A controller without a name, an unnamed action, or two actions sharing a
    /// name is malformed; no partial descriptor is returned for it.
    pub fn build(self) -> Result<ControllerMetaDescriptor, MonoRailError> {
        let type_name = self.type_name;
        let malformed = |reason: String| MonoRailError::DescriptorResolution {
            controller: type_name.clone(),
            reason,
        };

        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(malformed("controller name is empty".to_string())),
        };

        let mut actions = HashMap::with_capacity(self.actions.len());
        for action in self.actions {
            if action.name().is_empty() {
                return Err(malformed("action name is empty".to_string()));
            }
            if let ActionDescriptor::Async(pair) = &action {
                if pair.begin.is_empty() || pair.end.is_empty() {
                    return Err(malformed(format!(
                        "async action '{}' is missing its begin or end phase",
                        pair.action
                    )));
                }
            }
            let key = action.name().to_string();
            if actions.insert(key.clone(), action).is_some() {
                return Err(malformed(format!("action '{key}' is declared twice")));
            }
        }

        let controller = ControllerDescriptor {
            type_name,
            name,
            area: self.area,
            is_sessionless: self.sessionless,
            layouts: self.layouts,
        };

        Ok(ControllerMetaDescriptor {
            controller,
            actions: Arc::new(actions),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_actions() {
        let mut b = DescriptorBuilder::new("app::HomeController");
        b.name("home").sessionless(true).action("index").async_action("report");
        let desc = b.build().unwrap();

        assert_eq!(desc.controller.name, "home");
        assert!(desc.is_sessionless());
        assert!(!desc.action("index").unwrap().is_async());
        assert!(desc.action("report").unwrap().is_async());
        assert!(desc.action("Report").is_none());
    }

    #[test]
    fn test_builder_rejects_missing_name() {
        let b = DescriptorBuilder::new("app::Nameless");
        let err = b.build().unwrap_err();
        assert!(matches!(err, MonoRailError::DescriptorResolution { .. }));
    }

    #[test]
    fn test_builder_rejects_duplicate_actions() {
        let mut b = DescriptorBuilder::new("app::Dup");
        b.name("dup").action("index").async_action("index");
        let err = b.build().unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_builder_rejects_incomplete_pair() {
        let mut b = DescriptorBuilder::new("app::Half");
        b.name("half").async_pair(AsyncActionPair::new("load", "begin_load", ""));
        assert!(b.build().is_err());
    }

    #[test]
    fn test_conventional_pair_names() {
        let pair = AsyncActionPair::conventional("load");
        assert_eq!(pair.begin, "begin_load");
        assert_eq!(pair.end, "end_load");
    }
}
