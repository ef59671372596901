//! Controllers declared in YAML instead of code.
//!
//! Used by the `monorail select` command to exercise handler selection without
//! compiling controllers in:
//!
//! ```yaml
//! controllers:
//!   - name: home
//!     layouts: [default]
//!     actions: [index, about]
//!   - name: feed
//!     area: api
//!     sessionless: true
//!     actions:
//!       - index
//!       - name: refresh
//!         async: true
//! ```
//!
//! Async actions get `begin_<name>` / `end_<name>` phases unless `begin` and
//! `end` are given explicitly.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::controller::{Controller, ControllerContext, DefaultControllerFactory, EngineContext};
use crate::descriptor::{AsyncActionPair, DescriptorBuilder};
use crate::error::MonoRailError;
use crate::handler::HandlerResponse;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ControllerManifest {
    #[serde(default)]
    pub controllers: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub sessionless: bool,
    #[serde(default)]
    pub layouts: Vec<String>,
    #[serde(default)]
    pub actions: Vec<ManifestAction>,
}

/// An action is either a bare name (synchronous) or a detailed entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ManifestAction {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, rename = "async")]
        is_async: bool,
        #[serde(default)]
        begin: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
}

impl ControllerManifest {
    /// # Errors
    ///
    /// [`MonoRailError::Config`] on malformed YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, MonoRailError> {
        serde_yaml::from_str(text).map_err(|e| MonoRailError::Config(e.to_string()))
    }

    /// # Errors
    ///
    /// [`MonoRailError::Config`] when the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, MonoRailError> {
        let text = fs::read_to_string(path)
            .map_err(|e| MonoRailError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }

    /// Register one [`ManifestController`] per entry.
    pub fn register_all(&self, factory: &mut DefaultControllerFactory) {
        for entry in &self.controllers {
            let controller: Arc<dyn Controller> = Arc::new(ManifestController::new(entry.clone()));
            factory.register_instance(&entry.area, &entry.name, controller);
        }
        info!(controllers = self.controllers.len(), "Controller manifest registered");
    }
}

/// Controller whose declaration comes from a [`ManifestEntry`].
///
/// Actions answer with a plain-text line naming what ran.
#[derive(Debug, Clone)]
pub struct ManifestController {
    entry: ManifestEntry,
}

impl ManifestController {
    #[must_use]
    pub fn new(entry: ManifestEntry) -> Self {
        Self { entry }
    }
}

impl Controller for ManifestController {
    fn describe(&self, builder: &mut DescriptorBuilder) -> Result<(), MonoRailError> {
        builder
            .name(self.entry.name.clone())
            .area(self.entry.area.clone())
            .sessionless(self.entry.sessionless);
        for layout in &self.entry.layouts {
            builder.layout(layout.clone());
        }
        for action in &self.entry.actions {
            match action {
                ManifestAction::Name(name)
                | ManifestAction::Detailed {
                    name,
                    is_async: false,
                    ..
                } => {
                    builder.action(name.clone());
                }
                ManifestAction::Detailed {
                    name, begin, end, ..
                } => {
                    let mut pair = AsyncActionPair::conventional(name);
                    if let Some(begin) = begin {
                        pair.begin = begin.clone();
                    }
                    if let Some(end) = end {
                        pair.end = end.clone();
                    }
                    builder.async_pair(pair);
                }
            }
        }
        Ok(())
    }

    fn process(
        &self,
        _engine: &EngineContext,
        context: &mut ControllerContext,
    ) -> Result<HandlerResponse, MonoRailError> {
        Ok(HandlerResponse::text(
            200,
            format!("{} processed {}", self.entry.name, context.action()),
        ))
    }

    fn begin_process(
        &self,
        _engine: &EngineContext,
        context: &mut ControllerContext,
    ) -> Result<(), MonoRailError> {
        context
            .property_bag_mut()
            .insert("begun".to_string(), serde_json::Value::Bool(true));
        Ok(())
    }

    fn end_process(
        &self,
        _engine: &EngineContext,
        context: &mut ControllerContext,
    ) -> Result<HandlerResponse, MonoRailError> {
        let begun = context
            .property_bag()
            .get("begun")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if !begun {
            return Err(MonoRailError::ActionFailed {
                action: context.action().to_string(),
                reason: "end phase ran without a begin phase".to_string(),
            });
        }
        Ok(HandlerResponse::text(
            200,
            format!("{} completed {}", self.entry.name, context.action()),
        ))
    }

    /// Every manifest entry shares one Rust type, so the cache key is the
    /// declared area and name.
    fn descriptor_key(&self) -> Cow<'static, str> {
        Cow::Owned(format!(
            "{}::{}/{}",
            self.type_name(),
            self.entry.area.to_lowercase(),
            self.entry.name.to_lowercase()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ControllerFactory;
    use crate::descriptor::{DefaultDescriptorResolver, DescriptorResolver};

    const MANIFEST: &str = r#"
controllers:
  - name: home
    layouts: [default]
    actions: [index]
  - name: feed
    area: api
    sessionless: true
    actions:
      - index
      - name: refresh
        async: true
      - name: sync_again
        async: false
      - name: export
        async: true
        begin: start_export
        end: finish_export
"#;

    #[test]
    fn test_parse_mixed_action_forms() {
        let manifest = ControllerManifest::from_yaml_str(MANIFEST).unwrap();
        assert_eq!(manifest.controllers.len(), 2);
        assert_eq!(
            manifest.controllers[0].actions,
            vec![ManifestAction::Name("index".to_string())]
        );
        assert!(manifest.controllers[1].sessionless);
    }

    #[test]
    fn test_describe_builds_pairs() {
        let manifest = ControllerManifest::from_yaml_str(MANIFEST).unwrap();
        let mut factory = DefaultControllerFactory::new();
        manifest.register_all(&mut factory);
        let resolver = DefaultDescriptorResolver::new(true);

        let feed = factory.create_controller("API", "Feed").unwrap();
        let descriptor = resolver.build_descriptor(feed.as_ref()).unwrap();
        assert!(descriptor.is_sessionless());
        assert!(!descriptor.action("index").unwrap().is_async());
        assert!(!descriptor.action("sync_again").unwrap().is_async());
        assert!(descriptor.action("refresh").unwrap().is_async());
        match descriptor.action("export").unwrap() {
            crate::descriptor::ActionDescriptor::Async(pair) => {
                assert_eq!(pair.begin, "start_export");
                assert_eq!(pair.end, "finish_export");
            }
            other => panic!("expected async pair, got {other:?}"),
        }

        let home = factory.create_controller("", "home").unwrap();
        let home_descriptor = resolver.build_descriptor(home.as_ref()).unwrap();
        assert_eq!(home_descriptor.controller.name, "home");
        assert_eq!(home_descriptor.controller.layouts, vec!["default".to_string()]);
        assert_eq!(resolver.size(), 2);
    }

    #[test]
    fn test_malformed_manifest() {
        let err = ControllerManifest::from_yaml_str("controllers: 7").unwrap_err();
        assert!(matches!(err, MonoRailError::Config(_)));
    }
}
