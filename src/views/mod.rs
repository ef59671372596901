//! # Views Module
//!
//! The rendering seam used by the email template service.
//!
//! [`ViewEngineManager`] is the contract: existence check plus two render
//! entry points, one with an explicit layout and parameter object, one driven
//! by a controller context. [`TemplateViewEngine`] implements it over a
//! directory of `minijinja` templates.

mod engine;

pub use engine::{TemplateViewEngine, CHILD_CONTENT_KEY, DEFAULT_TEMPLATE_EXTENSION, LAYOUTS_DIR};

use serde_json::Value;
use std::fmt;

use crate::controller::{Controller, ControllerContext, EngineContext};
use crate::error::MonoRailError;

/// Template lookup and rendering service.
pub trait ViewEngineManager: Send + Sync {
    /// Whether a template exists at `path` (relative to the views root).
    fn has_template(&self, path: &str) -> bool;

    /// Render `path` with `data`, wrapped in `layout` when given.
    fn process(
        &self,
        path: &str,
        layout: Option<&str>,
        writer: &mut dyn fmt::Write,
        data: &Value,
    ) -> Result<(), MonoRailError>;

    /// Render `path` for a controller, using the context's property bag as data
    /// and its layout names as layouts.
    fn process_with_context(
        &self,
        path: &str,
        writer: &mut dyn fmt::Write,
        engine: &EngineContext,
        controller: &dyn Controller,
        context: &ControllerContext,
    ) -> Result<(), MonoRailError>;
}
