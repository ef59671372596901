use minijinja::Environment;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::ViewEngineManager;
use crate::controller::{Controller, ControllerContext, EngineContext};
use crate::error::MonoRailError;

/// Extension tried when a template path has none.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "j2";
/// Directory (under the views root) holding layouts.
pub const LAYOUTS_DIR: &str = "layouts";
/// Variable through which a layout receives the rendered child view.
pub const CHILD_CONTENT_KEY: &str = "childContent";

/// `minijinja`-backed view engine over a directory of templates.
pub struct TemplateViewEngine {
    base_dir: PathBuf,
    extension: String,
}

impl TemplateViewEngine {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Map a template path onto the views root, refusing anything that would
    /// leave it.
    fn map_path(&self, template: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(template.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    /// Existing file for a template path: exact name first, then with the
    /// configured extension appended.
    fn resolve(&self, template: &str) -> Option<PathBuf> {
        let exact = self.map_path(template)?;
        if exact.is_file() {
            return Some(exact);
        }
        let mut with_ext = exact.into_os_string();
        with_ext.push(".");
        with_ext.push(&self.extension);
        let with_ext = PathBuf::from(with_ext);
        with_ext.is_file().then_some(with_ext)
    }

    fn render(&self, template: &str, data: &Value) -> Result<String, MonoRailError> {
        let failed = |reason: String| MonoRailError::ViewRendering {
            template: template.to_string(),
            reason,
        };

        let path = self
            .resolve(template)
            .ok_or_else(|| failed("template not found".to_string()))?;
        let source = fs::read_to_string(&path).map_err(|e| failed(e.to_string()))?;

        let mut env = Environment::new();
        env.add_template("tpl", &source)
            .map_err(|e| failed(e.to_string()))?;
        let tmpl = env.get_template("tpl").map_err(|e| failed(e.to_string()))?;
        let rendered = tmpl.render(data).map_err(|e| failed(e.to_string()))?;

        debug!(template = %template, path = %path.display(), "View rendered");
        Ok(rendered)
    }

    /// Render `template`, then wrap it in each layout from innermost (last) to
    /// outermost (first).
    fn render_with_layouts(
        &self,
        template: &str,
        layouts: &[String],
        data: &Value,
    ) -> Result<String, MonoRailError> {
        let mut output = self.render(template, data)?;
        for layout in layouts.iter().rev() {
            let layout_path = format!("{LAYOUTS_DIR}/{layout}");
            let mut layout_data = match data {
                Value::Object(map) => map.clone(),
                _ => Map::new(),
            };
            layout_data.insert(CHILD_CONTENT_KEY.to_string(), Value::String(output));
            output = self.render(&layout_path, &Value::Object(layout_data))?;
        }
        Ok(output)
    }
}

fn write_out(
    writer: &mut dyn fmt::Write,
    template: &str,
    output: &str,
) -> Result<(), MonoRailError> {
    writer
        .write_str(output)
        .map_err(|e| MonoRailError::ViewRendering {
            template: template.to_string(),
            reason: e.to_string(),
        })
}

impl ViewEngineManager for TemplateViewEngine {
    fn has_template(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    fn process(
        &self,
        path: &str,
        layout: Option<&str>,
        writer: &mut dyn fmt::Write,
        data: &Value,
    ) -> Result<(), MonoRailError> {
        let layouts: Vec<String> = layout.map(str::to_string).into_iter().collect();
        let output = self.render_with_layouts(path, &layouts, data)?;
        write_out(writer, path, &output)
    }

    fn process_with_context(
        &self,
        path: &str,
        writer: &mut dyn fmt::Write,
        engine: &EngineContext,
        controller: &dyn Controller,
        context: &ControllerContext,
    ) -> Result<(), MonoRailError> {
        let mut data = context.property_bag().clone();
        data.insert("area".to_string(), Value::from(context.area()));
        data.insert("controller".to_string(), Value::from(context.name()));
        data.insert("action".to_string(), Value::from(context.action()));
        data.insert(
            "request_id".to_string(),
            Value::from(engine.request_id.to_string()),
        );

        debug!(
            request_id = %engine.request_id,
            controller_type = %controller.type_name(),
            template = %path,
            layouts = ?context.layout_names(),
            "Rendering view for controller"
        );

        let layouts = context.layout_names().unwrap_or(&[]);
        let output = self.render_with_layouts(path, layouts, &Value::Object(data))?;
        write_out(writer, path, &output)
    }
}
