use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::MailMessage;
use crate::controller::{Controller, ControllerContext, EngineContext};
use crate::error::MonoRailError;
use crate::views::ViewEngineManager;

/// Directory, relative to the views root, that relative template names
/// resolve under.
pub const EMAIL_TEMPLATE_PATH: &str = "mail";

/// Renders email templates through a view engine and parses the output into
/// a [`MailMessage`].
#[derive(Clone)]
pub struct EmailTemplateService {
    view_engine: Arc<dyn ViewEngineManager>,
    template_dir: String,
}

impl EmailTemplateService {
    #[must_use]
    pub fn new(view_engine: Arc<dyn ViewEngineManager>) -> Self {
        Self {
            view_engine,
            template_dir: EMAIL_TEMPLATE_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_template_dir(mut self, dir: impl Into<String>) -> Self {
        self.template_dir = dir.into().trim_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn template_dir(&self) -> &str {
        &self.template_dir
    }

    /// Names starting with `/` are used as-is; anything else lives under the
    /// template directory.
    fn normalize(&self, name: &str) -> String {
        if name.starts_with('/') {
            name.to_string()
        } else {
            format!("{}/{}", self.template_dir, name)
        }
    }

    #[must_use]
    pub fn has_mail_template(&self, name: &str) -> bool {
        self.view_engine.has_template(&self.normalize(name))
    }

    /// Render a mail template with a parameter object.
    ///
    /// `parameters` may be any value that serializes to a map (a struct, a
    /// `HashMap`, a `serde_json::Value` object); `()` or `null` mean none.
    ///
    /// # Errors
    ///
    /// - [`MonoRailError::TemplateNotFound`] if no such template exists
    /// - [`MonoRailError::ViewRendering`] if the parameters are not a map or
    ///   rendering fails
    /// - [`MonoRailError::InvalidMailAddress`] from header parsing
    pub fn render_mail_message<P: Serialize + ?Sized>(
        &self,
        name: &str,
        layout: Option<&str>,
        parameters: &P,
    ) -> Result<MailMessage, MonoRailError> {
        let template = self.normalize(name);
        debug!(template = %template, layout = ?layout, "Rendering e-mail template");

        if !self.view_engine.has_template(&template) {
            warn!(template = %template, "E-mail template not found");
            return Err(MonoRailError::TemplateNotFound { template });
        }

        let data = match serde_json::to_value(parameters) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(Value::Null) => Value::Object(Map::new()),
            Ok(other) => {
                return Err(MonoRailError::ViewRendering {
                    template,
                    reason: format!("parameters must serialize to a map, got {other}"),
                })
            }
            Err(e) => {
                return Err(MonoRailError::ViewRendering {
                    template,
                    reason: e.to_string(),
                })
            }
        };

        let mut rendered = String::new();
        self.view_engine
            .process(&template, layout, &mut rendered, &data)?;
        let message = MailMessage::parse(&rendered)?;

        info!(
            template = %template,
            recipients = message.to.len(),
            is_body_html = message.is_body_html,
            "E-mail message rendered"
        );
        Ok(message)
    }

    /// Render a mail template against a controller's context.
    ///
    /// With `do_not_apply_layout` the context renders without its layouts;
    /// the previous layout names are put back before returning, whether or
    /// not rendering succeeded.
    ///
    /// # Errors
    ///
    /// Same as [`render_mail_message`](Self::render_mail_message).
    pub fn render_mail_message_with_context(
        &self,
        name: &str,
        engine: &EngineContext,
        controller: &dyn Controller,
        context: &mut ControllerContext,
        do_not_apply_layout: bool,
    ) -> Result<MailMessage, MonoRailError> {
        let template = self.normalize(name);
        debug!(
            request_id = %engine.request_id,
            template = %template,
            do_not_apply_layout = do_not_apply_layout,
            "Rendering e-mail template for controller"
        );

        if !self.view_engine.has_template(&template) {
            warn!(template = %template, "E-mail template not found");
            return Err(MonoRailError::TemplateNotFound { template });
        }

        let previous_layouts = do_not_apply_layout.then(|| context.replace_layout_names(None));

        let mut rendered = String::new();
        let result = self
            .view_engine
            .process_with_context(&template, &mut rendered, engine, controller, context);

        if let Some(layouts) = previous_layouts {
            context.set_layout_names(layouts);
        }
        result?;

        let message = MailMessage::parse(&rendered)?;
        info!(
            request_id = %engine.request_id,
            template = %template,
            recipients = message.to.len(),
            is_body_html = message.is_body_html,
            "E-mail message rendered"
        );
        Ok(message)
    }
}
