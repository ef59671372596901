use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::MonoRailConfig;
use crate::controller::{DefaultControllerContextFactory, DefaultControllerFactory};
use crate::descriptor::DefaultDescriptorResolver;
use crate::handler::HandlerFactory;
use crate::mail::EmailTemplateService;
use crate::manifest::ControllerManifest;
use crate::routing::{RequestContext, RouteMatch};
use crate::views::TemplateViewEngine;

/// Command-line interface for MonoRail
#[derive(Parser, Debug)]
#[command(name = "monorail")]
#[command(about = "MonoRail handler selection and mail rendering", long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "MONORAIL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the handler a request would be dispatched to
    Select {
        /// YAML controller manifest
        #[arg(short, long)]
        manifest: PathBuf,

        /// Area of the controller (empty for the root area)
        #[arg(long, default_value = "")]
        area: String,

        /// Controller name
        #[arg(long)]
        controller: String,

        /// Action name
        #[arg(long)]
        action: String,

        /// Also execute the selected handler and print its response
        #[arg(long, default_value_t = false)]
        execute: bool,
    },
    /// Render a mail template and print the parsed message as JSON
    Mail {
        /// Views directory (overrides configuration)
        #[arg(long)]
        views: Option<PathBuf>,

        /// Template name, relative to the mail directory unless it starts with `/`
        #[arg(short, long)]
        template: String,

        /// Layout to wrap the template in
        #[arg(short, long)]
        layout: Option<String>,

        /// Template parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MonoRailConfig> {
    match path {
        Some(p) => MonoRailConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(MonoRailConfig::from_env()),
    }
}

/// Run a parsed command, writing its JSON output to `out`.
pub fn run_cli(cli: Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Select {
            manifest,
            area,
            controller,
            action,
            execute,
        } => {
            let report = select(&config, &manifest, &area, &controller, &action, execute)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        Commands::Mail {
            views,
            template,
            layout,
            params,
        } => {
            let views_dir = views.unwrap_or_else(|| config.views.directory.clone());
            let params: Value =
                serde_json::from_str(&params).context("--params must be a JSON object")?;

            let engine = TemplateViewEngine::new(views_dir).with_extension(&config.views.extension);
            let service = EmailTemplateService::new(Arc::new(engine))
                .with_template_dir(config.mail.template_dir.clone());
            let message = service.render_mail_message(&template, layout.as_deref(), &params)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&message)?)?;
        }
    }
    Ok(())
}

fn select(
    config: &MonoRailConfig,
    manifest_path: &Path,
    area: &str,
    controller: &str,
    action: &str,
    execute: bool,
) -> anyhow::Result<Value> {
    let manifest = ControllerManifest::load(manifest_path)?;
    let mut controllers = DefaultControllerFactory::new();
    manifest.register_all(&mut controllers);

    let factory = HandlerFactory::new(
        Arc::new(controllers),
        Arc::new(DefaultDescriptorResolver::new(config.descriptors.cache)),
        Arc::new(DefaultControllerContextFactory),
    )
    .with_stack_size(config.runtime.stack_size);

    let path = if area.is_empty() {
        format!("/{controller}/{action}")
    } else {
        format!("/{area}/{controller}/{action}")
    };
    let mut request = RequestContext::new(Method::GET, path.clone());
    let mut route_match = RouteMatch::new()
        .with_param("controller", controller)
        .with_param("action", action);
    if !area.is_empty() {
        route_match = route_match.with_param("area", area);
    }
    request.set_route_match(route_match);

    let handler = factory.get_handler(&request, &Method::GET, &path, "")?;
    let mut report = json!({
        "handler": handler.kind(),
        "requires_session": handler.requires_session(),
        "area": handler.controller_context().area(),
        "controller": handler.controller_context().name(),
        "action": handler.controller_context().action(),
        "layouts": handler.controller_context().layout_names(),
    });

    if execute {
        let response = handler.execute();
        info!(status = response.status, "Selected handler executed");
        report["response"] = serde_json::to_value(&response)?;
    }
    Ok(report)
}
