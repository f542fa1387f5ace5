// ABOUTME: Command implementations for the knotenmail CLI
// ABOUTME: Handles execution of render, validate, and list commands

use anyhow::Result;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::args::Args;
use super::config::Config;
use crate::mail::{MailOptions, MailRenderer, UrlBuilder};
use crate::template::{Layer, TemplateStore};

/// Arguments of the `render` command
#[derive(Debug, Default)]
pub struct RenderRequest {
    pub template: String,
    pub data_file: Option<PathBuf>,
    pub vars: Vec<String>,
    pub token: Option<String>,
    pub id: Option<String>,
    pub text: bool,
}

/// Render a mail template and print it
pub async fn render_mail(request: RenderRequest, config: &Config) -> Result<()> {
    let data = build_data(&request, config).await?;

    let id = request
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!("Rendering template '{}' as mail[{}]", request.template, id);

    let renderer = MailRenderer::from_config(config);
    let options = MailOptions::new(id, request.template).with_data(data);
    let rendered = renderer
        .render(&options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to render mail: {}", e))?;

    if request.text {
        let outgoing = rendered.into_outgoing()?;
        println!("Subject: {}\n\n{}", outgoing.subject, outgoing.text);
    } else {
        println!("Subject: {}\n\n{}", rendered.subject, rendered.body);
    }

    Ok(())
}

/// Template data from the data file, the monitoring token and `--var` overrides, in
/// increasing precedence
async fn build_data(request: &RenderRequest, config: &Config) -> Result<Layer> {
    let mut data = match &request.data_file {
        Some(path) => load_data_file(path).await?,
        None => Layer::new(),
    };

    if let Some(token) = &request.token {
        let urls = UrlBuilder::new(&config.server.base_url);
        data.insert(
            "confirmUrl".to_string(),
            JsonValue::String(urls.monitoring_confirm_url(token)),
        );
        data.insert(
            "disableUrl".to_string(),
            JsonValue::String(urls.monitoring_disable_url(token)),
        );
    }

    data.extend(Args::parse_variables(&request.vars)?);
    Ok(data)
}

/// Check every template and snippet for syntax errors
pub async fn validate_templates(config: &Config) -> Result<()> {
    let renderer = MailRenderer::from_config(config);
    let store = renderer.store();
    info!("Validating templates in {}", store.base_path().display());

    let mut paths = Vec::new();
    for name in store.list_mail_templates() {
        paths.push(store.subject_path(&name)?);
        paths.push(store.body_path(&name)?);
    }
    for name in store.list_snippets() {
        paths.push(store.snippet_path(&name)?);
    }

    let mut failures = 0;
    for path in &paths {
        let outcome = match store.load(path).await {
            Ok(source) => renderer.engine().validate_template(&source),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => println!("  ok      {}", display_relative(store, path)),
            Err(e) => {
                failures += 1;
                error!("Template {} is invalid: {}", path.display(), e);
                println!("  failed  {}: {}", display_relative(store, path), e);
            }
        }
    }

    println!("{} templates checked, {} failed", paths.len(), failures);

    if failures > 0 {
        anyhow::bail!("{} of {} templates are invalid", failures, paths.len());
    }
    Ok(())
}

/// Print the available mail templates and snippets
pub async fn list_templates(config: &Config) -> Result<()> {
    let store = TemplateStore::new(&config.templates.directory);

    println!("Mail templates:");
    for name in store.list_mail_templates() {
        println!("  {}", name);
    }

    println!("Snippets:");
    for name in store.list_snippets() {
        println!("  {}", name);
    }

    Ok(())
}

/// Read template data from a JSON or YAML file; the top level must be a mapping
async fn load_data_file(path: &Path) -> Result<Layer> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read data file '{}': {}", path.display(), e))?;

    parse_data(&contents)
        .map_err(|e| anyhow::anyhow!("Invalid data file '{}': {}", path.display(), e))
}

fn parse_data(contents: &str) -> Result<Layer> {
    match serde_yaml::from_str::<JsonValue>(contents)? {
        JsonValue::Object(map) => Ok(map),
        JsonValue::Null => Ok(Layer::new()),
        other => anyhow::bail!("expected a mapping at the top level, found {}", other),
    }
}

fn display_relative(store: &TemplateStore, path: &Path) -> String {
    path.strip_prefix(store.base_path())
        .unwrap_or(path)
        .display()
        .to_string()
}
