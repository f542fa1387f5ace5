// ABOUTME: Mail render operation: loads a template pair and renders subject and body
// ABOUTME: Composes call data under global data and helpers, failing atomically on any error

use std::sync::Arc;
use tracing::{debug, error};

use super::global::GlobalRenderData;
use super::{MailOptions, RenderedMail};
use crate::cli::config::Config;
use crate::template::{
    EngineOptions, MailTemplates, Result, TemplateContext, TemplateEngine, TemplateError,
    TemplateStore,
};

/// Renders mail templates; cheap to clone and safe to share between concurrent renders
#[derive(Clone)]
pub struct MailRenderer {
    store: Arc<TemplateStore>,
    engine: TemplateEngine,
    global: GlobalRenderData,
}

impl MailRenderer {
    pub fn new(store: Arc<TemplateStore>, engine: TemplateEngine, global: GlobalRenderData) -> Self {
        Self {
            store,
            engine,
            global,
        }
    }

    /// Build store, engine and global data from application configuration
    pub fn from_config(config: &Config) -> Self {
        let templates = &config.templates;
        let store = Arc::new(if templates.cache {
            TemplateStore::cached(&templates.directory)
        } else {
            TemplateStore::new(&templates.directory)
        });

        let engine = TemplateEngine::new(
            Arc::clone(&store),
            EngineOptions {
                strict: templates.strict,
            },
        );

        Self::new(store, engine, GlobalRenderData::from_config(config))
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Render the template pair named by `options.email`.
    ///
    /// Load failures are returned as `NotFound` / `IoError`. Evaluation runs on the blocking
    /// pool; its failures are logged with the mail id and returned as `RenderError`.
    /// Subject and body are never returned independently.
    pub async fn render(&self, options: &MailOptions) -> Result<RenderedMail> {
        debug!("Rendering mail[{}] from template '{}'", options.id, options.email);

        let templates = self.store.load_mail(&options.email).await?;
        let context = self.context_for(options);

        // Snippet helpers read files synchronously, so evaluation stays off the async workers
        let renderer = self.clone();
        let outcome = match tokio::task::spawn_blocking(move || {
            renderer.render_templates(&templates, &context)
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => Err(handlebars::RenderError::new(format!(
                "render task failed: {}",
                e
            ))),
        };

        outcome.map_err(|source| {
            error!(
                component = "mail",
                subcomponent = "template",
                "Error rendering template for mail[{}]: {}",
                options.id,
                source
            );
            TemplateError::RenderError {
                mail_id: options.id.clone(),
                source,
            }
        })
    }

    /// Context a mail is rendered against: call data, shadowed by global data and helpers
    pub fn context_for(&self, options: &MailOptions) -> TemplateContext {
        let overlay = self.engine.helpers().overlay_with(self.global.layer());
        TemplateContext::compose(None, options.data.clone(), &overlay)
    }

    fn render_templates(
        &self,
        templates: &MailTemplates,
        context: &TemplateContext,
    ) -> std::result::Result<RenderedMail, handlebars::RenderError> {
        let subject = self.engine.render_text(&templates.subject, context)?;
        let body = self.engine.render_html(&templates.body, context)?;

        Ok(RenderedMail {
            subject: subject.trim().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn renderer_for(files: &[(&str, &str)]) -> (TempDir, MailRenderer) {
        let temp_dir = TempDir::new().unwrap();
        for (relative, content) in files {
            let path = temp_dir.path().join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        let mut config = Config::default();
        config.templates.directory = temp_dir.path().to_path_buf();
        (temp_dir, MailRenderer::from_config(&config))
    }

    #[tokio::test]
    async fn test_subject_trimmed_body_untouched() {
        let (_dir, renderer) = renderer_for(&[
            ("greet.subject.txt", "  Hello World  \n"),
            ("greet.body.html", "\n  <p>Body</p>  \n"),
        ]);

        let mail = renderer
            .render(&MailOptions::new("mail-1", "greet"))
            .await
            .unwrap();

        assert_eq!(mail.subject, "Hello World");
        assert_eq!(mail.body, "\n  <p>Body</p>  \n");
    }

    #[tokio::test]
    async fn test_global_data_shadows_call_data() {
        let (_dir, renderer) = renderer_for(&[
            ("info.subject.txt", "{{community.name}}"),
            ("info.body.html", "{{editNodeUrl}} {{name}}"),
        ]);

        let options = MailOptions::new("mail-2", "info")
            .with_value("community", json!({"name": "Spoofed"}))
            .with_value("name", json!("Alice"));

        let mail = renderer.render(&options).await.unwrap();
        assert_eq!(mail.subject, "Freifunk Musterstadt");
        assert_eq!(mail.body, "http://localhost:8080/#/update Alice");
    }

    #[tokio::test]
    async fn test_render_error_carries_mail_id() {
        let (_dir, renderer) = renderer_for(&[
            ("broken.subject.txt", "Fine"),
            ("broken.body.html", "{{formatDateTime \"soon\"}}"),
        ]);

        let err = renderer
            .render(&MailOptions::new("mail-3", "broken"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Render);
        match err {
            TemplateError::RenderError { mail_id, .. } => assert_eq!(mail_id, "mail-3"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_template_is_not_found() {
        let (_dir, renderer) = renderer_for(&[]);

        let err = renderer
            .render(&MailOptions::new("mail-4", "does-not-exist"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
