// ABOUTME: Template engine built on Handlebars with the mail helper set installed
// ABOUTME: Renders HTML (escaping) and plain text (no escaping) against layered contexts

use handlebars::Handlebars;
use std::sync::Arc;

use super::context::TemplateContext;
use super::error::{Result, TemplateError};
use super::helpers::HelperFunctions;
use super::snippet::BoundSnippet;
use super::store::TemplateStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Fail on placeholders that resolve in no layer instead of rendering them empty
    pub strict: bool,
}

#[derive(Clone)]
pub struct TemplateEngine {
    html: Arc<Handlebars<'static>>,
    text: Arc<Handlebars<'static>>,
    helpers: HelperFunctions,
}

impl TemplateEngine {
    /// Create a template engine with all mail helpers installed
    pub fn new(store: Arc<TemplateStore>, options: EngineOptions) -> Self {
        let helpers = HelperFunctions::new(store);

        let mut html = Handlebars::new();
        html.set_strict_mode(options.strict);
        helpers.register(&mut html);

        // Subjects are plain text, so values are inserted verbatim
        let mut text = Handlebars::new();
        text.set_strict_mode(options.strict);
        text.register_escape_fn(handlebars::no_escape);
        helpers.register(&mut text);

        Self {
            html: Arc::new(html),
            text: Arc::new(text),
            helpers,
        }
    }

    pub fn helpers(&self) -> &HelperFunctions {
        &self.helpers
    }

    /// Render HTML; interpolated values are HTML-escaped
    pub fn render_html(
        &self,
        template: &str,
        context: &TemplateContext,
    ) -> std::result::Result<String, handlebars::RenderError> {
        self.html.render_template(template, &context.to_json())
    }

    /// Render plain text; interpolated values are inserted verbatim
    pub fn render_text(
        &self,
        template: &str,
        context: &TemplateContext,
    ) -> std::result::Result<String, handlebars::RenderError> {
        self.text.render_template(template, &context.to_json())
    }

    /// Obtain snippet `name` bound to `context` for later invocation
    pub fn snippet(&self, name: &str, context: &TemplateContext) -> BoundSnippet {
        BoundSnippet::new(
            self.helpers.snippet_renderer().clone(),
            Arc::clone(&self.html),
            name,
            context.clone(),
        )
    }

    /// Validate template syntax without rendering
    pub fn validate_template(&self, template: &str) -> Result<()> {
        match handlebars::Template::compile(template) {
            Ok(_) => Ok(()),
            Err(e) => Err(TemplateError::SyntaxError(e.to_string())),
        }
    }
}
