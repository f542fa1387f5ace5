// ABOUTME: Snippet rendering with recursive invocation from inside templates
// ABOUTME: Provides the snippet renderer, the snippet helper and context-bound snippet handles

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use super::context::{Layer, Overlay, TemplateContext};
use super::error::{Result, TemplateError};
use super::helpers::HELPER_NAMES;
use super::store::TemplateStore;

#[derive(Debug, Clone)]
pub struct SnippetRenderer {
    store: Arc<TemplateStore>,
}

impl SnippetRenderer {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self { store }
    }

    /// Render snippet `name` against `compose(caller, data, helpers)`.
    ///
    /// The snippet sees the caller's keys for everything `data` does not define, and
    /// may itself invoke further snippets through the same registry.
    pub fn render_snippet(
        &self,
        registry: &Handlebars<'_>,
        name: &str,
        data: Layer,
        caller: &TemplateContext,
    ) -> Result<String> {
        let source = self.store.load_snippet(name)?;
        let context =
            TemplateContext::compose(Some(caller), data, &Overlay::functions(HELPER_NAMES));

        registry
            .render_template(&source, &context.to_json())
            .map_err(TemplateError::SnippetError)
    }
}

/// A snippet bound to the context it was obtained from.
///
/// Owns its captured context and registry, so it can be invoked after the render call
/// that produced it has returned.
#[derive(Clone)]
pub struct BoundSnippet {
    renderer: SnippetRenderer,
    registry: Arc<Handlebars<'static>>,
    name: String,
    context: TemplateContext,
}

impl BoundSnippet {
    pub(crate) fn new(
        renderer: SnippetRenderer,
        registry: Arc<Handlebars<'static>>,
        name: &str,
        context: TemplateContext,
    ) -> Self {
        Self {
            renderer,
            registry,
            name: name.to_string(),
            context,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, data: Layer) -> Result<String> {
        self.renderer
            .render_snippet(&self.registry, &self.name, data, &self.context)
    }
}

/// Handlebars helper rendering a snippet inline.
///
/// Unbound: `{{snippet "name" key=value}}`. Bound (`header`, `footer`, ...):
/// `{{header key=value}}`. An object positional argument is merged under the hash
/// arguments.
pub struct SnippetHelper {
    renderer: SnippetRenderer,
    bound: Option<&'static str>,
}

impl SnippetHelper {
    pub fn generic(renderer: SnippetRenderer) -> Self {
        Self {
            renderer,
            bound: None,
        }
    }

    pub fn bound(renderer: SnippetRenderer, name: &'static str) -> Self {
        Self {
            renderer,
            bound: Some(name),
        }
    }
}

impl HelperDef for SnippetHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (name, data_index) = match self.bound {
            Some(name) => (name, 0),
            None => {
                let name = h
                    .param(0)
                    .and_then(|v| v.value().as_str())
                    .ok_or_else(|| RenderError::new("snippet helper requires a snippet name"))?;
                (name, 1)
            }
        };

        let mut data = Layer::new();
        if let Some(param) = h.param(data_index) {
            match param.value() {
                JsonValue::Object(map) => data.extend(map.clone()),
                JsonValue::Null => {}
                _ => {
                    return Err(RenderError::new(format!(
                        "snippet '{}' expects an object as data argument",
                        name
                    )))
                }
            }
        }
        for (key, value) in h.hash() {
            data.insert(key.to_string(), value.value().clone());
        }

        let caller = TemplateContext::from_json(ctx.data());
        let rendered = self
            .renderer
            .render_snippet(r, name, data, &caller)
            .map_err(|e| RenderError::from_error(&e.to_string(), e))?;

        out.write(&rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ErrorKind;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup(snippets: &[(&str, &str)]) -> (TempDir, SnippetRenderer, Handlebars<'static>) {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("snippets");
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in snippets {
            std::fs::write(dir.join(format!("{}.html", name)), content).unwrap();
        }

        let renderer = SnippetRenderer::new(Arc::new(TemplateStore::new(temp_dir.path())));
        let mut handlebars = Handlebars::new();
        handlebars.register_helper("snippet", Box::new(SnippetHelper::generic(renderer.clone())));
        handlebars.register_helper(
            "header",
            Box::new(SnippetHelper::bound(renderer.clone(), "header")),
        );

        (temp_dir, renderer, handlebars)
    }

    fn caller(value: JsonValue) -> TemplateContext {
        TemplateContext::from_json(&value)
    }

    #[test]
    fn test_snippet_sees_data_and_caller_keys() {
        let (_dir, renderer, handlebars) = setup(&[("greeting", "{{salutation}} {{name}}")]);

        let mut data = Layer::new();
        data.insert("salutation".to_string(), json!("Moin"));

        let rendered = renderer
            .render_snippet(
                &handlebars,
                "greeting",
                data,
                &caller(json!({"name": "Alice", "salutation": "Hello"})),
            )
            .unwrap();

        assert_eq!(rendered, "Moin Alice");
    }

    #[test]
    fn test_missing_snippet_is_not_found() {
        let (_dir, renderer, handlebars) = setup(&[]);

        let err = renderer
            .render_snippet(&handlebars, "nope", Layer::new(), &caller(json!({})))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_recursive_snippets_through_helper() {
        let (_dir, _renderer, handlebars) = setup(&[
            ("outer", "[{{snippet \"inner\" label=title}}|{{name}}]"),
            ("inner", "<{{label}} for {{name}}>"),
        ]);

        let rendered = handlebars
            .render_template(
                "{{snippet \"outer\" title=\"Node\"}}",
                &json!({"name": "Alice"}),
            )
            .unwrap();

        assert_eq!(rendered, "[<Node for Alice>|Alice]");
    }

    #[test]
    fn test_bound_helper_and_object_argument() {
        let (_dir, _renderer, handlebars) = setup(&[("header", "<h1>{{title}} / {{sub}}</h1>")]);

        let rendered = handlebars
            .render_template(
                "{{header page sub=\"hash wins\"}}",
                &json!({"page": {"title": "Status", "sub": "from object"}}),
            )
            .unwrap();

        assert_eq!(rendered, "<h1>Status / hash wins</h1>");
    }

    #[test]
    fn test_missing_snippet_inside_template_keeps_cause() {
        let (_dir, _renderer, handlebars) = setup(&[]);

        let err = handlebars
            .render_template("{{snippet \"ghost\"}}", &json!({}))
            .unwrap_err();

        let wrapped = TemplateError::SnippetError(err);
        let missing = wrapped.missing_path().unwrap();
        assert!(missing.ends_with("snippets/ghost.html"));
    }

    #[test]
    fn test_bound_snippet_outlives_its_origin() {
        let (_dir, renderer, handlebars) = setup(&[("sig", "-- {{team}}")]);

        let bound = {
            let origin = caller(json!({"team": "Freifunk"}));
            BoundSnippet::new(renderer, Arc::new(handlebars), "sig", origin)
        };

        assert_eq!(bound.name(), "sig");
        assert_eq!(bound.call(Layer::new()).unwrap(), "-- Freifunk");

        let mut data = Layer::new();
        data.insert("team".to_string(), json!("Admins"));
        assert_eq!(bound.call(data).unwrap(), "-- Admins");
    }
}
