// ABOUTME: Layered rendering context for mail templates and snippets
// ABOUTME: Composes parent, call-site and overlay layers with last-layer-wins lookup

use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// One data layer of a rendering context
pub type Layer = Map<String, JsonValue>;

/// Top layer of a composition: optional global values plus the names of helper
/// functions, which shadow everything below them.
#[derive(Debug, Clone)]
pub struct Overlay {
    values: Arc<Layer>,
    functions: &'static [&'static str],
}

impl Overlay {
    /// Overlay carrying only helper functions
    pub fn functions(functions: &'static [&'static str]) -> Self {
        Self {
            values: Arc::new(Layer::new()),
            functions,
        }
    }

    /// Overlay carrying global values on top of which the helper functions sit
    pub fn with_values(values: Arc<Layer>, functions: &'static [&'static str]) -> Self {
        Self { values, functions }
    }

    pub fn values(&self) -> &Layer {
        &self.values
    }

    pub fn function_names(&self) -> &'static [&'static str] {
        self.functions
    }
}

/// A value reachable from a context
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    Value(&'a JsonValue),
    Function(&'static str),
}

/// Read-only composition of data layers, lowest precedence first.
///
/// Layers are shared through `Arc`, so composing a child context onto a parent
/// never copies the parent's data.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    layers: Vec<Arc<Layer>>,
    functions: &'static [&'static str],
}

impl TemplateContext {
    /// Build a context from an already flattened JSON object, e.g. the root data of a
    /// Handlebars render call. Non-object values yield an empty context.
    pub fn from_json(value: &JsonValue) -> Self {
        let layer = match value {
            JsonValue::Object(map) => map.clone(),
            _ => Layer::new(),
        };

        Self {
            layers: vec![Arc::new(layer)],
            functions: &[],
        }
    }

    /// Compose `parent`, `data` and `overlay` into a new context.
    ///
    /// Precedence from lowest to highest: every layer of `parent`, then `data`, then the
    /// overlay values, then the overlay's helper functions. Composition is associative:
    /// a composed context used as `parent` keeps all of its layers in order.
    pub fn compose(parent: Option<&TemplateContext>, data: Layer, overlay: &Overlay) -> Self {
        let mut layers = parent
            .map(|p| p.layers.clone())
            .unwrap_or_default();

        layers.push(Arc::new(data));
        if !overlay.values.is_empty() {
            layers.push(Arc::clone(&overlay.values));
        }

        Self {
            layers,
            functions: overlay.functions,
        }
    }

    /// Resolve `key`, checking helper functions first and then layers from highest to
    /// lowest precedence
    pub fn get(&self, key: &str) -> Option<Resolved<'_>> {
        if let Some(name) = self.functions.iter().copied().find(|name| *name == key) {
            return Some(Resolved::Function(name));
        }

        self.layers
            .iter()
            .rev()
            .find_map(|layer| layer.get(key))
            .map(Resolved::Value)
    }

    /// Value bound to `key`, if it is data rather than a helper function
    pub fn value(&self, key: &str) -> Option<&JsonValue> {
        match self.get(key)? {
            Resolved::Value(value) => Some(value),
            Resolved::Function(_) => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Flatten into the JSON object the template engine evaluates against.
    /// Keys shadowed by helper functions are left out; the engine resolves those names
    /// to the registered helpers.
    pub fn to_json(&self) -> JsonValue {
        let mut merged = Layer::new();
        for layer in &self.layers {
            for (key, value) in layer.iter() {
                merged.insert(key.clone(), value.clone());
            }
        }

        for name in self.functions {
            merged.remove(*name);
        }

        JsonValue::Object(merged)
    }
}
