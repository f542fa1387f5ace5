// ABOUTME: Transactional mail rendering for the node management form
// ABOUTME: Defines mail requests and results and exports the renderer, URLs and transport hook

pub mod global;
pub mod renderer;
pub mod transport;
pub mod urls;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::template::Layer;

pub use global::GlobalRenderData;
pub use renderer::MailRenderer;
pub use transport::{html_to_text, OutgoingMail};
pub use urls::UrlBuilder;

/// One render request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailOptions {
    /// Identifies the mail in diagnostics
    pub id: String,
    /// Template name
    pub email: String,
    #[serde(default)]
    pub data: Layer,
}

impl MailOptions {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            data: Layer::new(),
        }
    }

    pub fn with_data(mut self, data: Layer) -> Self {
        self.data = data;
        self
    }

    pub fn with_value(mut self, key: &str, value: JsonValue) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }
}

/// Subject and HTML body of one rendered mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMail {
    pub subject: String,
    pub body: String,
}
