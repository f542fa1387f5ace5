// ABOUTME: Template module for loading, composing and rendering mail templates
// ABOUTME: Provides the template store, layered contexts, snippets and helper functions

pub mod context;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod snippet;
pub mod store;

pub use context::{Layer, Overlay, Resolved, TemplateContext};
pub use engine::{EngineOptions, TemplateEngine};
pub use error::{ErrorKind, Result, TemplateError};
pub use helpers::{HelperFunctions, HELPER_NAMES};
pub use snippet::{BoundSnippet, SnippetRenderer};
pub use store::{MailTemplates, TemplateStore};
