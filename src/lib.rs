// ABOUTME: Main library module for the knotenmail mail template renderer
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod jobs;
pub mod mail;
pub mod template;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use mail::{MailOptions, MailRenderer, RenderedMail};
pub use template::{TemplateContext, TemplateEngine, TemplateError, TemplateStore};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
