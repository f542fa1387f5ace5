// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Builds template trees in temporary directories and captures log output

#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::fs;
use tracing_subscriber::fmt::MakeWriter;

use knotenmail::mail::MailRenderer;
use knotenmail::Config;

pub const HEADER_SNIPPET: &str = "<h1>{{community.name}}</h1>";
pub const FOOTER_SNIPPET: &str = "<p>{{community.contactEmail}}</p>";

/// One mail template pair; a `None` part is left missing on disk
pub struct TestMail {
    pub name: String,
    pub subject: Option<String>,
    pub body: Option<String>,
}

/// Describes a template directory before it is written to disk
pub struct TemplateTreeBuilder {
    mails: Vec<TestMail>,
    snippets: Vec<(String, String)>,
}

impl TemplateTreeBuilder {
    pub fn new() -> Self {
        Self {
            mails: Vec::new(),
            snippets: Vec::new(),
        }
    }

    /// Header and footer snippets as used by most mail bodies
    pub fn with_default_snippets(self) -> Self {
        self.with_snippet("header", HEADER_SNIPPET)
            .with_snippet("footer", FOOTER_SNIPPET)
    }

    pub fn with_mail(mut self, name: &str, subject: &str, body: &str) -> Self {
        self.mails.push(TestMail {
            name: name.to_string(),
            subject: Some(subject.to_string()),
            body: Some(body.to_string()),
        });
        self
    }

    pub fn with_subject_only(mut self, name: &str, subject: &str) -> Self {
        self.mails.push(TestMail {
            name: name.to_string(),
            subject: Some(subject.to_string()),
            body: None,
        });
        self
    }

    pub fn with_body_only(mut self, name: &str, body: &str) -> Self {
        self.mails.push(TestMail {
            name: name.to_string(),
            subject: None,
            body: Some(body.to_string()),
        });
        self
    }

    pub fn with_snippet(mut self, name: &str, content: &str) -> Self {
        self.snippets.push((name.to_string(), content.to_string()));
        self
    }

    pub async fn write_to(&self, base: &Path) {
        fs::create_dir_all(base.join("snippets")).await.unwrap();

        for mail in &self.mails {
            if let Some(subject) = &mail.subject {
                fs::write(base.join(format!("{}.subject.txt", mail.name)), subject)
                    .await
                    .unwrap();
            }
            if let Some(body) = &mail.body {
                fs::write(base.join(format!("{}.body.html", mail.name)), body)
                    .await
                    .unwrap();
            }
        }

        for (name, content) in &self.snippets {
            fs::write(base.join("snippets").join(format!("{}.html", name)), content)
                .await
                .unwrap();
        }
    }
}

impl Default for TemplateTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub templates_dir: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let templates_dir = temp_dir.path().join("mailTemplates");

        Self {
            temp_dir,
            templates_dir,
        }
    }

    pub async fn with_templates(builder: &TemplateTreeBuilder) -> Self {
        let env = Self::new();
        builder.write_to(&env.templates_dir).await;
        env
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.templates.directory = self.templates_dir.clone();
        config
    }

    pub fn renderer(&self) -> MailRenderer {
        MailRenderer::from_config(&self.config())
    }

    /// Write a configuration file pointing at this environment's templates
    pub async fn create_config_file(&self) -> PathBuf {
        let path = self.temp_dir.path().join("knotenmail.yaml");
        let content = format!(
            "templates:\n  directory: {}\nlogging:\n  level: warn\n",
            self.templates_dir.display()
        );
        fs::write(&path, content).await.unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory log sink usable as a `tracing_subscriber` writer
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

pub struct LogCaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the thread's default subscriber; capture stops when the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for LogCaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogCaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}
