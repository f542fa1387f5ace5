// ABOUTME: Filesystem-backed template store for mail templates and snippets
// ABOUTME: Resolves template names to paths, loads text concurrently and optionally caches it

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

use super::error::{Result, TemplateError};

const SUBJECT_SUFFIX: &str = ".subject.txt";
const BODY_SUFFIX: &str = ".body.html";
const SNIPPET_SUFFIX: &str = ".html";
const SNIPPETS_DIR: &str = "snippets";

/// Raw subject and body text of one mail template.
#[derive(Debug, Clone)]
pub struct MailTemplates {
    pub subject: Arc<str>,
    pub body: Arc<str>,
}

/// Read-only store for `<base>/<name>.subject.txt`, `<base>/<name>.body.html` and
/// `<base>/snippets/<name>.html`.
#[derive(Debug)]
pub struct TemplateStore {
    base_path: PathBuf,
    cache: Option<RwLock<HashMap<PathBuf, Arc<str>>>>,
}

impl TemplateStore {
    /// Create a store that re-reads every template from disk
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: None,
        }
    }

    /// Create a store that keeps template text in memory once read.
    /// Templates are deployment-time assets, so entries are never invalidated.
    pub fn cached(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    pub fn subject_path(&self, name: &str) -> Result<PathBuf> {
        self.resolve(&self.base_path, name, SUBJECT_SUFFIX)
    }

    pub fn body_path(&self, name: &str) -> Result<PathBuf> {
        self.resolve(&self.base_path, name, BODY_SUFFIX)
    }

    pub fn snippet_path(&self, name: &str) -> Result<PathBuf> {
        self.resolve(&self.base_path.join(SNIPPETS_DIR), name, SNIPPET_SUFFIX)
    }

    /// Load the text at `path` without blocking the runtime
    pub async fn load(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(text) = self.cache_get(path) {
            debug!("Template cache hit: {}", path.display());
            return Ok(text);
        }

        debug!("Loading template: {}", path.display());
        let text: Arc<str> = fs::read_to_string(path)
            .await
            .map_err(|e| TemplateError::from_io(path, e))?
            .into();

        self.cache_put(path, &text);
        Ok(text)
    }

    /// Load the text at `path` on the current thread.
    /// Used by helpers, which Handlebars evaluates synchronously.
    pub fn load_blocking(&self, path: &Path) -> Result<Arc<str>> {
        if let Some(text) = self.cache_get(path) {
            debug!("Template cache hit: {}", path.display());
            return Ok(text);
        }

        debug!("Loading template: {}", path.display());
        let text: Arc<str> = std::fs::read_to_string(path)
            .map_err(|e| TemplateError::from_io(path, e))?
            .into();

        self.cache_put(path, &text);
        Ok(text)
    }

    /// Load subject and body of a mail template concurrently.
    /// The first failure wins; the other load's outcome is discarded.
    pub async fn load_mail(&self, name: &str) -> Result<MailTemplates> {
        let subject_path = self.subject_path(name)?;
        let body_path = self.body_path(name)?;

        let (subject, body) = tokio::try_join!(self.load(&subject_path), self.load(&body_path))?;

        Ok(MailTemplates { subject, body })
    }

    pub fn load_snippet(&self, name: &str) -> Result<Arc<str>> {
        let path = self.snippet_path(name)?;
        self.load_blocking(&path)
    }

    /// Names of all mail templates that have a subject file, sorted
    pub fn list_mail_templates(&self) -> Vec<String> {
        self.list_names(&self.base_path, SUBJECT_SUFFIX)
    }

    /// Names of all snippets, sorted
    pub fn list_snippets(&self) -> Vec<String> {
        self.list_names(&self.base_path.join(SNIPPETS_DIR), SNIPPET_SUFFIX)
    }

    fn resolve(&self, dir: &Path, name: &str, suffix: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}{}", name, suffix));

        let well_formed = !name.is_empty()
            && Path::new(name)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if well_formed {
            Ok(path)
        } else {
            Err(TemplateError::NotFound { path })
        }
    }

    fn list_names(&self, dir: &Path, suffix: &str) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name().to_string_lossy().to_string();
                file_name.strip_suffix(suffix).map(|name| name.to_string())
            })
            .filter(|name| !name.is_empty())
            .collect();

        names.sort();
        names
    }

    fn cache_get(&self, path: &Path) -> Option<Arc<str>> {
        let cache = self.cache.as_ref()?;
        let guard = cache.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(path).cloned()
    }

    fn cache_put(&self, path: &Path, text: &Arc<str>) {
        if let Some(cache) = &self.cache {
            // Racing loads insert identical text; last writer wins.
            let mut guard = cache.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.insert(path.to_path_buf(), Arc::clone(text));
        }
    }
}
