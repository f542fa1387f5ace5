// ABOUTME: Process-wide values injected into every mail rendering context
// ABOUTME: Derives community data and the edit-node URL from configuration once at startup

use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use super::urls::UrlBuilder;
use crate::cli::config::{CommunityConfig, Config};
use crate::template::Layer;

/// Read-only after construction; clones share the same layer
#[derive(Debug, Clone)]
pub struct GlobalRenderData {
    values: Arc<Layer>,
}

impl GlobalRenderData {
    pub fn new(community: &CommunityConfig, urls: &UrlBuilder) -> Self {
        let mut values = Layer::new();
        values.insert(
            "community".to_string(),
            json!({
                "name": community.name,
                "domain": community.domain,
                "contactEmail": community.contact_email,
                "sites": community.sites,
                "domains": community.domains,
            }),
        );
        values.insert(
            "editNodeUrl".to_string(),
            JsonValue::String(urls.edit_node_url()),
        );

        Self {
            values: Arc::new(values),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let urls = UrlBuilder::new(&config.server.base_url);
        Self::new(&config.client.community, &urls)
    }

    pub fn layer(&self) -> Arc<Layer> {
        Arc::clone(&self.values)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let global = GlobalRenderData::from_config(&Config::default());

        assert_eq!(
            global.get("editNodeUrl"),
            Some(&json!("http://localhost:8080/#/update"))
        );

        let community = global.get("community").unwrap();
        assert_eq!(community["name"], "Freifunk Musterstadt");
        assert_eq!(community["domain"], "musterstadt.freifunk.net");
        assert_eq!(community["contactEmail"], "kontakt@musterstadt.freifunk.net");
    }

    #[test]
    fn test_clones_share_layer() {
        let global = GlobalRenderData::from_config(&Config::default());
        let copy = global.clone();
        assert!(Arc::ptr_eq(&global.layer(), &copy.layer()));
    }
}
