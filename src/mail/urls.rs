// ABOUTME: Builds links into the node management web form
// ABOUTME: Produces edit-node and monitoring confirmation URLs from the configured base URL

use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn edit_node_url(&self) -> String {
        self.form_url("update", &[])
    }

    pub fn monitoring_confirm_url(&self, token: &str) -> String {
        self.form_url("monitoring/confirm", &[("token", token)])
    }

    pub fn monitoring_disable_url(&self, token: &str) -> String {
        self.form_url("monitoring/disable", &[("token", token)])
    }

    /// `<base>/#/<route>`, with `query` form-encoded after the client-side route
    fn form_url(&self, route: &str, query: &[(&str, &str)]) -> String {
        let mut url = format!("{}/#/{}", self.base_url, route);

        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }

        url
    }
}
