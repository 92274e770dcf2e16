use crate::config::BackendsConfig;

/// A single routing rule: requests whose path starts with `path_prefix` go
/// to `target_base_url`, with the prefix rewritten to `rewrite_to`.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub path_prefix: String,
    pub rewrite_to: String,
    pub target_base_url: String,
}

/// Static prefix-to-backend mapping.
///
/// Routes are examined in registration order and the first prefix match
/// wins. This is deliberately NOT longest-prefix matching; overlap between
/// prefixes is resolved by order alone.
pub struct BackendRegistry {
    routes: Vec<Route>,
}

impl BackendRegistry {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Standard route table: users and products services.
    pub fn from_config(backends: &BackendsConfig) -> Self {
        Self::new(vec![
            Route {
                path_prefix: "/api/users".to_string(),
                rewrite_to: "/users".to_string(),
                target_base_url: backends.user_service_url.clone(),
            },
            Route {
                path_prefix: "/api/products".to_string(),
                rewrite_to: "/products".to_string(),
                target_base_url: backends.product_service_url.clone(),
            },
        ])
    }

    /// First route whose prefix the path starts with, in registration order.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| path.starts_with(&r.path_prefix))
    }
}
