// ============================================================================
// Route Registry
// ============================================================================
//
// Static prefix -> host table, populated once at startup.
//
// Matching is `str::starts_with` over the table in insertion order and the
// first hit wins. There is no longest-prefix tie-break: with "/clinica" listed
// before "/clinica-v2", a request for "/clinica-v2/x" goes to the "/clinica"
// host.
//
// ============================================================================

/// One configured prefix and the host that serves it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    /// Scheme + authority without trailing slash, e.g. "http://localhost:3000"
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    pub fn new(routes: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            routes: routes
                .into_iter()
                .map(|(prefix, host)| Route { prefix, host })
                .collect(),
        }
    }

    /// First route whose prefix the path starts with
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| path.starts_with(&route.prefix))
    }
}

impl Route {
    /// `<host><path>[?<query>]`; the path is forwarded untouched, prefix included
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(query) => format!("{}{}?{}", self.host, path, query),
            None => format!("{}{}", self.host, path),
        }
    }
}
