/// Which paths the session gate lets through and where it sends everyone else.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub public_paths: Vec<String>,
    pub login_path: String,
    pub default_path: String,
}

/// How the gate answers a request without a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Public,
    Api,
    Fragment,
    Page,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            public_paths: vec![
                "/login".to_string(),
                "/health".to_string(),
                "/static".to_string(),
                "/favicon.ico".to_string(),
                "/api/auth/login".to_string(),
                "/api/client-errors".to_string(),
            ],
            login_path: "/login".to_string(),
            default_path: "/dashboard".to_string(),
        }
    }
}

impl GateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_public_path(mut self, path: impl Into<String>) -> Self {
        self.public_paths.push(path.into());
        self
    }

    pub fn is_public_path(&self, path: &str) -> bool {
        for public_path in &self.public_paths {
            if path == public_path || path.starts_with(&format!("{}/", public_path)) {
                return true;
            }
        }
        false
    }

    pub fn classify(&self, path: &str) -> PathKind {
        if self.is_public_path(path) {
            PathKind::Public
        } else if path.starts_with("/api/") {
            PathKind::Api
        } else if path.starts_with("/ui/") {
            PathKind::Fragment
        } else {
            PathKind::Page
        }
    }

    /// Login URL that returns to `target` after sign-in.
    pub fn login_url(&self, target: &str) -> String {
        if target.is_empty() || target == "/" || target == self.default_path {
            return self.login_path.clone();
        }
        format!(
            "{}?redirect={}",
            self.login_path,
            urlencoding::encode(target)
        )
    }
}
