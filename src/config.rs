use std::time::Duration;

use url::Url;

use crate::error::Error;

const DEFAULT_REMOTE: &str = "https://blog-app-y4v5.onrender.com";

/// BlogVerse API client configuration.
///
/// The base URL is a constructor parameter; every endpoint path has a
/// default matching the BlogVerse backend and can be overridden by chaining.
///
/// ```rust,ignore
/// use blogverse_client::ClientConfig;
///
/// let config = ClientConfig::new("https://blog.example.com".parse()?)
///     .with_sign_in_path("/signin")
///     .with_timeout(std::time::Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) login_path: String,
    pub(crate) signup_path: String,
    pub(crate) refresh_path: String,
    pub(crate) blogs_path: String,
    pub(crate) my_blogs_path: String,
    pub(crate) sign_in_path: String,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
}

impl ClientConfig {
    /// Endpoint paths are resolved under the base URL's path, so a base of
    /// `https://host/blog` sends login to `https://host/blog/api/login/`.
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            login_path: "/api/login/".into(),
            signup_path: "/api/signup/".into(),
            refresh_path: "/api/token/refresh/".into(),
            blogs_path: "/api/blogs/".into(),
            my_blogs_path: "/api/my-blogs/".into(),
            sign_in_path: "/login".into(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("blogverse-client/", env!("CARGO_PKG_VERSION")).into(),
        }
    }

    /// Configuration for the public BlogVerse deployment.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the URL is a constant.
    pub fn default_remote() -> Result<Self, Error> {
        let url = DEFAULT_REMOTE
            .parse()
            .map_err(|e| Error::Config(format!("default remote: {e}")))?;
        Ok(Self::new(url))
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `BLOGVERSE_API_URL`: base URL of the API server
    ///
    /// # Optional env vars
    /// - `BLOGVERSE_SIGN_IN_PATH`: where to send the user when the session expires
    /// - `BLOGVERSE_TIMEOUT_SECS`: transport timeout in seconds
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, Error> {
        let url_str = std::env::var("BLOGVERSE_API_URL")
            .map_err(|_| Error::Config("BLOGVERSE_API_URL is required".into()))?;
        let base_url: Url = url_str
            .parse()
            .map_err(|e| Error::Config(format!("BLOGVERSE_API_URL: {e}")))?;

        let mut config = Self::new(base_url);

        if let Ok(path) = std::env::var("BLOGVERSE_SIGN_IN_PATH") {
            config = config.with_sign_in_path(path);
        }
        if let Ok(secs) = std::env::var("BLOGVERSE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("BLOGVERSE_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_signup_path(mut self, path: impl Into<String>) -> Self {
        self.signup_path = path.into();
        self
    }

    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    #[must_use]
    pub fn with_blogs_path(mut self, path: impl Into<String>) -> Self {
        self.blogs_path = path.into();
        self
    }

    #[must_use]
    pub fn with_my_blogs_path(mut self, path: impl Into<String>) -> Self {
        self.my_blogs_path = path.into();
        self
    }

    /// Override the navigator destination used when the session expires.
    #[must_use]
    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    #[must_use]
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an API path under the base URL. A leading `/` does not
    /// escape the base path.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("invalid path {path:?}: {e}")))
    }

    /// Path of a single blog resource, e.g. `/api/blogs/7/`.
    pub(crate) fn blog_path(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{id}/", self.blogs_path.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        "https://blog.example.com".parse().unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new(base());

        assert_eq!(config.base_url().as_str(), "https://blog.example.com/");
        assert_eq!(config.refresh_path(), "/api/token/refresh/");
        assert_eq!(config.sign_in_path(), "/login");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("blogverse-client/"));
    }

    #[test]
    fn test_config_with_overrides() {
        let config = ClientConfig::new(base())
            .with_sign_in_path("/signin")
            .with_refresh_path("/auth/refresh/")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.sign_in_path(), "/signin");
        assert_eq!(config.refresh_path(), "/auth/refresh/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_endpoint_resolution() {
        let config = ClientConfig::new(base());

        let url = config.endpoint("/api/login/").unwrap();
        assert_eq!(url.as_str(), "https://blog.example.com/api/login/");
        assert_eq!(
            config.endpoint("api/blogs/7/").unwrap().as_str(),
            "https://blog.example.com/api/blogs/7/"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        for raw in ["https://blog.example.com/blog", "https://blog.example.com/blog/"] {
            let config = ClientConfig::new(raw.parse().unwrap());

            assert_eq!(config.base_url().as_str(), "https://blog.example.com/blog/");
            assert_eq!(
                config.endpoint("/api/login/").unwrap().as_str(),
                "https://blog.example.com/blog/api/login/"
            );
            assert_eq!(
                config.endpoint(config.refresh_path()).unwrap().as_str(),
                "https://blog.example.com/blog/api/token/refresh/"
            );
        }
    }

    #[test]
    fn test_blog_path() {
        let config = ClientConfig::new(base());
        assert_eq!(config.blog_path(42), "/api/blogs/42/");

        let config = config.with_blogs_path("/v2/posts");
        assert_eq!(config.blog_path(7), "/v2/posts/7/");
    }

    #[test]
    fn test_default_remote() {
        let config = ClientConfig::default_remote().unwrap();
        assert_eq!(config.base_url().host_str(), Some("blog-app-y4v5.onrender.com"));
    }
}
