use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::Error;

/// Description of an outbound API call.
///
/// Captured before the first attempt so it can be replayed after a token
/// refresh with only the `Authorization` header changed.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<JsonValue>,
    pub(crate) headers: HeaderMap,
    pub(crate) retried: bool,
    pub(crate) anonymous: bool,
}

impl PendingRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            retried: false,
            anonymous: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `body` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Validation(format!("request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Send without the session's bearer token.
    ///
    /// A 401 on an anonymous request is returned as-is; there is no session
    /// credential to refresh.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub fn body(&self) -> Option<&JsonValue> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether this request has already been through a refresh.
    #[must_use]
    pub fn is_retry(&self) -> bool {
        self.retried
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Set `Authorization: Bearer <token>`, replacing any existing value.
    ///
    /// Fails, leaving the headers untouched, if the token contains bytes
    /// that cannot appear in a header.
    pub(crate) fn set_bearer(&mut self, token: &str) -> Result<(), InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    #[must_use]
    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_captures_everything() {
        let req = PendingRequest::get("/api/blogs/")
            .with_query("page", 2)
            .with_query("page_size", 6);

        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/api/blogs/");
        assert_eq!(
            req.query(),
            &[
                ("page".to_string(), "2".to_string()),
                ("page_size".to_string(), "6".to_string())
            ]
        );
        assert!(req.body().is_none());
        assert!(!req.is_retry());
    }

    #[test]
    fn json_body_is_kept_for_replay() {
        let req = PendingRequest::post("/api/blogs/")
            .with_json(&json!({"title": "t", "content": "c"}))
            .unwrap();
        let replay = req.clone();

        assert_eq!(replay.body(), Some(&json!({"title": "t", "content": "c"})));
    }

    #[test]
    fn set_bearer_replaces_header() {
        let mut req = PendingRequest::get("/api/my-blogs/");
        assert!(!req.has_authorization());

        req.set_bearer("T1").unwrap();
        req.set_bearer("T2").unwrap();

        let values: Vec<_> = req.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "Bearer T2");
        assert!(values[0].is_sensitive());
    }

    #[test]
    fn set_bearer_rejects_control_characters() {
        let mut req = PendingRequest::get("/");
        req.set_bearer("T1").unwrap();

        assert!(req.set_bearer("bad\ntoken").is_err());
        assert_eq!(req.headers().get(AUTHORIZATION).unwrap(), "Bearer T1");
    }

    #[test]
    fn mark_retried_is_sticky() {
        let mut req = PendingRequest::delete("/api/blogs/1/");
        req.mark_retried();
        assert!(req.clone().is_retry());
    }
}
