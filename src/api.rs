use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::client::AuthenticatedHttpClient;
use crate::error::Error;
use crate::request::PendingRequest;
use crate::session::Session;
use crate::traits::{Navigator, TokenStore};
use crate::types::{Blog, BlogDraft, BlogId, BlogListing, BlogPage, LoginBody, SignupBody, TokenPair};

/// Typed client for the BlogVerse endpoints.
///
/// Public reads (listing and single blog) go out without a bearer token, like
/// the web front-end does. Everything else carries the session token and
/// benefits from the refresh-and-retry handling of
/// [`AuthenticatedHttpClient`].
pub struct BlogApi<S, N> {
    client: AuthenticatedHttpClient<S, N>,
}

impl<S, N> Clone for BlogApi<S, N> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<S: TokenStore, N: Navigator> BlogApi<S, N> {
    #[must_use]
    pub fn new(client: AuthenticatedHttpClient<S, N>) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &AuthenticatedHttpClient<S, N> {
        &self.client
    }

    /// Sign in and store the issued tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty credentials (nothing is sent),
    /// [`Error::Api`] if the server rejects them.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        require("email", email)?;
        require("password", password)?;

        let request = PendingRequest::post(&self.client.config().login_path)
            .anonymous()
            .with_json(&LoginBody {
                username: email,
                password,
            })?;
        let tokens: TokenPair = self.send_json(request, "login").await?;

        let session = Session::establish(&**self.client.store(), &tokens, email)?;
        tracing::info!(user = ?session.user_label, "Login successful");
        Ok(session)
    }

    /// Register a new account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for empty input, [`Error::Api`] with the
    /// server's reason (e.g. email already in use) otherwise.
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), Error> {
        require("email", email)?;
        require("password", password)?;

        let request = PendingRequest::post(&self.client.config().signup_path)
            .anonymous()
            .with_json(&SignupBody { email, password })?;
        let response = self.client.send(request).await?;
        ensure_success(response, "signup").await?;

        tracing::info!("Registration successful");
        Ok(())
    }

    /// Drop the local session. The backend keeps no server-side session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be cleared.
    pub fn logout(&self) -> Result<(), Error> {
        Session::clear(&**self.client.store())?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Fetch one page of blogs, newest first. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for page 0, [`Error::Api`] for server errors.
    pub async fn list_blogs(&self, page: u32, page_size: Option<u32>) -> Result<BlogPage, Error> {
        if page == 0 {
            return Err(Error::Validation("page numbers start at 1".into()));
        }

        let mut request = PendingRequest::get(&self.client.config().blogs_path)
            .anonymous()
            .with_query("page", page);
        if let Some(size) = page_size {
            request = request.with_query("page_size", size);
        }

        let listing: BlogListing = self.send_json(request, "list blogs").await?;
        Ok(listing.into())
    }

    /// The `limit` newest blogs.
    ///
    /// # Errors
    ///
    /// Same as [`list_blogs`](Self::list_blogs).
    pub async fn latest_blogs(&self, limit: usize) -> Result<Vec<Blog>, Error> {
        let mut page = self.list_blogs(1, None).await?;
        page.results.truncate(limit);
        Ok(page.results)
    }

    /// # Errors
    ///
    /// Returns [`Error::Api`] with status 404 if the blog does not exist.
    pub async fn get_blog(&self, id: BlogId) -> Result<Blog, Error> {
        let request = PendingRequest::get(self.client.config().blog_path(id)).anonymous();
        self.send_json(request, "get blog").await
    }

    /// Publish a blog as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty title or content,
    /// [`Error::AuthExpired`] if the session cannot be recovered.
    pub async fn create_blog(&self, draft: &BlogDraft) -> Result<Blog, Error> {
        validate_draft(draft)?;

        let request = PendingRequest::post(&self.client.config().blogs_path).with_json(draft)?;
        let blog: Blog = self.send_json(request, "create blog").await?;

        tracing::info!(blog_id = %blog.id, "Blog published");
        Ok(blog)
    }

    /// Replace the title and content of one of the user's blogs.
    ///
    /// # Errors
    ///
    /// Same as [`create_blog`](Self::create_blog).
    pub async fn update_blog(&self, id: BlogId, draft: &BlogDraft) -> Result<Blog, Error> {
        validate_draft(draft)?;

        let request =
            PendingRequest::put(self.client.config().blog_path(id)).with_json(draft)?;
        let blog: Blog = self.send_json(request, "update blog").await?;

        tracing::info!(blog_id = %blog.id, "Blog updated");
        Ok(blog)
    }

    /// # Errors
    ///
    /// Returns [`Error::AuthExpired`] if the session cannot be recovered,
    /// [`Error::Api`] otherwise on failure.
    pub async fn delete_blog(&self, id: BlogId) -> Result<(), Error> {
        let request = PendingRequest::delete(self.client.config().blog_path(id));
        let response = self.client.send(request).await?;
        ensure_success(response, "delete blog").await?;

        tracing::info!(blog_id = %id, "Blog deleted");
        Ok(())
    }

    /// Blogs authored by the signed-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthExpired`] if the session cannot be recovered.
    pub async fn my_blogs(&self) -> Result<Vec<Blog>, Error> {
        let request = PendingRequest::get(&self.client.config().my_blogs_path);
        self.send_json(request, "list my blogs").await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: PendingRequest,
        operation: &'static str,
    ) -> Result<T, Error> {
        let response = self.client.send(request).await?;
        let response = ensure_success(response, operation).await?;
        response.json::<T>().await.map_err(Into::into)
    }
}

/// Checks HTTP response status; returns the response on success or an error with details.
async fn ensure_success(response: Response, operation: &'static str) -> Result<Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        operation,
        status,
        detail: error_detail(&body),
    })
}

/// Human-readable reason from an error body.
///
/// A JSON string is used as-is, then a `detail` field, then the compact JSON
/// text, then the raw body.
pub(crate) fn error_detail(body: &str) -> String {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::String(s)) => s,
        Ok(value) => match value.get("detail").and_then(JsonValue::as_str) {
            Some(detail) => detail.to_owned(),
            None => value.to_string(),
        },
        Err(_) if body.trim().is_empty() => "Unknown error".into(),
        Err(_) => body.trim().to_owned(),
    }
}

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_draft(draft: &BlogDraft) -> Result<(), Error> {
    require("title", &draft.title)?;
    require("content", &draft.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_from_detail_field() {
        let body = r#"{"detail":"No active account found with the given credentials"}"#;
        assert_eq!(
            error_detail(body),
            "No active account found with the given credentials"
        );
    }

    #[test]
    fn detail_from_plain_json_string() {
        assert_eq!(error_detail(r#""Server busy""#), "Server busy");
    }

    #[test]
    fn detail_falls_back_to_compact_json() {
        let body = r#"{ "email": ["This email is already in use."] }"#;
        assert_eq!(
            error_detail(body),
            r#"{"email":["This email is already in use."]}"#
        );
    }

    #[test]
    fn detail_from_non_json_body() {
        assert_eq!(error_detail("<h1>Bad Gateway</h1>\n"), "<h1>Bad Gateway</h1>");
        assert_eq!(error_detail("   "), "Unknown error");
    }

    #[test]
    fn require_rejects_blank() {
        assert!(require("email", "a@b.com").is_ok());
        assert!(matches!(require("email", "  "), Err(Error::Validation(m)) if m == "email is required"));
    }

    #[test]
    fn draft_validation() {
        assert!(validate_draft(&BlogDraft::new("Title", "Body")).is_ok());
        assert!(validate_draft(&BlogDraft::new("", "Body")).is_err());
        assert!(validate_draft(&BlogDraft::new("Title", "\n")).is_err());
    }
}
