use std::sync::Arc;

use reqwest::{Response, StatusCode};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::request::PendingRequest;
use crate::session::{self, Session, keys};
use crate::traits::{Navigator, TokenStore};
use crate::types::{RefreshBody, RefreshedToken};

/// HTTP client that attaches the session's bearer token and recovers from a
/// single expired access token.
///
/// On a 401 for a request that has not been retried yet, the client exchanges
/// the stored refresh token for a new access token exactly once, then replays
/// the request with the new token. A second 401 is handed back unchanged.
/// When no refresh token exists or the refresh itself fails, the session is
/// cleared, the [`Navigator`] is sent to the sign-in path, and the call fails
/// with [`Error::AuthExpired`].
///
/// The retry flag lives on the request, so concurrent requests each get their
/// own refresh attempt. Concurrent refreshes are not coalesced; the last
/// stored access token wins.
///
/// `Clone` is cheap; clones share the store, navigator and connection pool.
pub struct AuthenticatedHttpClient<S, N> {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    store: Arc<S>,
    navigator: Arc<N>,
}

// Manual Clone: avoid derive adding `S: Clone, N: Clone` bounds.
impl<S, N> Clone for AuthenticatedHttpClient<S, N> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            http: self.http.clone(),
            store: self.store.clone(),
            navigator: self.navigator.clone(),
        }
    }
}

impl<S: TokenStore, N: Navigator> AuthenticatedHttpClient<S, N> {
    /// Create a client owning its store and navigator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig, store: S, navigator: N) -> Result<Self, Error> {
        Self::with_shared(config, Arc::new(store), Arc::new(navigator))
    }

    /// Create a client over a store and navigator shared with the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the underlying HTTP client cannot be built.
    pub fn with_shared(
        config: ClientConfig,
        store: Arc<S>,
        navigator: Arc<N>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
            store,
            navigator,
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// The configured timeout and user agent are not applied to it.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Snapshot of the stored session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub fn session(&self) -> Result<Session, Error> {
        Session::load(&*self.store)
    }

    /// Send a request, refreshing the access token once on a 401.
    ///
    /// Any response other than a first 401 is returned as-is, including
    /// error statuses. Transport failures propagate without retry.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] on network failure or timeout.
    /// - [`Error::AuthExpired`] when a 401 could not be recovered from,
    ///   including a refresh that returned an unusable token.
    /// - [`Error::Store`] if the session cannot be read or holds an access
    ///   token that cannot be sent as a header.
    pub async fn send(&self, mut request: PendingRequest) -> Result<Response, Error> {
        if !request.anonymous
            && let Some(access) = session::read(&*self.store, keys::ACCESS)?
        {
            request.set_bearer(&access).map_err(|e| {
                Error::Store(format!("stored access token is not a valid header value: {e}"))
            })?;
        }

        let response = self.dispatch(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.anonymous {
            return Ok(response);
        }

        request.mark_retried();
        let access = self.refresh_access_token().await?;
        if let Err(e) = request.set_bearer(&access) {
            tracing::warn!(error = %e, "Refreshed access token is not a valid header value");
            return Err(self.expire_session());
        }

        self.resend(request).await
    }

    /// Replay a request that has already been through a refresh.
    ///
    /// The retry flag is set, so whatever comes back (a second 401 included)
    /// goes straight to the caller.
    async fn resend(&self, request: PendingRequest) -> Result<Response, Error> {
        debug_assert!(request.is_retry());
        let response = self.dispatch(&request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                "Request rejected again after token refresh"
            );
        }
        Ok(response)
    }

    async fn dispatch(&self, request: &PendingRequest) -> Result<Response, Error> {
        let url = self.config.endpoint(&request.path)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            retry = request.retried,
            "Dispatching API request"
        );

        Ok(builder.send().await?)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// The refresh token itself is left untouched.
    async fn refresh_access_token(&self) -> Result<String, Error> {
        let Some(refresh) = session::read(&*self.store, keys::REFRESH)? else {
            tracing::warn!("Access token rejected and no refresh token is stored");
            return Err(self.expire_session());
        };

        let url = self.config.endpoint(&self.config.refresh_path)?;
        let outcome: Result<RefreshedToken, reqwest::Error> = async {
            self.http
                .post(url)
                .json(&RefreshBody { refresh: &refresh })
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        }
        .await;

        let token = match outcome {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                return Err(self.expire_session());
            }
        };

        // The retry can still succeed with the new token even if persisting it fails.
        if let Err(e) = session::write(&*self.store, keys::ACCESS, &token.access) {
            tracing::warn!(error = %e, "Failed to persist refreshed access token");
        }
        tracing::info!("Access token refreshed");

        Ok(token.access)
    }

    /// Clear the session, send the navigator to sign-in and produce the
    /// error the original request fails with.
    fn expire_session(&self) -> Error {
        if let Err(e) = Session::clear(&*self.store) {
            tracing::warn!(error = %e, "Failed to clear expired session");
        }
        tracing::info!(redirect = %self.config.sign_in_path, "Session expired");
        self.navigator.redirect_to(&self.config.sign_in_path);
        Error::AuthExpired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use crate::traits::NoopNavigator;

    #[test]
    fn client_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<AuthenticatedHttpClient<MemoryTokenStore, NoopNavigator>>();
    }

    #[test]
    fn clones_share_the_store() {
        let config = ClientConfig::new("http://localhost:1".parse().unwrap());
        let client =
            AuthenticatedHttpClient::new(config, MemoryTokenStore::new(), NoopNavigator).unwrap();
        let clone = client.clone();

        clone.store().set(keys::ACCESS, "T1").unwrap();

        assert_eq!(client.session().unwrap().access_token.as_deref(), Some("T1"));
        assert!(Arc::ptr_eq(client.store(), clone.store()));
    }

    #[test]
    fn expire_session_clears_and_redirects() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Recorder(Mutex<Vec<String>>);
        impl Navigator for Recorder {
            fn redirect_to(&self, path: &str) {
                self.0.lock().unwrap().push(path.to_owned());
            }
        }

        let config = ClientConfig::new("http://localhost:1".parse().unwrap())
            .with_sign_in_path("/signin");
        let navigator = Arc::new(Recorder::default());
        let client = AuthenticatedHttpClient::with_shared(
            config,
            Arc::new(MemoryTokenStore::new()),
            navigator.clone(),
        )
        .unwrap();
        for key in keys::ALL {
            client.store().set(key, "x").unwrap();
        }

        let err = client.expire_session();

        assert!(matches!(err, Error::AuthExpired));
        assert_eq!(client.session().unwrap(), Session::default());
        assert_eq!(*navigator.0.lock().unwrap(), vec!["/signin".to_string()]);
    }
}
