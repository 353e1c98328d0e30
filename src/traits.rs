use crate::notice::Notice;

/// Error type returned by consumer-provided collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer-provided persistent key/value storage for session tokens.
///
/// The client only ever touches the keys in [`crate::session::keys`].
/// Implementations should survive process restarts; see
/// [`FileTokenStore`](crate::FileTokenStore) for a ready-made one.
///
/// # Example
///
/// ```rust,ignore
/// impl TokenStore for Keychain {
///     fn get(&self, key: &str) -> Result<Option<String>, BoxError> {
///         Ok(self.entry(key)?.get_password().ok())
///     }
///
///     fn set(&self, key: &str, value: &str) -> Result<(), BoxError> {
///         self.entry(key)?.set_password(value)?;
///         Ok(())
///     }
///
///     fn remove(&self, key: &str) -> Result<(), BoxError> {
///         let _ = self.entry(key)?.delete_credential();
///         Ok(())
///     }
/// }
/// ```
pub trait TokenStore: Send + Sync + 'static {
    /// Look up a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, BoxError>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &str) -> Result<(), BoxError>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), BoxError>;
}

/// Consumer-provided redirect capability.
///
/// Called with the configured sign-in path when the session can no longer
/// be recovered.
pub trait Navigator: Send + Sync + 'static {
    fn redirect_to(&self, path: &str);
}

/// Consumer-provided user messaging (toasts, status bar, log line...).
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notice: Notice);
}

/// Navigator that does nothing, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect_to(&self, path: &str) {
        tracing::debug!(path, "Redirect requested with no navigator attached");
    }
}
