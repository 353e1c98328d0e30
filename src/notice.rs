use crate::error::Error;
use crate::traits::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message for the user, handed to a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// `"<prefix>: <detail>"`, e.g. `"Login failed: No active account found"`.
    #[must_use]
    pub fn failure(prefix: &str, error: &Error) -> Self {
        Self::error(format!("{prefix}: {}", error.detail()))
    }
}

/// Report the outcome of an operation and pass the result through.
///
/// ```rust,ignore
/// let session = notify_outcome(
///     &toasts,
///     api.login(email, password).await,
///     "Login successful!",
///     "Login failed",
/// )?;
/// ```
pub fn notify_outcome<T, N: Notifier + ?Sized>(
    notifier: &N,
    result: Result<T, Error>,
    success: &str,
    failure_prefix: &str,
) -> Result<T, Error> {
    match &result {
        Ok(_) => notifier.notify(Notice::success(success)),
        Err(e) => notifier.notify(Notice::failure(failure_prefix, e)),
    }
    result
}
