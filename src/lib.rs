#![doc = include_str!("../README.md")]

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod notice;
pub mod request;
pub mod session;
pub mod store;
pub mod traits;
pub mod types;

// Re-exports for convenient access
pub use api::BlogApi;
pub use client::AuthenticatedHttpClient;
pub use config::ClientConfig;
pub use error::Error;
pub use notice::{Notice, NoticeKind, notify_outcome};
pub use request::PendingRequest;
pub use session::{Session, user_label_for};
pub use store::{FileTokenStore, MemoryTokenStore};
pub use traits::{BoxError, Navigator, NoopNavigator, Notifier, TokenStore};
pub use types::{Blog, BlogDraft, BlogId, BlogPage, TokenPair};
