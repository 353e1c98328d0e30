use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Server-assigned blog identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    FromStr, From, Into,
)]
#[serde(transparent)]
pub struct BlogId(pub u64);

/// Blog post as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub content: String,
    /// Author email (the backend renders the user as its username, which is the email).
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Blog {
    /// Author display name: the local part of the author email.
    #[must_use]
    pub fn author_name(&self) -> &str {
        self.author.split('@').next().unwrap_or_default()
    }

    /// The first `max_chars` characters of the content, with `...` appended
    /// when truncated.
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> String {
        match self.content.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.content[..cut]),
            None => self.content.clone(),
        }
    }

    /// Estimated reading time at 250 characters per minute, at least 1.
    ///
    /// Empty content counts as 100 characters.
    #[must_use]
    pub fn read_minutes(&self) -> u32 {
        let len = match self.content.chars().count() {
            0 => 100,
            n => n,
        };
        let minutes = (len as f64 / 250.0).round() as u32;
        minutes.max(1)
    }
}

/// Title and content for creating or replacing a blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
}

impl BlogDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// One page of the blog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPage {
    pub results: Vec<Blog>,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl BlogPage {
    /// `ceil(count / page_size)`; zero when `page_size` is zero.
    #[must_use]
    pub fn total_pages(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.count.div_ceil(u64::from(page_size))
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// The listing endpoint answers either paginated or as a bare array,
/// depending on server pagination settings.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum BlogListing {
    Paginated {
        results: Vec<Blog>,
        #[serde(default)]
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
    Plain(Vec<Blog>),
}

impl From<BlogListing> for BlogPage {
    fn from(listing: BlogListing) -> Self {
        match listing {
            BlogListing::Paginated {
                results,
                count,
                next,
                previous,
            } => Self {
                results,
                count,
                next,
                previous,
            },
            BlogListing::Plain(results) => Self {
                count: results.len() as u64,
                results,
                next: None,
                previous: None,
            },
        }
    }
}

/// Login credentials. The backend authenticates by username, which is the email.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SignupBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Token pair issued by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RefreshBody<'a> {
    pub refresh: &'a str,
}

/// Response of the token refresh endpoint. Only the access token is renewed.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshedToken {
    pub access: String,
}
