use crate::error::Error;
use crate::traits::TokenStore;
use crate::types::TokenPair;

/// Token store keys used by the client.
pub mod keys {
    pub const ACCESS: &str = "access";
    pub const REFRESH: &str = "refresh";
    pub const USER_LABEL: &str = "userLabel";

    pub const ALL: [&str; 3] = [ACCESS, REFRESH, USER_LABEL];
}

/// Client-held authentication state.
///
/// A snapshot of what the [`TokenStore`] holds. The store is the source of
/// truth; a `Session` value goes stale as soon as another request refreshes
/// the access token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Display initial derived from the account email. Not an identity.
    pub user_label: Option<String>,
}

impl Session {
    /// Read the current session from the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store cannot be read.
    pub fn load<S: TokenStore + ?Sized>(store: &S) -> Result<Self, Error> {
        Ok(Self {
            access_token: read(store, keys::ACCESS)?,
            refresh_token: read(store, keys::REFRESH)?,
            user_label: read(store, keys::USER_LABEL)?,
        })
    }

    /// Persist a freshly issued token pair together with the display label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if any write fails.
    pub fn establish<S: TokenStore + ?Sized>(
        store: &S,
        tokens: &TokenPair,
        email: &str,
    ) -> Result<Self, Error> {
        let user_label = user_label_for(email);

        write(store, keys::ACCESS, &tokens.access)?;
        write(store, keys::REFRESH, &tokens.refresh)?;
        match &user_label {
            Some(label) => write(store, keys::USER_LABEL, label)?,
            None => remove(store, keys::USER_LABEL)?,
        }

        Ok(Self {
            access_token: Some(tokens.access.clone()),
            refresh_token: Some(tokens.refresh.clone()),
            user_label,
        })
    }

    /// Remove every session key from the store.
    ///
    /// All keys are attempted even if one fails; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if any removal fails.
    pub fn clear<S: TokenStore + ?Sized>(store: &S) -> Result<(), Error> {
        let mut first_err = None;
        for key in keys::ALL {
            if let Err(e) = remove(store, key) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// First character of the trimmed email, uppercased.
#[must_use]
pub fn user_label_for(email: &str) -> Option<String> {
    email
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
}

pub(crate) fn read<S: TokenStore + ?Sized>(store: &S, key: &str) -> Result<Option<String>, Error> {
    store
        .get(key)
        .map_err(|e| Error::Store(format!("read {key}: {e}")))
}

pub(crate) fn write<S: TokenStore + ?Sized>(store: &S, key: &str, value: &str) -> Result<(), Error> {
    store
        .set(key, value)
        .map_err(|e| Error::Store(format!("write {key}: {e}")))
}

fn remove<S: TokenStore + ?Sized>(store: &S, key: &str) -> Result<(), Error> {
    store
        .remove(key)
        .map_err(|e| Error::Store(format!("remove {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    #[test]
    fn user_label_is_uppercased_initial() {
        assert_eq!(user_label_for("a@b.com").as_deref(), Some("A"));
        assert_eq!(user_label_for("  zoe@x.io ").as_deref(), Some("Z"));
        assert_eq!(user_label_for("ébène@x.fr").as_deref(), Some("É"));
        assert_eq!(user_label_for("   "), None);
    }

    #[test]
    fn establish_writes_all_three_keys() {
        let store = MemoryTokenStore::new();
        let session = Session::establish(&store, &pair("T1", "R1"), "a@b.com").unwrap();

        assert_eq!(
            session,
            Session {
                access_token: Some("T1".into()),
                refresh_token: Some("R1".into()),
                user_label: Some("A".into()),
            }
        );
        assert_eq!(Session::load(&store).unwrap(), session);
    }

    #[test]
    fn clear_removes_everything() {
        let store = MemoryTokenStore::new();
        Session::establish(&store, &pair("T1", "R1"), "a@b.com").unwrap();

        Session::clear(&store).unwrap();

        let session = Session::load(&store).unwrap();
        assert_eq!(session, Session::default());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clear_on_empty_store_is_ok() {
        let store = MemoryTokenStore::new();
        assert!(Session::clear(&store).is_ok());
    }
}
