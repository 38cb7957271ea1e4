use async_trait::async_trait;
use std::collections::HashMap;

/// Resolves authentication tokens to usernames.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Identity: Send + Sync {
    /// The username the token was issued to, if the token is valid.
    async fn resolve(&self, token: &str) -> Option<String>;
}

/// A fixed table of tokens.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Tokens(HashMap<String, String>);

impl<T: Into<String>, U: Into<String>> FromIterator<(T, U)> for Tokens {
    fn from_iter<I: IntoIterator<Item = (T, U)>>(iter: I) -> Self {
        Tokens(iter.into_iter().map(|(t, u)| (t.into(), u.into())).collect())
    }
}

#[async_trait]
impl Identity for Tokens {
    async fn resolve(&self, token: &str) -> Option<String> {
        self.0.get(token).cloned()
    }
}
