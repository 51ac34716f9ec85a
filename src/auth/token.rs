use serde::{Deserialize, Serialize};

/// The credential pair handed out at login. Both tokens are opaque: the
/// client never inspects them, only stores and replays them. Expiry is
/// discovered by a failed call, never by a local clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer token attached to every authenticated call
    pub access_token: String,
    /// Longer-lived token used exclusively to mint a new access token
    pub refresh_token: Option<String>,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}
