use thiserror::Error;

/// Machine-readable code the backend attaches to a 401 when the access token
/// (and only the access token) has expired. This is the one code that makes a
/// silent refresh worth attempting.
pub const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";

/// Fallback message when the backend returns an error without a usable body.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors surfaced by the admin client library.
#[derive(Error, Debug)]
pub enum AdminError {
    /// The backend answered with a non-2xx status. `message` carries the
    /// server-supplied text verbatim so screens can show it as-is.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a usable response (network unreachable,
    /// malformed body on a declared-JSON response, and the like).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered 2xx but the payload did not have the shape the
    /// caller needed.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Reading or writing the persistent token store failed.
    #[error("token storage error: {0}")]
    Storage(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Writing an export artifact (HTML report, invoice PDF) failed.
    #[error("export failed: {0}")]
    Export(String),

    /// Reading interactive input from the terminal failed.
    #[error("input error: {0}")]
    Input(String),
}

impl AdminError {
    /// Build an API error from a parsed error payload, falling back to the
    /// generic message when the server sent none.
    pub fn from_payload(status: u16, payload: &serde_json::Value) -> Self {
        let code = payload
            .get("code")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let message = payload
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string();
        AdminError::Api {
            status,
            code,
            message,
        }
    }

    /// True when this error already forced the session back to the login
    /// screen (terminal authentication failure).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AdminError::Api { status: 401, .. })
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        AdminError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_displays_server_message_verbatim() {
        let err = AdminError::from_payload(500, &json!({"message": "Internal error"}));
        assert_eq!(err.to_string(), "Internal error");
    }

    #[test]
    fn missing_message_falls_back_to_generic_text() {
        let err = AdminError::from_payload(502, &serde_json::Value::Null);
        assert_eq!(err.to_string(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn code_is_preserved_for_programmatic_handling() {
        let err = AdminError::from_payload(
            401,
            &json!({"code": "TOKEN_EXPIRED", "message": "expired"}),
        );
        match err {
            AdminError::Api { status, code, .. } => {
                assert_eq!(status, 401);
                assert_eq!(code.as_deref(), Some(TOKEN_EXPIRED_CODE));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }
}
