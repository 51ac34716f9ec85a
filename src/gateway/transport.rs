use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AdminError, Result};

/// HTTP methods the console uses against the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One field of a multipart form
#[derive(Debug, Clone)]
pub enum MultipartPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        data: Vec<u8>,
    },
}

/// An owned description of a multipart body.
///
/// The retry path needs to re-issue a request after a token refresh, so the
/// form is kept as plain data and converted into a `reqwest` form per attempt
/// rather than holding the one-shot `reqwest::multipart::Form` directly.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<MultipartPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            data,
        });
        self
    }

    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Build the wire form for a single attempt
    fn to_reqwest(&self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            form = match part {
                MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
                MultipartPart::File {
                    name,
                    file_name,
                    mime,
                    data,
                } => {
                    let part = reqwest::multipart::Part::bytes(data.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime)
                        .map_err(|e| AdminError::Transport(format!("invalid mime type: {}", e)))?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Request body: either a structured payload serialized to JSON, or a raw
/// multipart payload sent unmodified so the transport can set its own
/// boundary.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

/// A fully composed outbound request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// What came back from the wire
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Declared content type, if any
    pub content_type: Option<String>,
    /// Raw response body
    pub body: String,
}

impl TransportResponse {
    /// Check if successful (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the response declares a JSON content type
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false)
    }
}

/// Trait for HTTP transport operations, allowing for mocking
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one HTTP request and return the raw response
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Implementation of `HttpTransport` using reqwest
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport with a custom-configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method.as_reqwest(), &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        builder = match request.body {
            Some(RequestBody::Json(value)) => {
                let raw = serde_json::to_string(&value)
                    .map_err(|e| AdminError::Transport(format!("failed to encode body: {}", e)))?;
                builder.body(raw)
            }
            Some(RequestBody::Multipart(form)) => builder.multipart(form.to_reqwest()?),
            None => builder,
        };

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_form_keeps_parts_in_order() {
        let form = MultipartForm::new()
            .text("name", "USB Lamp")
            .file("mainImage", "lamp.jpg", "image/jpeg", vec![1, 2, 3])
            .text("category", "gadgets");

        let names: Vec<&str> = form
            .parts()
            .iter()
            .map(|p| match p {
                MultipartPart::Text { name, .. } => name.as_str(),
                MultipartPart::File { name, .. } => name.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["name", "mainImage", "category"]);

        // Cloning keeps the form rebuildable for a retry
        let clone = form.clone();
        assert_eq!(clone.parts().len(), 3);
        assert!(clone.to_reqwest().is_ok());
    }

    #[test]
    fn json_detection_requires_declared_content_type() {
        let json = TransportResponse {
            status: 200,
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: "{}".to_string(),
        };
        assert!(json.is_json());

        let pdf = TransportResponse {
            status: 200,
            content_type: Some("application/pdf".to_string()),
            body: String::new(),
        };
        assert!(!pdf.is_json());

        let bare = TransportResponse {
            status: 204,
            content_type: None,
            body: String::new(),
        };
        assert!(!bare.is_json());
        assert!(bare.is_success());
    }
}
