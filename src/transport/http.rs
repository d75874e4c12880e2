//! `reqwest`-backed transport

use super::{FormPart, MultipartForm, PartValue, RequestBody, Transport, TransportResponse};
use crate::{
    config::ClientConfig,
    error::{Result, SnapEditError},
    tracing_config::{events, spans},
};
use async_trait::async_trait;
use instant::Instant;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    multipart::{Form, Part},
    Client,
};
use tracing::Instrument;

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "X-API-KEY";

// Header names are case-insensitive; `HeaderName::from_static` needs lowercase
const API_KEY_HEADER_NAME: &str = "x-api-key";

/// HTTP transport with a fixed origin and API key header
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport from a validated configuration
    ///
    /// # Errors
    /// - API key contains characters not allowed in a header
    /// - Failed to create HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(config.api_key.trim()).map_err(|_| {
            SnapEditError::invalid_config("API key contains characters not allowed in an HTTP header")
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER_NAME), api_key);

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Join a path onto the origin; absolute URLs pass through
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, path: &str, request: reqwest::RequestBuilder) -> Result<TransportResponse> {
        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        events::http_response(path, status, started.elapsed().as_millis() as u64);

        TransportResponse::new(status, body).error_for_status(path)
    }
}

fn into_reqwest_form(form: MultipartForm) -> Result<Form> {
    form.into_parts()
        .into_iter()
        .try_fold(Form::new(), |form, FormPart { name, value }| {
            Ok(match value {
                PartValue::Text(text) => form.text(name, text),
                PartValue::File {
                    data,
                    file_name,
                    mime_type,
                } => {
                    let part = Part::bytes(data)
                        .file_name(file_name)
                        .mime_str(&mime_type)?;
                    form.part(name, part)
                },
            })
        })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<TransportResponse> {
        let url = self.resolve_url(path);
        let request = self.client.get(&url);
        self.send(path, request)
            .instrument(spans::http_request("GET", path))
            .await
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<TransportResponse> {
        let url = self.resolve_url(path);
        let request = match body {
            RequestBody::Json(value) => self.client.post(&url).json(&value),
            RequestBody::Multipart(form) => self.client.post(&url).multipart(into_reqwest_form(form)?),
        };
        self.send(path, request)
            .instrument(spans::http_request("POST", path))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_data::EncodedImage;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Accept one connection, answer `{}` and return the raw request text
    async fn serve_once(listener: TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..read]);
            if request_complete(&raw) {
                break;
            }
        }
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end].lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        });
        match content_length {
            Some(length) => raw.len() >= header_end + 4 + length,
            None => text.ends_with("--\r\n"),
        }
    }

    fn transport(base_url: &str) -> HttpTransport {
        let config = ClientConfig::builder()
            .api_key("test-key")
            .base_url(base_url)
            .build()
            .unwrap();
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_resolve_url() {
        let transport = transport("https://platform.snapedit.app/");
        assert_eq!(transport.base_url(), "https://platform.snapedit.app");
        assert_eq!(
            transport.resolve_url("/api/background_removal/v1/erase"),
            "https://platform.snapedit.app/api/background_removal/v1/erase"
        );
        assert_eq!(
            transport.resolve_url("api/x"),
            "https://platform.snapedit.app/api/x"
        );
        assert_eq!(
            transport.resolve_url("https://other.example/api/x"),
            "https://other.example/api/x"
        );
    }

    #[test]
    fn test_rejects_unusable_api_key() {
        let mut config = ClientConfig::builder().api_key("ok").build().unwrap();
        config.api_key = "bad\nkey".to_string();
        let err = HttpTransport::new(&config).unwrap_err();
        assert!(matches!(err, SnapEditError::InvalidConfig(_)));
    }

    #[test]
    fn test_form_conversion() {
        let form = MultipartForm::new()
            .text("zoom_factor", "2")
            .file("input_image", vec![0u8; 4], "image.png", "image/png");
        assert!(into_reqwest_form(form).is_ok());

        let form = MultipartForm::new().file("input_image", vec![0u8; 4], "image.png", "not a mime");
        assert!(matches!(
            into_reqwest_form(form),
            Err(SnapEditError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_multipart_post_on_the_wire() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener));

        let config = ClientConfig::builder()
            .api_key("k123")
            .base_url(format!("http://{}", addr))
            .build()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();

        let image = EncodedImage::new(vec![0x89, b'P', b'N', b'G', 1, 2, 3], "image/png");
        let form = MultipartForm::new().image("original_preview_image", "image", &image);
        let response = transport
            .post(
                "/api/object_removal/v1/auto_suggest",
                RequestBody::Multipart(form),
            )
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"{}");

        let request = server.await.unwrap();
        assert!(
            request.starts_with("POST /api/object_removal/v1/auto_suggest HTTP/1.1\r\n"),
            "request line: {}",
            request.lines().next().unwrap_or_default()
        );
        let lowered = request.to_ascii_lowercase();
        assert!(lowered.contains("\r\nx-api-key: k123\r\n"));
        assert!(lowered.contains("content-type: multipart/form-data; boundary="));
        let disposition =
            "content-disposition: form-data; name=\"original_preview_image\"; filename=\"image.png\"";
        let part = &lowered[lowered.find(disposition).unwrap()..];
        assert!(part.contains("\r\ncontent-type: image/png\r\n"));
    }

    #[tokio::test]
    async fn test_connection_failure_is_passed_through() {
        // Nothing listens on port 9 of the loopback interface
        let transport = transport("http://127.0.0.1:9");
        let err = transport.get("/api/ping").await.unwrap_err();
        assert!(matches!(err, SnapEditError::Network(_)));
    }
}
