use std::time::Duration;

pub use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};

use crate::crisis::CRISIS_RESOURCES;
use crate::error::{
    BuildClientSnafu, ChatError, ChatResult, DecodeSnafu, EmptyBaseUrlSnafu, StatusSnafu,
    TransportSnafu,
};

pub const CHAT_PATH: &str = "/chat";
pub const CRISIS_RESOURCES_PATH: &str = "/crisis-resources";

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reply of `POST /chat`: either `{ "response": .. }` or `{ "error": .. }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatReply {
    pub fn into_result(self) -> ChatResult<String> {
        // An empty error string counts as no error, same as a falsy check would.
        if let Some(message) = self.error.filter(|message| !message.is_empty()) {
            return Err(ChatError::ServerReported {
                stage: "chat-reply-error-field",
                message,
            });
        }

        self.response.ok_or(ChatError::MissingResponse {
            stage: "chat-reply-response-field",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrisisLine {
    pub name: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub country: String,
}

impl CrisisLine {
    fn contact(&self) -> Option<&str> {
        self.number.as_deref().or(self.url.as_deref())
    }
}

/// Payload of `GET /crisis-resources`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrisisDirectory {
    #[serde(default)]
    pub crisis_lines: Vec<CrisisLine>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl CrisisDirectory {
    /// Formats the directory as a single bot bubble. Falls back to the built-in
    /// resources text when the server sent nothing usable.
    pub fn to_message_text(&self) -> String {
        if self.crisis_lines.is_empty() && self.resources.is_empty() {
            return CRISIS_RESOURCES.to_string();
        }

        let mut text = String::from("🆘 CRISIS RESOURCES 🆘\n");

        if !self.crisis_lines.is_empty() {
            text.push_str("\nCRISIS LINES:\n");
            for line in &self.crisis_lines {
                text.push_str("• ");
                text.push_str(&line.name);
                if !line.country.is_empty() {
                    text.push_str(&format!(" ({})", line.country));
                }
                if let Some(contact) = line.contact() {
                    text.push_str(&format!(" - {contact}"));
                }
                text.push('\n');
            }
        }

        if !self.resources.is_empty() {
            text.push_str("\nWHAT YOU CAN DO:\n");
            for resource in &self.resources {
                text.push_str(&format!("• {resource}\n"));
            }
        }

        text.push_str("\nRemember: You are not alone, and help is available. 💙");
        text
    }
}

/// Transport seam for the chat widget. The HTTP implementation talks to the
/// support server; tests substitute an in-memory fake.
pub trait ChatClient: Send + Sync {
    fn send_message<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, ChatResult<String>>;
    fn crisis_resources<'a>(&'a self) -> BoxFuture<'a, ChatResult<CrisisDirectory>>;
}

pub struct HttpChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpChatClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ChatResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        ensure!(
            !base_url.is_empty(),
            EmptyBaseUrlSnafu {
                stage: "http-client-new",
            }
        );

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context(BuildClientSnafu {
            stage: "build-http-client",
        })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_chat(&self, request: ChatRequest) -> ChatResult<String> {
        let url = self.endpoint(CHAT_PATH);
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .context(TransportSnafu {
                stage: "send-chat-request",
                url: &url,
            })?;

        let status = response.status();
        let body = response.text().await.context(TransportSnafu {
            stage: "read-chat-response",
            url: &url,
        })?;

        interpret_chat_reply(status, &body)
    }

    async fn get_crisis_resources(&self) -> ChatResult<CrisisDirectory> {
        let url = self.endpoint(CRISIS_RESOURCES_PATH);
        let response = self.http.get(&url).send().await.context(TransportSnafu {
            stage: "send-crisis-resources-request",
            url: &url,
        })?;

        let status = response.status();
        let body = response.text().await.context(TransportSnafu {
            stage: "read-crisis-resources-response",
            url: &url,
        })?;

        ensure_success(status, &body, "crisis-resources-http-status")?;
        serde_json::from_str(&body).context(DecodeSnafu {
            stage: "decode-crisis-resources",
        })
    }
}

impl ChatClient for HttpChatClient {
    fn send_message<'a>(&'a self, request: ChatRequest) -> BoxFuture<'a, ChatResult<String>> {
        Box::pin(self.post_chat(request))
    }

    fn crisis_resources<'a>(&'a self) -> BoxFuture<'a, ChatResult<CrisisDirectory>> {
        Box::pin(self.get_crisis_resources())
    }
}

fn ensure_success(status: StatusCode, body: &str, stage: &'static str) -> ChatResult<()> {
    ensure!(
        status.is_success(),
        StatusSnafu {
            stage,
            status: status.as_u16(),
            body,
        }
    );
    Ok(())
}

/// Maps a raw `/chat` HTTP reply to the bot text or a typed failure.
pub(crate) fn interpret_chat_reply(status: StatusCode, body: &str) -> ChatResult<String> {
    ensure_success(status, body, "chat-http-status")?;
    let reply: ChatReply = serde_json::from_str(body).context(DecodeSnafu {
        stage: "decode-chat-reply",
    })?;
    reply.into_result()
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    use super::*;

    #[test]
    fn success_reply_yields_response_text() {
        let text = interpret_chat_reply(StatusCode::OK, r#"{"response":"Hi there"}"#)
            .expect("response text");
        assert_eq!(text, "Hi there");
    }

    #[test]
    fn error_field_is_a_server_reported_failure() {
        let error = interpret_chat_reply(StatusCode::OK, r#"{"error":"model offline"}"#)
            .expect_err("error field must fail");
        assert_eq!(error.server_message(), Some("model offline"));
    }

    #[test]
    fn empty_error_field_is_ignored() {
        let text = interpret_chat_reply(StatusCode::OK, r#"{"error":"","response":"ok"}"#)
            .expect("empty error is not an error");
        assert_eq!(text, "ok");
    }

    #[test]
    fn non_success_status_wins_over_payload() {
        let error = interpret_chat_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Error generating response: boom"}"#,
        )
        .expect_err("5xx must fail");
        assert!(matches!(error, ChatError::Status { status: 500, .. }));
        assert_eq!(error.server_message(), None);
    }

    #[test]
    fn undecodable_and_empty_payloads_fail() {
        assert!(matches!(
            interpret_chat_reply(StatusCode::OK, "<html>oops</html>"),
            Err(ChatError::Decode { .. })
        ));
        assert!(matches!(
            interpret_chat_reply(StatusCode::OK, "{}"),
            Err(ChatError::MissingResponse { .. })
        ));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            HttpChatClient::new("   ", None),
            Err(ChatError::EmptyBaseUrl { .. })
        ));
    }

    #[test]
    fn crisis_directory_formats_lines_and_resources() {
        let directory: CrisisDirectory = serde_json::from_str(
            r#"{
                "crisis_lines": [
                    {"name": "National Suicide Prevention Lifeline", "number": "988", "country": "US"},
                    {"name": "International Association for Suicide Prevention", "url": "https://www.iasp.info/resources/Crisis_Centres/", "country": "International"}
                ],
                "resources": ["Contact your local mental health services"]
            }"#,
        )
        .expect("directory json");

        let text = directory.to_message_text();
        assert!(text.starts_with("🆘 CRISIS RESOURCES 🆘"));
        assert!(text.contains("• National Suicide Prevention Lifeline (US) - 988"));
        assert!(text.contains(
            "(International) - https://www.iasp.info/resources/Crisis_Centres/"
        ));
        assert!(text.contains("• Contact your local mental health services"));
    }

    #[test]
    fn empty_crisis_directory_uses_builtin_text() {
        assert_eq!(CrisisDirectory::default().to_message_text(), CRISIS_RESOURCES);
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let read = socket.read(&mut chunk).await.expect("read request");
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&buffer).into_owned();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }

        String::from_utf8_lossy(&buffer).into_owned()
    }

    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let address = listener.local_addr().expect("listener address");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket
                .write_all(response.as_bytes())
                .await
                .expect("write response");
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{address}"), handle)
    }

    #[tokio::test]
    async fn http_client_posts_json_message() {
        let (base_url, server) = serve_once("200 OK", r#"{"response":"Hi there"}"#).await;
        let client = HttpChatClient::new(format!("{base_url}/"), None).expect("client");

        let reply = client
            .send_message(ChatRequest::new("Hello"))
            .await
            .expect("reply");
        let request = server.await.expect("server task");

        assert_eq!(reply, "Hi there");
        assert!(request.starts_with("POST /chat HTTP/1.1"));
        assert!(request.contains(r#"{"message":"Hello"}"#));
    }

    #[tokio::test]
    async fn http_client_maps_error_status() {
        let (base_url, server) =
            serve_once("400 BAD REQUEST", r#"{"error":"No message provided"}"#).await;
        let client = HttpChatClient::new(base_url, None).expect("client");

        let error = client
            .send_message(ChatRequest::new("Hello"))
            .await
            .expect_err("400 must fail");
        server.await.expect("server task");

        assert!(matches!(error, ChatError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn http_client_fetches_crisis_directory() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"crisis_lines":[{"name":"Crisis Text Line","number":"Text HOME to 741741","country":"US"}],"resources":[]}"#,
        )
        .await;
        let client = HttpChatClient::new(base_url, None).expect("client");

        let directory = client.crisis_resources().await.expect("directory");
        let request = server.await.expect("server task");

        assert!(request.starts_with("GET /crisis-resources HTTP/1.1"));
        assert_eq!(directory.crisis_lines.len(), 1);
        assert_eq!(directory.crisis_lines[0].contact(), Some("Text HOME to 741741"));
    }

    #[tokio::test]
    async fn http_client_reports_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let address = listener.local_addr().expect("listener address");
        drop(listener);

        let client = HttpChatClient::new(format!("http://{address}"), None).expect("client");
        let error = client
            .send_message(ChatRequest::new("Hello"))
            .await
            .expect_err("closed port must fail");

        assert!(matches!(error, ChatError::Transport { .. }));
    }
}
