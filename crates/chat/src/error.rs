use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChatError {
    #[snafu(display("failed to build http client on `{stage}`: {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("chat server base url is empty"))]
    EmptyBaseUrl { stage: &'static str },
    #[snafu(display("request to {url} failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        url: String,
        source: reqwest::Error,
    },
    #[snafu(display("chat server returned status {status}: {body}"))]
    Status {
        stage: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode chat server payload on `{stage}`: {source}"))]
    Decode {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("chat server reported an error: {message}"))]
    ServerReported {
        stage: &'static str,
        message: String,
    },
    #[snafu(display("chat server reply carried neither a response nor an error"))]
    MissingResponse { stage: &'static str },
}

impl ChatError {
    /// Server-side failures are distinguishable from transport failures even though
    /// the default display policy collapses both into the same apology.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ServerReported { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
