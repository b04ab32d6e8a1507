use std::io::{BufRead, BufReader, Lines};
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{BackendError, ChatBackend, ChatRequest, FragmentStream};

pub const DEFAULT_HOST: &str = "http://localhost:11434";
const DEFAULT_PORT: u16 = 11434;

/// Blocking client for a local Ollama server's `/api/chat` endpoint.
pub struct OllamaClient {
    client: Client,
    host: String,
}

impl OllamaClient {
    pub fn new(host: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            client,
            host: normalize_host(host),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.host)
    }
}

impl ChatBackend for OllamaClient {
    fn chat(&self, request: &ChatRequest) -> Result<FragmentStream<'_>, BackendError> {
        debug!(
            url = %self.chat_url(),
            model = %request.model,
            messages = request.messages.len(),
            "sending chat request"
        );

        let response = self.client.post(self.chat_url()).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = serde_json::from_str::<Chunk>(&body)
                .ok()
                .and_then(|chunk| chunk.error)
                .unwrap_or(body);
            return Err(BackendError::Remote(format!("{}: {}", status, detail.trim())));
        }

        Ok(Box::new(OllamaStream::new(BufReader::new(response))))
    }
}

/// Reads the newline-delimited JSON body one chunk at a time.
struct OllamaStream<R> {
    lines: Lines<R>,
    finished: bool,
}

impl<R: BufRead> OllamaStream<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for OllamaStream<R> {
    type Item = Result<String, BackendError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(BackendError::Unavailable(e.to_string())));
                }
                None => {
                    self.finished = true;
                    return Some(Err(BackendError::MalformedStream(
                        "stream ended before completion".to_string(),
                    )));
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match parse_chunk(&line) {
                Ok(Fragment::Text(text)) => return Some(Ok(text)),
                Ok(Fragment::Final(text)) => {
                    self.finished = true;
                    if !text.is_empty() {
                        return Some(Ok(text));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct Chunk {
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, PartialEq)]
enum Fragment {
    Text(String),
    Final(String),
}

fn parse_chunk(line: &str) -> Result<Fragment, BackendError> {
    let chunk: Chunk = serde_json::from_str(line).map_err(|e| {
        warn!(line, "unparsable stream chunk");
        BackendError::MalformedStream(e.to_string())
    })?;

    if let Some(error) = chunk.error {
        return Err(BackendError::Remote(error));
    }

    let text = chunk.message.map(|m| m.content).unwrap_or_default();
    if chunk.done {
        Ok(Fragment::Final(text))
    } else {
        Ok(Fragment::Text(text))
    }
}

/// Accepts `OLLAMA_HOST`-style values: `host`, `host:port` or a full URL.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return DEFAULT_HOST.to_string();
    }

    let (scheme, rest) = match host.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", host),
    };

    let authority = rest.split('/').next().unwrap_or(rest);
    if authority.contains(':') {
        format!("{}://{}", scheme, rest)
    } else {
        let path = &rest[authority.len()..];
        format!("{}://{}:{}{}", scheme, authority, DEFAULT_PORT, path)
    }
}
