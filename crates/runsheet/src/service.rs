//! The external layout reader boundary.
//!
//! A [`LayoutReader`] takes the raw bytes of a scanned run sheet and answers
//! with text that should be a JSON array of `{type, content}` records. The
//! answer is untrusted; decoding and repairing it is
//! [`runsheet_import::normalize`]'s job, not the reader's.
//!
//! [`GeminiReader`] talks to the Generative Language API over blocking HTTP.
//! The call is the only long-running operation of a session and cannot be
//! cancelled once started.

use std::env;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ServiceConfig;

/// The instructions sent along with every document.
pub const EXTRACTION_PROMPT: &str = r#"You are a Run Sheet Parser. I will provide a PDF image/document of a stage run sheet.
Convert the visible content into a JSON array of "Segments" matching this TypeScript structure:

type SegmentType = 'HEADER' | 'NOTE' | 'TIME_BOX' | 'CUE' | 'SPEAKER' | 'DIAGRAM';

interface Segment {
  type: SegmentType;
  content: {
    // For HEADER (Top of page, titles)
    title?: string;
    subtitle?: string;
    date?: string;

    // For NOTE (General instructions) or SPEAKER (Spoken text) or TIME_BOX (Events with time)
    text?: string;

    // For TIME_BOX
    time?: string; // e.g. "9:30"

    // For CUE (Rows with Camera, Media, Track info)
    cueLabel?: string; // e.g., "Camera 1", "Media"
    cueId?: string;    // e.g., "Main Speaker", "Track 001"
    cueDesc?: string;  // e.g., "Invites audience", "Theme Video"
    isMedia?: boolean; // true if it is a Media/Video/Track cue, false for Camera/Lighting

    // For DIAGRAM
    // Just return an empty array for stageItems, I cannot parse coordinates yet.
    stageItems?: [];
  }
}

Parsing Rules:
1. Identify the main Convention Title/Theme at the top as a HEADER.
2. Identify items starting with a time (e.g. "9:30") as TIME_BOX. The description goes in 'text'.
3. Identify tabular rows with "Camera", "Media", "Track", "Preset" as CUE segments.
   - 'cueLabel' is the first column (e.g. "Camera 1 Preset 1").
   - 'cueId' is the middle column (e.g. "Main Speaker").
   - 'cueDesc' is the right column (e.g. "Invites audience").
4. Identify blocks of text instructions as NOTE.
5. Identify specific script lines or "SPEAKER" blocks as SPEAKER.
6. If you see a diagram/image of a stage, insert a NOTE segment with text "[Stage Diagram detected - Please add manually]".
7. Return ONLY the JSON array. Do not wrap in markdown code blocks.
"#;

/// Errors raised while calling the layout reader.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API key is missing: set the `{0}` environment variable")]
    MissingCredential(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service answered with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Reads the layout of a document.
pub trait LayoutReader {
    /// Sends `bytes` (of MIME type `mime_type`) to the reader and returns its
    /// raw text answer.
    ///
    /// An empty answer is returned as an empty string; it is up to the
    /// caller to reject it.
    fn read_layout(&self, bytes: &[u8], mime_type: &str) -> Result<String, ServiceError>;
}

impl<R: LayoutReader + ?Sized> LayoutReader for &R {
    fn read_layout(&self, bytes: &[u8], mime_type: &str) -> Result<String, ServiceError> {
        (**self).read_layout(bytes, mime_type)
    }
}

/// A [`LayoutReader`] backed by the Generative Language `generateContent` API.
#[derive(Debug)]
pub struct GeminiReader {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiReader {
    /// Creates a reader from `config`, reading the API key from the
    /// environment variable it names.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MissingCredential`] if the variable is unset
    /// or empty, and [`ServiceError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let api_key = env::var(config.api_key_env())
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ServiceError::MissingCredential(config.api_key_env().to_string()))?;
        Self::new(config, api_key)
    }

    /// Creates a reader from `config` with an explicit API key.
    pub fn new(config: &ServiceConfig, api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(concat!("runsheet/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint().trim_end_matches('/').to_string(),
            model: config.model().to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl LayoutReader for GeminiReader {
    fn read_layout(&self, bytes: &[u8], mime_type: &str) -> Result<String, ServiceError> {
        let request = GenerateRequest::new(bytes, mime_type);

        info!(model:% = self.model, mime_type = mime_type, bytes = bytes.len(); "Sending document to layout reader");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.json::<GenerateResponse>()?.into_text();
        debug!(chars = text.len(); "Layout reader answered");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn new(bytes: &[u8], mime_type: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type,
                            data: STANDARD.encode(bytes),
                        },
                    },
                    RequestPart::Text {
                        text: EXTRACTION_PROMPT,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text { text: &'static str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
