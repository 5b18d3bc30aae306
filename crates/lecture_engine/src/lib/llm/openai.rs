use std::collections::VecDeque;

use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use itertools::Itertools;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    error::TaskError,
    llm::{
        clip_for_prompt, ConceptExtraction, ConceptExtractor, NotesGenerator, NotesStream,
        PodcastScriptGenerator, StudyMaterialsGenerator,
    },
    types::{Concept, PodcastScript, StudyMaterials, TranscriptBundle},
};

/// Chat-completions client shared by every generation task.
///
/// Constructed once at startup and cloned into each task slot; clones share
/// the underlying connection pool.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<OpenAIError> for TaskError {
    fn from(e: OpenAIError) -> Self {
        match e {
            OpenAIError::Request(e) => TaskError::Http(e),
            OpenAIError::Api { status, message } => TaskError::Api { status, message },
            OpenAIError::Malformed(message) => TaskError::Malformed(message),
        }
    }
}

const NOTES_PROMPT: &str = include_str!("./prompts/notes.txt");
const CONCEPTS_PROMPT: &str = include_str!("./prompts/concepts.txt");
const STUDY_PROMPT: &str = include_str!("./prompts/study_materials.txt");
const PODCAST_PROMPT: &str = include_str!("./prompts/podcast.txt");

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub async fn send_completion_request(
        &self,
        model_name: impl Into<String>,
        system_prompt: &str,
        user_content: impl Into<String>,
        json_mode: bool,
    ) -> Result<CompletionResponse, OpenAIError> {
        let mut body = serde_json::json!({
            "model": model_name.into(),
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content.into() }
            ]
        });
        if json_mode {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }

    /// JSON-mode completion parsed straight into `T`.
    pub async fn send_json_request<T: DeserializeOwned>(
        &self,
        model_name: impl Into<String>,
        system_prompt: &str,
        user_content: impl Into<String>,
    ) -> Result<T, OpenAIError> {
        let response = self
            .send_completion_request(model_name, system_prompt, user_content, true)
            .await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| OpenAIError::Malformed("no content in response".into()))?;

        serde_json::from_str(&content).map_err(|e| OpenAIError::Malformed(e.to_string()))
    }

    /// Streaming completion: one item per non-empty content delta, in arrival
    /// order. Chunk boundaries are provider-defined; concatenation yields the
    /// full text.
    pub async fn stream_completion_request(
        &self,
        model_name: impl Into<String>,
        system_prompt: &str,
        user_content: impl Into<String>,
    ) -> Result<BoxStream<'static, Result<String, OpenAIError>>, OpenAIError> {
        let body = serde_json::json!({
            "model": model_name.into(),
            "stream": true,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_content.into() }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(OpenAIError::Api { status, message });
        }

        let bytes = resp.bytes_stream().map(|r| r.map(|b| b.to_vec())).boxed();
        let state = SseState {
            bytes,
            buf: Vec::new(),
            pending: VecDeque::new(),
            done: false,
        };

        let stream = futures::stream::try_unfold(state, |mut state| async move {
            loop {
                if let Some(text) = state.pending.pop_front() {
                    return Ok(Some((text, state)));
                }
                if state.done {
                    return Ok(None);
                }
                match state.bytes.next().await {
                    None => state.done = true,
                    Some(Err(e)) => return Err(OpenAIError::Request(e)),
                    Some(Ok(chunk)) => {
                        state.buf.extend_from_slice(&chunk);
                        for line in drain_complete_lines(&mut state.buf) {
                            match parse_sse_line(line.trim()) {
                                SseLine::Delta(text) => state.pending.push_back(text),
                                SseLine::Done => state.done = true,
                                SseLine::Ignore => {}
                            }
                        }
                    }
                }
            }
        });

        Ok(stream.boxed())
    }
}

struct SseState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buf: Vec<u8>,
    pending: VecDeque<String>,
    done: bool,
}

/// Splits complete lines out of the byte buffer. HTTP chunk boundaries are
/// arbitrary, so a trailing partial line (including a partial UTF-8 sequence)
/// stays buffered until more bytes arrive; only whole lines are decoded.
fn drain_complete_lines(buf: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(newline) = buf.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buf.drain(..=newline).collect();
        lines.push(String::from_utf8_lossy(&line).into_owned());
    }
    lines
}

#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Ignore,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Ignore;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return SseLine::Done;
    }
    let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
        // keep-alives and unknown payloads are skipped
        return SseLine::Ignore;
    };
    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) if !text.is_empty() => SseLine::Delta(text),
        _ => SseLine::Ignore,
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: String,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: CompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

impl NotesGenerator for OpenAIClient {
    const NOTES_MODEL: &'static str = "gpt-4o-mini";

    async fn generate_notes(&self, bundle: &TranscriptBundle) -> Result<NotesStream, TaskError> {
        let user_content = format!(
            "Video title: {}\n\nTranscript:\n{}",
            bundle.title,
            clip_for_prompt(&bundle.transcript)
        );

        let stream = self
            .stream_completion_request(Self::NOTES_MODEL, NOTES_PROMPT, user_content)
            .await?;

        Ok(stream.map_err(TaskError::from).boxed())
    }
}

impl ConceptExtractor for OpenAIClient {
    const CONCEPTS_MODEL: &'static str = "gpt-4o-mini";

    async fn extract_concepts(
        &self,
        bundle: &TranscriptBundle,
    ) -> Result<ConceptExtraction, TaskError> {
        let user_content = format!(
            "Video title: {}\n\nTranscript:\n{}",
            bundle.title,
            clip_for_prompt(&bundle.transcript)
        );

        let mut extraction: ConceptExtraction = self
            .send_json_request(Self::CONCEPTS_MODEL, CONCEPTS_PROMPT, user_content)
            .await?;

        extraction.content_type.confidence = extraction.content_type.confidence.clamp(0.0, 1.0);
        extraction.concepts = extraction
            .concepts
            .into_iter()
            .unique_by(|c| c.name.to_lowercase())
            .map(|mut c| {
                c.confidence_score = c.confidence_score.clamp(0.0, 1.0);
                c
            })
            .collect();

        tracing::info!(
            count = extraction.concepts.len(),
            content_type = ?extraction.content_type.primary_type,
            "Concepts extracted"
        );

        Ok(extraction)
    }
}

impl StudyMaterialsGenerator for OpenAIClient {
    const STUDY_MODEL: &'static str = "gpt-4o-mini";

    async fn generate_study_materials(
        &self,
        concepts: &[Concept],
        transcript: Option<&str>,
    ) -> Result<StudyMaterials, TaskError> {
        let concept_json =
            serde_json::to_string_pretty(concepts).map_err(|e| TaskError::Malformed(e.to_string()))?;

        let mut user_content = format!("Key concepts:\n{concept_json}");
        if let Some(transcript) = transcript {
            user_content.push_str("\n\nTranscript excerpt:\n");
            user_content.push_str(clip_for_prompt(transcript));
        }

        let mut materials: StudyMaterials = self
            .send_json_request(Self::STUDY_MODEL, STUDY_PROMPT, user_content)
            .await?;

        let before = materials.quiz_questions.len();
        materials
            .quiz_questions
            .retain(|q| q.options.len() == 4 && q.correct_index < q.options.len());
        if materials.quiz_questions.len() < before {
            tracing::warn!(
                dropped = before - materials.quiz_questions.len(),
                "Dropped malformed quiz questions"
            );
        }

        Ok(materials)
    }
}

impl PodcastScriptGenerator for OpenAIClient {
    const PODCAST_MODEL: &'static str = "gpt-4o-mini";

    async fn generate_podcast(
        &self,
        concepts: &[Concept],
        notes: Option<&str>,
        video_title: &str,
    ) -> Result<PodcastScript, TaskError> {
        let concept_json =
            serde_json::to_string_pretty(concepts).map_err(|e| TaskError::Malformed(e.to_string()))?;

        let mut user_content = format!("Episode topic: {video_title}\n\nKey concepts:\n{concept_json}");
        if let Some(notes) = notes {
            user_content.push_str("\n\nLecture notes for context:\n");
            user_content.push_str(clip_for_prompt(notes));
        }

        let script: PodcastScript = self
            .send_json_request(Self::PODCAST_MODEL, PODCAST_PROMPT, user_content)
            .await?;

        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delta_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Delta("Hello".into()));
    }

    #[test]
    fn test_parse_done_line() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
    }

    #[test]
    fn test_empty_delta_is_ignored() {
        let line = r#"data: {"choices":[{"delta":{}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Ignore);
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        assert_eq!(parse_sse_line(""), SseLine::Ignore);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Ignore);
        assert_eq!(parse_sse_line("event: message"), SseLine::Ignore);
    }

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut buf = b"data: {\"choices\":".to_vec();
        assert!(drain_complete_lines(&mut buf).is_empty());

        buf.extend_from_slice(b"[{\"delta\":{\"content\":\"Hi\"}}]}\n");
        let lines = drain_complete_lines(&mut buf);
        assert_eq!(lines.len(), 1);
        assert_eq!(parse_sse_line(lines[0].trim()), SseLine::Delta("Hi".into()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let payload = "data: {\"choices\":[{\"delta\":{\"content\":\"café\"}}]}\n".as_bytes();
        // cut inside the two-byte 'é'
        let cut = payload.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut buf = Vec::new();
        buf.extend_from_slice(&payload[..cut]);
        assert!(drain_complete_lines(&mut buf).is_empty());

        buf.extend_from_slice(&payload[cut..]);
        let lines = drain_complete_lines(&mut buf);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            parse_sse_line(lines[0].trim()),
            SseLine::Delta("café".into())
        );
    }
}
