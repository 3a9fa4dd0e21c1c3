use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::{Candidate, CandidatePreview, Weights};

const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Base origin of the matching backend. Overridable per-run via --api-url;
/// otherwise taken from the environment.
pub fn api_base_url() -> String {
    env::var("SCOUT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

// --- Service traits ---

/// The recommendation endpoint pair. Implemented over HTTP in production,
/// mocked in tests.
pub trait MatchService {
    fn basic(&self, description: &str, top_k: u32) -> Result<Vec<Candidate>>;
    fn weighted(&self, description: &str, weights: &Weights, top_k: u32) -> Result<Vec<Candidate>>;
}

/// The conversational assistant endpoint.
pub trait ChatService {
    fn send(&self, message: &str) -> Result<ChatReply>;
}

// --- Wire shapes ---

#[derive(Debug, Serialize)]
pub struct RecommendRequest<'a> {
    pub job_description: &'a str,
    pub top_k: u32,
}

#[derive(Debug, Serialize)]
pub struct WeightedRecommendRequest<'a> {
    pub job_description: &'a str,
    pub top_k: u32,
    pub weights: &'a Weights,
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    results: Vec<Candidate>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub candidates: Vec<CandidatePreview>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Pull the most specific failure message out of a non-2xx body. The
/// recommend endpoints report `detail`, the chat endpoint `error`.
fn service_error(body: &str, fallback: &str) -> anyhow::Error {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .detail
        .or(parsed.error)
        .unwrap_or_else(|| fallback.to_string());
    anyhow!("{}", message)
}

// --- HTTP clients ---

pub struct HttpMatchClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpMatchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn fetch<T: Serialize>(&self, path: &str, body: &T) -> Result<Vec<Candidate>> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .context("Failed to reach the matching service")?;

        if !response.status().is_success() {
            let text = response.text().unwrap_or_default();
            return Err(service_error(
                &text,
                "Failed to fetch recommendations. Please try again.",
            ));
        }

        let parsed: RecommendResponse = response
            .json()
            .context("Failed to parse the matching service response")?;
        Ok(parsed.results)
    }
}

impl MatchService for HttpMatchClient {
    fn basic(&self, description: &str, top_k: u32) -> Result<Vec<Candidate>> {
        self.fetch(
            "/recommend",
            &RecommendRequest {
                job_description: description,
                top_k,
            },
        )
    }

    fn weighted(&self, description: &str, weights: &Weights, top_k: u32) -> Result<Vec<Candidate>> {
        self.fetch(
            "/recommend/weighted",
            &WeightedRecommendRequest {
                job_description: description,
                top_k,
                weights,
            },
        )
    }
}

pub struct HttpChatClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl ChatService for HttpChatClient {
    fn send(&self, message: &str) -> Result<ChatReply> {
        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatRequest { message })
            .send()
            .context("Failed to reach the assistant service")?;

        if !response.status().is_success() {
            let text = response.text().unwrap_or_default();
            return Err(service_error(&text, "Failed to get AI response"));
        }

        response
            .json()
            .context("Failed to parse the assistant response")
    }
}
