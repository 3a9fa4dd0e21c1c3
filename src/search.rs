use std::time::{Duration, Instant};

use anyhow::Result;

use crate::api::MatchService;
use crate::models::{Candidate, JobRequest, TopK, Weights};

// --- Feedback notices ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient feedback raised once per submission cycle; auto-dismissed by
/// the renderer after its TTL.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    raised_at: Instant,
}

impl Notice {
    fn success(text: String) -> Self {
        Self {
            kind: NoticeKind::Success,
            text,
            raised_at: Instant::now(),
        }
    }

    fn error(text: String) -> Self {
        Self {
            kind: NoticeKind::Error,
            text,
            raised_at: Instant::now(),
        }
    }

    pub fn ttl(&self) -> Duration {
        match self.kind {
            NoticeKind::Success => Duration::from_secs(4),
            NoticeKind::Error => Duration::from_secs(5),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.raised_at.elapsed() >= self.ttl()
    }
}

// --- Submission controller ---

/// Token identifying one issued request. A completion is applied only when
/// its token is still the latest, so a slow earlier response can never
/// overwrite a newer result set.
pub type RequestToken = u64;

/// Draft state plus the at-most-one-in-flight submission discipline for
/// the recommendation pipeline. Holds the latest completed result set; the
/// ranking engine reads it, never the other way around.
#[derive(Default)]
pub struct SearchController {
    pub description: String,
    pub top_k: TopK,
    pub use_weighted: bool,
    pub weights: Weights,
    loading: bool,
    latest_token: RequestToken,
    results: Vec<Candidate>,
    current_request: Option<JobRequest>,
    notice: Option<Notice>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results(&self) -> &[Candidate] {
        &self.results
    }

    /// The request the current results answer, kept for display context.
    pub fn current_request(&self) -> Option<&JobRequest> {
        self.current_request.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| !n.is_expired())
    }

    /// Validate the draft and open a request cycle. Empty descriptions and
    /// submissions while loading are dropped, not queued.
    pub fn begin(&mut self) -> Option<RequestToken> {
        if self.description.trim().is_empty() || self.loading {
            return None;
        }

        let request = if self.use_weighted {
            JobRequest::weighted(self.description.trim(), self.top_k, self.weights)
        } else {
            JobRequest::basic(self.description.trim(), self.top_k)
        };

        self.latest_token += 1;
        self.loading = true;
        self.current_request = Some(request);
        Some(self.latest_token)
    }

    /// Apply a completed request. A stale token means a newer request has
    /// been issued since; the outcome is discarded untouched.
    pub fn complete(&mut self, token: RequestToken, outcome: Result<Vec<Candidate>>) {
        if token != self.latest_token {
            return;
        }
        self.loading = false;

        match outcome {
            Ok(results) => {
                self.notice = Some(Notice::success(format!(
                    "Found {} talent matches!",
                    results.len()
                )));
                self.results = results;
            }
            Err(err) => {
                // Never show stale data next to an error notice.
                self.results.clear();
                self.notice = Some(Notice::error(err.to_string()));
            }
        }
    }

    /// Blocking submit: one request cycle against the given service.
    /// Returns false when the draft was rejected before any network call.
    pub fn submit(&mut self, service: &dyn MatchService) -> bool {
        let Some(token) = self.begin() else {
            return false;
        };
        // begin() always sets current_request alongside the token.
        let Some(request) = self.current_request.clone() else {
            return false;
        };

        let outcome = match &request.weights {
            Some(weights) => {
                service.weighted(&request.description, weights, request.top_k.as_u32())
            }
            None => service.basic(&request.description, request.top_k.as_u32()),
        };
        self.complete(token, outcome);
        true
    }
}
