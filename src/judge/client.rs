//! HTTP client for the upstream judge

use std::time::Duration;

use reqwest::multipart::{Form, Part};

use crate::config::JudgeConfig;

/// Failure to obtain any response from the judge
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("failed to build judge client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("judge unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
}

/// One code submission as the judge expects it
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub contest: String,
    /// 1-based task number
    pub task: i32,
    pub language: String,
    pub file_extension: String,
    pub code: String,
}

impl JudgeRequest {
    fn into_form(self) -> Form {
        let file_name = format!("code.{}", self.file_extension);
        Form::new()
            .text("contest", self.contest)
            .text("task", self.task.to_string())
            .text("language", self.language)
            .part("code", Part::text(self.code).file_name(file_name))
    }
}

/// Thin wrapper over a pooled `reqwest` client
#[derive(Debug, Clone)]
pub struct JudgeClient {
    http: reqwest::Client,
    url: String,
}

impl JudgeClient {
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeError> {
        // Only the connect phase is bounded; a judging stream may legitimately run long
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(JudgeError::Build)?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a submission and return the judge's response as soon as its headers arrive
    ///
    /// Any status is returned as-is; only transport failures are errors.
    pub async fn submit(&self, request: JudgeRequest) -> Result<reqwest::Response, JudgeError> {
        tracing::debug!(
            url = %self.url,
            contest = %request.contest,
            task = request.task,
            language = %request.language,
            "Dispatching submission to judge"
        );

        self.http
            .post(&self.url)
            .multipart(request.into_form())
            .send()
            .await
            .map_err(JudgeError::Unreachable)
    }
}
