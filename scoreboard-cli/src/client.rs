/// HTTP client for a running scoreboard server.
use reqwest::Client;
use scoreboard_core::{LeaderboardSummary, RankedEntry, Standing};
use serde::de::DeserializeOwned;

use crate::server::{RemoveResponse, SubmitResponse};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
}

pub struct ScoreboardClient {
    base_url: String,
    client: Client,
}

impl ScoreboardClient {
    pub fn new(base_url: &str) -> Self {
        ScoreboardClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn submit(
        &self,
        name: &str,
        score: i64,
        time: Option<&str>,
    ) -> Result<SubmitResponse, ClientError> {
        let score = score.to_string();
        let mut query = vec![("name", name), ("score", score.as_str())];
        if let Some(time) = time {
            query.push(("time", time));
        }
        self.get("/submit", &query).await
    }

    pub async fn page(&self, page: i64, size: Option<usize>) -> Result<Vec<RankedEntry>, ClientError> {
        let page = page.to_string();
        let size = size.map(|s| s.to_string());
        let mut query = vec![("page", page.as_str())];
        if let Some(ref size) = size {
            query.push(("size", size.as_str()));
        }
        self.get("/leaderboard", &query).await
    }

    pub async fn top(&self, limit: Option<usize>) -> Result<Vec<RankedEntry>, ClientError> {
        let limit = limit.map(|l| l.to_string());
        let query: Vec<(&str, &str)> = limit.iter().map(|l| ("limit", l.as_str())).collect();
        self.get("/top", &query).await
    }

    pub async fn remove(&self, name: &str) -> Result<RemoveResponse, ClientError> {
        self.get("/remove", &[("name", name)]).await
    }

    /// `Ok(None)` when the server has no entry for that name.
    pub async fn standing(&self, name: &str) -> Result<Option<Standing>, ClientError> {
        match self.get("/standing", &[("name", name)]).await {
            Ok(standing) => Ok(Some(standing)),
            Err(ClientError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn summary(&self) -> Result<LeaderboardSummary, ClientError> {
        self.get("/summary", &[]).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self.client.get(&url).query(query).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let body = body.chars().take(200).collect();
            return Err(ClientError::Status { status, body });
        }

        Ok(resp.json().await?)
    }
}
