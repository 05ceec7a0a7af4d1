//! # GitHub Gist Uploader
//!
//! Publishes text as a private gist through the GitHub REST API and returns its URL.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::config::GistConfig;
use crate::domain::traits::Gist;

const FILE_NAME: &str = "commands.txt";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct CreateGist<'a> {
    description: &'a str,
    public: bool,
    files: HashMap<&'a str, GistFile<'a>>,
}

#[derive(Debug, Serialize)]
struct GistFile<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    html_url: String,
}

pub struct GithubGist {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl GithubGist {
    pub fn new(config: &GistConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("gavel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    async fn create(&self, description: &str, content: &str) -> Result<String> {
        let body = create_body(description, content);
        let response = self
            .client
            .post(format!("{}/gists", self.api_url))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .context("Gist request failed")?
            .error_for_status()
            .context("Gist API returned an error")?;
        let gist: GistResponse = response.json().await.context("Malformed gist response")?;
        Ok(gist.html_url)
    }
}

fn create_body<'a>(description: &'a str, content: &'a str) -> CreateGist<'a> {
    CreateGist {
        description,
        public: false,
        files: HashMap::from([(FILE_NAME, GistFile { content })]),
    }
}

#[async_trait]
impl Gist for GithubGist {
    async fn upload(&self, description: &str, content: &str) -> Result<String, String> {
        self.create(description, content)
            .await
            .map_err(|e| format!("{e:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(create_body("Learned commands", "?a: b")).unwrap();
        assert_eq!(body["description"], "Learned commands");
        assert_eq!(body["public"], false);
        assert_eq!(body["files"]["commands.txt"]["content"], "?a: b");
    }

    #[test]
    fn test_api_url_is_normalized() {
        let gist = GithubGist::new(&GistConfig {
            token: "t".to_string(),
            api_url: "https://api.github.com/".to_string(),
        })
        .unwrap();
        assert_eq!(gist.api_url, "https://api.github.com");
    }

    #[test]
    fn test_response_parsing() {
        let response: GistResponse = serde_json::from_str(
            r#"{"id":"1","html_url":"https://gist.github.com/1","files":{}}"#,
        )
        .unwrap();
        assert_eq!(response.html_url, "https://gist.github.com/1");
    }
}
