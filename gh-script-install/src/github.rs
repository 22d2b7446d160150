use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

/// Environment variable holding the token the fetch tool uses for private repositories
pub const TOKEN_ENV_VAR: &str = "GITHUB_OAUTH_TOKEN";

/// Checks whether a repository can be read without authentication
pub struct RepoAccessChecker {
    http_client: Client,
}

impl RepoAccessChecker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("gh-script-install")
            .timeout(timeout)
            .build()?;

        Ok(Self::with_client(http_client))
    }

    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }

    /// GET the repository URL once. Any network error or non-2xx status
    /// counts as "not public".
    pub async fn is_public(&self, repo: &str) -> bool {
        let result = self
            .http_client
            .get(repo)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(response) => {
                tracing::info!("{} is publicly accessible ({})", repo, response.status());
                true
            }
            Err(e) => {
                tracing::info!("{} is not publicly accessible: {}", repo, e);
                false
            }
        }
    }
}

/// Whether the token variable is set to a non-empty value
pub fn token_present() -> bool {
    std::env::var_os(TOKEN_ENV_VAR).is_some_and(|value| !value.is_empty())
}
