pub mod types;

pub use types::{PullRequestHead, PullResponse, ResolvedSource};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::target::TargetRef;

/// Branch cloned when reviewing a plain repository.
pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Pull request #{0} has no head in the API response")]
    MissingHead(u64),

    #[error("The head repository of pull request #{0} no longer exists")]
    HeadRepositoryGone(u64),

    #[error("Unexpected head label {0:?}, expected <user>:<branch>")]
    MalformedLabel(String),
}

/// Anything that can tell us where a pull request's head lives.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn head(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestHead, PrError>;
}

/// Reads pull request metadata from the GitHub REST API.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            token,
        }
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    /// One GET, no retry. A token is forwarded only when one is configured.
    #[instrument(skip(self), fields(api = %self.api_url))]
    async fn head(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestHead, PrError> {
        let url = format!("{}/repos/{}/{}/pulls/{}", self.api_url, owner, repo, number);

        let mut request = self
            .http
            .get(&url)
            .header("User-Agent", "ric")
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!("fetching PR metadata from GitHub API");
        let response = request.send().await?.error_for_status()?;
        let metadata = response.json::<PullResponse>().await?;

        let head = metadata.into_head(number)?;
        debug!(user = %head.user, repo = %head.repo, branch = %head.branch, "resolved PR head");
        Ok(head)
    }
}

impl PullResponse {
    /// Validate the decoded payload and split the head label.
    pub fn into_head(self, number: u64) -> Result<PullRequestHead, PrError> {
        let head = self.head.ok_or(PrError::MissingHead(number))?;
        let label = head.label.ok_or(PrError::MissingHead(number))?;
        let repo = head.repo.ok_or(PrError::HeadRepositoryGone(number))?;
        let (user, branch) = parse_label(&label)?;

        Ok(PullRequestHead {
            user: user.to_string(),
            repo: repo.name,
            branch: branch.to_string(),
        })
    }
}

/// Split a `<user>:<branch>` label on its first colon.
pub fn parse_label(label: &str) -> Result<(&str, &str), PrError> {
    label
        .split_once(':')
        .ok_or_else(|| PrError::MalformedLabel(label.to_string()))
}

impl PullRequestHead {
    pub fn resolve(&self, web_url: &str) -> ResolvedSource {
        ResolvedSource {
            clone_url: format!("{}/{}/{}", web_url, self.user, self.repo),
            branch: self.branch.clone(),
        }
    }
}

impl ResolvedSource {
    /// The target repository itself, on its default branch.
    pub fn default_for(target: &TargetRef, web_url: &str) -> Self {
        Self {
            clone_url: format!("{}/{}/{}", web_url, target.owner, target.repo),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::parse_target;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn head_json(label: &str, repo: &str) -> serde_json::Value {
        serde_json::json!({
            "number": 42,
            "head": { "label": label, "ref": "feature-x", "repo": { "name": repo } }
        })
    }

    #[test]
    fn test_resolve_fork_head() {
        let response: PullResponse =
            serde_json::from_value(head_json("contributor:feature-x", "widgets")).unwrap();
        let source = response.into_head(42).unwrap().resolve("https://github.com");
        assert_eq!(source.clone_url, "https://github.com/contributor/widgets");
        assert_eq!(source.branch, "feature-x");
    }

    #[test]
    fn test_default_source_for_repository() {
        let target = parse_target("https://github.com/acme/widgets").unwrap();
        let source = ResolvedSource::default_for(&target, "https://github.com");
        assert_eq!(source.clone_url, "https://github.com/acme/widgets");
        assert_eq!(source.branch, "master");
    }

    #[test]
    fn test_parse_label_splits_on_first_colon() {
        assert_eq!(parse_label("alice:fix/bug").unwrap(), ("alice", "fix/bug"));
        assert_eq!(parse_label("alice:a:b").unwrap(), ("alice", "a:b"));
        assert!(matches!(parse_label("no-colon"), Err(PrError::MalformedLabel(_))));
    }

    #[test]
    fn test_into_head_reports_missing_fields() {
        let missing_head: PullResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(missing_head.into_head(1), Err(PrError::MissingHead(1))));

        let missing_label: PullResponse =
            serde_json::from_str(r#"{ "head": { "repo": { "name": "w" } } }"#).unwrap();
        assert!(matches!(missing_label.into_head(2), Err(PrError::MissingHead(2))));

        let deleted_fork: PullResponse =
            serde_json::from_str(r#"{ "head": { "label": "a:b", "repo": null } }"#).unwrap();
        assert!(matches!(
            deleted_fork.into_head(3),
            Err(PrError::HeadRepositoryGone(3))
        ));
    }

    #[tokio::test]
    async fn test_github_client_fetches_head() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/pulls/42"))
            .and(header("User-Agent", "ric"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(head_json("contributor:feature-x", "widgets")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), None);
        let head = client.head("acme", "widgets", 42).await.unwrap();
        assert_eq!(
            head,
            PullRequestHead {
                user: "contributor".to_string(),
                repo: "widgets".to_string(),
                branch: "feature-x".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_github_client_sends_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/pulls/7"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(head_json("acme:topic", "widgets")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), Some("secret".to_string()));
        let head = client.head("acme", "widgets", 7).await.unwrap();
        assert_eq!(head.branch, "topic");
    }

    #[tokio::test]
    async fn test_github_client_surfaces_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = GitHubClient::new(server.uri(), None);
        let err = client.head("acme", "widgets", 9).await.unwrap_err();
        assert!(matches!(err, PrError::ApiRequest(_)));
    }
}
