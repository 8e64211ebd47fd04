use serde::Deserialize;

/// Subset of `GET /repos/{owner}/{repo}/pulls/{number}` that we need.
/// Every field is optional so that a missing one can be reported by name
/// instead of failing inside serde.
#[derive(Debug, Clone, Deserialize)]
pub struct PullResponse {
    pub head: Option<HeadRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadRef {
    /// `<user>:<branch>`
    pub label: Option<String>,
    /// `null` when the fork the PR came from has been deleted.
    pub repo: Option<HeadRepo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeadRepo {
    pub name: String,
}

/// Where a pull request's proposed commits live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestHead {
    /// Login of the user or org owning the head repository.
    pub user: String,
    pub repo: String,
    pub branch: String,
}

/// The repository and branch that actually get cloned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub clone_url: String,
    pub branch: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_pull_response() {
        let json = r#"{
            "number": 42,
            "head": {
                "label": "contributor:feature-x",
                "ref": "feature-x",
                "repo": { "name": "widgets", "full_name": "contributor/widgets" }
            }
        }"#;
        let response: PullResponse = serde_json::from_str(json).unwrap();
        let head = response.head.unwrap();
        assert_eq!(head.label.as_deref(), Some("contributor:feature-x"));
        assert_eq!(head.repo.unwrap().name, "widgets");
    }

    #[test]
    fn test_deserialize_deleted_fork() {
        let json = r#"{ "head": { "label": "ghost:patch-1", "repo": null } }"#;
        let response: PullResponse = serde_json::from_str(json).unwrap();
        assert!(response.head.unwrap().repo.is_none());
    }
}
