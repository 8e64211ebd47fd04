pub mod types;

pub use types::{CloneDepth, PathParts, RunOptions, TargetRef};

use reqwest::Url;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Malformed URL {url:?}: {source}")]
    MalformedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Parse the user-supplied URL and classify it as a repository or pull request.
///
/// Only the URL syntax is validated. The host is not checked, and a path that
/// doesn't name an owner and repository yields empty identifiers, which fail
/// later when cloning.
pub fn parse_target(raw: &str) -> Result<TargetRef, TargetError> {
    let url = Url::parse(raw).map_err(|source| TargetError::MalformedUrl {
        url: raw.to_string(),
        source,
    })?;
    let path = url.path();
    let parts = classify(path);

    Ok(TargetRef {
        raw_url: raw.to_string(),
        is_pull_request: is_pull_request(path),
        owner: parts.owner,
        repo: parts.repo,
        pr_number: parts.pr_number,
    })
}

/// True when `/pull/<digits>` appears anywhere in the path.
pub fn is_pull_request(path: &str) -> bool {
    path.match_indices("/pull/").any(|(idx, needle)| {
        path[idx + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    })
}

/// Split `/<owner>/<repo>[/pull/<number>...]` into its parts.
///
/// Owner and repo are only taken together: a path with a single segment
/// yields neither. The PR number is read from the digits directly after a
/// `pull` segment that follows the repository.
pub fn classify(path: &str) -> PathParts {
    let Some(rest) = path.strip_prefix('/') else {
        return PathParts::default();
    };
    let mut segments = rest.split('/');

    let (owner, repo) = match (segments.next(), segments.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => (owner, repo),
        _ => return PathParts::default(),
    };

    let pr_number = match (segments.next(), segments.next()) {
        (Some("pull"), Some(number)) => leading_number(number),
        _ => 0,
    };

    PathParts {
        owner: owner.to_string(),
        repo: repo.to_string(),
        pr_number,
    }
}

fn leading_number(segment: &str) -> u64 {
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    segment[..end].parse().unwrap_or(0)
}
