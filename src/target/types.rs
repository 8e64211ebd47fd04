/// What the user asked to review, derived once from the input URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub raw_url: String,
    pub is_pull_request: bool,
    pub owner: String,
    pub repo: String,
    /// 0 when the target is not a pull request.
    pub pr_number: u64,
}

impl TargetRef {
    /// Human-friendly name, e.g. `acme/widgets` or `acme/widgets#42`.
    pub fn display_name(&self) -> String {
        if self.is_pull_request {
            format!("{}/{}#{}", self.owner, self.repo, self.pr_number)
        } else {
            format!("{}/{}", self.owner, self.repo)
        }
    }
}

/// Owner, repository and PR number pulled out of a URL path.
/// Segments that don't match default to empty / 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParts {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

/// How much history to fetch when cloning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneDepth {
    /// Only the latest commit (`--depth 1`).
    Shallow,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub depth: CloneDepth,
}

impl RunOptions {
    /// An explicit `--deep` value wins. Otherwise pull requests are cloned
    /// with full history, since the head commits may not be reachable from a
    /// depth-1 clone, and plain repositories are cloned shallow.
    pub fn resolve(deep: Option<bool>, target: &TargetRef) -> Self {
        let deep = deep.unwrap_or(target.is_pull_request);
        Self {
            depth: if deep {
                CloneDepth::Full
            } else {
                CloneDepth::Shallow
            },
        }
    }

    pub fn is_deep(&self) -> bool {
        self.depth == CloneDepth::Full
    }
}
