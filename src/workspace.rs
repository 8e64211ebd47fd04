use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::info;

use crate::exec::CommandSpec;
use crate::target::CloneDepth;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "ric";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Failed to create workspace directory {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Last timestamp handed out, so that two names generated within the same
/// millisecond by this process still differ.
static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

fn next_stamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let previous = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    now.max(previous + 1)
}

/// `ric-<repo>-<unix millis>`
pub fn workspace_dir_name(repo: &str) -> String {
    format!("{}-{}-{}", WORKSPACE_PREFIX, repo, next_stamp())
}

/// The throwaway directory a review happens in. Never removed by us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `root`. The directory must not exist yet.
    pub fn create_in(root: &Path, repo: &str) -> Result<Self, WorkspaceError> {
        let path = root.join(workspace_dir_name(repo));
        fs::create_dir(&path).map_err(|source| WorkspaceError::Create {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "created workspace");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `git clone [--depth 1] <url> .` inside the workspace. Credential
    /// prompts are disabled so a private or missing repo fails immediately.
    pub fn clone_spec(&self, clone_url: &str, depth: CloneDepth) -> CommandSpec {
        let mut spec = CommandSpec::new("git").arg("clone");
        if depth == CloneDepth::Shallow {
            spec = spec.args(["--depth", "1"]);
        }
        spec.args([clone_url, "."])
            .env("GIT_TERMINAL_PROMPT", "0")
            .current_dir(&self.path)
    }

    pub fn checkout_spec(&self, branch: &str) -> CommandSpec {
        CommandSpec::new("git")
            .args(["checkout", branch])
            .env("GIT_TERMINAL_PROMPT", "0")
            .current_dir(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_name_format() {
        let name = workspace_dir_name("widgets");
        let stamp = name.strip_prefix("ric-widgets-").unwrap();
        assert!(stamp.parse::<u64>().is_ok());
    }

    #[test]
    fn test_dir_names_do_not_collide() {
        let names: Vec<String> = (0..100).map(|_| workspace_dir_name("widgets")).collect();
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_create_in_makes_directory() {
        let root = tempfile::tempdir().unwrap();
        let first = Workspace::create_in(root.path(), "widgets").unwrap();
        let second = Workspace::create_in(root.path(), "widgets").unwrap();
        assert!(first.path().is_dir());
        assert!(second.path().is_dir());
        assert_ne!(first.path(), second.path());
        assert!(first.path().starts_with(root.path()));
    }

    #[test]
    fn test_create_in_missing_root_fails() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("does-not-exist");
        assert!(matches!(
            Workspace::create_in(&missing, "widgets"),
            Err(WorkspaceError::Create { .. })
        ));
    }

    #[test]
    fn test_clone_spec_depth() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create_in(root.path(), "widgets").unwrap();

        let shallow = workspace.clone_spec("https://github.com/acme/widgets", CloneDepth::Shallow);
        assert_eq!(
            shallow.to_string(),
            "git clone --depth 1 https://github.com/acme/widgets ."
        );
        assert_eq!(shallow.current_dir.as_deref(), Some(workspace.path()));
        assert!(shallow
            .envs
            .contains(&("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())));

        let full = workspace.clone_spec("https://github.com/acme/widgets", CloneDepth::Full);
        assert_eq!(full.to_string(), "git clone https://github.com/acme/widgets .");
    }

    #[test]
    fn test_checkout_spec() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create_in(root.path(), "widgets").unwrap();
        let spec = workspace.checkout_spec("feature-x");
        assert_eq!(spec.to_string(), "git checkout feature-x");
        assert_eq!(spec.current_dir.as_deref(), Some(workspace.path()));
    }
}
