use std::future::Future;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::editor::EditorCommand;
use crate::exec::{CommandRunner, ExecError};
use crate::pr::{PrError, PullRequestSource, ResolvedSource};
use crate::status::{StatusReporter, Step};
use crate::target::{RunOptions, TargetError, TargetRef};
use crate::workspace::{Workspace, WorkspaceError};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    PullRequest(#[from] PrError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Command(#[from] ExecError),
}

/// What a finished review left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub workspace: Workspace,
    pub source: ResolvedSource,
}

/// Fetches a repository or pull request into a fresh workspace and opens it
/// in the editor. Each stage only starts once the previous one succeeded.
pub struct Review<'a> {
    pub pull_requests: &'a dyn PullRequestSource,
    pub runner: &'a dyn CommandRunner,
    pub status: &'a dyn StatusReporter,
    pub editor: EditorCommand,
    /// Base for clone URLs, e.g. https://github.com
    pub web_url: String,
    /// Directory new workspaces are created under.
    pub workspace_root: PathBuf,
}

impl Review<'_> {
    pub async fn run(
        &self,
        target: &TargetRef,
        options: RunOptions,
    ) -> Result<ReviewOutcome, ReviewError> {
        let name = target.display_name();
        info!(url = %target.raw_url, target = %name, deep = options.is_deep(), "starting review");

        let source = self.resolve_source(target, &name).await?;
        debug!(clone_url = %source.clone_url, branch = %source.branch, "resolved source");

        let workspace = Workspace::create_in(&self.workspace_root, &target.repo)?;
        self.status
            .succeed(&Step::WorkspaceReady(workspace.path().to_path_buf()));

        let cloning = Step::Cloning(source.clone_url.clone());
        self.status.start(&cloning);
        self.tracked(
            &cloning,
            self.runner
                .run(&workspace.clone_spec(&source.clone_url, options.depth)),
        )
        .await?;

        let checking_out = Step::CheckingOut(source.branch.clone());
        self.status.update(&checking_out);
        self.tracked(
            &checking_out,
            self.runner.run(&workspace.checkout_spec(&source.branch)),
        )
        .await?;

        let reviewing = Step::Reviewing(name.clone());
        self.status.start(&reviewing);
        info!(workspace = %workspace.path().display(), "opening editor");
        self.tracked(
            &reviewing,
            self.runner.run(&self.editor.launch_spec(workspace.path())),
        )
        .await?;
        self.status.succeed(&Step::DoneReviewing(name));

        Ok(ReviewOutcome { workspace, source })
    }

    async fn resolve_source(
        &self,
        target: &TargetRef,
        name: &str,
    ) -> Result<ResolvedSource, ReviewError> {
        if !target.is_pull_request {
            return Ok(ResolvedSource::default_for(target, &self.web_url));
        }

        let retrieving = Step::RetrievingPr(name.to_string());
        self.status.start(&retrieving);
        let head = self
            .tracked(
                &retrieving,
                self.pull_requests
                    .head(&target.owner, &target.repo, target.pr_number),
            )
            .await?;
        Ok(head.resolve(&self.web_url))
    }

    /// Await `work`, marking `step` failed if it errors.
    async fn tracked<T, E>(
        &self,
        step: &Step,
        work: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ReviewError>
    where
        ReviewError: From<E>,
    {
        match work.await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.status.fail(step);
                Err(err.into())
            }
        }
    }
}
