use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// One user-visible step of a review run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    WorkspaceReady(PathBuf),
    RetrievingPr(String),
    Cloning(String),
    CheckingOut(String),
    Reviewing(String),
    DoneReviewing(String),
}

impl Step {
    /// Message split around the name worth highlighting.
    fn parts(&self) -> (&'static str, String, &'static str) {
        match self {
            Step::WorkspaceReady(path) => (
                "Files will temporarily reside in ",
                path.display().to_string(),
                "",
            ),
            Step::RetrievingPr(name) => ("Retrieving PR info ", name.clone(), ""),
            Step::Cloning(url) => ("Cloning ", url.clone(), " into temporary directory"),
            Step::CheckingOut(branch) => ("Checking out ", branch.clone(), ""),
            Step::Reviewing(name) => ("Reviewing ", name.clone(), " in editor"),
            Step::DoneReviewing(name) => ("Done reviewing ", name.clone(), ""),
        }
    }

    fn render(&self, highlight: impl Fn(&str) -> String) -> String {
        let (before, subject, after) = self.parts();
        format!("{before}{}{after}", highlight(&subject))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(str::to_string))
    }
}

/// Progress reporting for the review pipeline, kept apart from the pipeline
/// so it can run without a terminal.
pub trait StatusReporter: Send + Sync {
    /// A step is now in progress, replacing any previous in-progress step.
    fn start(&self, step: &Step);
    /// Reword the in-progress step.
    fn update(&self, step: &Step);
    fn succeed(&self, step: &Step);
    fn fail(&self, step: &Step);
}

fn highlight(name: &str) -> String {
    let styled: ColoredString = name.italic().blue();
    styled.to_string()
}

const TICK: Duration = Duration::from_millis(80);

/// Shows the in-progress step as a spinner on stderr. Each `start` replaces
/// the running spinner; `succeed` and `fail` leave a final line behind.
/// Nothing is drawn when stderr is not a terminal.
pub struct TerminalStatus {
    current: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl TerminalStatus {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            hidden: false,
        }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            current: Mutex::new(None),
            hidden: true,
        }
    }

    fn spinner(&self) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        if self.hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(TICK);
        bar
    }

    fn lock(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn finish(&self, marker: ColoredString, step: &Step, failed: bool) {
        let bar = self.lock().take().unwrap_or_else(|| self.spinner());
        bar.set_style(
            ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let line = format!("{marker} {}", step.render(highlight));
        if failed {
            bar.abandon_with_message(line);
        } else {
            bar.finish_with_message(line);
        }
    }
}

impl Default for TerminalStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for TerminalStatus {
    fn start(&self, step: &Step) {
        let mut current = self.lock();
        if let Some(previous) = current.take() {
            previous.finish_and_clear();
        }
        let bar = self.spinner();
        bar.set_message(step.render(highlight));
        *current = Some(bar);
    }

    fn update(&self, step: &Step) {
        let running = self.lock().clone();
        match running {
            Some(bar) => bar.set_message(step.render(highlight)),
            None => self.start(step),
        }
    }

    fn succeed(&self, step: &Step) {
        self.finish("✔".green().bold(), step, false);
    }

    fn fail(&self, step: &Step) {
        self.finish("✖".red().bold(), step, true);
    }
}
