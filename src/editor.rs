use std::path::Path;

use crate::exec::{CommandSpec, ExecError};

/// The command that opens a workspace for review, e.g. `code --wait`.
#[derive(Debug, Clone)]
pub struct EditorCommand {
    base: CommandSpec,
}

impl EditorCommand {
    pub fn new(command_line: &str) -> Result<Self, ExecError> {
        Ok(Self {
            base: CommandSpec::from_command_line(command_line)?,
        })
    }

    /// The editor invocation with the workspace appended as the last argument.
    /// The command must block until the editor window is closed.
    pub fn launch_spec(&self, workspace: &Path) -> CommandSpec {
        self.base
            .clone()
            .arg(workspace.to_string_lossy().into_owned())
    }
}
