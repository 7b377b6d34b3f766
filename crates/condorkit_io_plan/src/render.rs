//! Shell text rendering of command plans and job-script templating.

use std::fs;
use std::path::{Path, PathBuf};

use crate::spec::{
    EnumCopyOperation, PlanError, SpecCommandPlan, SpecJobScriptRequest, SpecShellRenderOptions,
};

/// Template token replaced by commands run before setup.
pub const C_TOKEN_PREVIOUS_COMMANDS: &str = "PREVIOUSCOMMANDS";
/// Template token replaced by the setup command.
pub const C_TOKEN_SETUP_COMMAND: &str = "SETUPCOMMAND";
/// Template token replaced by the rendered copy commands.
pub const C_TOKEN_COPY_COMMAND: &str = "COPYCOMMAND";
/// Template token replaced by the rendered delete command.
pub const C_TOKEN_DELETE_FILES: &str = "DELETEFILES";
/// Template token replaced by the job command. Substituted last.
pub const C_TOKEN_CMD: &str = "CMD";

////////////////////////////////////////////////////////////////////////////////
// #region ShellRendering

fn _is_shell_safe(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_./=+:,@%-".contains(c))
}

/// Quote `value` for POSIX shells when it contains anything beyond a
/// conservative safe set.
pub fn quote_shell_arg(value: &str) -> String {
    if _is_shell_safe(value) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn _quote_path(path: &Path) -> String {
    quote_shell_arg(&path.to_string_lossy())
}

fn _guarded(spec_render_options: &SpecShellRenderOptions, cmd: String) -> String {
    if spec_render_options.command_guard.is_empty() {
        return cmd;
    }
    format!("{} {cmd}", spec_render_options.command_guard)
}

/// Render one operation as a single shell line.
pub fn render_operation(
    op: &EnumCopyOperation,
    spec_render_options: &SpecShellRenderOptions,
) -> String {
    let cmd = match op {
        EnumCopyOperation::MakeDir { path_dir_dst } => {
            format!("mkdir -p {}", _quote_path(path_dir_dst))
        }
        EnumCopyOperation::CopyTree {
            path_src,
            path_dir_dst,
        } => {
            let c_src = _quote_path(path_src);
            format!("cp -r {c_src} {}", _quote_path(path_dir_dst))
        }
        EnumCopyOperation::DeleteFiles { l_paths_rel } => {
            let l_quoted: Vec<String> = l_paths_rel.iter().map(|p| quote_shell_arg(p)).collect();
            format!("rm {}", l_quoted.join(" "))
        }
    };
    _guarded(spec_render_options, cmd)
}

impl SpecCommandPlan {
    /// One shell line per operation, in plan order.
    pub fn to_shell_lines(&self, spec_render_options: &SpecShellRenderOptions) -> Vec<String> {
        self.operations
            .iter()
            .map(|op| render_operation(op, spec_render_options))
            .collect()
    }

    /// `mkdir` / `cp` lines joined by newlines, without the delete line.
    pub fn render_copy_command(&self, spec_render_options: &SpecShellRenderOptions) -> String {
        self.operations
            .iter()
            .filter(|op| !matches!(op, EnumCopyOperation::DeleteFiles { .. }))
            .map(|op| render_operation(op, spec_render_options))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The delete line, or an empty string when nothing is deleted.
    pub fn render_delete_command(&self, spec_render_options: &SpecShellRenderOptions) -> String {
        self.operations
            .iter()
            .find(|op| matches!(op, EnumCopyOperation::DeleteFiles { .. }))
            .map(|op| render_operation(op, spec_render_options))
            .unwrap_or_default()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region JobScriptTemplate

/// Job shell template loaded once and rendered per job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecJobScriptTemplate {
    /// Where the template was read from (empty for in-memory templates).
    pub path_template: PathBuf,
    /// Raw template text.
    pub content: String,
}

impl SpecJobScriptTemplate {
    /// Read the template at `path_template`.
    pub fn from_file(path_template: &Path) -> Result<Self, PlanError> {
        let content =
            fs::read_to_string(path_template).map_err(|source| PlanError::TemplateRead {
                path: path_template.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path_template: path_template.to_path_buf(),
            content,
        })
    }

    /// Wrap in-memory template text.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            path_template: PathBuf::new(),
            content: content.into(),
        }
    }

    /// Apply `(token, value)` replacements in order; every occurrence is replaced.
    pub fn render(&self, l_replacements: &[(&str, &str)]) -> String {
        let mut content = self.content.clone();
        for (token, value) in l_replacements {
            content = content.replace(*token, value);
        }
        content
    }

    /// Render the standard job tokens.
    pub fn render_job(
        &self,
        spec_request: &SpecJobScriptRequest,
        c_copy_command: &str,
        c_delete_command: &str,
    ) -> String {
        let c_previous = spec_request.previous_commands.as_str();
        let c_setup = format!("{}{}", spec_request.setup_command, spec_request.setup_flags);
        self.render(&[
            (C_TOKEN_PREVIOUS_COMMANDS, c_previous),
            (C_TOKEN_SETUP_COMMAND, c_setup.as_str()),
            (C_TOKEN_COPY_COMMAND, c_copy_command),
            (C_TOKEN_DELETE_FILES, c_delete_command),
            (C_TOKEN_CMD, spec_request.cmd.as_str()),
        ])
    }
}

/// Write fully rendered `content` to `path_out` in a single call.
pub fn write_script(path_out: &Path, content: &str) -> Result<(), PlanError> {
    let map_err = |source| PlanError::ScriptWrite {
        path: path_out.to_path_buf(),
        source,
    };
    if let Some(path_parent) = path_out.parent() {
        if !path_parent.as_os_str().is_empty() {
            fs::create_dir_all(path_parent).map_err(map_err)?;
        }
    }
    fs::write(path_out, content).map_err(map_err)?;
    tracing::info!(path = %path_out.display(), "Job script written");
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
