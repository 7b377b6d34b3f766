//! Planner models, options and top-level error types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// How exclude pattern segments are compared against path components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumExcludeMatchMode {
    /// Each segment must equal the path component at the same position.
    #[default]
    Segment,
    /// Each segment is a shell-like wildcard matched against one component.
    Glob,
    /// Each segment is an anchored regular expression matched against one component.
    Regex,
    /// Raw substring containment on the relative path string.
    ///
    /// `"run"` also matches `"myrun"`. Kept for parity with job layouts that
    /// were written against this behavior.
    Substring,
}

/// Filesystem classification of a path at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPathKind {
    /// Existing directory (symlinks are followed).
    Directory,
    /// Existing regular file (symlinks are followed).
    File,
    /// Nothing at this path, or an entry that is neither file nor directory.
    Missing,
}

/// One explicitly requested extra path.
///
/// Deserializes from either a plain string or a `[source, destination]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumIncludeSpec {
    /// Destination inferred from the path relative to the source root.
    Bare(PathBuf),
    /// Copy `source` into `destination` (relative to the destination root).
    Relocated(PathBuf, PathBuf),
}

impl EnumIncludeSpec {
    /// Shorthand for [`EnumIncludeSpec::Bare`].
    pub fn bare(path: impl Into<PathBuf>) -> Self {
        Self::Bare(path.into())
    }

    /// Shorthand for [`EnumIncludeSpec::Relocated`].
    pub fn relocated(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self::Relocated(source.into(), destination.into())
    }

    /// Source path as written by the caller.
    pub fn source(&self) -> &Path {
        match self {
            Self::Bare(path) => path,
            Self::Relocated(source, _) => source,
        }
    }
}

/// One filesystem operation of a command plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCopyOperation {
    /// `mkdir -p <path_dir_dst>`.
    MakeDir {
        /// Directory to create.
        path_dir_dst: PathBuf,
    },
    /// `cp -r <path_src> <path_dir_dst>`.
    CopyTree {
        /// File or directory to copy.
        path_src: PathBuf,
        /// Directory receiving the copy.
        path_dir_dst: PathBuf,
    },
    /// `rm <paths...>`, run after the job command.
    DeleteFiles {
        /// Source-root relative file paths.
        l_paths_rel: Vec<String>,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndOptions

/// Ordered operations realizing one selective copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCommandPlan {
    /// Operations in execution order.
    pub operations: Vec<EnumCopyOperation>,
}

impl SpecCommandPlan {
    /// Append a `MakeDir` + `CopyTree` pair targeting `path_dir_dst`.
    pub fn push_copy_pair(&mut self, path_src: PathBuf, path_dir_dst: PathBuf) {
        self.operations.push(EnumCopyOperation::MakeDir {
            path_dir_dst: path_dir_dst.clone(),
        });
        self.operations.push(EnumCopyOperation::CopyTree {
            path_src,
            path_dir_dst,
        });
    }

    /// Append all operations of `other`, keeping their order.
    pub fn extend(&mut self, other: SpecCommandPlan) {
        self.operations.extend(other.operations);
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the plan has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Sources of every `CopyTree` operation, in order.
    pub fn copy_sources(&self) -> Vec<&Path> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                EnumCopyOperation::CopyTree { path_src, .. } => Some(path_src.as_path()),
                _ => None,
            })
            .collect()
    }

    /// Relative paths carried by the trailing `DeleteFiles`, if any.
    pub fn delete_paths(&self) -> Option<&[String]> {
        self.operations.iter().find_map(|op| match op {
            EnumCopyOperation::DeleteFiles { l_paths_rel } => Some(l_paths_rel.as_slice()),
            _ => None,
        })
    }
}

/// Caller-supplied include/exclude lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecIncludeExcludeConfig {
    /// Extra paths copied outside the selective walk.
    pub include: Vec<EnumIncludeSpec>,
    /// Exclude patterns relative to the source root.
    pub exclude: Vec<String>,
}

/// Shell text rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecShellRenderOptions {
    /// Wrapper function prefixed to every command. Empty disables the prefix.
    pub command_guard: String,
}

impl Default for SpecShellRenderOptions {
    fn default() -> Self {
        Self {
            command_guard: "check_command_success".to_string(),
        }
    }
}

/// Construction options for [`crate::session::SelectiveCopySession`].
#[derive(Debug, Clone)]
pub struct SpecSessionOptions {
    /// Tree that is selectively copied.
    pub path_dir_src: PathBuf,
    /// Destination root as seen by the job (usually `.`).
    pub path_dir_dst: PathBuf,
    /// Exclude pattern interpretation.
    pub rule_match: EnumExcludeMatchMode,
    /// Shell rendering options.
    pub render: SpecShellRenderOptions,
    /// Job shell template. Required only for script generation.
    pub path_template: Option<PathBuf>,
}

impl SpecSessionOptions {
    /// Options for `path_dir_src` with every other field defaulted.
    pub fn new(path_dir_src: impl Into<PathBuf>) -> Self {
        Self {
            path_dir_src: path_dir_src.into(),
            path_dir_dst: PathBuf::from("."),
            rule_match: EnumExcludeMatchMode::default(),
            render: SpecShellRenderOptions::default(),
            path_template: None,
        }
    }
}

/// Job-specific text substituted into the shell template.
#[derive(Debug, Clone)]
pub struct SpecJobScriptRequest {
    /// Job command (`CMD`).
    pub cmd: String,
    /// Commands run before setup (`PREVIOUSCOMMANDS`).
    pub previous_commands: String,
    /// Environment setup command (`SETUPCOMMAND`).
    pub setup_command: String,
    /// Appended verbatim to `setup_command`.
    pub setup_flags: String,
}

impl Default for SpecJobScriptRequest {
    fn default() -> Self {
        Self {
            cmd: String::new(),
            previous_commands: String::new(),
            setup_command: "check_command_success source setup.sh".to_string(),
            setup_flags: String::new(),
        }
    }
}

/// One non-fatal diagnostic with path + message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPlanDiagnostic {
    /// Offending source path or pattern text.
    pub path: PathBuf,
    /// User-facing message.
    pub exception: String,
}

/// Errors that abort a planner or session call.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Exclude pattern is empty or malformed.
    #[error("Invalid exclude pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// Raw pattern text.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },
    /// Source root does not exist.
    #[error("Source root does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
    /// Source root exists but is not a directory.
    #[error("Source root is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Requested include path does not exist.
    #[error("Include path does not exist: {}", .0.display())]
    IncludeSpecMissing(PathBuf),
    /// Config file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Config file content could not be parsed.
    #[error("Failed to parse config {}: {message}", path.display())]
    ConfigParse {
        /// Config file path.
        path: PathBuf,
        /// Parser error text.
        message: String,
    },
    /// Config file extension is not recognized.
    #[error("Unsupported config format (expected .toml, .yaml, .yml or .json): {}", .0.display())]
    UnsupportedConfigFormat(PathBuf),
    /// Template file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    TemplateRead {
        /// Template path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Script generation was requested without a template path.
    #[error("No job script template configured")]
    TemplateMissing,
    /// Rendered script could not be written.
    #[error("Failed to write script {}: {source}", path.display())]
    ScriptWrite {
        /// Destination script path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
