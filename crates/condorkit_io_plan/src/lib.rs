//! `condorkit_io_plan` v1:
//! Selective-copy planner for batch job scripts.
//!
//! Given a source directory and exclude patterns, decides which entries a job
//! copies into its working directory and emits the shell commands for it.
//!
//! - `spec`    : enums/options/errors
//! - `report`  : plan-time report model
//! - `walk`    : filesystem seam and bounded-depth enumeration
//! - `pattern` : exclude-pattern compilation and matching
//! - `plan`    : selective planning (copy / excluded / delete sets)
//! - `emit`    : `mkdir` / `cp -r` / `rm` operations from a selection
//! - `include` : explicit include paths
//! - `render`  : shell rendering and job-script templating
//! - `config`  : include/exclude config files
//! - `session` : accumulated include/exclude state across jobs
//! - `util`    : shared path helpers

pub mod config;
pub mod emit;
pub mod include;
pub mod pattern;
pub mod plan;
pub mod render;
pub mod report;
pub mod session;
pub mod spec;
pub mod util;
pub mod walk;

pub use config::{load_include_exclude_config, parse_include_exclude_config};
pub use emit::{append_delete_files, emit_copy_commands, emit_selection};
pub use include::{SpecResolvedInclude, merge_include_specs, resolve_include_spec};
pub use pattern::{SpecExcludePattern, compile_exclude_patterns};
pub use plan::{SpecSelection, plan_selective_copy, plan_with_patterns};
pub use render::{SpecJobScriptTemplate, quote_shell_arg, render_operation, write_script};
pub use report::{ReportPlan, ReportPlanBuilder};
pub use session::SelectiveCopySession;
pub use spec::{
    EnumCopyOperation, EnumExcludeMatchMode, EnumIncludeSpec, EnumPathKind, PlanError,
    SpecCommandPlan, SpecIncludeExcludeConfig, SpecJobScriptRequest, SpecPlanDiagnostic,
    SpecSessionOptions, SpecShellRenderOptions,
};
pub use util::SpecPathSet;
pub use walk::{FsAccessor, StdFs, list_children, list_up_to_depth};
