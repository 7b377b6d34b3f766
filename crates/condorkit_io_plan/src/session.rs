//! Include/exclude state shared across several job-script generations.

use std::path::Path;

use crate::emit::emit_selection;
use crate::include::merge_include_specs;
use crate::plan::{compile_patterns_reporting, plan_with_patterns};
use crate::render::{SpecJobScriptTemplate, write_script};
use crate::report::{ReportPlan, ReportPlanBuilder};
use crate::spec::{
    EnumIncludeSpec, PlanError, SpecCommandPlan, SpecIncludeExcludeConfig, SpecJobScriptRequest,
    SpecSessionOptions,
};
use crate::walk::{FsAccessor, StdFs};

/// Accumulates include specs and exclude patterns, then plans and renders jobs.
///
/// Every [`SelectiveCopySession::build_plan`] call re-reads the filesystem; only
/// the configured lists persist between calls, until [`SelectiveCopySession::reset`].
#[derive(Debug)]
pub struct SelectiveCopySession<F: FsAccessor = StdFs> {
    fs_accessor: F,
    spec_options: SpecSessionOptions,
    l_includes: Vec<EnumIncludeSpec>,
    l_excludes: Vec<String>,
    spec_template: Option<SpecJobScriptTemplate>,
}

impl SelectiveCopySession<StdFs> {
    /// Session over the real filesystem.
    pub fn new(spec_options: SpecSessionOptions) -> Self {
        Self::with_fs(StdFs, spec_options)
    }
}

impl<F: FsAccessor> SelectiveCopySession<F> {
    /// Session over a custom [`FsAccessor`].
    pub fn with_fs(fs_accessor: F, spec_options: SpecSessionOptions) -> Self {
        Self {
            fs_accessor,
            spec_options,
            l_includes: Vec::new(),
            l_excludes: Vec::new(),
            spec_template: None,
        }
    }

    /// Session options.
    pub fn options(&self) -> &SpecSessionOptions {
        &self.spec_options
    }

    /// Accumulated include specs.
    pub fn includes(&self) -> &[EnumIncludeSpec] {
        &self.l_includes
    }

    /// Accumulated exclude patterns.
    pub fn excludes(&self) -> &[String] {
        &self.l_excludes
    }

    /// Append include specs.
    pub fn add_includes(&mut self, l_specs: impl IntoIterator<Item = EnumIncludeSpec>) {
        self.l_includes.extend(l_specs);
    }

    /// Append exclude patterns.
    pub fn add_excludes<S: Into<String>>(&mut self, l_patterns: impl IntoIterator<Item = S>) {
        self.l_excludes.extend(l_patterns.into_iter().map(Into::into));
    }

    /// Append both lists of a typed config.
    pub fn apply_config(&mut self, spec_config: SpecIncludeExcludeConfig) {
        self.add_includes(spec_config.include);
        self.add_excludes(spec_config.exclude);
    }

    /// Forget accumulated includes and excludes.
    pub fn reset(&mut self) {
        self.l_includes.clear();
        self.l_excludes.clear();
    }

    /// Plan the current state: include ops, then selective copy ops, then the
    /// trailing delete.
    pub fn build_plan(&self) -> Result<(SpecCommandPlan, ReportPlan), PlanError> {
        let path_dir_src = self.spec_options.path_dir_src.as_path();
        let path_dir_dst = self.spec_options.path_dir_dst.as_path();
        let mut builder_plan_report = ReportPlanBuilder::default();

        let l_patterns = compile_patterns_reporting(
            &self.l_excludes,
            self.spec_options.rule_match,
            &mut builder_plan_report,
        );

        let spec_selection = plan_with_patterns(
            &self.fs_accessor,
            path_dir_src,
            &l_patterns,
            &mut builder_plan_report,
        )?;

        let mut builder_include_report = ReportPlanBuilder::default();
        let mut spec_cmd_plan = merge_include_specs(
            &self.fs_accessor,
            &self.l_includes,
            path_dir_src,
            path_dir_dst,
            &mut builder_include_report,
        );
        spec_cmd_plan.extend(emit_selection(
            &self.fs_accessor,
            &spec_selection,
            path_dir_src,
            path_dir_dst,
            &mut builder_plan_report,
        ));

        let mut report = builder_plan_report.build();
        report.merge(builder_include_report.build());
        Ok((spec_cmd_plan, report))
    }

    fn template(&mut self) -> Result<&SpecJobScriptTemplate, PlanError> {
        if self.spec_template.is_none() {
            let path_template = self
                .spec_options
                .path_template
                .as_deref()
                .ok_or(PlanError::TemplateMissing)?;
            self.spec_template = Some(SpecJobScriptTemplate::from_file(path_template)?);
        }
        self.spec_template.as_ref().ok_or(PlanError::TemplateMissing)
    }

    /// Plan, render into the job template and write `path_out` in one shot.
    ///
    /// With `if_reset`, the accumulated state is cleared after a successful write.
    pub fn write_job_script(
        &mut self,
        path_out: &Path,
        spec_request: &SpecJobScriptRequest,
        if_reset: bool,
    ) -> Result<ReportPlan, PlanError> {
        let (spec_cmd_plan, report) = self.build_plan()?;
        let spec_render_options = self.spec_options.render.clone();
        let c_copy = spec_cmd_plan.render_copy_command(&spec_render_options);
        let c_delete = spec_cmd_plan.render_delete_command(&spec_render_options);

        let content = self.template()?.render_job(spec_request, &c_copy, &c_delete);
        write_script(path_out, &content)?;
        tracing::info!("{report}");

        if if_reset {
            self.reset();
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::SelectiveCopySession;
    use crate::spec::{
        EnumCopyOperation, EnumIncludeSpec, PlanError, SpecIncludeExcludeConfig,
        SpecJobScriptRequest, SpecSessionOptions,
    };

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    fn setup_tree(root: &Path) {
        write_text(&root.join("pkg/gen.py"), "g");
        write_text(&root.join("pkg/.git/HEAD"), "h");
        write_text(&root.join("output/old.root"), "o");
        write_text(&root.join("JOs/jo_1.py"), "j");
        write_text(&root.join("setup.sh"), "s");
    }

    #[test]
    fn combined_plan_orders_includes_then_copies_then_delete() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("src");
        setup_tree(&root);
        write_text(&tmp.path().join("eos/hists/h.root"), "h");

        let mut session = SelectiveCopySession::new(SpecSessionOptions::new(&root));
        session.apply_config(SpecIncludeExcludeConfig {
            include: vec![EnumIncludeSpec::relocated(tmp.path().join("eos/hists"), "")],
            exclude: vec!["output".to_string(), "pkg/.git".to_string()],
        });

        let (spec_cmd_plan, report) = session.build_plan().expect("plan");
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.cnt_included, 1);

        assert_eq!(
            spec_cmd_plan.operations[1],
            EnumCopyOperation::CopyTree {
                path_src: tmp.path().join("eos/hists"),
                path_dir_dst: PathBuf::from(".")
            }
        );
        assert_eq!(
            spec_cmd_plan.operations.last(),
            Some(&EnumCopyOperation::DeleteFiles {
                l_paths_rel: vec!["setup.sh".to_string()]
            })
        );

        let l_sources = spec_cmd_plan.copy_sources();
        assert!(l_sources.contains(&root.join("JOs").as_path()));
        assert!(l_sources.contains(&root.join("pkg/gen.py").as_path()));
        assert!(l_sources.contains(&root.join("setup.sh").as_path()));
        assert!(!l_sources.contains(&root.join("output").as_path()));
        assert!(!l_sources.contains(&root.join("pkg").as_path()));
        assert!(!l_sources.contains(&root.join("pkg/.git").as_path()));
    }

    #[test]
    fn include_pass_counts_fold_into_plan_report() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("src");
        setup_tree(&root);

        let mut session = SelectiveCopySession::new(SpecSessionOptions::new(&root));
        session.add_includes([
            EnumIncludeSpec::bare("JOs"),
            EnumIncludeSpec::relocated("eos/nothing", ""),
        ]);
        session.add_excludes(["output"]);

        let (_, report) = session.build_plan().expect("plan");
        assert_eq!(report.cnt_included, 1);
        assert_eq!(report.cnt_excluded, 1);
        assert_eq!(report.warning_count(), 1);
        assert!(report.warnings[0].contains("eos/nothing"));
        assert_eq!(report.cnt_scanned, 4);
    }

    #[test]
    fn write_job_script_renders_template_and_resets() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("src");
        setup_tree(&root);
        let path_template = tmp.path().join("job_condor_TEMPLATE.sh");
        write_text(
            &path_template,
            "#!/bin/bash\nPREVIOUSCOMMANDS\nSETUPCOMMAND\nCOPYCOMMAND\nCMD\nDELETEFILES\n",
        );

        let mut spec_options = SpecSessionOptions::new(&root);
        spec_options.path_template = Some(path_template);
        let mut session = SelectiveCopySession::new(spec_options);
        session.add_excludes(["output", "pkg", "JOs"]);

        let spec_request = SpecJobScriptRequest {
            cmd: "python run.py --dsid 100".to_string(),
            ..SpecJobScriptRequest::default()
        };
        let path_out = tmp.path().join("submits/100/job.sh");
        let report = session
            .write_job_script(&path_out, &spec_request, true)
            .expect("write script");
        assert_eq!(report.cnt_selected, 1);

        let content = std::fs::read_to_string(&path_out).expect("read script");
        let c_src = root.join("setup.sh").display().to_string();
        assert!(content.contains("check_command_success source setup.sh\n"));
        let c_copy_line = format!("check_command_success cp -r {c_src} .");
        assert!(content.contains(&c_copy_line));
        let c_tail = "python run.py --dsid 100\ncheck_command_success rm setup.sh\n";
        assert!(content.contains(c_tail));
        assert!(!content.contains("COPYCOMMAND"));

        assert!(session.excludes().is_empty());
        assert!(session.includes().is_empty());
    }

    #[test]
    fn state_accumulates_until_reset() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("src");
        setup_tree(&root);

        let mut session = SelectiveCopySession::new(SpecSessionOptions::new(&root));
        session.add_excludes(["output"]);
        session.add_excludes(["pkg"]);
        let path_pkg = root.join("pkg");
        let path_output = root.join("output");
        let (spec_cmd_plan, _) = session.build_plan().expect("plan");
        let l_sources = spec_cmd_plan.copy_sources();
        assert!(!l_sources.contains(&path_pkg.as_path()));

        session.reset();
        let (spec_cmd_plan, _) = session.build_plan().expect("plan");
        let l_sources = spec_cmd_plan.copy_sources();
        assert!(l_sources.contains(&path_pkg.as_path()));
        assert!(l_sources.contains(&path_output.as_path()));
    }

    #[test]
    fn missing_template_and_missing_source_are_errors() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("src");
        setup_tree(&root);

        let mut session = SelectiveCopySession::new(SpecSessionOptions::new(&root));
        let err = session
            .write_job_script(
                &tmp.path().join("job.sh"),
                &SpecJobScriptRequest::default(),
                false,
            )
            .expect_err("no template");
        assert!(matches!(err, PlanError::TemplateMissing));
        assert!(!tmp.path().join("job.sh").exists());

        let session = SelectiveCopySession::new(SpecSessionOptions::new(tmp.path().join("nope")));
        let err = session.build_plan().expect_err("missing source");
        assert!(matches!(err, PlanError::SourceMissing(_)));
    }
}
