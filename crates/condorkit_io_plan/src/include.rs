//! Explicit include paths copied outside the selective walk.

use std::path::{Path, PathBuf};

use crate::report::ReportPlanBuilder;
use crate::spec::{EnumIncludeSpec, PlanError, SpecCommandPlan};
use crate::util::{derive_destination_parent, join_or_root};
use crate::walk::FsAccessor;

/// Source and destination of one include spec after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecResolvedInclude {
    /// Path handed to `cp -r`.
    pub path_src: PathBuf,
    /// Directory receiving the copy.
    pub path_dir_dst: PathBuf,
}

/// Resolve one spec against the source and destination roots.
///
/// Relative sources are taken relative to `path_dir_src`. A bare path keeps its
/// parent structure below the source root; one outside the root lands directly
/// in `path_dir_dst`.
pub fn resolve_include_spec(
    spec_include: &EnumIncludeSpec,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> SpecResolvedInclude {
    let path_src = path_dir_src.join(spec_include.source());
    let path_dir_dst = match spec_include {
        EnumIncludeSpec::Relocated(_, path_dst) => join_or_root(path_dir_dst, path_dst),
        EnumIncludeSpec::Bare(_) => match path_src.strip_prefix(path_dir_src) {
            Ok(path_rel) => derive_destination_parent(path_dir_dst, path_rel),
            Err(_) => path_dir_dst.to_path_buf(),
        },
    };
    SpecResolvedInclude {
        path_src,
        path_dir_dst,
    }
}

/// Emit a `MakeDir` + `CopyTree` pair for every include spec whose source exists.
///
/// Missing sources are skipped with one warning each.
pub fn merge_include_specs<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    l_specs: &[EnumIncludeSpec],
    path_dir_src: &Path,
    path_dir_dst: &Path,
    builder_plan_report: &mut ReportPlanBuilder,
) -> SpecCommandPlan {
    let mut spec_cmd_plan = SpecCommandPlan::default();

    for spec_include in l_specs {
        let spec_resolved = resolve_include_spec(spec_include, path_dir_src, path_dir_dst);
        if !fs_accessor.exists(&spec_resolved.path_src) {
            let err = PlanError::IncludeSpecMissing(spec_resolved.path_src);
            builder_plan_report.add_warning(err.to_string());
            continue;
        }

        tracing::debug!(
            source = %spec_resolved.path_src.display(),
            destination = %spec_resolved.path_dir_dst.display(),
            "Adding included path"
        );
        builder_plan_report.add_included();
        spec_cmd_plan.push_copy_pair(spec_resolved.path_src, spec_resolved.path_dir_dst);
    }

    spec_cmd_plan
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::{merge_include_specs, resolve_include_spec};
    use crate::report::ReportPlanBuilder;
    use crate::spec::{EnumCopyOperation, EnumIncludeSpec};
    use crate::walk::StdFs;

    #[test]
    fn relocated_with_empty_destination_targets_root() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path();
        std::fs::create_dir_all(root.join("eos/hists")).expect("mkdir");

        let mut builder = ReportPlanBuilder::default();
        let spec_cmd_plan = merge_include_specs(
            &StdFs,
            &[EnumIncludeSpec::relocated("eos/hists", "")],
            root,
            Path::new("."),
            &mut builder,
        );

        assert_eq!(
            spec_cmd_plan.operations,
            vec![
                EnumCopyOperation::MakeDir {
                    path_dir_dst: PathBuf::from(".")
                },
                EnumCopyOperation::CopyTree {
                    path_src: root.join("eos/hists"),
                    path_dir_dst: PathBuf::from(".")
                },
            ]
        );
        let report = builder.build();
        assert_eq!(report.cnt_included, 1);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn missing_include_yields_one_diagnostic_and_no_ops() {
        let tmp = TempDir::new().expect("tempdir");

        let mut builder = ReportPlanBuilder::default();
        let spec_cmd_plan = merge_include_specs(
            &StdFs,
            &[EnumIncludeSpec::relocated("eos/nothing", "")],
            tmp.path(),
            Path::new("."),
            &mut builder,
        );

        assert!(spec_cmd_plan.is_empty());
        let report = builder.build();
        assert_eq!(report.warning_count(), 1);
        assert!(report.warnings[0].contains("eos/nothing"));
    }

    #[test]
    fn bare_path_keeps_parent_structure() {
        let root = Path::new("/work/src");
        let dst = Path::new(".");

        let spec_resolved =
            resolve_include_spec(&EnumIncludeSpec::bare("results/v1/JOs"), root, dst);
        assert_eq!(
            spec_resolved.path_src,
            PathBuf::from("/work/src/results/v1/JOs")
        );
        assert_eq!(spec_resolved.path_dir_dst, PathBuf::from("./results/v1"));

        let spec_resolved = resolve_include_spec(&EnumIncludeSpec::bare("JOs"), root, dst);
        assert_eq!(spec_resolved.path_dir_dst, PathBuf::from("."));

        let spec_resolved =
            resolve_include_spec(&EnumIncludeSpec::bare("/work/src/a/b"), root, dst);
        assert_eq!(spec_resolved.path_dir_dst, PathBuf::from("./a"));

        let spec_resolved = resolve_include_spec(&EnumIncludeSpec::bare("/other/x"), root, dst);
        assert_eq!(spec_resolved.path_src, PathBuf::from("/other/x"));
        assert_eq!(spec_resolved.path_dir_dst, PathBuf::from("."));
    }

    #[test]
    fn relocated_destination_is_joined_under_root() {
        let spec_resolved = resolve_include_spec(
            &EnumIncludeSpec::relocated("/data/ffs/comb", "inputs/comb"),
            Path::new("/work/src"),
            Path::new("output"),
        );
        assert_eq!(spec_resolved.path_src, PathBuf::from("/data/ffs/comb"));
        assert_eq!(
            spec_resolved.path_dir_dst,
            PathBuf::from("output/inputs/comb")
        );
    }
}
