//! Selective planning: which source entries are copied, excluded or deleted.

use std::path::{Path, PathBuf};

use crate::pattern::{SpecExcludePattern, compile_exclude_patterns};
use crate::report::{ReportPlan, ReportPlanBuilder};
use crate::spec::{EnumExcludeMatchMode, PlanError};
use crate::util::{SpecPathSet, derive_relative_components, derive_relative_string};
use crate::walk::{FsAccessor, list_children, list_up_to_depth};

/// Outcome of one planning pass over a source root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSelection {
    /// Paths to copy. No member is excluded or lies inside an excluded
    /// subtree, and no member lies inside another member.
    pub copy_set: SpecPathSet,
    /// Paths excluded by a pattern match.
    pub excluded_set: SpecPathSet,
    /// Root-relative paths of top-level files, removed after the job runs.
    pub delete_list: Vec<String>,
}

/// Plan a selective copy of `path_dir_src` under raw exclude patterns.
///
/// Invalid patterns are reported in the returned [`ReportPlan`] and skipped.
/// Only a missing or non-directory source root aborts the pass.
pub fn plan_selective_copy<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    path_dir_src: &Path,
    l_patterns_raw: &[String],
    rule_match: EnumExcludeMatchMode,
) -> Result<(SpecSelection, ReportPlan), PlanError> {
    let mut builder_plan_report = ReportPlanBuilder::default();
    let l_patterns =
        compile_patterns_reporting(l_patterns_raw, rule_match, &mut builder_plan_report);
    let spec_selection = plan_with_patterns(
        fs_accessor,
        path_dir_src,
        &l_patterns,
        &mut builder_plan_report,
    )?;
    Ok((spec_selection, builder_plan_report.build()))
}

/// Compile raw patterns, recording each rejected one as a report error keyed
/// by the pattern text.
pub(crate) fn compile_patterns_reporting(
    l_patterns_raw: &[String],
    rule_match: EnumExcludeMatchMode,
    builder_plan_report: &mut ReportPlanBuilder,
) -> Vec<SpecExcludePattern> {
    let (l_patterns, l_errors) = compile_exclude_patterns(l_patterns_raw, rule_match);
    for err in l_errors {
        let c_pattern = match &err {
            PlanError::InvalidPattern { pattern, .. } => pattern.clone(),
            _ => String::new(),
        };
        builder_plan_report.add_error(PathBuf::from(c_pattern), err.to_string());
    }
    l_patterns
}

/// Plan a selective copy with already compiled patterns.
pub fn plan_with_patterns<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    path_dir_src: &Path,
    l_patterns: &[SpecExcludePattern],
    builder_plan_report: &mut ReportPlanBuilder,
) -> Result<SpecSelection, PlanError> {
    if !fs_accessor.exists(path_dir_src) {
        return Err(PlanError::SourceMissing(path_dir_src.to_path_buf()));
    }
    if !fs_accessor.is_dir(path_dir_src) {
        return Err(PlanError::SourceNotDirectory(path_dir_src.to_path_buf()));
    }

    let mut spec_selection = SpecSelection::default();
    for path_entry in list_children(fs_accessor, path_dir_src) {
        builder_plan_report.add_scanned(1);
        plan_top_level_entry(
            fs_accessor,
            path_dir_src,
            &path_entry,
            l_patterns,
            &mut spec_selection,
            builder_plan_report,
        );
    }

    finalize_copy_set(&mut spec_selection);
    builder_plan_report.set_selected(spec_selection.copy_set.len() as u64);
    tracing::info!(
        source = %path_dir_src.display(),
        selected = spec_selection.copy_set.len(),
        excluded = spec_selection.excluded_set.len(),
        delete = spec_selection.delete_list.len(),
        "Selective copy planned"
    );
    Ok(spec_selection)
}

fn plan_top_level_entry<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    path_dir_src: &Path,
    path_entry: &Path,
    l_patterns: &[SpecExcludePattern],
    spec_selection: &mut SpecSelection,
    builder_plan_report: &mut ReportPlanBuilder,
) {
    let c_name = path_entry
        .file_name()
        .map(|v| v.to_string_lossy().to_string())
        .unwrap_or_default();
    let l_hits: Vec<&SpecExcludePattern> = l_patterns
        .iter()
        .filter(|p| p.is_first_segment_hit(&c_name))
        .collect();

    if l_hits.is_empty() {
        tracing::debug!(entry = %path_entry.display(), "No pattern applies, copying whole");
        spec_selection.copy_set.insert(path_entry.to_path_buf());
    }

    for pattern in l_hits {
        if pattern.depth() == 0 {
            let components_rel = derive_relative_components(path_entry, path_dir_src);
            if pattern.matches(&components_rel) {
                tracing::debug!(
                    entry = %path_entry.display(),
                    pattern = pattern.as_str(),
                    "Excluding top-level entry"
                );
                if spec_selection.excluded_set.insert(path_entry.to_path_buf()) {
                    builder_plan_report.add_excluded();
                }
                break;
            }
            spec_selection.copy_set.insert(path_entry.to_path_buf());
            continue;
        }

        plan_descendants(
            fs_accessor,
            path_dir_src,
            path_entry,
            pattern,
            spec_selection,
            builder_plan_report,
        );
    }

    if fs_accessor.is_file(path_entry) {
        let c_rel = derive_relative_string(path_entry, path_dir_src);
        if !spec_selection.delete_list.contains(&c_rel) {
            spec_selection.delete_list.push(c_rel);
        }
    }
}

fn plan_descendants<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    path_dir_src: &Path,
    path_entry: &Path,
    pattern: &SpecExcludePattern,
    spec_selection: &mut SpecSelection,
    builder_plan_report: &mut ReportPlanBuilder,
) {
    let mut l_candidates = list_up_to_depth(fs_accessor, path_entry, pattern.depth());
    builder_plan_report.add_scanned(l_candidates.len() as u64);
    if l_candidates.is_empty() {
        // Files and empty dirs cannot hold a deeper match.
        tracing::debug!(
            entry = %path_entry.display(),
            pattern = pattern.as_str(),
            "Nothing below entry, copying whole"
        );
        spec_selection.copy_set.insert(path_entry.to_path_buf());
        return;
    }
    l_candidates.retain(|c| !spec_selection.excluded_set.covers(c));

    tracing::debug!(
        entry = %path_entry.display(),
        pattern = pattern.as_str(),
        depth = pattern.depth(),
        candidates = l_candidates.len(),
        "Matching descendants"
    );

    for path_candidate in l_candidates {
        let components_rel = derive_relative_components(&path_candidate, path_dir_src);
        if pattern.matches(&components_rel) {
            tracing::debug!(candidate = %path_candidate.display(), "Excluding");
            if spec_selection.excluded_set.insert(path_candidate) {
                builder_plan_report.add_excluded();
            }
        } else {
            spec_selection.copy_set.insert(path_candidate);
        }
    }
}

/// Resolve the copy set against the excluded set.
///
/// 1. Exclusion wins: members equal to or inside an excluded path go.
/// 2. Ancestors of an excluded path go; their surviving children are listed.
/// 3. Members inside another member go; `cp -r` of the ancestor covers them.
fn finalize_copy_set(spec_selection: &mut SpecSelection) {
    let excluded_set = &spec_selection.excluded_set;
    let is_excluded = |path: &Path| {
        excluded_set.covers(path) || excluded_set.has_strict_descendant_of(path)
    };
    spec_selection.copy_set.retain(|path| !is_excluded(path));

    let snapshot_copy_set = spec_selection.copy_set.clone();
    spec_selection.copy_set.retain(|path| {
        !snapshot_copy_set
            .iter()
            .any(|other| other != path && path.starts_with(other))
    });
}
