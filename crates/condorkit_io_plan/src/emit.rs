//! Turn a finished selection into `mkdir` / `cp -r` operations.

use std::path::Path;

use crate::plan::SpecSelection;
use crate::report::ReportPlanBuilder;
use crate::spec::{EnumCopyOperation, EnumPathKind, SpecCommandPlan};
use crate::util::{SpecPathSet, derive_destination_parent};
use crate::walk::FsAccessor;

/// Emit one `MakeDir` + `CopyTree` pair per member of `copy_set`.
///
/// Each member lands in `path_dir_dst` joined with its parent directory relative
/// to `path_dir_src`, so `cp -r` recreates the relative structure. Members that
/// vanished since planning are skipped with a warning.
pub fn emit_copy_commands<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    copy_set: &SpecPathSet,
    path_dir_src: &Path,
    path_dir_dst: &Path,
    builder_plan_report: &mut ReportPlanBuilder,
) -> SpecCommandPlan {
    let mut spec_cmd_plan = SpecCommandPlan::default();

    for path_copy in copy_set {
        let Ok(path_rel) = path_copy.strip_prefix(path_dir_src) else {
            builder_plan_report.add_warning(format!(
                "Copy entry outside source root skipped: {}",
                path_copy.display()
            ));
            continue;
        };
        let path_dir_dst_parent = derive_destination_parent(path_dir_dst, path_rel);

        match fs_accessor.classify(path_copy) {
            EnumPathKind::Directory | EnumPathKind::File => {
                spec_cmd_plan.push_copy_pair(path_copy.clone(), path_dir_dst_parent);
            }
            EnumPathKind::Missing => {
                builder_plan_report.add_warning(format!(
                    "Copy entry vanished before emission: {}",
                    path_copy.display()
                ));
            }
        }
    }

    spec_cmd_plan
}

/// Append the trailing `DeleteFiles` operation when `delete_list` is non-empty.
pub fn append_delete_files(spec_cmd_plan: &mut SpecCommandPlan, delete_list: &[String]) {
    if delete_list.is_empty() {
        return;
    }
    spec_cmd_plan.operations.push(EnumCopyOperation::DeleteFiles {
        l_paths_rel: delete_list.to_vec(),
    });
}

/// Emit the copy operations of `spec_selection` followed by its deletions.
pub fn emit_selection<F: FsAccessor + ?Sized>(
    fs_accessor: &F,
    spec_selection: &SpecSelection,
    path_dir_src: &Path,
    path_dir_dst: &Path,
    builder_plan_report: &mut ReportPlanBuilder,
) -> SpecCommandPlan {
    let mut spec_cmd_plan = emit_copy_commands(
        fs_accessor,
        &spec_selection.copy_set,
        path_dir_src,
        path_dir_dst,
        builder_plan_report,
    );
    append_delete_files(&mut spec_cmd_plan, &spec_selection.delete_list);
    spec_cmd_plan
}
