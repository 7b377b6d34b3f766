//! Planning report model and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecPlanDiagnostic;

/// Aggregate counters and diagnostics for one planning pass.
#[derive(Debug, Default, Clone)]
pub struct ReportPlan {
    /// Entries inspected (top-level entries plus enumerated descendants).
    pub cnt_scanned: u64,
    /// Entries left in the final copy set.
    pub cnt_selected: u64,
    /// Entries placed in the excluded set.
    pub cnt_excluded: u64,
    /// Explicit include specs turned into operations.
    pub cnt_included: u64,
    /// Non-fatal warnings (missing includes, vanished entries).
    pub warnings: Vec<String>,
    /// Non-fatal errors (rejected patterns).
    pub errors: Vec<SpecPlanDiagnostic>,
}

impl ReportPlan {
    /// Number of collected errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_selected".to_string(), self.cnt_selected);
        dict_counts.insert("cnt_excluded".to_string(), self.cnt_excluded);
        dict_counts.insert("cnt_included".to_string(), self.cnt_included);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} scanned={} selected={} excluded={} included={} errors={} warnings={}",
            self.cnt_scanned,
            self.cnt_selected,
            self.cnt_excluded,
            self.cnt_included,
            self.error_count(),
            self.warning_count()
        )
    }

    /// Fold another report (e.g. the include pass) into this one.
    pub fn merge(&mut self, other: ReportPlan) {
        self.cnt_scanned += other.cnt_scanned;
        self.cnt_selected += other.cnt_selected;
        self.cnt_excluded += other.cnt_excluded;
        self.cnt_included += other.cnt_included;
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for ReportPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[PLAN]"))
    }
}

/// Mutable accumulator for planning statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportPlanBuilder {
    /// See [`ReportPlan::cnt_scanned`].
    pub cnt_scanned: u64,
    /// See [`ReportPlan::cnt_selected`].
    pub cnt_selected: u64,
    /// See [`ReportPlan::cnt_excluded`].
    pub cnt_excluded: u64,
    /// See [`ReportPlan::cnt_included`].
    pub cnt_included: u64,
    /// See [`ReportPlan::warnings`].
    pub warnings: Vec<String>,
    /// See [`ReportPlan::errors`].
    pub errors: Vec<SpecPlanDiagnostic>,
}

impl ReportPlanBuilder {
    /// Increment scanned count by `value`.
    pub fn add_scanned(&mut self, value: u64) {
        self.cnt_scanned += value;
    }

    /// Increment excluded count by one.
    pub fn add_excluded(&mut self) {
        self.cnt_excluded += 1;
    }

    /// Increment included count by one.
    pub fn add_included(&mut self) {
        self.cnt_included += 1;
    }

    /// Overwrite the selected count once the copy set is final.
    pub fn set_selected(&mut self, value: u64) {
        self.cnt_selected = value;
    }

    /// Add warning message and mirror it to the log.
    pub fn add_warning(&mut self, warning: String) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Add one path-scoped error and mirror it to the log.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        tracing::warn!(path = %path.display(), "{exception}");
        self.errors.push(SpecPlanDiagnostic { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportPlan {
        ReportPlan {
            cnt_scanned: self.cnt_scanned,
            cnt_selected: self.cnt_selected,
            cnt_excluded: self.cnt_excluded,
            cnt_included: self.cnt_included,
            warnings: self.warnings,
            errors: self.errors,
        }
    }
}
