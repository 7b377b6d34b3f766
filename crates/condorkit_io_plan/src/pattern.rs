//! Exclude pattern compilation and matching.
//!
//! Patterns are `/`-separated segments relative to the source root. Matching is
//! always done against the candidate's root-relative path, never the absolute
//! one, so components of the source root itself can not produce a hit.

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumExcludeMatchMode, PlanError};

////////////////////////////////////////////////////////////////////////////////
// #region SegmentMatchers

#[derive(Debug, Clone)]
pub(crate) enum TypeSegmentMatcher {
    Literal(String),
    Glob(GlobMatcher),
    Regex(Regex),
}

impl TypeSegmentMatcher {
    fn is_match(&self, component: &str) -> bool {
        match self {
            Self::Literal(v) => v == component,
            Self::Glob(v) => v.is_match(component),
            Self::Regex(v) => v.is_match(component),
        }
    }
}

fn _compile_segment(
    raw: &str,
    segment: &str,
    rule_match: EnumExcludeMatchMode,
) -> Result<TypeSegmentMatcher, PlanError> {
    match rule_match {
        EnumExcludeMatchMode::Segment | EnumExcludeMatchMode::Substring => {
            Ok(TypeSegmentMatcher::Literal(segment.to_string()))
        }
        EnumExcludeMatchMode::Glob => {
            let matcher = Glob::new(segment)
                .map_err(|e| PlanError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: format!("invalid glob segment `{segment}`: {e}"),
                })?
                .compile_matcher();
            Ok(TypeSegmentMatcher::Glob(matcher))
        }
        EnumExcludeMatchMode::Regex => {
            let c_anchored = format!("^(?:{segment})$");
            let regex = Regex::new(&c_anchored).map_err(|e| PlanError::InvalidPattern {
                pattern: raw.to_string(),
                reason: format!("invalid regex segment `{segment}`: {e}"),
            })?;
            Ok(TypeSegmentMatcher::Regex(regex))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExcludePattern

/// A compiled exclude pattern.
#[derive(Debug, Clone)]
pub struct SpecExcludePattern {
    raw: String,
    segments: Vec<String>,
    matchers: Vec<TypeSegmentMatcher>,
    rule_match: EnumExcludeMatchMode,
}

impl SpecExcludePattern {
    /// Validate and compile `raw`.
    ///
    /// Rejects empty patterns, a leading `/` and empty interior segments. A
    /// single trailing `/` is dropped.
    pub fn compile(raw: &str, rule_match: EnumExcludeMatchMode) -> Result<Self, PlanError> {
        let invalid = |reason: &str| PlanError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if raw.starts_with('/') {
            return Err(invalid("pattern must be relative to the source root"));
        }
        let c_trimmed = raw.strip_suffix('/').unwrap_or(raw);
        let segments: Vec<String> = c_trimmed.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(invalid("pattern contains an empty segment"));
        }

        let mut matchers = Vec::with_capacity(segments.len());
        for segment in &segments {
            matchers.push(_compile_segment(raw, segment, rule_match)?);
        }

        Ok(Self {
            raw: c_trimmed.to_string(),
            segments,
            matchers,
            rule_match,
        })
    }

    /// Pattern text (trailing `/` removed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of levels below a top-level entry that must be enumerated.
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// Whether the first segment applies to the top-level entry `name_entry`.
    ///
    /// Entries for which no pattern gets a first-segment hit are copied whole
    /// without further inspection.
    pub fn is_first_segment_hit(&self, name_entry: &str) -> bool {
        match self.rule_match {
            EnumExcludeMatchMode::Substring => name_entry.contains(self.segments[0].as_str()),
            _ => self.matchers[0].is_match(name_entry),
        }
    }

    /// Whether the candidate, given as its root-relative components, is
    /// excluded by this pattern.
    pub fn matches(&self, components_rel: &[String]) -> bool {
        match self.rule_match {
            EnumExcludeMatchMode::Substring => components_rel.join("/").contains(self.raw.as_str()),
            _ => {
                components_rel.len() >= self.matchers.len()
                    && self
                        .matchers
                        .iter()
                        .zip(components_rel)
                        .all(|(matcher, component)| matcher.is_match(component))
            }
        }
    }
}

/// Compile every raw pattern, splitting accepted patterns from rejected ones.
pub fn compile_exclude_patterns(
    l_raw: &[String],
    rule_match: EnumExcludeMatchMode,
) -> (Vec<SpecExcludePattern>, Vec<PlanError>) {
    let mut l_patterns = Vec::with_capacity(l_raw.len());
    let mut l_errors = Vec::new();
    for raw in l_raw {
        match SpecExcludePattern::compile(raw, rule_match) {
            Ok(pattern) => l_patterns.push(pattern),
            Err(e) => l_errors.push(e),
        }
    }
    (l_patterns, l_errors)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{SpecExcludePattern, compile_exclude_patterns};
    use crate::spec::{EnumExcludeMatchMode, PlanError};

    fn comps(txt: &str) -> Vec<String> {
        txt.split('/').map(str::to_string).collect()
    }

    fn compile(raw: &str, rule_match: EnumExcludeMatchMode) -> SpecExcludePattern {
        SpecExcludePattern::compile(raw, rule_match).expect("valid pattern")
    }

    #[test]
    fn depth_counts_slashes() {
        let rule = EnumExcludeMatchMode::Segment;
        assert_eq!(compile("out", rule).depth(), 0);
        assert_eq!(compile("photonjetsignal/.git", rule).depth(), 1);
        assert_eq!(compile("a/b/c", rule).depth(), 2);
        assert_eq!(compile("a/b/", rule).depth(), 1);
    }

    #[test]
    fn segment_mode_does_not_match_partial_names() {
        let pattern = compile("run", EnumExcludeMatchMode::Segment);
        assert!(pattern.is_first_segment_hit("run"));
        assert!(!pattern.is_first_segment_hit("myrun"));
        assert!(pattern.matches(&comps("run")));
        assert!(pattern.matches(&comps("run/inner")));
        assert!(!pattern.matches(&comps("myrun")));
    }

    #[test]
    fn substring_mode_keeps_loose_containment() {
        let pattern = compile("run", EnumExcludeMatchMode::Substring);
        assert!(pattern.is_first_segment_hit("myrun"));
        assert!(pattern.matches(&comps("myrun")));

        let pattern_deep = compile("c/d", EnumExcludeMatchMode::Substring);
        assert!(pattern_deep.is_first_segment_hit("c"));
        assert!(pattern_deep.matches(&comps("c/d")));
        assert!(!pattern_deep.matches(&comps("c/e")));
    }

    #[test]
    fn deep_segment_pattern_needs_full_prefix() {
        let pattern = compile("c/d", EnumExcludeMatchMode::Segment);
        assert!(pattern.is_first_segment_hit("c"));
        assert!(!pattern.matches(&comps("c")));
        assert!(pattern.matches(&comps("c/d")));
        assert!(!pattern.matches(&comps("c/e")));
        assert!(!pattern.matches(&comps("x/c/d")));
    }

    #[test]
    fn glob_and_regex_segments() {
        let pattern_glob = compile("pkg/__pycache__*", EnumExcludeMatchMode::Glob);
        assert!(pattern_glob.matches(&comps("pkg/__pycache__")));
        assert!(!pattern_glob.matches(&comps("pkg/src")));

        let pattern_regex = compile(r"run_\d+", EnumExcludeMatchMode::Regex);
        assert!(pattern_regex.is_first_segment_hit("run_01"));
        assert!(!pattern_regex.is_first_segment_hit("run_01_old"));
    }

    #[test]
    fn malformed_patterns_rejected() {
        for raw in ["", "   ", "/abs", "a//b"] {
            let err = SpecExcludePattern::compile(raw, EnumExcludeMatchMode::Segment)
                .expect_err("must fail");
            assert!(matches!(err, PlanError::InvalidPattern { .. }));
        }

        let err = SpecExcludePattern::compile("[", EnumExcludeMatchMode::Glob)
            .expect_err("invalid glob must fail");
        assert!(matches!(err, PlanError::InvalidPattern { .. }));

        let err = SpecExcludePattern::compile("(", EnumExcludeMatchMode::Regex)
            .expect_err("invalid regex must fail");
        assert!(matches!(err, PlanError::InvalidPattern { .. }));
    }

    #[test]
    fn compile_many_splits_good_and_bad() {
        let l_raw = vec!["out".to_string(), "/bad".to_string(), "a/b".to_string()];
        let (l_patterns, l_errors) =
            compile_exclude_patterns(&l_raw, EnumExcludeMatchMode::Segment);

        assert_eq!(
            l_patterns.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            vec!["out", "a/b"]
        );
        assert_eq!(l_errors.len(), 1);
    }
}
