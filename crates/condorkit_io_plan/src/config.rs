//! Include/exclude configuration loading.

use std::fs;
use std::path::Path;

use crate::spec::{PlanError, SpecIncludeExcludeConfig};

/// Load a [`SpecIncludeExcludeConfig`] from a `.toml`, `.yaml`/`.yml` or
/// `.json` file. Missing keys default to empty lists.
///
/// ```toml
/// include = ["JOs", ["/eos/ffs/comb", ""]]
/// exclude = ["output", "pkg/.git"]
/// ```
pub fn load_include_exclude_config(path: &Path) -> Result<SpecIncludeExcludeConfig, PlanError> {
    let c_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|v| matches!(v.as_str(), "toml" | "yaml" | "yml" | "json"));
    let Some(c_ext) = c_ext else {
        return Err(PlanError::UnsupportedConfigFormat(path.to_path_buf()));
    };

    let content = fs::read_to_string(path).map_err(|source| PlanError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_include_exclude_config(&content, &c_ext).map_err(|message| PlanError::ConfigParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse config text in the format named by `c_format` (a file extension).
pub fn parse_include_exclude_config(
    content: &str,
    c_format: &str,
) -> Result<SpecIncludeExcludeConfig, String> {
    match c_format {
        "toml" => toml::from_str(content).map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        "json" => serde_json::from_str(content).map_err(|e| e.to_string()),
        other => Err(format!("unknown config format `{other}`")),
    }
}
