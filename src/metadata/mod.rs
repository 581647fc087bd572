//! Project metadata from pyproject.toml

use crate::error::{ErrorExt, PackageError, Result};
use std::path::Path;

/// Project metadata extracted from the `[project]` table of pyproject.toml
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    /// Project name (e.g., "envoy-server")
    pub name: String,

    /// Project version, possibly with a post-release suffix (e.g., "1.36.2.post1")
    pub version: String,

    /// One-line summary from `description`
    pub summary: Option<String>,

    /// License expression, or the `text` of a license table
    pub license: Option<String>,

    /// Python version specifier from `requires-python`
    pub requires_python: Option<String>,
}

impl ProjectManifest {
    /// Wheel distribution name: runs of `-`, `_` and `.` collapse to `_`.
    pub fn distribution_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut last_was_separator = false;
        for ch in self.name.chars() {
            if matches!(ch, '-' | '_' | '.') {
                if !last_was_separator {
                    out.push('_');
                }
                last_was_separator = true;
            } else {
                out.push(ch.to_ascii_lowercase());
                last_was_separator = false;
            }
        }
        out
    }
}

/// Read and parse the `[project]` table of a pyproject.toml file
pub fn load_manifest(path: &Path) -> Result<ProjectManifest> {
    let content = std::fs::read_to_string(path).fs_context("reading project manifest", path)?;
    parse_manifest(&content, path)
}

/// Parse pyproject.toml content; `path` is only used in error messages
pub fn parse_manifest(content: &str, path: &Path) -> Result<ProjectManifest> {
    let toml_value: toml::Value = toml::from_str(content)?;

    let invalid = |reason: &str| PackageError::InvalidManifest {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let project = toml_value
        .get("project")
        .ok_or_else(|| invalid("No [project] table"))?;

    let string_field = |key: &str| project.get(key).and_then(|v| v.as_str()).map(String::from);

    let name = string_field("name").ok_or_else(|| invalid("Missing 'name' in [project]"))?;
    let version =
        string_field("version").ok_or_else(|| invalid("Missing 'version' in [project]"))?;

    let license = match project.get("license") {
        Some(toml::Value::String(expr)) => Some(expr.clone()),
        Some(toml::Value::Table(table)) => table
            .get("text")
            .and_then(|v| v.as_str())
            .map(String::from),
        _ => None,
    };

    Ok(ProjectManifest {
        name,
        version,
        summary: string_field("description"),
        license,
        requires_python: string_field("requires-python"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYPROJECT: &str = r#"
[project]
name = "envoy-server"
version = "1.36.2.post1"
description = "Envoy proxy binaries"
license = { text = "Apache-2.0" }
requires-python = ">=3.9"

[build-system]
requires = ["hatchling"]
"#;

    #[test]
    fn reads_project_table() {
        let manifest = parse_manifest(PYPROJECT, Path::new("pyproject.toml")).unwrap();
        assert_eq!(manifest.name, "envoy-server");
        assert_eq!(manifest.version, "1.36.2.post1");
        assert_eq!(manifest.summary.as_deref(), Some("Envoy proxy binaries"));
        assert_eq!(manifest.license.as_deref(), Some("Apache-2.0"));
        assert_eq!(manifest.requires_python.as_deref(), Some(">=3.9"));
        assert_eq!(manifest.distribution_name(), "envoy_server");
    }

    #[test]
    fn missing_version_is_reported() {
        let err = parse_manifest("[project]\nname = \"x\"\n", Path::new("p.toml")).unwrap_err();
        assert!(err.to_string().contains("Missing 'version'"));
    }

    #[test]
    fn distribution_name_collapses_separators() {
        let manifest = ProjectManifest {
            name: "Envoy.-Server".to_string(),
            version: "1.0.0".to_string(),
            summary: None,
            license: None,
            requires_python: None,
        };
        assert_eq!(manifest.distribution_name(), "envoy_server");
    }
}
