//! phast_options: phast.json parsing and compiler options.
//!
//! Parses `phast.json` project files and provides the [`CompilerOptions`]
//! structure shared by the compiler and the CLI. Every field is optional in
//! the file; the accessors apply defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default import specifier of the runtime module.
pub const DEFAULT_RUNTIME_MODULE: &str = "./php-runtime.mjs";

/// Default project file name.
pub const PROJECT_FILE_NAME: &str = "phast.json";

/// Extension of compilable source files.
pub const SOURCE_EXTENSION: &str = "php";

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid project file '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Compiler options, matching the `compilerOptions` object of phast.json.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub out_dir: Option<String>,
    pub runtime_module: Option<String>,
    pub root_namespace: Option<String>,
    pub no_emit: Option<bool>,
    /// Write the runtime module next to the outputs.
    pub emit_runtime: Option<bool>,
    pub pretty: Option<bool>,
}

impl CompilerOptions {
    pub fn runtime_module(&self) -> &str {
        self.runtime_module.as_deref().unwrap_or(DEFAULT_RUNTIME_MODULE)
    }

    pub fn root_namespace(&self) -> &str {
        self.root_namespace.as_deref().unwrap_or("")
    }

    pub fn no_emit(&self) -> bool {
        self.no_emit.unwrap_or(false)
    }

    pub fn emit_runtime(&self) -> bool {
        self.emit_runtime.unwrap_or(false)
    }

    pub fn pretty(&self) -> bool {
        self.pretty.unwrap_or(true)
    }

    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref().map(Path::new)
    }

    /// Overlay every option set in `overrides` on top of `self`.
    pub fn merge(&mut self, overrides: &CompilerOptions) {
        if overrides.out_dir.is_some() {
            self.out_dir = overrides.out_dir.clone();
        }
        if overrides.runtime_module.is_some() {
            self.runtime_module = overrides.runtime_module.clone();
        }
        if overrides.root_namespace.is_some() {
            self.root_namespace = overrides.root_namespace.clone();
        }
        if overrides.no_emit.is_some() {
            self.no_emit = overrides.no_emit;
        }
        if overrides.emit_runtime.is_some() {
            self.emit_runtime = overrides.emit_runtime;
        }
        if overrides.pretty.is_some() {
            self.pretty = overrides.pretty;
        }
    }
}

/// The phast.json file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub compiler_options: Option<CompilerOptions>,
    /// Source files, relative to the project file.
    pub files: Option<Vec<String>>,
    /// Directories searched recursively for `.php` files.
    pub include: Option<Vec<String>>,
}

impl ProjectConfig {
    pub fn compiler_options(&self) -> CompilerOptions {
        self.compiler_options.clone().unwrap_or_default()
    }

    /// `files` followed by the sources found under `include`, resolved
    /// against `base_dir`. Directory entries are visited in name order.
    pub fn root_files(&self, base_dir: &Path) -> Result<Vec<PathBuf>, OptionsError> {
        let mut result: Vec<PathBuf> = self
            .files
            .iter()
            .flatten()
            .map(|file| base_dir.join(file))
            .collect();
        for dir in self.include.iter().flatten() {
            collect_sources(&base_dir.join(dir), &mut result)?;
        }
        result.dedup();
        Ok(result)
    }
}

fn collect_sources(dir: &Path, result: &mut Vec<PathBuf>) -> Result<(), OptionsError> {
    let io_error = |source| OptionsError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error)?;
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_sources(&path, result)?;
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            result.push(path);
        }
    }
    Ok(())
}

/// Parse a phast.json file from a string.
pub fn parse_project_config(content: &str) -> Result<ProjectConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse a phast.json file from a path.
pub fn parse_project_file(path: &Path) -> Result<ProjectConfig, OptionsError> {
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_project_config(&content).map_err(|source| OptionsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), files = config.files.as_ref().map_or(0, Vec::len), "loaded project file");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompilerOptions::default();
        assert_eq!(options.runtime_module(), "./php-runtime.mjs");
        assert_eq!(options.root_namespace(), "");
        assert!(!options.no_emit());
        assert!(!options.emit_runtime());
        assert!(options.pretty());
        assert!(options.out_dir().is_none());
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut options = CompilerOptions {
            out_dir: Some("dist".into()),
            root_namespace: Some("App".into()),
            ..Default::default()
        };
        options.merge(&CompilerOptions {
            out_dir: Some("build".into()),
            no_emit: Some(true),
            ..Default::default()
        });
        assert_eq!(options.out_dir.as_deref(), Some("build"));
        assert_eq!(options.root_namespace(), "App");
        assert!(options.no_emit());
    }
}
