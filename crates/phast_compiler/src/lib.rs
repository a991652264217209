//! phast_compiler: Compiler orchestration.
//!
//! Runs scan -> parse -> bind -> lower -> print for single sources
//! ([`compile_source`]) and for whole programs ([`Program`]), and embeds the
//! JavaScript runtime that compiled modules import.

use bumpalo::Bump;
use phast_binder::bind;
use phast_core::InternalError;
use phast_diagnostics::{Diagnostic, DiagnosticCollection};
use phast_emitter::{Emitter, OutputFile};
use phast_options::{CompilerOptions, OptionsError};
use phast_parser::parse_source;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// The runtime module compiled output imports.
pub const RUNTIME_SOURCE: &str = include_str!("../runtime/php-runtime.mjs");

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid UTF-8")]
    InvalidUtf8 { path: PathBuf },

    #[error("cannot write output: {0}")]
    Write(#[source] std::io::Error),

    #[error("{file}: {source}")]
    Internal {
        file: String,
        #[source]
        source: InternalError,
    },

    #[error(transparent)]
    Options(#[from] OptionsError),
}

/// Best-effort JavaScript plus everything reported while producing it.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub js: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// The outcome of compiling one file of a [`Program`].
#[derive(Debug)]
pub struct FileResult {
    pub file_name: String,
    pub output: Result<CompileOutput, CompileError>,
}

/// An emitter configured from `options`.
pub fn emitter_for(options: &CompilerOptions) -> Emitter {
    let mut emitter = Emitter::new();
    emitter.out_dir = options.out_dir().map(PathBuf::from);
    emitter.root_namespace = options.root_namespace().to_string();
    emitter.printer_options.runtime_module = options.runtime_module().to_string();
    emitter
}

/// Compile one source text. Diagnostics never fail the compilation; only an
/// internal invariant violation does.
pub fn compile_source(
    file_name: &str,
    text: &str,
    options: &CompilerOptions,
) -> Result<CompileOutput, CompileError> {
    let started = Instant::now();
    let arena = Bump::new();
    let mut diagnostics = DiagnosticCollection::for_file(file_name);

    let file = parse_source(&arena, file_name, text, &mut diagnostics);
    debug!(file = file_name, statements = file.statements.len(), elapsed = ?started.elapsed(), "parsed");

    let bound = bind(&file, &mut diagnostics, None);
    debug!(file = file_name, elapsed = ?started.elapsed(), "bound");

    let js = emitter_for(options)
        .print(&bound)
        .map_err(|source| CompileError::Internal {
            file: file_name.to_string(),
            source,
        })?;
    info!(
        file = file_name,
        diagnostics = diagnostics.len(),
        bytes = js.len(),
        elapsed = ?started.elapsed(),
        "compiled"
    );

    Ok(CompileOutput {
        js,
        diagnostics: diagnostics.into_diagnostics(),
    })
}

/// The bound tree of `text` as an indented dump, plus the diagnostics.
pub fn dump_bound(file_name: &str, text: &str) -> (String, Vec<Diagnostic>) {
    let arena = Bump::new();
    let mut diagnostics = DiagnosticCollection::for_file(file_name);
    let file = parse_source(&arena, file_name, text, &mut diagnostics);
    let bound = bind(&file, &mut diagnostics, None);
    (phast_binder::bound_tree_dump(&bound), diagnostics.into_diagnostics())
}

/// A source file held by a [`Program`].
#[derive(Debug, Clone)]
pub struct SourceText {
    pub file_name: String,
    pub text: String,
}

/// The program represents the entire compilation unit.
pub struct Program {
    /// Compiler options.
    pub options: CompilerOptions,
    /// The root file names.
    pub root_files: Vec<PathBuf>,
    sources: Vec<SourceText>,
}

impl Program {
    /// Create a new program from root files and options.
    pub fn new(root_files: Vec<PathBuf>, options: CompilerOptions) -> Self {
        Self {
            options,
            root_files,
            sources: Vec::new(),
        }
    }

    /// Add a source file to the program.
    pub fn add_source(&mut self, file_name: impl Into<String>, text: impl Into<String>) {
        self.sources.push(SourceText {
            file_name: file_name.into(),
            text: text.into(),
        });
    }

    pub fn sources(&self) -> &[SourceText] {
        &self.sources
    }

    /// Load all root files from disk.
    pub fn load_root_files(&mut self) -> Result<(), CompileError> {
        for path in &self.root_files {
            let bytes = std::fs::read(path).map_err(|source| CompileError::Read {
                path: path.clone(),
                source,
            })?;
            let text = simdutf8::basic::from_utf8(&bytes)
                .map_err(|_| CompileError::InvalidUtf8 { path: path.clone() })?;
            self.sources.push(SourceText {
                file_name: path.to_string_lossy().into_owned(),
                text: text.to_string(),
            });
        }
        debug!(files = self.sources.len(), "loaded root files");
        Ok(())
    }

    /// Compile every source in parallel. Results keep the order sources
    /// were added in.
    pub fn compile_all(&self) -> Vec<FileResult> {
        let started = Instant::now();
        let results: Vec<FileResult> = self
            .sources
            .par_iter()
            .map(|source| FileResult {
                file_name: source.file_name.clone(),
                output: compile_source(&source.file_name, &source.text, &self.options),
            })
            .collect();
        info!(files = results.len(), elapsed = ?started.elapsed(), "compiled program");
        results
    }

    /// Write the output of every successfully compiled file, plus the
    /// runtime module when `emitRuntime` is set. Returns the written paths.
    pub fn emit(&self, results: &[FileResult]) -> Result<Vec<PathBuf>, CompileError> {
        if self.options.no_emit() {
            return Ok(Vec::new());
        }
        let emitter = emitter_for(&self.options);
        let mut files: Vec<OutputFile> = results
            .iter()
            .filter_map(|result| {
                let output = result.output.as_ref().ok()?;
                Some(OutputFile {
                    path: emitter.get_output_path(std::path::Path::new(&result.file_name)),
                    text: output.js.clone(),
                })
            })
            .collect();
        if self.options.emit_runtime() {
            files.push(emitter.runtime_output(RUNTIME_SOURCE));
        }
        emitter.write_output_files(&files).map_err(CompileError::Write)?;
        for file in &files {
            debug!(path = %file.path.display(), "wrote");
        }
        Ok(files.into_iter().map(|file| file.path).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_exports_every_builtin() {
        for symbol in phast_binder::builtins::symbols() {
            let export_name = phast_binder::builtins::export_name(symbol).unwrap();
            assert!(
                RUNTIME_SOURCE.contains(&format!("export function {}(", export_name)),
                "runtime is missing {}",
                export_name
            );
        }
    }

    #[test]
    fn test_emitter_for_applies_options() {
        let options = CompilerOptions {
            out_dir: Some("dist".into()),
            root_namespace: Some("App".into()),
            runtime_module: Some("php-runtime".into()),
            ..Default::default()
        };
        let emitter = emitter_for(&options);
        assert_eq!(emitter.out_dir, Some(PathBuf::from("dist")));
        assert_eq!(emitter.root_namespace, "App");
        assert_eq!(emitter.printer_options.runtime_module, "php-runtime");
    }
}
