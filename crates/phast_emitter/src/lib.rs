//! phast_emitter: JavaScript module output.
//!
//! Coordinates the back half of the pipeline:
//! 1. Lower the bound tree (echo, arrays, namespaces, concatenation)
//! 2. Print it as an ES module
//! 3. Compute output paths and write files

use phast_binder::BoundFile;
use phast_core::InternalError;
use phast_printer::{render, PrinterOptions};
use phast_transformers::lower_file;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of every emitted module.
pub const OUTPUT_EXTENSION: &str = ".mjs";

/// File name used for the runtime when the import specifier has none.
pub const DEFAULT_RUNTIME_FILE_NAME: &str = "php-runtime.mjs";

/// The emitter produces output files from bound trees.
pub struct Emitter {
    /// Output directory override. Outputs land next to their source without one.
    pub out_dir: Option<PathBuf>,
    /// Namespace in effect before a file's first `namespace` statement.
    pub root_namespace: String,
    pub printer_options: PrinterOptions,
}

/// The result of emitting a source file.
#[derive(Debug)]
pub struct EmitResult {
    /// The emitted JavaScript content.
    pub js_content: String,
    /// Output file paths.
    pub output_files: Vec<OutputFile>,
}

/// A file produced by the emitter.
#[derive(Debug, Clone)]
pub struct OutputFile {
    /// The output file path.
    pub path: PathBuf,
    /// The content of the file.
    pub text: String,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            out_dir: None,
            root_namespace: String::new(),
            printer_options: PrinterOptions::default(),
        }
    }

    /// Lower and print `file`. Aborts on a tree the printer cannot handle.
    pub fn emit(&self, file: &BoundFile) -> Result<EmitResult, InternalError> {
        let js_content = self.print(file)?;
        let path = self.get_output_path(Path::new(&file.file_name));
        debug!(file = %file.file_name, output = %path.display(), bytes = js_content.len(), "emitted");

        Ok(EmitResult {
            output_files: vec![OutputFile {
                path,
                text: js_content.clone(),
            }],
            js_content,
        })
    }

    /// Lower and print `file` without computing any output path.
    pub fn print(&self, file: &BoundFile) -> Result<String, InternalError> {
        let lowered = lower_file(file, &self.root_namespace);
        render(&lowered, &self.printer_options)
    }

    /// The runtime module placed where the emitted imports expect it.
    pub fn runtime_output(&self, runtime_source: &str) -> OutputFile {
        let file_name = Path::new(&self.printer_options.runtime_module)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".mjs") || name.ends_with(".js"))
            .unwrap_or_else(|| DEFAULT_RUNTIME_FILE_NAME.to_string());
        let base_dir = self.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        OutputFile {
            path: base_dir.join(file_name),
            text: runtime_source.to_string(),
        }
    }

    /// Write output files to disk.
    pub fn write_output_files(&self, files: &[OutputFile]) -> std::io::Result<()> {
        for file in files {
            if let Some(parent) = file.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&file.path, &file.text)?;
        }
        Ok(())
    }

    pub fn get_output_path(&self, source: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap_or_default();
        let base_dir = if let Some(ref out_dir) = self.out_dir {
            out_dir.clone()
        } else {
            source.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
        };
        base_dir.join(format!("{}{}", stem.to_string_lossy(), OUTPUT_EXTENSION))
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let emitter = Emitter::new();
        let path = emitter.get_output_path(Path::new("src/index.php"));
        assert_eq!(path, PathBuf::from("src/index.mjs"));
    }

    #[test]
    fn test_output_path_with_outdir() {
        let mut emitter = Emitter::new();
        emitter.out_dir = Some(PathBuf::from("dist"));
        let path = emitter.get_output_path(Path::new("src/index.php"));
        assert_eq!(path, PathBuf::from("dist/index.mjs"));
    }

    #[test]
    fn test_runtime_output_follows_import_specifier() {
        let mut emitter = Emitter::new();
        emitter.out_dir = Some(PathBuf::from("dist"));
        emitter.printer_options.runtime_module = "./lib/runtime.mjs".to_string();
        let file = emitter.runtime_output("export {};");
        assert_eq!(file.path, PathBuf::from("dist/runtime.mjs"));
        assert_eq!(file.text, "export {};");
    }

    #[test]
    fn test_bare_specifier_uses_default_file_name() {
        let mut emitter = Emitter::new();
        emitter.printer_options.runtime_module = "php-runtime".to_string();
        let file = emitter.runtime_output("");
        assert_eq!(file.path, PathBuf::from("./php-runtime.mjs"));
    }
}
