//! phast: compiles PHP sources into ES modules.
//!
//! Usage:
//!   phast [options] [file...]
//!
//! Without files, reads `phast.json` from the current directory.

mod tracing_config;

use clap::{ArgAction, Parser as ClapParser};
use miette::{GraphicalReportHandler, LabeledSpan, NamedSource, Severity, SourceSpan};
use phast_compiler::{dump_bound, CompileError, Program};
use phast_core::LineMap;
use phast_diagnostics::{Diagnostic, DiagnosticCategory};
use phast_options::{parse_project_file, CompilerOptions, ProjectConfig, PROJECT_FILE_NAME};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::debug;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_DIAGNOSTICS: i32 = 2;

#[derive(ClapParser, Debug)]
#[command(name = "phast", about = "phast - compiles PHP to JavaScript modules", disable_version_flag = true)]
struct Cli {
    /// PHP files to compile.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to phast.json.
    #[arg(short = 'p', long = "project")]
    project: Option<PathBuf>,

    /// Redirect output to the directory.
    #[arg(long = "out-dir")]
    out_dir: Option<String>,

    /// Do not write outputs.
    #[arg(long = "no-emit")]
    no_emit: bool,

    /// Write the runtime module next to the outputs.
    #[arg(long = "emit-runtime")]
    emit_runtime: bool,

    /// Import specifier of the runtime module.
    #[arg(long = "runtime-module")]
    runtime_module: Option<String>,

    /// Namespace in effect before the first `namespace` statement.
    #[arg(long = "root-namespace")]
    root_namespace: Option<String>,

    /// Print the bound tree of each file instead of compiling.
    #[arg(long = "dump-bound")]
    dump_bound: bool,

    /// Render diagnostics with source snippets.
    #[arg(long, action = ArgAction::Set)]
    pretty: Option<bool>,

    /// Print the compiler version.
    #[arg(short = 'v', long)]
    version: bool,
}

impl Cli {
    /// Options given on the command line; unset flags stay `None`.
    fn option_overrides(&self) -> CompilerOptions {
        CompilerOptions {
            out_dir: self.out_dir.clone(),
            runtime_module: self.runtime_module.clone(),
            root_namespace: self.root_namespace.clone(),
            no_emit: self.no_emit.then_some(true),
            emit_runtime: self.emit_runtime.then_some(true),
            pretty: self.pretty,
        }
    }
}

fn main() {
    tracing_config::init_tracing();
    let cli = Cli::parse();

    if cli.version {
        println!("phast Version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let start = Instant::now();

    let (files, mut options) = match resolve_input(cli) {
        Ok(input) => input,
        Err(message) => {
            print_error(&message);
            return EXIT_FAILURE;
        }
    };
    options.merge(&cli.option_overrides());

    if files.is_empty() {
        print_error("No input files found.");
        return EXIT_FAILURE;
    }

    let mut program = Program::new(files, options);
    if let Err(e) = program.load_root_files() {
        print_error(&e.to_string());
        return EXIT_FAILURE;
    }

    if cli.dump_bound {
        return run_dump_bound(&program);
    }

    let results = program.compile_all();
    let pretty = program.options.pretty();
    let mut diagnostic_count = 0;
    let mut failed = false;
    for (source, result) in program.sources().iter().zip(&results) {
        match result.output {
            Ok(ref output) => {
                diagnostic_count += output.diagnostics.len();
                for diagnostic in &output.diagnostics {
                    print_diagnostic(diagnostic, &source.text, pretty);
                }
            }
            Err(ref e) => {
                print_error(&e.to_string());
                failed = true;
            }
        }
    }

    if let Err(e) = program.emit(&results) {
        print_error(&e.to_string());
        return EXIT_FAILURE;
    }
    debug!(elapsed = ?start.elapsed(), "done");

    if failed {
        return EXIT_FAILURE;
    }
    if diagnostic_count > 0 {
        eprintln!(
            "\nFound {} error{}.",
            diagnostic_count,
            if diagnostic_count == 1 { "" } else { "s" }
        );
        return EXIT_DIAGNOSTICS;
    }
    EXIT_SUCCESS
}

fn run_dump_bound(program: &Program) -> i32 {
    let pretty = program.options.pretty();
    let mut has_diagnostics = false;
    for source in program.sources() {
        let (dump, diagnostics) = dump_bound(&source.file_name, &source.text);
        println!("// {}", source.file_name);
        print!("{}", dump);
        for diagnostic in &diagnostics {
            print_diagnostic(diagnostic, &source.text, pretty);
        }
        has_diagnostics |= !diagnostics.is_empty();
    }
    if has_diagnostics {
        EXIT_DIAGNOSTICS
    } else {
        EXIT_SUCCESS
    }
}

/// Root files and file options. Explicit files win over a project file;
/// `phast.json` in the current directory is used when neither is given.
fn resolve_input(cli: &Cli) -> Result<(Vec<PathBuf>, CompilerOptions), String> {
    let project = match cli.project {
        Some(ref path) => Some(path.clone()),
        None if cli.files.is_empty() && Path::new(PROJECT_FILE_NAME).exists() => {
            Some(PathBuf::from(PROJECT_FILE_NAME))
        }
        None => None,
    };
    let Some(project) = project else {
        return Ok((cli.files.clone(), CompilerOptions::default()));
    };

    let config: ProjectConfig = parse_project_file(&project).map_err(|e| e.to_string())?;
    let options = config.compiler_options();
    if !cli.files.is_empty() {
        return Ok((cli.files.clone(), options));
    }
    let base_dir = project.parent().unwrap_or_else(|| Path::new("."));
    let files = config
        .root_files(base_dir)
        .map_err(|e| CompileError::from(e).to_string())?;
    Ok((files, options))
}

// ============================================================================
// Diagnostic output
// ============================================================================

/// A diagnostic bound to its source text for miette rendering.
#[derive(Debug)]
struct SourceDiagnostic {
    message: String,
    code: u32,
    category: DiagnosticCategory,
    source: NamedSource<String>,
    span: Option<SourceSpan>,
}

impl SourceDiagnostic {
    fn new(diagnostic: &Diagnostic, text: &str) -> Self {
        Self {
            message: diagnostic.message_text.clone(),
            code: diagnostic.code,
            category: diagnostic.category,
            source: NamedSource::new(diagnostic.file.clone().unwrap_or_default(), text.to_string()),
            span: diagnostic
                .span
                .map(|span| SourceSpan::from((span.start as usize, span.length as usize))),
        }
    }
}

impl fmt::Display for SourceDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SourceDiagnostic {}

impl miette::Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("PHP{}", self.code)))
    }

    fn severity(&self) -> Option<Severity> {
        Some(match self.category {
            DiagnosticCategory::Error => Severity::Error,
            DiagnosticCategory::Warning => Severity::Warning,
            DiagnosticCategory::Message => Severity::Advice,
        })
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(None, span))))
    }
}

/// `file(line,col): error PHP{code}: message`, 1-based.
fn format_plain(diagnostic: &Diagnostic, text: &str) -> String {
    let mut result = String::new();
    if let Some(ref file) = diagnostic.file {
        result.push_str(file);
        if let Some(span) = diagnostic.span {
            let position = LineMap::new(text).line_and_column_of(span.start);
            result.push_str(&format!("({},{})", position.line + 1, position.column + 1));
        }
        result.push_str(": ");
    }
    result.push_str(&format!(
        "{} PHP{}: {}",
        diagnostic.category, diagnostic.code, diagnostic.message_text
    ));
    result
}

fn print_diagnostic(diagnostic: &Diagnostic, text: &str, pretty: bool) {
    if pretty {
        let report = SourceDiagnostic::new(diagnostic, text);
        let mut rendered = String::new();
        if GraphicalReportHandler::new()
            .render_report(&mut rendered, &report)
            .is_ok()
        {
            eprintln!("{}", rendered);
            return;
        }
    }
    eprintln!("{}", format_plain(diagnostic, text));
}

fn print_error(message: &str) {
    eprintln!("error: {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use phast_core::TextSpan;

    fn diagnostic_at(start: u32, length: u32) -> Diagnostic {
        Diagnostic {
            file: Some("index.php".to_string()),
            span: Some(TextSpan::new(start, length)),
            message_text: "'break' is only valid inside a loop or switch".to_string(),
            code: 2007,
            category: DiagnosticCategory::Error,
        }
    }

    #[test]
    fn test_plain_format_uses_one_based_positions() {
        let text = "<?php\n  break;\n";
        let line = format_plain(&diagnostic_at(8, 5), text);
        assert_eq!(
            line,
            "index.php(2,3): error PHP2007: 'break' is only valid inside a loop or switch"
        );
    }

    #[test]
    fn test_miette_report_carries_code_and_label() {
        let report = SourceDiagnostic::new(&diagnostic_at(8, 5), "<?php\n  break;\n");
        let code = miette::Diagnostic::code(&report).unwrap().to_string();
        assert_eq!(code, "PHP2007");
        let labels: Vec<_> = miette::Diagnostic::labels(&report).unwrap().collect();
        assert_eq!(labels[0].offset(), 8);
        assert_eq!(labels[0].len(), 5);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "phast",
            "a.php",
            "--out-dir",
            "dist",
            "--emit-runtime",
            "--pretty",
            "false",
            "--runtime-module",
            "php-runtime",
        ])
        .unwrap();
        let overrides = cli.option_overrides();
        assert_eq!(cli.files, vec![PathBuf::from("a.php")]);
        assert_eq!(overrides.out_dir.as_deref(), Some("dist"));
        assert_eq!(overrides.emit_runtime, Some(true));
        assert_eq!(overrides.no_emit, None);
        assert_eq!(overrides.pretty, Some(false));
        assert_eq!(overrides.runtime_module.as_deref(), Some("php-runtime"));
    }

    #[test]
    fn test_explicit_files_skip_project_lookup() {
        let cli = Cli::try_parse_from(["phast", "main.php"]).unwrap();
        let (files, options) = resolve_input(&cli).unwrap();
        assert_eq!(files, vec![PathBuf::from("main.php")]);
        assert_eq!(options, CompilerOptions::default());
    }
}
