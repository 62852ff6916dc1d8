//! Command line interface for Qt Linguist `.ts` catalogs.

use std::ffi::OsString;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{
    InitError,
    RollingFileAppender,
    Rotation,
};
use tracing_subscriber::EnvFilter;
use ts_catalog::catalog::{
    CatalogError,
    Translator,
    TranslatorSet,
    load_catalog_file,
    save_catalog_file,
    write_catalog,
};
use ts_catalog::catalog::language::detect_language_from_path;
use ts_catalog::check::{
    check_catalog,
    has_errors,
};
use ts_catalog::config::{
    ConfigError,
    ConfigManager,
};
use ts_catalog::indexer::{
    IndexerError,
    WorkspaceIndexer,
};

/// Usage text for `--help`.
const HELP: &str = "\
ts-catalog: inspect Qt Linguist .ts translation catalogs

USAGE:
  ts-catalog [--log-file PATH] <COMMAND>

COMMANDS:
  check [DIR]                 Check every catalog under DIR (default: .)
  lookup TARGET --context C --source S [--comment X] [-n N] [--language L]
                              Translate one string. TARGET is a catalog or a directory
  format FILE [--output OUT]  Re-serialize a catalog in Linguist layout

OPTIONS:
  --log-file PATH             Write logs to PATH instead of stderr (level: RUST_LOG)
  -h, --help                  Print this help
";

/// Exit status for usage, load and I/O failures.
const EXIT_ERROR: u8 = 2;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Args(#[from] pico_args::Error),
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Indexer(#[from] IndexerError),
    #[error("Failed to open log file: {0}")]
    LogFile(#[from] InitError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// `--help`
    Help,
    /// `check [DIR]`
    Check {
        dir: PathBuf,
    },
    /// `lookup TARGET ...`
    Lookup {
        target: PathBuf,
        context: String,
        source: String,
        comment: Option<String>,
        count: Option<i64>,
        language: Option<String>,
    },
    /// `format FILE [--output OUT]`
    Format {
        file: PathBuf,
        output: Option<PathBuf>,
    },
}

/// Rejects arguments nobody consumed.
fn finish(args: pico_args::Arguments) -> Result<(), CliError> {
    let rest: Vec<OsString> = args.finish();
    if rest.is_empty() {
        Ok(())
    } else {
        let rest: Vec<_> = rest.iter().map(|arg| arg.to_string_lossy()).collect();
        Err(CliError::Usage(format!("Unexpected arguments: {}", rest.join(" "))))
    }
}

/// Parses everything after the global options.
fn parse_command(mut args: pico_args::Arguments) -> Result<Command, CliError> {
    if args.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }

    let command = match args.subcommand()?.as_deref() {
        Some("check") => {
            let dir = args.opt_free_from_str()?.unwrap_or_else(|| PathBuf::from("."));
            Command::Check { dir }
        }
        Some("lookup") => {
            let context = args.value_from_str("--context")?;
            let source = args.value_from_str("--source")?;
            let comment = args.opt_value_from_str("--comment")?;
            let count = args.opt_value_from_str(["-n", "--count"])?;
            let language = args.opt_value_from_str("--language")?;
            let target = args.free_from_str()?;
            Command::Lookup { target, context, source, comment, count, language }
        }
        Some("format") => {
            let output = args.opt_value_from_str(["-o", "--output"])?;
            let file = args.free_from_str()?;
            Command::Format { file, output }
        }
        Some(other) => return Err(CliError::Usage(format!("Unknown command '{other}'"))),
        None => return Err(CliError::Usage("Missing command, see --help".to_string())),
    };

    finish(args)?;
    Ok(command)
}

/// Installs the global subscriber. The guard must live until exit so
/// buffered file logs are flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>, CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(log_file) = log_file else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        return Ok(None);
    };

    let file_name = log_file
        .file_name()
        .ok_or_else(|| CliError::Usage(format!("Invalid log file '{}'", log_file.display())))?;
    let directory = log_file.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy().into_owned())
        .build(directory)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).with_ansi(false).init();
    Ok(Some(guard))
}

/// `check`: index a directory and print diagnostics.
async fn run_check(dir: &Path, out: &mut impl Write) -> Result<ExitCode, CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(dir.to_path_buf()))?;

    let indexer = WorkspaceIndexer::new();
    indexer.index_workspace(dir, &config_manager).await?;

    let config = &config_manager.get_settings().diagnostics;
    let catalogs = indexer.catalogs().await;
    let failures = indexer.failures().await;
    let mut failed = !failures.is_empty();
    let mut reported = failures.len();

    for failure in &failures {
        let position = failure.position().map(|p| format!("{p}:")).unwrap_or_default();
        writeln!(
            out,
            "{}:{position} error [malformed]: {}",
            failure.path.display(),
            failure.message()
        )?;
    }

    for entry in &catalogs {
        let diagnostics =
            check_catalog(&entry.catalog, entry.language.as_deref(), Some(&*entry.text), config);
        for diagnostic in &diagnostics {
            writeln!(out, "{}:{diagnostic}", entry.path.display())?;
        }
        reported += diagnostics.len();
        failed |= has_errors(&diagnostics);
    }

    writeln!(out, "{} catalogs checked, {reported} diagnostics", catalogs.len())?;
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// `lookup` against a single catalog file.
fn file_translator(file: &Path, language: Option<String>) -> Result<TranslatorSet, CliError> {
    let catalog = load_catalog_file(file)?;
    let translator = Translator::new(catalog);
    let language = language.or_else(|| {
        translator.language().is_none().then(|| detect_language_from_path(file)).flatten()
    });
    let translator = match language {
        Some(language) => translator.with_language(language),
        None => translator,
    };
    Ok(std::iter::once(translator).collect())
}

/// `lookup` against every catalog of one language in a directory.
async fn directory_translators(
    dir: &Path,
    language: Option<String>,
) -> Result<TranslatorSet, CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(dir.to_path_buf()))?;

    let indexer = WorkspaceIndexer::new();
    indexer.index_workspace(dir, &config_manager).await?;

    let primary_languages = config_manager.get_settings().primary_languages.as_deref();
    let language = indexer
        .select_language(language.as_deref(), primary_languages)
        .await
        .ok_or_else(|| CliError::Usage(format!("No catalogs found in '{}'", dir.display())))?;
    tracing::debug!(language = %language, "Selected language");

    Ok(indexer.translator_set(&language).await)
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = pico_args::Arguments::from_env();
    let log_file: Option<PathBuf> = match args.opt_value_from_str("--log-file") {
        Ok(log_file) => log_file,
        Err(e) => return report_error(&CliError::Args(e)),
    };

    let _guard = match init_tracing(log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => return report_error(&e),
    };

    match run(args).await {
        Ok(code) => code,
        // Without a log file the error log already lands on stderr.
        Err(e) => {
            tracing::error!("{e}");
            if log_file.is_some() { report_error(&e) } else { ExitCode::from(EXIT_ERROR) }
        }
    }
}

/// Prints `error: ...` to stderr.
fn report_error(error: &CliError) -> ExitCode {
    let _ = writeln!(std::io::stderr().lock(), "error: {error}");
    ExitCode::from(EXIT_ERROR)
}

/// Runs one command, writing results to stdout.
async fn run(args: pico_args::Arguments) -> Result<ExitCode, CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match parse_command(args)? {
        Command::Help => {
            out.write_all(HELP.as_bytes())?;
        }
        Command::Check { dir } => return run_check(&dir, &mut out).await,
        Command::Lookup { target, context, source, comment, count, language } => {
            let translators = if target.is_dir() {
                directory_translators(&target, language).await?
            } else {
                file_translator(&target, language)?
            };
            let text = match count {
                Some(n) => translators.translate_plural(&context, &source, comment.as_deref(), n),
                None => translators.translate(&context, &source, comment.as_deref()).into_owned(),
            };
            writeln!(out, "{text}")?;
        }
        Command::Format { file, output } => {
            let catalog = load_catalog_file(&file)?;
            match output {
                Some(output) => save_catalog_file(&catalog, &output)?,
                None => out.write_all(write_catalog(&catalog)?.as_bytes())?,
            }
        }
    }

    out.flush()?;
    Ok(ExitCode::SUCCESS)
}
