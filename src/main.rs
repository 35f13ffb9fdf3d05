//! blackd-client - CLI entry point
//!
//! Parses arguments, merges them with the settings file, runs the worker
//! pool against the configured daemons and turns the report into the
//! process exit code.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use blackd_client::config::{ConfigError, ConfigLoader, Settings};
use blackd_client::{
    logging, Endpoint, FormatOptions, HttpTransport, Mode, RunConfig, RunError, Transport,
    Verbosity, EXIT_ERROR,
};
use clap::builder::RangedU64ValueParser;
use clap::Parser;

/// Format Python files through running blackd daemons
#[derive(Parser, Debug)]
#[command(name = "blackd-client")]
#[command(version, about = "Format Python files through running blackd daemons")]
struct Cli {
    /// Daemon port; repeat or comma-separate to spread work over several daemons
    #[arg(
        short,
        long = "port",
        env = "BLACKD_PORT",
        value_delimiter = ',',
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    ports: Vec<u16>,

    /// Host the daemons listen on
    #[arg(long, env = "BLACKD_HOST")]
    host: Option<String>,

    /// Print a diff for each changed file instead of rewriting it
    #[arg(long)]
    diff: bool,

    /// Don't write files back; exit 1 if any file would change
    #[arg(long)]
    check: bool,

    /// Concurrent requests per daemon
    #[arg(
        short = 'j',
        long,
        env = "BLACKD_MAX_CONCURRENCY",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    max_concurrency: Option<usize>,

    /// Per-request timeout, e.g. "5s" or "1500ms"
    #[arg(long, env = "BLACKD_TIMEOUT", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// How many characters per line to allow
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    line_length: Option<u16>,

    /// Python versions the output must support (e.g. py311)
    #[arg(long = "target-version", value_delimiter = ',')]
    target_versions: Vec<String>,

    /// Don't normalize string quotes or prefixes
    #[arg(long)]
    skip_string_normalization: bool,

    /// Don't use trailing commas as a reason to split lines
    #[arg(long)]
    skip_magic_trailing_comma: bool,

    /// Enable preview style
    #[arg(long)]
    preview: bool,

    /// Skip the AST safety checks
    #[arg(long)]
    fast: bool,

    /// Also report files that were already formatted
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// Settings file to use instead of the default location
    #[arg(long, env = "BLACKD_CLIENT_CONFIG")]
    config: Option<PathBuf>,

    /// Files and directories to format
    #[arg(value_name = "SRC", required = true)]
    sources: Vec<PathBuf>,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let settings = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let config = match resolve(cli, &settings) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match execute(config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Merges CLI (flags and environment) over the settings file.
fn resolve(cli: Cli, settings: &Settings) -> Result<RunConfig, ConfigError> {
    let verbosity = cli.verbosity();
    let host = cli.host.unwrap_or_else(|| settings.daemon.host.clone());
    if host.trim().is_empty() {
        return Err(ConfigError::Invalid {
            key: "host",
            message: "host must not be empty".to_string(),
        });
    }
    let ports = if cli.ports.is_empty() {
        settings.daemon.ports.clone()
    } else {
        cli.ports
    };
    let timeout = match cli.timeout {
        Some(timeout) => timeout,
        None => settings.daemon.timeout()?,
    };

    let file = FormatOptions::from(&settings.format);
    let format = FormatOptions {
        line_length: cli.line_length.or(file.line_length),
        target_versions: if cli.target_versions.is_empty() {
            file.target_versions
        } else {
            cli.target_versions
        },
        skip_string_normalization: cli.skip_string_normalization
            || file.skip_string_normalization,
        skip_magic_trailing_comma: cli.skip_magic_trailing_comma
            || file.skip_magic_trailing_comma,
        preview: cli.preview || file.preview,
        fast: cli.fast || file.fast,
    };

    let endpoints = ports
        .into_iter()
        .map(|port| Endpoint::new(host.clone(), port))
        .collect();
    let mut config = RunConfig::new(endpoints, cli.sources);
    config.mode = Mode {
        check: cli.check,
        diff: cli.diff,
    };
    config.max_concurrency = cli
        .max_concurrency
        .unwrap_or(settings.daemon.max_concurrency);
    config.timeout = timeout;
    config.format = format;
    config.verbosity = verbosity;
    Ok(config)
}

/// Runs the pool to completion and prints the summary.
fn execute(config: RunConfig) -> Result<u8, RunError> {
    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(config.timeout, config.max_concurrency)
            .map_err(|e| RunError::Client(e.to_string()))?,
    );
    let verbosity = config.verbosity;
    tracing::debug!(
        "{} endpoint(s), {} worker(s)",
        config.endpoints.len(),
        config.worker_count()
    );

    let runtime = tokio::runtime::Runtime::new().map_err(|e| RunError::Runtime(e.to_string()))?;
    let result = runtime.block_on(blackd_client::run(Arc::new(config), transport));
    // A fatal error may leave the traversal thread running; don't wait for it.
    runtime.shutdown_background();

    let report = result?;
    report.emit(verbosity);
    Ok(report.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["blackd-client"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments should parse")
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sources_are_required() {
        assert!(Cli::try_parse_from(["blackd-client"]).is_err());
    }

    #[test]
    fn defaults_come_from_settings() {
        let config = resolve(parse(&["src"]), &Settings::default()).expect("resolve");
        assert_eq!(config.endpoints, vec![Endpoint::local(45484)]);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.mode, Mode::default());
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert_eq!(config.sources, vec![PathBuf::from("src")]);
    }

    #[test]
    fn ports_repeat_and_split_on_commas() {
        let cli = parse(&["-p", "9000", "--port", "9001,9002", "src"]);
        assert_eq!(cli.ports, vec![9000, 9001, 9002]);
        let config = resolve(cli, &Settings::default()).expect("resolve");
        assert_eq!(config.endpoints.len(), 3);
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn port_zero_is_rejected() {
        assert!(Cli::try_parse_from(["blackd-client", "-p", "0", "src"]).is_err());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(Cli::try_parse_from(["blackd-client", "-j", "0", "src"]).is_err());
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["blackd-client", "-v", "-q", "src"]).is_err());
    }

    #[test]
    fn timeout_is_human_readable() {
        let cli = parse(&["--timeout", "1500ms", "src"]);
        assert_eq!(cli.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn cli_overrides_settings_file() {
        let mut settings = Settings::default();
        settings.daemon.ports = vec![7000];
        settings.daemon.max_concurrency = 2;
        settings.daemon.host = "10.0.0.1".to_string();
        settings.format.line_length = Some(79);

        let cli = parse(&[
            "-p",
            "8000",
            "-j",
            "6",
            "--host",
            "localhost",
            "--line-length",
            "100",
            "src",
        ]);
        let config = resolve(cli, &settings).expect("resolve");
        assert_eq!(config.endpoints, vec![Endpoint::new("localhost", 8000)]);
        assert_eq!(config.max_concurrency, 6);
        assert_eq!(config.format.line_length, Some(100));
    }

    #[test]
    fn settings_file_fills_unset_flags() {
        let mut settings = Settings::default();
        settings.daemon.ports = vec![7000, 7001];
        settings.daemon.timeout = "2s".to_string();
        settings.format.target_versions = vec!["py311".to_string()];
        settings.format.preview = true;

        let config = resolve(parse(&["--fast", "src"]), &settings).expect("resolve");
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.format.target_versions, vec!["py311".to_string()]);
        assert!(config.format.preview);
        assert!(config.format.fast);
    }

    #[test]
    fn mode_and_verbosity_flags() {
        let config =
            resolve(parse(&["--check", "--diff", "-q", "a.py"]), &Settings::default())
                .expect("resolve");
        assert!(config.mode.check);
        assert!(config.mode.diff);
        assert_eq!(config.verbosity, Verbosity::Quiet);

        let config = resolve(parse(&["-v", "a.py"]), &Settings::default()).expect("resolve");
        assert_eq!(config.verbosity, Verbosity::Verbose);
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = resolve(parse(&["--host", " ", "src"]), &Settings::default())
            .expect_err("empty host");
        assert!(matches!(err, ConfigError::Invalid { key: "host", .. }));
    }
}
