#![deny(unsafe_code)]

//! yasync-cli: command-line client for the synchronization daemon's REST API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use yasync_core::{
    DispatchError, Dispatcher, Endpoint, Error, Overrides, SessionDescriptor, StatusPolicy,
    build_info, format, ops,
};

/// Yet another command-line tool for the synchronization daemon.
#[derive(Debug, Parser)]
#[command(name = "yasync-cli", version = build_info::LONG_VERSION, about, long_about = None)]
struct Cli {
    /// Path to the daemon's configuration file.
    #[arg(short, long, default_value = yasync_config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Server address, overriding the one in the config file.
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// API key, overriding the one in the config file.
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value = "5", value_parser = parse_timeout)]
    timeout: Duration,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show brief information obtained from the config file.
    Show,

    /// Show the server's recent log messages.
    Log,

    /// Scan a directory or file to trigger synchronization.
    Scan {
        /// Directory or file inside a monitored folder.
        path: PathBuf,
    },

    /// Check whether the config file matches the running server.
    Check,

    /// Send a GET request to the server. Useful for debugging.
    Get {
        /// GET endpoint, e.g. `system/status`.
        endpoint: String,

        /// Query parameters.
        #[arg(value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Send a POST request to the server. Useful for debugging.
    Post {
        /// POST endpoint, e.g. `db/scan`.
        endpoint: String,

        /// Query parameters.
        #[arg(value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_file.as_deref())?;
    debug!(command = ?cli.command, "executing command");

    let overrides = Overrides {
        url: cli.url.clone(),
        api_key: cli.api_key.clone(),
    };
    let session = SessionDescriptor::resolve(&cli.config, &overrides)?;

    match cli.command {
        Commands::Show => cmd_show(&session),
        Commands::Log => cmd_log(&session, cli.timeout).await?,
        Commands::Scan { path } => cmd_scan(&session, &path, cli.timeout).await?,
        Commands::Check => cmd_check(&session, cli.timeout).await?,
        Commands::Get { endpoint, params } => {
            cmd_get(&session, &endpoint, &params, cli.timeout).await?
        }
        Commands::Post { endpoint, params } => {
            cmd_post(&session, &endpoint, &params, cli.timeout).await?
        }
    }

    debug!("done");
    Ok(())
}

fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn cmd_show(session: &SessionDescriptor) {
    print!("{session}");
}

async fn cmd_log(session: &SessionDescriptor, timeout: Duration) -> Result<()> {
    let dispatcher = Dispatcher::new(session)?;
    let log = ops::fetch_log(&dispatcher, timeout).await?;
    print!("{}", format::format_log(&log));
    Ok(())
}

async fn cmd_scan(session: &SessionDescriptor, path: &Path, timeout: Duration) -> Result<()> {
    let dispatcher = Dispatcher::new(session)?;
    let location = ops::scan(&dispatcher, path, timeout).await?;
    match &location.sub_path {
        Some(sub) => println!("Scan requested: folder {} ({sub})", location.folder_id),
        None => println!("Scan requested: folder {}", location.folder_id),
    }
    Ok(())
}

async fn cmd_check(session: &SessionDescriptor, timeout: Duration) -> Result<()> {
    let dispatcher = Dispatcher::new(session)?;
    match ops::check(&dispatcher, timeout).await {
        Ok(report) => {
            print!("{report}");
            if !report.is_consistent() {
                bail!(
                    "{} does not match the running server",
                    session.config_path().display()
                );
            }
            info!(
                folders = report.folders_checked,
                "configuration is consistent"
            );
            Ok(())
        }
        Err(Error::Dispatch(DispatchError::Connection { .. })) => bail!(
            "cannot connect to the server at {}; is the daemon running?",
            session.base_url()
        ),
        Err(Error::Dispatch(DispatchError::Auth { status, .. })) => bail!(
            "the server at {} rejected the API key ({status}); does {} belong to this server?",
            session.base_url(),
            session.config_path().display()
        ),
        Err(e) => Err(e.into()),
    }
}

async fn cmd_get(
    session: &SessionDescriptor,
    endpoint: &str,
    params: &[(String, String)],
    timeout: Duration,
) -> Result<()> {
    let dispatcher = Dispatcher::new(session)?;
    let body = dispatcher
        .get(&Endpoint::new(endpoint), params, timeout)
        .await?;
    print_json(&body)
}

async fn cmd_post(
    session: &SessionDescriptor,
    endpoint: &str,
    params: &[(String, String)],
    timeout: Duration,
) -> Result<()> {
    let dispatcher = Dispatcher::new(session)?;
    let reply = dispatcher
        .post(
            &Endpoint::new(endpoint),
            params,
            timeout,
            StatusPolicy::Escalate,
        )
        .await?;
    if !reply.body.is_null() {
        print_json(&reply.body)?;
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a `KEY=VALUE` argument, splitting at the first `=`.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("invalid number of seconds: {s:?}"))?;
    if secs <= 0.0 {
        return Err("timeout must be positive".to_string());
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;
    use yasync_test_utils::config::TestConfigBuilder;
    use yasync_test_utils::daemon::MockDaemon;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("folder=abcde-12345").unwrap(),
            ("folder".to_string(), "abcde-12345".to_string())
        );
        assert_eq!(
            parse_key_val("sub=a=b").unwrap(),
            ("sub".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue=").is_err());
        assert!(parse_key_val("=nokey").is_err());
        assert!(parse_key_val("plain").is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("0.5").unwrap(), Duration::from_millis(500));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("soon").is_err());
        assert!(parse_timeout("NaN").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["yasync-cli", "show"]).unwrap();
        assert_eq!(
            cli.config,
            PathBuf::from(yasync_config::DEFAULT_CONFIG_PATH)
        );
        assert_eq!(cli.timeout, Duration::from_secs(5));
        assert!(cli.url.is_none());
        assert!(cli.api_key.is_none());
        assert!(matches!(cli.command, Commands::Show));
    }

    #[test]
    fn test_get_with_params() {
        let cli = Cli::try_parse_from([
            "yasync-cli",
            "--url",
            "https://203.0.113.5:8384",
            "--api-key",
            "k",
            "get",
            "db/status",
            "folder=abcde-12345",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://203.0.113.5:8384"));
        match cli.command {
            Commands::Get { endpoint, params } => {
                assert_eq!(endpoint, "db/status");
                assert_eq!(
                    params,
                    vec![("folder".to_string(), "abcde-12345".to_string())]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_malformed_param() {
        assert!(Cli::try_parse_from(["yasync-cli", "post", "db/scan", "folder"]).is_err());
    }

    #[test]
    fn test_scan_requires_path() {
        assert!(Cli::try_parse_from(["yasync-cli", "scan"]).is_err());
    }

    fn session_for(daemon: &MockDaemon, key: &str) -> (TempDir, SessionDescriptor) {
        let (tmp, config) = TestConfigBuilder::new()
            .address(&daemon.address())
            .api_key(key)
            .write_temp();
        let session = SessionDescriptor::resolve(&config, &Overrides::none()).unwrap();
        (tmp, session)
    }

    #[tokio::test]
    async fn test_check_explains_rejected_key() {
        let daemon = MockDaemon::start("right").await;
        let (_tmp, session) = session_for(&daemon, "wrong");

        let err = cmd_check(&session, TIMEOUT).await.unwrap_err();
        assert!(err.to_string().contains("rejected the API key"), "{err}");
    }

    #[tokio::test]
    async fn test_check_explains_unreachable_server() {
        // Bind and release a port so nothing is listening on it.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let (_tmp, config) = TestConfigBuilder::new()
            .address(&format!("127.0.0.1:{port}"))
            .write_temp();
        let session = SessionDescriptor::resolve(&config, &Overrides::none()).unwrap();

        let err = cmd_check(&session, TIMEOUT).await.unwrap_err();
        assert!(err.to_string().contains("is the daemon running"), "{err}");
        assert!(
            err.to_string().contains(&format!("127.0.0.1:{port}")),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_check_fails_on_drift() {
        let daemon = MockDaemon::start("k").await;
        daemon.set_config(json!({ "folders": [{ "id": "x", "label": "X", "path": "/srv/x" }] }));
        let (_tmp, session) = session_for(&daemon, "k");

        let err = cmd_check(&session, TIMEOUT).await.unwrap_err();
        let message = err.to_string();
        assert!(
            message.contains("does not match the running server"),
            "{message}"
        );
    }

    #[tokio::test]
    async fn test_post_illegal_endpoint() {
        let daemon = MockDaemon::start("k").await;
        let (_tmp, session) = session_for(&daemon, "k");

        let err = cmd_post(&session, "systemart", &[], TIMEOUT)
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("not a legal POST endpoint"),
            "{err}"
        );
        assert!(daemon.requests().is_empty());
    }
}
