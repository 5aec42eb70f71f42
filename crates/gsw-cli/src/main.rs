//! `gsw` binary: watches Gardener shoots and posts changes to a webhook

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgMatches, Command};
use gsw_core::{WatchConfig, Watcher};
use gsw_notify::{LogNotifier, Notifier, WebhookNotifier};
use gsw_observer::GardenerObserver;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("gsw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch Gardener shoots and report changes to a Slack webhook")
        .arg(
            Arg::new("kubeconfig")
                .long("kubeconfig")
                .value_parser(value_parser!(PathBuf))
                .help("Path to a kubeconfig; in-cluster or default config when omitted"),
        )
        .arg(
            Arg::new("slackurl")
                .long("slackurl")
                .help("Incoming webhook URL; messages are only logged when omitted"),
        )
        .arg(
            Arg::new("filename")
                .long("filename")
                .value_parser(value_parser!(PathBuf))
                .help("Snapshot file"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .default_value("60")
                .value_parser(value_parser!(u64))
                .help("Seconds between polls"),
        )
        .arg(
            Arg::new("notify-timeout")
                .long("notify-timeout")
                .default_value("10")
                .value_parser(value_parser!(u64))
                .help("Webhook timeout in seconds"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format"),
        )
}

fn init_logging(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn config_from(matches: &ArgMatches) -> WatchConfig {
    let mut config = WatchConfig::new(
        matches
            .get_one::<PathBuf>("filename")
            .cloned()
            .unwrap_or_default(),
    );

    if let Some(path) = matches.get_one::<PathBuf>("kubeconfig") {
        config = config.with_kubeconfig(path);
    }
    if let Some(url) = matches.get_one::<String>("slackurl").filter(|u| !u.is_empty()) {
        config = config.with_webhook_url(url);
    }
    if let Some(secs) = matches.get_one::<u64>("interval") {
        config = config.with_interval(Duration::from_secs(*secs));
    }
    if let Some(secs) = matches.get_one::<u64>("notify-timeout") {
        config = config.with_notify_timeout(Duration::from_secs(*secs));
    }
    config
}

fn notifier_for(config: &WatchConfig) -> anyhow::Result<Box<dyn Notifier>> {
    match &config.webhook_url {
        Some(url) => {
            let notifier = WebhookNotifier::with_timeout(url.clone(), config.notify_timeout)
                .context("failed to build webhook client")?;
            Ok(Box::new(notifier))
        }
        None => {
            tracing::warn!("no webhook url given, notifications are only logged");
            Ok(Box::new(LogNotifier))
        }
    }
}

/// Signals that stop the watcher
#[cfg(unix)]
fn shutdown_signals() -> [(&'static str, tokio::signal::unix::SignalKind); 4] {
    use tokio::signal::unix::SignalKind;

    [
        ("SIGINT", SignalKind::interrupt()),
        ("SIGTERM", SignalKind::terminate()),
        ("SIGHUP", SignalKind::hangup()),
        ("SIGQUIT", SignalKind::quit()),
    ]
}

/// Cancel `cancel` on the first shutdown signal
#[cfg(unix)]
fn install_shutdown_handlers(cancel: &CancellationToken) -> anyhow::Result<()> {
    use tokio::signal::unix::signal;

    for (name, kind) in shutdown_signals() {
        let mut stream = signal(kind).with_context(|| format!("failed to install {name} handler"))?;
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if stream.recv().await.is_some() {
                tracing::info!("{name} detected");
                cancel.cancel();
            }
        });
    }
    Ok(())
}

/// Cancel `cancel` on Ctrl-C
#[cfg(not(unix))]
fn install_shutdown_handlers(cancel: &CancellationToken) -> anyhow::Result<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C detected");
            cancel.cancel();
        }
    });
    Ok(())
}

async fn run(config: WatchConfig) -> anyhow::Result<()> {
    config.validate().context("invalid arguments")?;

    let observer = GardenerObserver::connect(config.kubeconfig.as_deref())
        .await
        .context("failed to connect to the garden cluster")?;
    let notifier = notifier_for(&config)?;
    let mut watcher = Watcher::new(&config, observer, notifier)?;

    let cancel = CancellationToken::new();
    install_shutdown_handlers(&cancel)?;

    watcher.run(cancel).await?;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Parse arguments; `Err` carries the exit status, 1 for usage errors
fn parse_args(cli: Command, args: impl IntoIterator<Item = String>) -> Result<ArgMatches, u8> {
    cli.try_get_matches_from(args).map_err(|e| {
        let _ = e.print();
        if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
            0
        } else {
            1
        }
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = match parse_args(cli(), std::env::args()) {
        Ok(matches) => matches,
        Err(code) => return ExitCode::from(code),
    };
    let format = matches
        .get_one::<String>("log-format")
        .map_or("text", String::as_str);
    init_logging(format);

    match run(config_from(&matches)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("gsw exited: {e:#}");
            ExitCode::FAILURE
        }
    }
}
