mod config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use console::{style, Term};
use tracing_subscriber::{fmt, EnvFilter};

use watch_core::{notify, Dispatcher, HttpProber, MailgunNotifier, VoipMsNotifier, Watcher};

use crate::config::{Cli, LogFormat, Settings};

fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("PAGE_WATCH_GIT_HASH");

    if GIT_HASH.is_empty() {
        VERSION
    } else {
        // Called once by clap; the string lives for the whole process.
        Box::leak(format!("{VERSION} ({GIT_HASH})").into_boxed_str())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load(cli) {
        Ok(s) => {
            init_tracing(s.log_format);
            tracing::debug!(log_format = %s.log_format, "Logging initialised");
            s
        }
        Err(e) => {
            init_tracing(LogFormat::Pretty);
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    print_banner(&settings);

    let prober = match HttpProber::from_config(&settings.watch) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build probe client");
            return ExitCode::FAILURE;
        }
    };
    let notify_client = match notify::build_client() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build notification client");
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = Dispatcher::new(vec![
        Box::new(MailgunNotifier::new(settings.email.clone(), notify_client.clone())),
        Box::new(VoipMsNotifier::new(settings.sms.clone(), notify_client)),
    ]);

    let mut watcher = Watcher::new(settings.watch, prober, dispatcher);
    watcher.run_until(shutdown_signal()).await;

    ExitCode::SUCCESS
}

fn print_banner(settings: &Settings) {
    let term = Term::stdout();
    let watch = &settings.watch;

    term.write_line(&format!(
        "{} {}",
        style("page-watch").bold(),
        style(version_string()).dim()
    ))
    .ok();
    term.write_line(&format!("  {} {}", style("url:     ").dim(), style(&watch.url).bold()))
        .ok();
    term.write_line(&format!(
        "  {} {}s",
        style("interval:").dim(),
        watch.poll_interval.as_secs()
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("404 flag:").dim(),
        watch.notify_on_404
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("email:   ").dim(),
        channel_status(&settings.email.missing())
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("sms:     ").dim(),
        channel_status(&settings.sms.missing())
    ))
    .ok();
    term.write_line("").ok();
    term.write_line(&format!("{}", style("Press Ctrl+C to stop").dim()))
        .ok();
    term.write_line("").ok();
}

fn channel_status(missing: &[&str]) -> String {
    if missing.is_empty() {
        format!("{}", style("enabled").green())
    } else {
        format!(
            "{} (missing {})",
            style("disabled").yellow(),
            missing.join(", ")
        )
    }
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, finishing current check");
}

fn init_tracing(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format {
        LogFormat::Json => {
            fmt().with_env_filter(filter).json().init();
        }
        LogFormat::Pretty => {
            fmt().with_env_filter(filter).init();
        }
    }
}
