// src/main.rs
use anyhow::Result;
use api_status::{
    config::{self, Config},
    health::HealthClient,
    render::{ConsoleRenderer, Renderer},
    status::{CheckRun, StatusController},
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, info};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_status=debug".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => Config::default(),
    };

    let renderer = Arc::new(ConsoleRenderer::stdout());
    renderer.on_version(&config.display_version);

    let client = HealthClient::from_config(&config)?;
    let controller = Arc::new(StatusController::new(Arc::new(client), renderer));
    let base_url = config.api_base_url.clone();

    info!("Watching API at {}", base_url);
    println!("Press Enter to check the API status, Ctrl+C to quit.");

    let mut checks = JoinSet::new();
    trigger(&mut checks, &controller, &base_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticker = config.poll_interval().map(|period| {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => trigger(&mut checks, &controller, &base_url),
                Ok(None) => {
                    stdin_open = false;
                    if !has_other_triggers(&ticker) {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    stdin_open = false;
                    if !has_other_triggers(&ticker) {
                        break;
                    }
                }
            },
            _ = tick(&mut ticker) => trigger(&mut checks, &controller, &base_url),
            Some(joined) = checks.join_next(), if !checks.is_empty() => {
                if let Err(e) = joined {
                    error!("Check task failed: {}", e);
                }
            }
            _ = &mut shutdown => {
                checks.abort_all();
                return Ok(());
            }
        }
    }

    // Let the last check (and its version lookup) finish before exiting.
    while let Some(joined) = checks.join_next().await {
        if let Err(e) = joined {
            error!("Check task failed: {}", e);
        }
    }

    Ok(())
}

/// Starts a check on its own task. The controller drops it if one is
/// already running.
fn trigger(checks: &mut JoinSet<()>, controller: &Arc<StatusController>, base_url: &Url) {
    let controller = controller.clone();
    let base_url = base_url.clone();

    checks.spawn(async move {
        if let Some(run) = controller.run_check(&base_url).await {
            settle(run).await;
        }
    });
}

/// Waits for the version lookup a check started, if any.
async fn settle(run: CheckRun) {
    if let Some(info_task) = run.info_task {
        if let Err(e) = info_task.await {
            error!("Info task failed: {}", e);
        }
    }
}

/// Once stdin is gone, only the poll interval can start further checks.
fn has_other_triggers(ticker: &Option<Interval>) -> bool {
    ticker.is_some()
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_status::status::CheckState;
    use std::time::Duration;

    #[tokio::test]
    async fn settle_survives_a_failed_info_task() {
        let run = CheckRun {
            state: CheckState::Online,
            info_task: Some(tokio::spawn(async { panic!("info lookup failed") })),
        };

        // Completes instead of propagating the panic.
        settle(run).await;
    }

    #[tokio::test]
    async fn settle_without_info_task() {
        settle(CheckRun {
            state: CheckState::Offline,
            info_task: None,
        })
        .await;
    }

    #[tokio::test]
    async fn stdin_loss_ends_the_loop_without_polling() {
        assert!(!has_other_triggers(&None));

        let ticker = interval_at(Instant::now(), Duration::from_secs(5));
        assert!(has_other_triggers(&Some(ticker)));
    }
}
