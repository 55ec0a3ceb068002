// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use bmc_stats::cli::{Cli, CollectArgs, Commands, SummaryArgs};
use bmc_stats::collect::{standard_collectors, CycleState, Scheduler};
use bmc_stats::network::{discover_endpoints, ControllerClient};
use bmc_stats::storage::DatasetStore;
use bmc_stats::summary::summarize;
use bmc_stats::{AppConfig, CollectorConfig, EnvConfig};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bmc_stats=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Collect(args) => run_collect(args).await,
        Commands::Summary(args) => run_summary(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run_collect(args: CollectArgs) -> Result<()> {
    let password = match EnvConfig::controller_password() {
        Ok(password) => password,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!(
                "Example: export {}='your_password'",
                AppConfig::PASSWORD_ENV_VAR
            );
            process::exit(1);
        }
    };

    // Validated before anything touches the network
    let config = CollectorConfig::from_args(&args, password)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_signal_listener(shutdown_tx);

    let client = ControllerClient::new(&config)?;
    let inventory = discover_endpoints(&client, &config)
        .await
        .with_context(|| format!("Endpoint discovery against {} failed", config.base_url))?;
    if inventory.is_empty() {
        warn!("No PSU endpoints found; power batches will only carry the total");
    }

    let store = DatasetStore::new(&config.output_dir);
    info!("Writing datasets to {}", store.dir().display());

    let collectors = standard_collectors(&client, Arc::new(inventory), &config);
    let mut scheduler = Scheduler::new(config.budget, store, collectors, shutdown_rx);
    let summary = scheduler.run().await;

    match summary.state {
        CycleState::Completed => println!("Data collection completed."),
        CycleState::Interrupted => info!("Stopped after {} cycles", summary.cycles),
        CycleState::Idle | CycleState::Running => {}
    }
    Ok(())
}

fn run_summary(args: &SummaryArgs) -> Result<()> {
    let every = usize::try_from(args.resample).unwrap_or(usize::MAX);
    let summary = summarize(&args.data_dir, every)
        .with_context(|| format!("Cannot summarize datasets in {}", args.data_dir.display()))?;
    print!("{summary}");
    Ok(())
}

/// The first Ctrl-C or SIGTERM asks the scheduler to stop after the round in
/// flight; a second one exits immediately.
fn spawn_signal_listener(shutdown: watch::Sender<bool>) {
    tokio::spawn(async move {
        wait_for_signal().await;
        eprintln!("\nInterrupt received, shutting down...");
        let _ = shutdown.send(true);

        wait_for_signal().await;
        process::exit(0);
    });
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                let _ = signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}
