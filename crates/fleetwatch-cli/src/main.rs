mod args;
mod console;
mod output;

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use fleetwatch_client::{ClientConfig, HttpServerApi, MemoryServerApi, ServerApi};
use fleetwatch_common::telemetry::{init_tracing, TelemetryConfig};
use fleetwatch_common::ServerDraft;
use fleetwatch_dashboard::{report, AppState, Exported, Notifier, StateProjector, TracingNotifier};

use crate::args::{Args, Command};
use crate::output::{print_state, PrintNotifier};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let provider = init_tracing(TelemetryConfig {
        service_name: "fleetwatch",
        otlp_endpoint: args.otlp_endpoint.as_deref(),
        otlp_token: args.otlp_token.as_deref(),
    });

    let api: Arc<dyn ServerApi> = if args.demo {
        tracing::info!("using in-memory demo fleet");
        Arc::new(MemoryServerApi::sample())
    } else {
        tracing::info!(api_url = %args.api_url, "using server api");
        Arc::new(HttpServerApi::new(ClientConfig {
            base_url: args.api_url.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
        })?)
    };
    // Toasts only make sense on a terminal; piped output keeps them in the log.
    let notifier: Arc<dyn Notifier> = if std::io::stdout().is_terminal() {
        Arc::new(PrintNotifier)
    } else {
        Arc::new(TracingNotifier)
    };
    let projector = StateProjector::new(api, notifier);

    let result = run_command(&projector, args.command).await;

    if let Some(provider) = provider {
        if let Err(err) = provider.shutdown() {
            eprintln!("failed to flush traces: {err}");
        }
    }
    result
}

/// Failed actions were already reported by the notifier, so they only turn
/// into a failing exit code here.
async fn run_command(projector: &StateProjector, command: Command) -> Result<ExitCode> {
    // Every other action patches or projects the cached list, so fill it first.
    let initial = settle(projector.load()).await?;
    if matches!(command, Command::Console) {
        print_state(&initial);
        console::run_console(projector).await?;
        return Ok(ExitCode::SUCCESS);
    }
    if initial.error().is_some() {
        return Ok(ExitCode::FAILURE);
    }

    let state = match command {
        Command::List | Command::Console => initial,
        Command::Ping { ip_address } => settle(projector.ping(ip_address)).await?,
        Command::Save {
            name,
            ip_address,
            memory,
            server_type,
            status,
        } => {
            let draft = ServerDraft {
                ip_address,
                name,
                memory,
                server_type,
                status,
            };
            settle(projector.save(draft)).await?
        }
        Command::Delete { id } => settle(projector.delete(id)).await?,
        Command::Filter { status } => settle(projector.filter(status)).await?,
        Command::Report { format, out } => {
            let servers = projector.visible_servers();
            match report::export(format, &servers, &out, &mut std::io::stdout())? {
                Exported::File(path) => println!("✓ Report written to {}", path.display()),
                Exported::Printed => {}
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    print_state(&state);
    match state {
        AppState::Error(_) => Ok(ExitCode::FAILURE),
        _ => Ok(ExitCode::SUCCESS),
    }
}

async fn settle(action: fleetwatch_dashboard::Action) -> Result<AppState> {
    let kind = action.kind();
    action
        .settled()
        .await
        .with_context(|| format!("{kind:?} action was superseded"))
}
