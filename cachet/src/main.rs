#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::path::Path;

use args::{Args, Command, CompleteArgs};
use cachet_config::Config;
use cachet_core::CallContext;
use cachet_llm::{Client, CompletionMessage, CompletionRequest, CompletionStatus, Role, StatusEvent};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Status events buffered between the call and the printer
const STATUS_BUFFER: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(&args.config)?;

    cachet_telemetry::init(config.telemetry.as_ref())?;

    tracing::debug!(config_path = %args.config.display(), "starting cachet");

    let client = Client::from_config(&config)?;

    let cancellation = CancellationToken::new();
    let cancel_on_signal = cancellation.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel_on_signal.cancel();
    });

    let ctx = CallContext::with_cancellation(cancellation);

    match args.command {
        Command::Models => list_models(&client, &ctx).await,
        Command::Complete(complete) => complete_prompt(&client, ctx, complete).await,
    }
}

/// Load the configuration file, or only the environment when there is none
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Config::from_env()
    }
}

async fn list_models(client: &Client, ctx: &CallContext) -> anyhow::Result<()> {
    for model in client.list_models(ctx, &[]).await? {
        println!("{model}");
    }
    Ok(())
}

async fn complete_prompt(client: &Client, ctx: CallContext, args: CompleteArgs) -> anyhow::Result<()> {
    let ctx = if args.no_cache { ctx.without_cache() } else { ctx };

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = args.system {
        messages.push(CompletionMessage::text(Role::System, system));
    }
    messages.push(CompletionMessage::text(Role::User, args.prompt));

    let model = args.model.unwrap_or_else(|| client.default_model().to_owned());
    tracing::info!(model = %model, cache = !ctx.is_cache_disabled(), "submitting completion");

    let request = CompletionRequest {
        model,
        messages,
        json_response: args.json,
        set_seed: args.seed.then_some(true),
        ..CompletionRequest::default()
    };

    let (status_tx, mut status_rx) = mpsc::channel(STATUS_BUFFER);
    let printer = tokio::spawn(async move {
        while let Some(status) = status_rx.recv().await {
            report(&status);
        }
    });

    let result = client.call(&ctx, request, &status_tx).await;
    drop(status_tx);
    printer.await?;

    let message = result?;
    println!("{}", message.text_content());
    for call in message.tool_calls() {
        println!("[tool call {}] {}({})", call.id, call.function.name, call.function.arguments);
    }

    Ok(())
}

fn report(status: &CompletionStatus) {
    let completion_id = status.completion_id.as_str();
    match &status.event {
        StatusEvent::Submitted { request } => {
            tracing::debug!(completion_id, model = %request.model, messages = request.messages.len(), "submitted");
        }
        StatusEvent::Partial { message } => {
            tracing::debug!(completion_id, content = %message.text_content(), "partial");
        }
        StatusEvent::Final { chunks, cached, .. } => {
            tracing::info!(completion_id, chunks = chunks.len(), cached, "completed");
        }
    }
}

/// Wait for `SIGINT` or `SIGTERM`
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("cancelling in-flight call");
}
