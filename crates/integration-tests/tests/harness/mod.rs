#![allow(dead_code)]

pub mod config;
pub mod mock_llm;

use cachet_core::CallContext;
use cachet_llm::{Client, CompletionMessage, CompletionRequest, CompletionStatus, LlmError, Role};
use tokio::sync::mpsc;

/// Run one completion while a separate task drains the status channel
pub async fn complete(
    client: &Client,
    ctx: &CallContext,
    request: CompletionRequest,
) -> (Result<CompletionMessage, LlmError>, Vec<CompletionStatus>) {
    let (tx, mut rx) = mpsc::channel(4);
    let collector = tokio::spawn(async move {
        let mut statuses = Vec::new();
        while let Some(status) = rx.recv().await {
            statuses.push(status);
        }
        statuses
    });

    let result = client.call(ctx, request, &tx).await;
    drop(tx);

    (result, collector.await.unwrap())
}

/// Request with a single user message and the configured default model
pub fn user_request(text: &str) -> CompletionRequest {
    CompletionRequest {
        messages: vec![CompletionMessage::text(Role::User, text)],
        ..CompletionRequest::default()
    }
}
