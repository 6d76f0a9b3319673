//! `adapta ask` — run a query through the full workflow.

use adapta_core::AgentConfig;
use tokio_util::sync::CancellationToken;

use super::{build_orchestrator, print_json};

/// Run `query` and print the report, or the run state as JSON.
///
/// Ctrl-C cancels the run; the engine still formats whatever it has.
pub async fn run(config: AgentConfig, query: &str, json: bool) -> Result<(), String> {
    if query.trim().is_empty() {
        return Err("Query must not be empty".to_string());
    }

    let orchestrator = build_orchestrator(config)?;

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("[Ask] Interrupted, cancelling run");
                cancel.cancel();
            }
        })
    };

    let state = orchestrator.run_with_cancel(query, &cancel).await;
    watcher.abort();

    if json {
        let value = serde_json::to_value(&state)
            .map_err(|e| format!("Failed to serialize run state: {}", e))?;
        print_json(&value);
    } else {
        println!("{}", state.report);
    }
    Ok(())
}
