pub mod commands;

use std::sync::Arc;
use std::time::Duration;

use crate::services::messaging::telegram::TelegramClient;
use crate::state::AppState;

const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-polls the bot API and dispatches every update in order. Runs until
/// the process exits.
pub async fn run(state: Arc<AppState>, client: Arc<TelegramClient>) {
    let mut offset = 0;
    tracing::info!("bot polling started");

    loop {
        let updates = match client.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::error!(error = %e, "getUpdates failed");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            let update_id = update.update_id;
            offset = offset.max(update_id + 1);
            if let Err(e) = commands::handle_update(&state, update).await {
                tracing::error!(update_id, error = %e, "failed to handle update");
            }
        }
    }
}
