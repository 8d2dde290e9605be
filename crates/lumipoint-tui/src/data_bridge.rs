//! Data bridge: forwards controller snapshots into the TUI action loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use lumipoint_core::Controller;

use crate::action::Action;

/// Send the current snapshot, then one [`Action::SnapshotUpdated`] per
/// change until cancelled or the controller goes away.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut stream = controller.subscribe();
    let _ = action_tx.send(Action::SnapshotUpdated(Arc::new(stream.current().clone())));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = stream.changed() => {
                let Some(snapshot) = changed else { break };
                debug!(status = snapshot.status.label(), "dispatching SnapshotUpdated");
                if action_tx.send(Action::SnapshotUpdated(Arc::new(snapshot))).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge shut down");
}
