use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::state::AppState;

/// Upgrades to a WebSocket stream of `PublicDraftState` pushes for one
/// draft. `shareId` is resolved to the internal draft id once, at
/// upgrade time; the connection itself is then just a subscriber on the
/// domain `Broadcaster` for that id (see `DraftConnectionManager`).
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    match state.draft_service.draft_id_for_share(&share_id).await {
        Ok(draft_id) => {
            let manager = state.ws_manager.clone();
            ws.on_upgrade(move |socket| async move { manager.run_connection(socket, draft_id).await })
        }
        Err(err) => {
            warn!(share_id = %share_id, error = %err, "websocket upgrade for unknown draft");
            crate::error::ApiError::from(err).into_response()
        }
    }
}
