use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use twap_core::{InboundMessage, OwnerId, ProgressEvent, ValidationError};
use twap_engine::{RegistryError, SessionRegistry};

/// Shared state of every TWAP connection
pub struct WsState {
    pub registry: SessionRegistry,
    /// Capacity of each connection's outbound event queue
    pub outbound_capacity: usize,
}

/// Handle WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one TWAP connection until the client goes away
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let owner = OwnerId::new();
    let (mut sender, mut receiver) = socket.split();
    tracing::info!("[{}] TWAP client connected", owner);

    // Single writer: every event for this owner goes through this queue
    let (tx, mut rx) = mpsc::channel::<ProgressEvent>(state.outbound_capacity.max(1));

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::warn!("[{}] Dropping unserializable event: {}", owner, e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => {
                dispatch(&state.registry, owner, text.as_str(), &tx).await;
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                tracing::debug!("[{}] Read error: {}", owner, e);
                break;
            }
        }
    }

    // Closing the channel cancels whatever is still running
    if state.registry.cancel(owner).is_ok() {
        tracing::info!("[{}] Client gone, active TWAP cancelled", owner);
    }
    tracing::info!("[{}] TWAP client disconnected", owner);

    // Cleanup
    drop(tx);
    let _ = send_task.await;
}

/// Route one text frame to the registry
async fn dispatch(
    registry: &SessionRegistry,
    owner: OwnerId,
    text: &str,
    tx: &mpsc::Sender<ProgressEvent>,
) {
    match InboundMessage::parse(text) {
        InboundMessage::Start(command) => {
            match registry.create(owner, &command, tx.clone()).await {
                Ok(handle) => {
                    tracing::info!(
                        "[{}] TWAP {} accepted: {} {}% / {} slices / {}s",
                        owner,
                        handle.id(),
                        command.inst_id,
                        command.percent,
                        command.slices,
                        command.interval
                    );
                }
                Err(e) => {
                    tracing::warn!("[{}] TWAP rejected: {}", owner, e);
                    reply(tx, e.to_event()).await;
                }
            }
        }
        InboundMessage::Cancel(_) => {
            if let Err(e) = registry.cancel(owner) {
                tracing::debug!("[{}] Cancel ignored: {}", owner, e);
                reply(tx, e.to_event()).await;
            }
        }
        InboundMessage::Malformed(reason) => {
            let err = RegistryError::from(ValidationError::Malformed(reason));
            tracing::warn!("[{}] {}", owner, err);
            reply(tx, err.to_event()).await;
        }
        InboundMessage::Unrecognized => {
            tracing::debug!("[{}] Ignoring unrecognized message: {}", owner, text);
        }
    }
}

async fn reply(tx: &mpsc::Sender<ProgressEvent>, event: ProgressEvent) {
    let _ = tx.send(event).await;
}
