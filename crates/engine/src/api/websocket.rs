//! WebSocket handling for combat table clients.
//!
//! A connection joins rooms and then receives every event broadcast to them.
//! Nothing is mutated over the socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use skirmish_domain::{CampaignId, CombatSessionId, EventTopic, UserId};
use skirmish_shared::{ClientMessage, ErrorCode, ServerMessage};

use super::auth::{caller_from_headers, USER_ID_HEADER};
use super::connections::ConnectionManager;
use crate::app::App;
use crate::infrastructure::ports::{Caller, UserRole};
use crate::use_cases::CombatError;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
    pub connections: Arc<ConnectionManager>,
    /// Buffer size for each connection's outbound channel
    pub channel_buffer: usize,
}

/// Identity for clients that cannot set headers on the upgrade request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsParams {
    pub user_id: Option<Uuid>,
    pub role: Option<String>,
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsState>>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
) -> Response {
    let caller = connection_caller(&params, &headers);
    ws.on_upgrade(move |socket| handle_socket(socket, state, caller))
}

/// Headers win over query parameters. An unreadable identity leaves the
/// connection anonymous; anonymous connections cannot join rooms.
fn connection_caller(params: &WsParams, headers: &HeaderMap) -> Option<Caller> {
    if headers.contains_key(USER_ID_HEADER) {
        return caller_from_headers(headers).ok();
    }
    let user_id = UserId::from_uuid(params.user_id?);
    let role = match params.role.as_deref() {
        None => UserRole::default(),
        Some(raw) => raw.parse().ok()?,
    };
    Some(Caller::new(user_id, role))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<WsState>, caller: Option<Caller>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.channel_buffer);

    state
        .connections
        .register(connection_id, caller.map(|c| c.user_id), tx.clone());

    tracing::info!(
        connection_id = %connection_id,
        authenticated = caller.is_some(),
        "WebSocket connection established"
    );

    // Forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => handle_message(msg, &state, connection_id, caller.as_ref()).await,
                    Err(e) => {
                        tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                        ServerMessage::error(
                            ErrorCode::BadRequest,
                            format!("Invalid message format: {}", e),
                        )
                    }
                };
                if tx.try_send(response).is_err() {
                    tracing::warn!(
                        connection_id = %connection_id,
                        "Failed to send response, channel full or closed"
                    );
                }
            }
            Ok(Message::Ping(_)) => {
                let _ = tx.try_send(ServerMessage::Pong);
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.connections.unregister(connection_id);
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a parsed client message and build the direct reply.
async fn handle_message(
    msg: ClientMessage,
    state: &WsState,
    connection_id: Uuid,
    caller: Option<&Caller>,
) -> ServerMessage {
    match msg {
        ClientMessage::Heartbeat => ServerMessage::Pong,

        ClientMessage::JoinSession { session_id } => {
            let Some(caller) = caller else {
                return unauthenticated();
            };
            handle_join_session(state, connection_id, caller, session_id).await
        }

        ClientMessage::LeaveSession { session_id } => {
            let topic = EventTopic::Combat(CombatSessionId::from_uuid(session_id));
            state.connections.leave(connection_id, topic);
            ServerMessage::Left {
                room: topic.to_string(),
            }
        }

        ClientMessage::JoinCampaign { campaign_id } => {
            let Some(caller) = caller else {
                return unauthenticated();
            };
            handle_join_campaign(state, connection_id, caller, campaign_id).await
        }

        ClientMessage::Unknown => {
            ServerMessage::error(ErrorCode::BadRequest, "Unknown message type")
        }
    }
}

async fn handle_join_session(
    state: &WsState,
    connection_id: Uuid,
    caller: &Caller,
    session_id: Uuid,
) -> ServerMessage {
    let session_id = CombatSessionId::from_uuid(session_id);
    if let Err(e) = state
        .app
        .use_cases
        .combat
        .get_session
        .execute(caller, session_id)
        .await
    {
        return combat_error(e);
    }
    join(state, connection_id, EventTopic::Combat(session_id))
}

async fn handle_join_campaign(
    state: &WsState,
    connection_id: Uuid,
    caller: &Caller,
    campaign_id: Uuid,
) -> ServerMessage {
    let campaign_id = CampaignId::from_uuid(campaign_id);
    let membership = match state
        .app
        .use_cases
        .campaigns
        .membership(campaign_id, caller.user_id)
        .await
    {
        Ok(membership) => membership,
        Err(e) => {
            tracing::error!(campaign_id = %campaign_id, error = %e, "Membership lookup failed");
            return ServerMessage::error(ErrorCode::InternalError, "Internal error");
        }
    };

    match membership {
        None => ServerMessage::error(
            ErrorCode::NotFound,
            format!("Campaign not found: {}", campaign_id),
        ),
        Some(m) if m.is_member() || caller.is_admin() => {
            join(state, connection_id, EventTopic::Campaign(campaign_id))
        }
        Some(_) => ServerMessage::error(
            ErrorCode::Forbidden,
            "Not a member of this campaign",
        ),
    }
}

fn join(state: &WsState, connection_id: Uuid, topic: EventTopic) -> ServerMessage {
    match state.connections.join(connection_id, topic) {
        Ok(()) => ServerMessage::Joined {
            room: topic.to_string(),
        },
        Err(e) => ServerMessage::error(ErrorCode::InternalError, e.to_string()),
    }
}

fn unauthenticated() -> ServerMessage {
    ServerMessage::error(
        ErrorCode::Unauthorized,
        "Connect with a user id to join rooms",
    )
}

fn combat_error(e: CombatError) -> ServerMessage {
    match e {
        CombatError::NotFound { .. } => ServerMessage::error(ErrorCode::NotFound, e.to_string()),
        CombatError::Forbidden(msg) => ServerMessage::error(ErrorCode::Forbidden, msg),
        CombatError::InvalidState(msg) => ServerMessage::error(ErrorCode::InvalidState, msg),
        CombatError::Validation(msg) => ServerMessage::error(ErrorCode::ValidationError, msg),
        CombatError::Repo(e) => {
            tracing::error!(error = %e, "Session lookup failed");
            ServerMessage::error(ErrorCode::InternalError, "Internal error")
        }
    }
}
