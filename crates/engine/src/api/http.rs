//! HTTP routes.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use skirmish_domain::{CampaignId, CharacterId, CombatSessionId, ParticipantId};
use skirmish_shared::{
    ActionRecordedData, AddParticipantRequest, ApiResponse, CharacterInfo, CombatActionData,
    CombatSessionData, CreateCombatSessionRequest, DiceHistoryQuery, DiceRollData,
    DiceRollRequest, ErrorCode,
    ErrorResponse, HealthData, ListActionsQuery, ListCombatSessionsQuery, ParticipantData,
    QuickRollRequest, RecordActionRequest, ToggleStatusRequest, TurnAdvancedData,
    UpdateParticipantRequest,
};

use crate::app::App;
use crate::infrastructure::ports::{Caller, CharacterSnapshot, RepoError};
use crate::use_cases::combat::{ParticipantDetails, SessionDetails};
use crate::use_cases::{CombatError, DiceError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/combat", post(create_session).get(list_sessions))
        .route("/api/combat/{id}", get(get_session))
        .route("/api/combat/{id}/turn-order", get(turn_order))
        .route("/api/combat/{id}/participants", post(add_participant))
        .route(
            "/api/combat/{id}/participants/{participant_id}",
            put(update_participant),
        )
        .route("/api/combat/{id}/start", post(start_combat))
        .route("/api/combat/{id}/next-turn", post(next_turn))
        .route("/api/combat/{id}/toggle-status", post(toggle_status))
        .route("/api/combat/{id}/end", post(end_combat))
        .route(
            "/api/combat/{id}/actions",
            post(record_action).get(list_actions),
        )
        .route("/api/dice/roll", post(roll_dice))
        .route("/api/dice/quick", post(quick_roll))
        .route("/api/dice/history", get(dice_history))
        .route("/api/dice/campaign/{campaign_id}", get(campaign_dice_history))
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn created<T>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::ok(data)))
}

async fn health() -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::ok(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

// =============================================================================
// Sessions
// =============================================================================

async fn create_session(
    State(app): State<Arc<App>>,
    caller: Caller,
    payload: Result<Json<CreateCombatSessionRequest>, JsonRejection>,
) -> Created<CombatSessionData> {
    let Json(input) = payload?;
    let session = app
        .use_cases
        .combat
        .create_session
        .execute(&caller, input)
        .await?;
    Ok(created(CombatSessionData::from(&session.snapshot())))
}

async fn list_sessions(
    State(app): State<Arc<App>>,
    caller: Caller,
    query: Result<Query<ListCombatSessionsQuery>, QueryRejection>,
) -> ApiResult<Vec<CombatSessionData>> {
    let Query(query) = query?;
    let sessions = app
        .use_cases
        .combat
        .list_sessions
        .execute(&caller, query.campaign_id.map(CampaignId::from_uuid))
        .await?;
    let data = sessions
        .iter()
        .map(|s| CombatSessionData::from(&s.snapshot()))
        .collect();
    Ok(Json(ApiResponse::list(data)))
}

async fn get_session(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CombatSessionData> {
    let Path(id) = path?;
    let details = app
        .use_cases
        .combat
        .get_session
        .execute(&caller, CombatSessionId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(session_data(&details))))
}

async fn turn_order(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Vec<ParticipantData>> {
    let Path(id) = path?;
    let order = app
        .use_cases
        .combat
        .turn_order
        .execute(&caller, CombatSessionId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::list(
        order.iter().map(ParticipantData::from).collect(),
    )))
}

// =============================================================================
// Participants
// =============================================================================

async fn add_participant(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AddParticipantRequest>, JsonRejection>,
) -> Created<ParticipantData> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let details = app
        .use_cases
        .combat
        .add_participant
        .execute(&caller, CombatSessionId::from_uuid(id), input)
        .await?;
    Ok(created(participant_data(&details)))
}

async fn update_participant(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<UpdateParticipantRequest>, JsonRejection>,
) -> ApiResult<ParticipantData> {
    let Path((id, participant_id)) = path?;
    let Json(input) = payload?;
    let details = app
        .use_cases
        .combat
        .update_participant
        .execute(
            &caller,
            CombatSessionId::from_uuid(id),
            ParticipantId::from_uuid(participant_id),
            input,
        )
        .await?;
    Ok(Json(ApiResponse::ok(participant_data(&details))))
}

// =============================================================================
// Turn flow
// =============================================================================

async fn start_combat(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CombatSessionData> {
    let Path(id) = path?;
    let session = app
        .use_cases
        .combat
        .start_combat
        .execute(&caller, CombatSessionId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(CombatSessionData::from(&session))))
}

async fn next_turn(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<TurnAdvancedData> {
    let Path(id) = path?;
    let outcome = app
        .use_cases
        .combat
        .advance_turn
        .execute(&caller, CombatSessionId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(TurnAdvancedData {
        session: CombatSessionData::from(&outcome.session),
        new_round: outcome.new_round,
    })))
}

async fn toggle_status(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ToggleStatusRequest>, JsonRejection>,
) -> ApiResult<CombatSessionData> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let session = app
        .use_cases
        .combat
        .toggle_status
        .execute(&caller, CombatSessionId::from_uuid(id), input)
        .await?;
    Ok(Json(ApiResponse::ok(CombatSessionData::from(&session))))
}

async fn end_combat(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CombatSessionData> {
    let Path(id) = path?;
    let session = app
        .use_cases
        .combat
        .conclude_combat
        .execute(&caller, CombatSessionId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(CombatSessionData::from(&session))))
}

// =============================================================================
// Actions
// =============================================================================

async fn record_action(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RecordActionRequest>, JsonRejection>,
) -> Created<ActionRecordedData> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let outcome = app
        .use_cases
        .combat
        .record_action
        .execute(&caller, CombatSessionId::from_uuid(id), input)
        .await?;
    Ok(created(ActionRecordedData {
        action: CombatActionData::from(&outcome.action),
        target: outcome.target.as_ref().map(ParticipantData::from),
    }))
}

async fn list_actions(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListActionsQuery>, QueryRejection>,
) -> ApiResult<Vec<CombatActionData>> {
    let Path(id) = path?;
    let Query(query) = query?;
    let actions = app
        .use_cases
        .combat
        .list_actions
        .execute(&caller, CombatSessionId::from_uuid(id), query.round)
        .await?;
    Ok(Json(ApiResponse::list(
        actions.iter().map(CombatActionData::from).collect(),
    )))
}

// =============================================================================
// Dice
// =============================================================================

async fn roll_dice(
    State(app): State<Arc<App>>,
    caller: Caller,
    payload: Result<Json<DiceRollRequest>, JsonRejection>,
) -> Created<DiceRollData> {
    let Json(input) = payload?;
    let roll = app.use_cases.dice.roll.execute(&caller, input).await?;
    Ok(created(DiceRollData::from(&roll)))
}

async fn quick_roll(
    State(app): State<Arc<App>>,
    caller: Caller,
    payload: Result<Json<QuickRollRequest>, JsonRejection>,
) -> ApiResult<DiceRollData> {
    let Json(input) = payload?;
    let roll = app.use_cases.dice.quick_roll.execute(&caller, input)?;
    Ok(Json(ApiResponse::ok(DiceRollData::from(&roll))))
}

async fn dice_history(
    State(app): State<Arc<App>>,
    caller: Caller,
    query: Result<Query<DiceHistoryQuery>, QueryRejection>,
) -> ApiResult<Vec<DiceRollData>> {
    let Query(query) = query?;
    let rolls = app
        .use_cases
        .dice
        .user_history
        .execute(&caller, query.limit)
        .await?;
    Ok(Json(ApiResponse::list(
        rolls.iter().map(DiceRollData::from).collect(),
    )))
}

async fn campaign_dice_history(
    State(app): State<Arc<App>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<DiceHistoryQuery>, QueryRejection>,
) -> ApiResult<Vec<DiceRollData>> {
    let Path(campaign_id) = path?;
    let Query(query) = query?;
    let rolls = app
        .use_cases
        .dice
        .campaign_history
        .execute(&caller, CampaignId::from_uuid(campaign_id), query.limit)
        .await?;
    Ok(Json(ApiResponse::list(
        rolls.iter().map(DiceRollData::from).collect(),
    )))
}

// =============================================================================
// Response assembly
// =============================================================================

fn character_info(character: &CharacterSnapshot) -> CharacterInfo {
    CharacterInfo {
        id: character.id.to_uuid(),
        name: character.name.clone(),
        class: character.class.clone(),
        level: character.level,
    }
}

fn participant_data(details: &ParticipantDetails) -> ParticipantData {
    ParticipantData::from(&details.participant)
        .with_character(details.character.as_ref().map(character_info))
}

fn session_data(details: &SessionDetails) -> CombatSessionData {
    let mut data = CombatSessionData::from(&details.session);
    join_characters(&mut data.participants, &details.characters);
    data
}

fn join_characters(
    participants: &mut [ParticipantData],
    characters: &HashMap<CharacterId, CharacterSnapshot>,
) {
    for participant in participants {
        participant.character = participant
            .character_id
            .and_then(|id| characters.get(&CharacterId::from_uuid(id)))
            .map(character_info);
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    InvalidState(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, msg),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationError, msg)
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg)
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden, msg),
            ApiError::InvalidState(msg) => (StatusCode::CONFLICT, ErrorCode::InvalidState, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    "Internal error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

impl From<CombatError> for ApiError {
    fn from(e: CombatError) -> Self {
        match e {
            CombatError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            CombatError::Forbidden(msg) => ApiError::Forbidden(msg),
            CombatError::InvalidState(msg) => ApiError::InvalidState(msg),
            CombatError::Validation(msg) => ApiError::Validation(msg),
            CombatError::Repo(e) => e.into(),
        }
    }
}

impl From<DiceError> for ApiError {
    fn from(e: DiceError) -> Self {
        match e {
            DiceError::Validation(msg) => ApiError::Validation(msg),
            DiceError::CampaignNotFound(_) => ApiError::NotFound(e.to_string()),
            DiceError::Forbidden(msg) => ApiError::Forbidden(msg),
            DiceError::Repo(e) => e.into(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
