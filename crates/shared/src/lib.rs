//! Skirmish Shared - wire types for REST and WebSocket clients
//!
//! This crate contains the types the engine exchanges with clients:
//! - REST request bodies and query strings
//! - Response DTOs and the `{ success, data }` envelope
//! - WebSocket message types (ClientMessage, ServerMessage)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - serde, uuid, chrono and the domain vocabulary
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain IDs on the wire** - DTOs carry raw `uuid::Uuid`

pub mod messages;
pub mod requests;
pub mod responses;

// =============================================================================
// WebSocket Message Types
// =============================================================================
pub use messages::{ClientMessage, ServerMessage};

// =============================================================================
// Request Types
// =============================================================================
pub use requests::{
    AddParticipantRequest, CreateCombatSessionRequest, DiceHistoryQuery, DiceRollRequest,
    ListActionsQuery, ListCombatSessionsQuery, QuickRollRequest, RecordActionRequest,
    ToggleStatusRequest, UpdateParticipantRequest,
};

// =============================================================================
// Response Types
// =============================================================================
pub use responses::{
    ActionRecordedData, ApiResponse, CharacterInfo, CombatActionData, CombatSessionData,
    DiceRollData, ErrorCode, ErrorResponse, HealthData, ParticipantData, TurnAdvancedData,
};
