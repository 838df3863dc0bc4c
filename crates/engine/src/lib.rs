//! Skirmish Engine library.
//!
//! Server-side code for running tabletop combat sessions.
//!
//! ## Structure
//!
//! - `use_cases/` - Combat and dice operations over the domain aggregate
//! - `stores/` - Per-session lock registry
//! - `infrastructure/` - Ports and their in-memory adapters
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::App;
