//! Authentication for the Responder console.
//!
//! This crate provides:
//! - An API client that attaches bearer tokens, refreshes them and retries once on 401
//! - JWT claim decoding and session user normalisation
//! - An FSM-backed session manager that publishes the current user
//! - A pure route guard over the session snapshot

mod client;
mod error;
mod fields;
pub mod guard;
mod jwt;
mod session;
mod session_fsm;
mod transport;
mod user;

#[cfg(test)]
mod tests;

pub use client::{extract_error_message, ApiClient};
pub use error::{AuthError, AuthResult};
pub use guard::{decide, GuardDecision, RouteRequirements};
pub use jwt::{decode_claims, JwtClaims};
pub use session::{AuthSnapshot, SessionManager, SessionState};
pub use session_fsm::{session_machine, SessionInput, SessionMachine, SessionPhase};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, TransportError};
pub use user::SessionUser;
