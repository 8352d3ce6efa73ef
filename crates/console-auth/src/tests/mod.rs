//! Request-flow tests for the API client and session manager.
//!
//! - `harness.rs`      - Scripted transport and a wired-up test context
//! - `client_flow.rs`  - Bearer auth, refresh, retry bound, error mapping
//! - `session_flow.rs` - Session validation, login, logout, guard integration

mod client_flow;
