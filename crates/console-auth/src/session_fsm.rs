//! Session state machine using rust-fsm.
//!
//! ```text
//!              ┌───────────┐
//!              │  Loading  │ (initial)
//!              └─────┬─────┘
//!    NoSession /     │      \ SessionValidated / LoginSucceeded
//!    SessionRejected │       \
//!    LoggedOut /     │        \
//!    AuthFailed      ▼         ▼
//! ┌─────────────────┐  LoginSucceeded  ┌───────────────┐
//! │ Unauthenticated │ ───────────────► │ Authenticated │
//! │                 │ ◄─────────────── │               │
//! └─────────────────┘ LoggedOut /      └───────────────┘
//!                     AuthFailed /
//!                     SessionRejected
//! ```
//!
//! Self-loops exist so that a repeated validation or login can refresh the
//! published user without leaving the current state.

use rust_fsm::*;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Loading)

    Loading => {
        NoSession => Unauthenticated,
        SessionRejected => Unauthenticated,
        LoggedOut => Unauthenticated,
        AuthFailed => Unauthenticated,
        SessionValidated => Authenticated,
        LoginSucceeded => Authenticated
    },
    Unauthenticated => {
        NoSession => Unauthenticated,
        SessionRejected => Unauthenticated,
        LoggedOut => Unauthenticated,
        LoginSucceeded => Authenticated
    },
    Authenticated => {
        SessionValidated => Authenticated,
        LoginSucceeded => Authenticated,
        NoSession => Unauthenticated,
        SessionRejected => Unauthenticated,
        AuthFailed => Unauthenticated,
        LoggedOut => Unauthenticated
    }
}

pub use session_machine::Input as SessionInput;
pub use session_machine::State as SessionPhase;
pub use session_machine::StateMachine as SessionMachine;
