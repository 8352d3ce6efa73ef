//! Configuration, filesystem paths and logging setup for the Responder console.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, RawConfig, DEFAULT_LOG_LEVEL, DEFAULT_PROFILE_TIMEOUT_SECS, ENV_ADMIN_ROLE_ID,
    ENV_API_URL, ENV_DEFAULT_ROLE_ID, ENV_LOG_LEVEL, ENV_PROFILE_TIMEOUT_SECS,
};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
