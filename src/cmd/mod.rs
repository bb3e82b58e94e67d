//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `serve`   | `Serve`          |
//! | `build`   | `Build`          |
//! | `deploy`  | `Deploy`         |
//! | `secrets` | `Secrets`        |
//! | `health`  | `Health`         |
//! | `config`  | `Config`         |

pub mod build;
pub mod config;
pub mod deploy;
pub mod health;
pub mod secrets;
pub mod serve;

pub use build::cmd_build;
pub use config::cmd_config;
pub use deploy::cmd_deploy;
pub use health::cmd_health;
pub use secrets::cmd_secrets;
pub use serve::cmd_serve;
