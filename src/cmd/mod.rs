//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|-----------------------------------------------------|
//! | `serve`         | `Serve`, `InitDb`                                  |
//! | `config`        | `Config`                                           |

pub mod config;
pub mod serve;

pub use config::cmd_config;
pub use serve::{cmd_init_db, cmd_serve};
