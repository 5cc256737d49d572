//! Logging setup.
//!
//! The renderer logs through the `log` facade: capacity overflow and unknown
//! textures at warn, shader failures at error, per-frame stats at debug.
//! [`init_logging`] installs `env_logger` for binaries that want it.

mod init;

pub use init::{init_logging, LoggingConfig};
