//! # gamecrew-error
//!
//! One error type for the whole workspace.
//!
//! - [`ErrorKind`] says what failed, so callers can branch on it.
//! - [`ErrorStatus`] says whether a retry can help. Retryable kinds start
//!   `Temporary` and become `Persistent` once retrying gives up.
//! - Operations and key-value context are appended as the error travels up,
//!   so a failure deep in a provider call still names its task and agent.
//!
//! ```rust
//! use gamecrew_error::{Error, ErrorKind, Result};
//!
//! fn lookup(agent: &str) -> Result<()> {
//!     Err(Error::agent_not_found(agent)
//!         .with_operation("crew::from_config")
//!         .with_context("task", "test_and_debug_game"))
//! }
//!
//! let err = lookup("tester").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::AgentNotFound);
//! assert!(err.kind().is_config_error());
//! ```
//!
//! Foreign errors are wrapped with `set_source` where they first appear;
//! only `std::io::Error` converts implicitly.

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

pub type Result<T> = std::result::Result<T, Error>;
