//! bondify-core — Review session, query cache, and SRS contract types.
//!
//! This crate defines the request/response shapes exchanged with the remote
//! scheduler, the `SrsBackend` trait the rest of the system is written
//! against, and the client-side bookkeeping around it: cached queries,
//! the due-word review session, and the game bridges.

pub mod cache;
pub mod error;
pub mod game_progress;
pub mod game_srs;
pub mod mock;
pub mod model;
pub mod queries;
pub mod session;
pub mod summary;
pub mod traits;

pub use error::{ApiError, ApiResult, SessionError};
pub use queries::{CachePolicy, SrsQueries};
pub use session::{ReviewSession, SessionPhase};
pub use traits::SrsBackend;
