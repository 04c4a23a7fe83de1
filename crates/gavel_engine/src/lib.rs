//! Gavel engine: remote API access and effect execution.
mod api;
mod client;
mod engine;
mod persist;

pub use api::{ApiClient, ApiError};
pub use client::{ApiSettings, ReqwestApiClient};
pub use engine::{EngineCommand, EngineEvent, EngineEvents, EngineHandle};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
