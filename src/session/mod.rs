pub mod countdown;
pub mod engine;
pub mod errors;
pub mod failure;
pub mod handle;
pub mod scheduler;
pub mod types;


pub use countdown::TickOutcome;
pub use engine::{CompletionCallback, SessionEngine, SessionEngineBuilder};
pub use errors::SessionError;
pub use failure::AudioFailureCounter;
pub use handle::CancellableHandle;
pub use scheduler::AnnounceOutcome;
pub use types::*;
