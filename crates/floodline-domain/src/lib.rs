pub mod commands;
pub mod correlation;
pub mod directory;
pub mod dispatcher;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod events;
pub mod outbound;
pub mod outbox;
pub mod retry;
pub mod rules;
pub mod signal;
pub mod work_item;

pub use commands::*;
pub use correlation::CorrelationKey;
pub use directory::*;
pub use dispatcher::{DispatchOutcome, SignalDispatcher};
pub use engine::*;
pub use envelope::*;
pub use error::{DomainError, DomainResult};
pub use events::*;
pub use outbound::*;
pub use outbox::*;
pub use retry::*;
pub use rules::*;
pub use signal::*;
pub use work_item::*;
