pub mod outbox;

pub use outbox::{PostgresOutboxEmitter, ensure_outbox_table};
