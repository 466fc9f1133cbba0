pub mod domain;
pub mod nats;
pub mod process_worker;

pub use domain::*;
pub use nats::*;
pub use process_worker::*;
