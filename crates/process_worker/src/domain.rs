mod incident_service;
mod mission_service;
mod responder_service;
mod step_service;

pub use incident_service::*;
pub use mission_service::*;
pub use responder_service::*;
pub use step_service::*;
