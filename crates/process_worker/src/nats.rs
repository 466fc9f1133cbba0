mod conversions;
mod incident_reported_processor;
mod mission_event_processor;
mod responder_updated_processor;
mod work_item_processor;

pub use conversions::*;
pub use incident_reported_processor::*;
pub use mission_event_processor::*;
pub use responder_updated_processor::*;
pub use work_item_processor::*;
