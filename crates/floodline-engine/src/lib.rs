pub mod client;
pub mod directory;
mod http;

pub use client::EngineClient;
pub use directory::{RestPriorityService, RestResponderDirectory, RestShelterDirectory};
pub use http::build_http_client;
