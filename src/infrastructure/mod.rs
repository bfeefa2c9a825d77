pub mod api_transport;

pub use api_transport::{ApiResponse, ApiTransport};
