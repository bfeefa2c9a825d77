pub mod generation_client;
pub mod storage_client;

pub use generation_client::{decode_lecture, HttpGenerationService};
pub use storage_client::HttpPersistenceService;
