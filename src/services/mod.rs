pub mod lecture_cache;
pub mod remote;

pub use lecture_cache::{FileCache, LectureCache, MemoryCache};
pub use remote::{GenerateLectureRequest, GenerationService, PersistenceService, StoreLectureRequest};
