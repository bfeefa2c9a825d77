pub mod lecture;
pub mod topic;

pub use lecture::{CachedLecture, LectureDocument, ProgressCursor, Task, TaskStatus};
pub use topic::Topic;
