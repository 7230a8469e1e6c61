//! Chapter, task and result types shared by the scheduler, packager and orchestrator.

mod chapter;
mod job;
mod layout;
mod result;

pub use chapter::ChapterId;
pub use job::{ChapterJob, ImageTask, JobCompletion};
pub use layout::{assign_folder_names, SeriesLayout};
pub use result::{DownloadOutcome, DownloadResult, FailureReason, ProgressSnapshot};
