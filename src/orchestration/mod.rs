pub mod artifacts;
pub mod error;
pub mod launcher;
pub mod materialize;
pub mod progress;
pub mod report_store;
pub mod request;
pub mod sync;

pub use artifacts::{copy_artifacts, CopyReport};
pub use error::OrchestratorError;
pub use launcher::{DuplicatedReport, LaunchOutcome, ReportOrchestrator};
pub use progress::{current_step, PipelineProgress};
pub use report_store::{ReportRecord, ReportStatus, ReportStore};
pub use request::{CommentRow, DuplicationOptions, LaunchMode, PromptSet, ReportRequest};
pub use sync::{NoopStorageSync, StorageSync, SyncError};
