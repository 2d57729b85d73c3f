//! Dataset upload: local validation, ordering rules, task polling and the
//! per-dataset view-model.

pub mod board;
pub mod dependencies;
pub mod poller;
pub mod validate;

pub use board::{FileState, FileView, UploadBoard};
pub use dependencies::{DependencyCheck, check_dependencies};
pub use poller::{PollProfile, ProgressEvent, ProgressStream, TaskApi, UploadEngine, wait_for_completion};
pub use validate::{UploadFile, validate_upload};
