// Upload workflow: validate → start → transport + simulated progress → result store.
// One workflow per mounted upload view; dropping it tears down its timers.

pub mod handlers;
pub mod progress;
pub mod registry;
pub mod store;
pub mod transport;
pub mod validator;
pub mod workflow;

use bytes::Bytes;

pub use progress::ProgressSettings;
pub use registry::UploadSessions;
pub use store::UploadState;
pub use transport::ResumeTransport;
pub use validator::{FileMeta, UploadPolicy};
pub use workflow::{UploadError, UploadWorkflow};

/// A candidate file selected by the user.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn meta(&self) -> FileMeta<'_> {
        FileMeta {
            name: &self.name,
            size: self.size(),
            content_type: self.content_type.as_deref(),
        }
    }
}
