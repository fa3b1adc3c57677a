use serde::{Deserialize, Serialize};

/// A file picked by the user, as handed to the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            content_type: content_type.into(),
            data,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileProgress {
    pub file_name: String,
    pub percent: u8,
}

/// Transient state of one batch: progress per file name, the error list and
/// the in-flight flag.
///
/// Progress entries keep the order in which files were first touched, so a
/// progress list renders in selection order.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadSession {
    progress: Vec<FileProgress>,
    errors: Vec<String>,
    in_flight: bool,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a batch. Errors from the previous batch are dropped here, not
    /// when that batch finished.
    pub fn begin(&mut self) {
        self.in_flight = true;
        self.errors.clear();
    }

    /// Ends a batch. The error list stays visible until the next `begin`.
    pub fn finish(&mut self) {
        self.in_flight = false;
        self.progress.clear();
    }

    pub fn set_progress(&mut self, file_name: &str, percent: u8) {
        let percent = percent.min(100);
        match self.progress.iter_mut().find(|p| p.file_name == file_name) {
            Some(entry) => entry.percent = percent,
            None => self.progress.push(FileProgress {
                file_name: file_name.to_string(),
                percent,
            }),
        }
    }

    pub fn push_error(&mut self, file_name: &str, reason: &str) {
        self.errors.push(format!("{file_name}: {reason}"));
    }

    pub fn progress(&self) -> &[FileProgress] {
        &self.progress
    }

    pub fn progress_for(&self, file_name: &str) -> Option<u8> {
        self.progress
            .iter()
            .find(|p| p.file_name == file_name)
            .map(|p| p.percent)
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// How a batch ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The owner was already at capacity; nothing was validated or uploaded.
    AtCapacity { notice: String },
    /// The batch ran; the owner callback has been invoked.
    Completed { stored: usize, errors: Vec<String> },
}

/// Response body of a completed upload batch.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UploadReport {
    pub images: Vec<String>,
    pub errors: Vec<String>,
    pub owner_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RemoveImageRequest {
    pub images: Vec<String>,
    pub index: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageList {
    pub images: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UploadLimits {
    pub allowed_mime_types: Vec<String>,
    pub max_file_size: u64,
    pub max_images: usize,
    pub help_text: String,
}
