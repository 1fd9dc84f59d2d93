use thiserror::Error;

/// Usage errors raised when start/stop calls are out of sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("cannot start segment '{label}': it is already active")]
    AlreadyActive { label: String },
    #[error("cannot stop segment '{label}': no active segment with this label")]
    NotActive { label: String },
}

impl TrackerError {
    pub fn label(&self) -> &str {
        match self {
            TrackerError::AlreadyActive { label } | TrackerError::NotActive { label } => label,
        }
    }
}
