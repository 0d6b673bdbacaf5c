use std::fmt;

use nvbind_core_types::PassId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindingError>;

/// Stable classification of a failure.
///
/// Callers match on the kind or its code instead of parsing messages.
/// Recoverable conditions (unknown option keys, dangling cross-item
/// references, unconvertible setter values) are logged as warnings and never
/// get a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    /// A change targets a volume the viewer has not loaded
    NotFound,
    AttachFailed,
    LoadFailed,
    NotReady,
    /// Accepted by the model, not driven by this build
    NotImplemented,
    InvalidConfig,
    Io,
    Serialization,
}

impl ExErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AttachFailed => "ERR_ATTACH_FAILED",
            ExErrorKind::LoadFailed => "ERR_LOAD_FAILED",
            ExErrorKind::NotReady => "ERR_NOT_READY",
            ExErrorKind::NotImplemented => "ERR_NOT_IMPLEMENTED",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

impl fmt::Display for ExErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified failure plus the context needed to act on it: the operation,
/// the volume url or file path it concerns, and the pass it happened in.
///
/// Renders as `ERR_CODE during op: message [subject=.., pass=..]`.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    message: String,
    op: Option<String>,
    subject: Option<String>,
    pass_id: Option<PassId>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            message: String::new(),
            op: None,
            subject: None,
            pass_id: None,
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// The volume url, option key or file path the failure concerns.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_pass_id(mut self, pass_id: PassId) -> Self {
        self.pass_id = Some(pass_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.code())?;
        if let Some(op) = &self.op {
            write!(f, " during {}", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }

        let subject = self.subject.iter().map(|s| format!("subject={}", s));
        let pass = self.pass_id.iter().map(|p| format!("pass={}", p));
        let context: Vec<String> = subject.chain(pass).collect();
        if !context.is_empty() {
            write!(f, " [{}]", context.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

/// Failures of binding operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// A change diff references a volume the viewer has not loaded
    #[error("No volume found with URL {url}")]
    VolumeNotFound { url: String },

    #[error("Failed to attach viewer to canvas: {message}")]
    AttachFailed { message: String },

    /// The viewer rejected a bulk load
    #[error("Failed to load volumes: {message}")]
    LoadFailed { message: String },

    #[error("Binding is not ready: {state}")]
    NotReady { state: String },

    /// Meshes are accepted by the model but not driven yet
    #[error("Meshes are not supported yet")]
    MeshesUnsupported,

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl BindingError {
    pub fn kind(&self) -> ExErrorKind {
        match self {
            BindingError::VolumeNotFound { .. } => ExErrorKind::NotFound,
            BindingError::AttachFailed { .. } => ExErrorKind::AttachFailed,
            BindingError::LoadFailed { .. } => ExErrorKind::LoadFailed,
            BindingError::NotReady { .. } => ExErrorKind::NotReady,
            BindingError::MeshesUnsupported => ExErrorKind::NotImplemented,
            BindingError::InvalidConfig { .. } => ExErrorKind::InvalidConfig,
            BindingError::Io { .. } => ExErrorKind::Io,
            BindingError::Serialization { .. } => ExErrorKind::Serialization,
        }
    }
}

impl From<BindingError> for ExError {
    fn from(err: BindingError) -> Self {
        let ex = ExError::new(err.kind()).with_message(err.to_string());
        match err {
            BindingError::VolumeNotFound { url } => {
                ex.with_op("apply_volume_changes").with_subject(url)
            }
            BindingError::AttachFailed { .. } => ex.with_op("attach_to_canvas"),
            BindingError::LoadFailed { .. } => ex.with_op("load_volumes"),
            BindingError::Io { path, .. } => ex.with_subject(path),
            BindingError::NotReady { .. }
            | BindingError::MeshesUnsupported
            | BindingError::InvalidConfig { .. }
            | BindingError::Serialization { .. } => ex,
        }
    }
}

impl From<serde_json::Error> for BindingError {
    fn from(err: serde_json::Error) -> Self {
        BindingError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ExErrorKind::NotFound,
            ExErrorKind::AttachFailed,
            ExErrorKind::LoadFailed,
            ExErrorKind::NotReady,
            ExErrorKind::NotImplemented,
            ExErrorKind::InvalidConfig,
            ExErrorKind::Io,
            ExErrorKind::Serialization,
        ];
        let codes: std::collections::HashSet<&str> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
        assert_eq!(ExErrorKind::LoadFailed.to_string(), "ERR_LOAD_FAILED");
    }

    #[test]
    fn test_volume_not_found_message_names_url() {
        let err = BindingError::VolumeNotFound {
            url: "https://example.com/notloaded.nii.gz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No volume found with URL https://example.com/notloaded.nii.gz"
        );

        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::NotFound);
        assert_eq!(ex.subject(), Some("https://example.com/notloaded.nii.gz"));
        assert_eq!(ex.op(), Some("apply_volume_changes"));
    }

    #[test]
    fn test_meshes_map_to_not_implemented() {
        let ex: ExError = BindingError::MeshesUnsupported.into();
        assert_eq!(ex.code(), "ERR_NOT_IMPLEMENTED");
        assert_eq!(ex.message(), "Meshes are not supported yet");
    }

    #[test]
    fn test_ex_error_display_includes_context() {
        let pass_id: PassId = "0190a5b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b".parse().unwrap();
        let err = ExError::new(ExErrorKind::LoadFailed)
            .with_op("load_volumes")
            .with_message("network down")
            .with_subject("https://example.com/brain.nii.gz")
            .with_pass_id(pass_id);

        assert_eq!(
            err.to_string(),
            "ERR_LOAD_FAILED during load_volumes: network down \
             [subject=https://example.com/brain.nii.gz, pass=0190a5b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b]"
        );
    }
}
