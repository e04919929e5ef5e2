//! Error taxonomy for record store operations.
//!
//! Every operation returns `Result<_, StoreError>`. Callers pick a transport
//! status from [`StoreError::class`] rather than from message text.

use crate::kind::EntityKind;
use crate::record::RecordId;
use std::io;
use std::path::Path;

/// Coarse classification used by outer layers to choose a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Validation,
    Conflict,
    NotFound,
    Storage,
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Storage => "storage",
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(self) -> bool {
        !matches!(self, Self::Storage)
    }

    /// Transport status for this class.
    ///
    /// Not-found is a 400, same as every other client error.
    pub fn status_code(self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }
}

/// Errors returned by [`crate::RecordStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("payload must be a JSON object")]
    PayloadNotObject,

    #[error("Incomplete data: missing required fields: {}", .fields.join(", "))]
    MissingFields {
        kind: EntityKind,
        fields: Vec<&'static str>,
    },

    #[error("CNPJ must be 14 characters long")]
    InvalidTaxCode,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("No data provided for update")]
    EmptyPatch,

    #[error("CNPJ already exists: {value} (company {existing})")]
    DuplicateTaxCode { value: String, existing: RecordId },

    #[error("{} with ID {id} not found", .kind.label())]
    NotFound { kind: EntityKind, id: RecordId },

    #[error("Please register your company first: company {reference} not found")]
    ReferenceNotFound { reference: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::PayloadNotObject
            | Self::MissingFields { .. }
            | Self::InvalidTaxCode
            | Self::InvalidEmail
            | Self::EmptyPatch => ErrorClass::Validation,
            Self::DuplicateTaxCode { .. } => ErrorClass::Conflict,
            Self::NotFound { .. } | Self::ReferenceNotFound { .. } => ErrorClass::NotFound,
            Self::Storage(_) => ErrorClass::Storage,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.class().status_code()
    }

    pub(crate) fn not_found(kind: EntityKind, id: RecordId) -> Self {
        Self::NotFound { kind, id }
    }
}

/// Failures of the underlying key space.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted record: {0}")]
    Corrupt(String),

    #[error("collection lock busy: {lock_path} (held by {holder})")]
    LockBusy { lock_path: String, holder: String },

    #[error("identifier space exhausted in {dir}")]
    IdentifiersExhausted { dir: String },

    #[error("failed to acquire collection lock {lock_path}: {message}")]
    LockIo { lock_path: String, message: String },
}

impl StorageError {
    pub(crate) fn io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied {
                path: path.display().to_string(),
            };
        }
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
