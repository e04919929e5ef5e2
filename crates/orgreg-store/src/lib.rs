//! # orgreg-store
//!
//! File-backed record layer for organizations and their members.
//!
//! This crate provides:
//! - `RecordStore` (create/get/list/replace/patch/delete per entity kind)
//! - identifier allocation from current occupancy
//! - tax-code uniqueness across organizations
//! - shallow patch merging that never adds fields
//! - organization → member cascading delete
//!
//! HTTP routing and response envelopes live outside this crate; callers map
//! [`StoreError::class`] to a status code.
//!
//! ## Data model
//!
//! ```text
//! <data_dir>/
//!     companies/<company_id>.json   one organization per file
//!     users/<id_user>.json          one member per file, company_id → companies/
//! ```

pub mod allocator;
pub mod cascade;
pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod kind;
pub mod lock;
pub mod patch;
pub mod record;
pub mod store;
pub mod uniqueness;
pub mod validate;

pub use allocator::next_id;
pub use collection::{Collection, CollectionWriter, Records};
pub use config::{ConfigError, DATA_DIR_ENV, DEFAULT_DATA_DIR, StoreConfig};
pub use error::{ErrorClass, StorageError, StoreError};
pub use kind::{EMAIL_FIELD, EntityKind, ORGANIZATION_REFERENCE_FIELD, TAX_CODE_FIELD};
pub use record::{Record, RecordId, record_id_from_value};
pub use store::{DeleteOutcome, RecordStore};
pub use validate::TAX_CODE_LEN;
