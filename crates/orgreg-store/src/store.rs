//! The record store: create/read/list/replace/patch/delete over both kinds.
//!
//! Every mutation holds its collection's writer for the whole
//! validate-allocate-write sequence. Lock order is organizations before
//! members; only organization delete takes both.

use crate::allocator;
use crate::cascade::cascade_delete;
use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::error::{StorageError, StoreError};
use crate::kind::{EntityKind, ORGANIZATION_REFERENCE_FIELD};
use crate::patch;
use crate::record::{Record, RecordId, record_id_from_value};
use crate::uniqueness;
use crate::validate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a successful delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub kind: EntityKind,
    pub id: RecordId,
    /// Members removed by the organization cascade, empty for member deletes.
    pub cascaded: Vec<RecordId>,
}

/// File-backed store for organizations and members.
///
/// All operations take `&self`; share one instance across threads with `Arc`.
#[derive(Debug)]
pub struct RecordStore {
    root: PathBuf,
    organizations: Collection,
    members: Collection,
}

impl RecordStore {
    /// Open a store rooted at `root`. Nothing is created until the first write.
    pub fn open(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            organizations: Collection::new(EntityKind::Organization, &root),
            members: Collection::new(EntityKind::Member, &root),
            root,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::open(&config.data_dir)
    }

    /// Create both partition directories if they are missing.
    pub fn init(&self) -> Result<(), StoreError> {
        for kind in EntityKind::ALL {
            let dir = self.collection(kind).dir();
            fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection(&self, kind: EntityKind) -> &Collection {
        match kind {
            EntityKind::Organization => &self.organizations,
            EntityKind::Member => &self.members,
        }
    }

    pub fn create(&self, kind: EntityKind, payload: Value) -> Result<Record, StoreError> {
        let mut record = Record::from_payload(payload)?;
        validate::require_fields(kind, &record)?;
        validate::check_field_rules(kind, &record)?;

        let writer = self.collection(kind).lock()?;
        self.check_constraints(kind, &record, None)?;
        let id = allocator::allocate(&writer)?;
        record.set_id(kind, id);
        writer.write(id, &record)?;

        log::info!("created {} {id}", kind.label().to_lowercase());
        Ok(record)
    }

    pub fn get(&self, kind: EntityKind, id: RecordId) -> Result<Record, StoreError> {
        self.collection(kind)
            .read(id)?
            .ok_or_else(|| StoreError::not_found(kind, id))
    }

    /// Every record of `kind`, in no particular order.
    pub fn list(&self, kind: EntityKind) -> Result<Vec<Record>, StoreError> {
        self.iter(kind)?.collect()
    }

    /// Lazy form of [`RecordStore::list`].
    pub fn iter(
        &self,
        kind: EntityKind,
    ) -> Result<impl Iterator<Item = Result<Record, StoreError>> + '_, StoreError> {
        Ok(self
            .collection(kind)
            .records()?
            .map(|entry| entry.map(|(_, record)| record).map_err(StoreError::from)))
    }

    /// Overwrite a record entirely. The identifier field is forced to `id`.
    pub fn replace(
        &self,
        kind: EntityKind,
        id: RecordId,
        payload: Value,
    ) -> Result<Record, StoreError> {
        let writer = self.collection(kind).lock()?;
        if !writer.contains(id)? {
            return Err(StoreError::not_found(kind, id));
        }

        let mut record = Record::from_payload(payload)?;
        validate::require_fields(kind, &record)?;
        validate::check_field_rules(kind, &record)?;
        self.check_constraints(kind, &record, Some(id))?;

        record.set_id(kind, id);
        writer.write(id, &record)?;

        log::info!("replaced {} {id}", kind.label().to_lowercase());
        Ok(record)
    }

    /// Overwrite only fields the stored record already has.
    ///
    /// Unknown fields are dropped and the identifier field is never changed.
    /// The tax-code uniqueness rule is not checked here, only its format.
    pub fn patch(
        &self,
        kind: EntityKind,
        id: RecordId,
        payload: Value,
    ) -> Result<Record, StoreError> {
        let writer = self.collection(kind).lock()?;
        let stored = writer
            .read(id)?
            .ok_or_else(|| StoreError::not_found(kind, id))?;

        let mut incoming = Record::from_payload(payload)?;
        if incoming.is_empty() {
            return Err(StoreError::EmptyPatch);
        }
        incoming.remove(kind.id_field());
        validate::check_field_rules(kind, &incoming)?;
        if kind == EntityKind::Member
            && stored.contains_field(ORGANIZATION_REFERENCE_FIELD)
            && let Some(reference) = incoming.get(ORGANIZATION_REFERENCE_FIELD)
        {
            self.require_organization(reference)?;
        }

        let mut merged = patch::merge(stored, &incoming);
        merged.set_id(kind, id);
        writer.write(id, &merged)?;

        log::info!("patched {} {id}", kind.label().to_lowercase());
        Ok(merged)
    }

    /// Remove a record. Deleting an organization also removes its members.
    pub fn delete(&self, kind: EntityKind, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        let writer = self.collection(kind).lock()?;
        if !writer.remove(id)? {
            return Err(StoreError::not_found(kind, id));
        }

        let cascaded = match kind {
            EntityKind::Organization => {
                let members = self.members.lock().inspect_err(|err| {
                    log::warn!("company {id} deleted but its users were not: {err}");
                })?;
                cascade_delete(&members, id)?
            }
            EntityKind::Member => Vec::new(),
        };
        drop(writer);

        log::info!(
            "deleted {} {id} (cascaded {} users)",
            kind.label().to_lowercase(),
            cascaded.len()
        );
        Ok(DeleteOutcome { kind, id, cascaded })
    }

    pub fn create_organization(&self, payload: Value) -> Result<Record, StoreError> {
        self.create(EntityKind::Organization, payload)
    }

    pub fn create_member(&self, payload: Value) -> Result<Record, StoreError> {
        self.create(EntityKind::Member, payload)
    }

    pub fn get_organization(&self, id: RecordId) -> Result<Record, StoreError> {
        self.get(EntityKind::Organization, id)
    }

    pub fn get_member(&self, id: RecordId) -> Result<Record, StoreError> {
        self.get(EntityKind::Member, id)
    }

    pub fn list_organizations(&self) -> Result<Vec<Record>, StoreError> {
        self.list(EntityKind::Organization)
    }

    pub fn list_members(&self) -> Result<Vec<Record>, StoreError> {
        self.list(EntityKind::Member)
    }

    pub fn replace_organization(&self, id: RecordId, payload: Value) -> Result<Record, StoreError> {
        self.replace(EntityKind::Organization, id, payload)
    }

    pub fn replace_member(&self, id: RecordId, payload: Value) -> Result<Record, StoreError> {
        self.replace(EntityKind::Member, id, payload)
    }

    pub fn patch_organization(&self, id: RecordId, payload: Value) -> Result<Record, StoreError> {
        self.patch(EntityKind::Organization, id, payload)
    }

    pub fn patch_member(&self, id: RecordId, payload: Value) -> Result<Record, StoreError> {
        self.patch(EntityKind::Member, id, payload)
    }

    pub fn delete_organization(&self, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        self.delete(EntityKind::Organization, id)
    }

    pub fn delete_member(&self, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        self.delete(EntityKind::Member, id)
    }

    /// Cross-record rules: tax-code uniqueness for organizations, the
    /// organization reference for members. Caller holds `kind`'s writer.
    fn check_constraints(
        &self,
        kind: EntityKind,
        record: &Record,
        replacing: Option<RecordId>,
    ) -> Result<(), StoreError> {
        if let Some(field) = kind.unique_field()
            && let Some(value) = record.get(field)
            && let Some(existing) =
                uniqueness::find_conflict(self.collection(kind), field, value, replacing)?
        {
            return Err(StoreError::DuplicateTaxCode {
                value: display_value(value),
                existing,
            });
        }

        if kind == EntityKind::Member
            && let Some(reference) = record.get(ORGANIZATION_REFERENCE_FIELD)
        {
            self.require_organization(reference)?;
        }
        Ok(())
    }

    fn require_organization(&self, reference: &Value) -> Result<(), StoreError> {
        let exists = match record_id_from_value(reference) {
            Some(id) => self.organizations.contains(id)?,
            None => false,
        };
        if exists {
            Ok(())
        } else {
            Err(StoreError::ReferenceNotFound {
                reference: display_value(reference),
            })
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
