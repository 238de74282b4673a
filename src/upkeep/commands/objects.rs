use super::{delete_by_id, find, ids_of, insert, list_where, require_non_empty, update_by_id};
use crate::category;
use crate::error::Result;
use crate::ids::{self, IdPolicy, OBJECT_WIDTH};
use crate::model::{now_stamp, NewObject, ObjectFilter, ObjectPatch, ObjectRecord};
use crate::store::StorageBackend;

pub fn list<B: StorageBackend>(store: &B, filter: &ObjectFilter) -> Result<Vec<ObjectRecord>> {
    list_where(store, |row| filter.matches(row))
}

pub fn get<B: StorageBackend>(store: &B, object_id: &str) -> Result<Option<ObjectRecord>> {
    find(store, object_id)
}

/// Ids are prefixed with the first three letters of the normalized type,
/// so `"Vehicles"` yields `VEH-0001`.
pub fn create<B: StorageBackend>(store: &B, policy: IdPolicy, new: NewObject) -> Result<String> {
    require_non_empty("name", &new.name)?;
    require_non_empty("object_type", &new.object_type)?;

    let object_type = category::normalize(&new.object_type);
    let prefix = ids::object_prefix(&object_type);
    let now = now_stamp();

    insert(
        store,
        |rows: &[ObjectRecord]| ids::next_id(ids_of(rows), &prefix, OBJECT_WIDTH, policy),
        |object_id| ObjectRecord {
            object_id,
            object_type,
            name: new.name,
            description: new.description,
            status: new.status,
            created_date: now,
            last_updated: now,
        },
    )
}

/// Applies the supplied fields and refreshes `last_updated`.
pub fn update<B: StorageBackend>(store: &B, object_id: &str, patch: ObjectPatch) -> Result<bool> {
    if let Some(name) = &patch.name {
        require_non_empty("name", name)?;
    }
    update_by_id(store, object_id, |row: &mut ObjectRecord| {
        patch.apply(row);
        row.last_updated = now_stamp();
    })
}

/// Services, reminders and reports pointing at the object are left alone.
pub fn delete<B: StorageBackend>(store: &B, object_id: &str) -> Result<bool> {
    delete_by_id::<B, ObjectRecord>(store, object_id)
}
