use crate::auth::User;
use crate::store::{self, keys, Document, StoreError};
use rusqlite::Connection;

/// Persisted identity for this workspace, if any. An unreadable session
/// document is dropped and treated as signed out.
pub fn restore(conn: &Connection) -> Result<Option<User>, StoreError> {
    match store::read_document::<User>(conn, keys::SESSION) {
        Ok(Document::Found { value, .. }) => Ok(Some(value)),
        Ok(Document::Missing) => Ok(None),
        Ok(Document::Corrupt { error, .. }) => {
            tracing::warn!(%error, "discarding unreadable session");
            store::delete_document(conn, keys::SESSION)?;
            Ok(None)
        }
        Err(StoreError::UnsupportedSchema { found, .. }) => {
            tracing::warn!(found, "discarding session written by a newer schema");
            store::delete_document(conn, keys::SESSION)?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Last login wins; the session is never compare-and-swapped.
pub fn persist(conn: &Connection, user: &User) -> Result<(), StoreError> {
    let rev = store::current_revision(conn, keys::SESSION)?;
    store::write_document(conn, keys::SESSION, user, rev)?;
    Ok(())
}

pub fn clear(conn: &Connection) -> Result<(), StoreError> {
    store::delete_document(conn, keys::SESSION)
}
