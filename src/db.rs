use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE: &str = "hostel.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents(
            key TEXT PRIMARY KEY,
            schema_version INTEGER NOT NULL,
            revision INTEGER NOT NULL,
            payload TEXT NOT NULL
        )",
        [],
    )?;
    // Workspaces created before write timestamps were tracked lack this column.
    ensure_documents_updated_at(&conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

fn ensure_documents_updated_at(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "documents", "updated_at")? {
        return Ok(());
    }
    conn.execute("ALTER TABLE documents ADD COLUMN updated_at TEXT", [])?;
    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch(
        "CREATE TABLE documents(
            key TEXT PRIMARY KEY,
            schema_version INTEGER NOT NULL,
            revision INTEGER NOT NULL,
            payload TEXT NOT NULL,
            updated_at TEXT
        );
        CREATE TABLE settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        );",
    )
    .expect("create schema");
    conn
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn settings_round_trip() {
        let conn = open_in_memory();
        assert_eq!(settings_get_json(&conn, "hostel.settings").unwrap(), None);
        settings_set_json(&conn, "hostel.settings", &json!({ "wardenBlock": "Block B" })).unwrap();
        settings_set_json(&conn, "hostel.settings", &json!({ "wardenBlock": "Block C" })).unwrap();
        assert_eq!(
            settings_get_json(&conn, "hostel.settings").unwrap(),
            Some(json!({ "wardenBlock": "Block C" }))
        );
    }

    #[test]
    fn old_documents_table_gains_updated_at() {
        let dir = std::env::temp_dir().join(format!(
            "hosteld-db-migrate-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("create dir");
        {
            let conn = Connection::open(dir.join(DB_FILE)).expect("open");
            conn.execute(
                "CREATE TABLE documents(
                    key TEXT PRIMARY KEY,
                    schema_version INTEGER NOT NULL,
                    revision INTEGER NOT NULL,
                    payload TEXT NOT NULL
                )",
                [],
            )
            .expect("create legacy table");
        }
        let conn = open_db(&dir).expect("open_db");
        assert!(table_has_column(&conn, "documents", "updated_at").unwrap());
        drop(conn);
        let _ = std::fs::remove_dir_all(dir);
    }
}
