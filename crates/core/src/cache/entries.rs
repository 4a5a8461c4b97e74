//! Namespace and entry operations on the cache store.
//!
//! A namespace is an isolated key→response store. Entries carry no
//! expiry; they are invalidated only by overwrite or by deleting the
//! whole namespace (the activation sweep).

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached response snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

impl StoredResponse {
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl CacheDb {
    /// Register a namespace, creating it if it doesn't exist.
    ///
    /// Idempotent; the analogue of opening a named cache.
    pub async fn open_namespace(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO namespaces (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the entry for `key` in `namespace`.
    ///
    /// Last write wins per key. The namespace must have been opened.
    pub async fn put(&self, namespace: &str, key: &str, url: &str, response: &StoredResponse) -> Result<(), Error> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        let url = url.to_string();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let known: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM namespaces WHERE name = ?1)",
                    params![namespace],
                    |row| row.get(0),
                )?;
                if !known {
                    return Err(Error::UnknownNamespace(namespace));
                }

                conn.execute(
                    "INSERT INTO entries (namespace, key, url, status, content_type, body, fetched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(namespace, key) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        content_type = excluded.content_type,
                        body = excluded.body,
                        fetched_at = excluded.fetched_at",
                    params![
                        namespace,
                        key,
                        url,
                        response.status as i64,
                        response.content_type,
                        response.body,
                        response.fetched_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for `key` in `namespace`.
    ///
    /// Returns None on a miss or when the namespace doesn't exist.
    pub async fn lookup(&self, namespace: &str, key: &str) -> Result<Option<StoredResponse>, Error> {
        let namespace = namespace.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, content_type, body, fetched_at
                     FROM entries WHERE namespace = ?1 AND key = ?2",
                    params![namespace, key],
                    |row| {
                        Ok(StoredResponse {
                            status: row.get::<_, i64>(0)? as u16,
                            content_type: row.get(1)?,
                            body: row.get(2)?,
                            fetched_at: row.get(3)?,
                        })
                    },
                );

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and every entry in it.
    ///
    /// Returns true if the namespace existed.
    pub async fn delete_namespace(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM namespaces WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// List all registered namespace names.
    pub async fn list_namespaces(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in a namespace.
    pub async fn entry_count(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE namespace = ?1",
                    params![namespace],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(body: &str) -> StoredResponse {
        StoredResponse::new(200, Some("application/json".to_string()), body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_put_and_lookup() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("ramadan-data-v1").await.unwrap();

        let response = make_response("{\"surah\":1}");
        db.put("ramadan-data-v1", "k1", "https://app/quran/quran.json", &response)
            .await
            .unwrap();

        let found = db.lookup("ramadan-data-v1", "k1").await.unwrap().unwrap();
        assert_eq!(found, response);
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("ramadan-data-v1").await.unwrap();
        assert!(db.lookup("ramadan-data-v1", "absent").await.unwrap().is_none());
        assert!(db.lookup("never-opened", "absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_last_write_wins() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("ns").await.unwrap();

        db.put("ns", "k", "https://app/x", &make_response("old")).await.unwrap();
        db.put("ns", "k", "https://app/x", &make_response("new")).await.unwrap();

        let found = db.lookup("ns", "k").await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(db.entry_count("ns").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_unknown_namespace() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let err = db.put("ghost", "k", "https://app/x", &make_response("x")).await;
        assert!(matches!(err, Err(Error::UnknownNamespace(ns)) if ns == "ghost"));
    }

    #[tokio::test]
    async fn test_delete_namespace_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_namespace("stale").await.unwrap();
        db.put("stale", "k", "https://app/x", &make_response("x")).await.unwrap();

        assert!(db.delete_namespace("stale").await.unwrap());
        assert!(!db.delete_namespace("stale").await.unwrap());
        assert_eq!(db.entry_count("stale").await.unwrap(), 0);
        assert!(db.lookup("stale", "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_namespaces() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for ns in ["ramadan-hub-v1", "ramadan-data-v1", "ramadan-cdn-v1"] {
            db.open_namespace(ns).await.unwrap();
        }
        // open is idempotent
        db.open_namespace("ramadan-hub-v1").await.unwrap();

        let names = db.list_namespaces().await.unwrap();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"ramadan-hub-v1".to_string()));
    }

    #[tokio::test]
    async fn test_is_success() {
        assert!(make_response("ok").is_success());
        assert!(!StoredResponse::new(404, None, Vec::new()).is_success());
        assert!(!StoredResponse::new(503, None, Vec::new()).is_success());
    }
}
