//! Entity identifier -> display title lookup, for reporting only.

use crate::db::Db;
use crate::error::Result;
use crate::ranking::EntityId;
use rusqlite::params_from_iter;
use std::collections::HashMap;
use std::path::Path;

/// SQLite has a default host-parameter limit of 999 on older builds.
const LOOKUP_CHUNK: usize = 500;

/// Title mapping backed by an `entity_id_mapping(id, entity)` table.
pub struct TitleMapping {
    db: Db,
}

impl TitleMapping {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Self {
        Self { db: Db::new(db_path) }
    }

    /// Titles for the given ids. Unknown ids are absent from the result.
    /// Ids are compared as text, so integer-keyed tables work too.
    pub async fn titles_for(&self, ids: &[EntityId]) -> Result<HashMap<EntityId, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let keys: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let titles = self
            .db
            .with_connection(move |conn| {
                let mut out = HashMap::with_capacity(keys.len());
                for chunk in keys.chunks(LOOKUP_CHUNK) {
                    let placeholders = vec!["?"; chunk.len()].join(", ");
                    let sql = format!(
                        "SELECT CAST(id AS TEXT), entity FROM entity_id_mapping WHERE CAST(id AS TEXT) IN ({})",
                        placeholders
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                        Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
                    })?;
                    for row in rows {
                        let (id, title) = row?;
                        if let Some(title) = title {
                            out.insert(EntityId::from(id), title);
                        }
                    }
                }
                Ok(out)
            })
            .await?;
        log::debug!("Resolved {} of {} entity titles", titles.len(), ids.len());
        Ok(titles)
    }
}

/// Lookup through an optional mapping; a failed lookup degrades to no titles.
pub async fn resolve_titles(
    mapping: Option<&TitleMapping>,
    ids: &[EntityId],
) -> HashMap<EntityId, String> {
    let Some(mapping) = mapping else {
        return HashMap::new();
    };
    match mapping.titles_for(ids).await {
        Ok(titles) => titles,
        Err(e) => {
            log::warn!("Entity title lookup failed, continuing without titles: {}", e);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn mapping_db(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("mapping.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE entity_id_mapping (id INTEGER, entity TEXT);
             INSERT INTO entity_id_mapping VALUES (12, 'Barack Obama');
             INSERT INTO entity_id_mapping VALUES (7, 'Honolulu');
             INSERT INTO entity_id_mapping VALUES (9, NULL);",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn looks_up_integer_keyed_titles() {
        let dir = TempDir::new().unwrap();
        let mapping = TitleMapping::open(mapping_db(&dir));
        let ids = vec![EntityId::new("12"), EntityId::new("7"), EntityId::new("404"), EntityId::new("9")];
        let titles = mapping.titles_for(&ids).await.unwrap();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles[&EntityId::new("12")], "Barack Obama");
        assert!(!titles.contains_key(&EntityId::new("404")));
    }

    #[tokio::test]
    async fn empty_request_skips_database() {
        let mapping = TitleMapping::open("/nonexistent/mapping.db");
        assert!(mapping.titles_for(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_titles_degrades_on_error() {
        let mapping = TitleMapping::open("/nonexistent/mapping.db");
        let titles = resolve_titles(Some(&mapping), &[EntityId::new("1")]).await;
        assert!(titles.is_empty());
        assert!(resolve_titles(None, &[EntityId::new("1")]).await.is_empty());
    }
}
