//! Document -> linked entity sets, loaded from a JSON Lines dataset.

use super::{DocId, EntityId};
use crate::error::{RankauditError, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct LinkRecord {
    doc_id: JsonValue,
    entities: JsonValue,
}

/// Entities linked within each document. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct EntityLinks {
    docs: HashMap<DocId, HashSet<EntityId>>,
}

impl EntityLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{"doc_id": ..., "entities": [...]}` lines from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let links = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
        crate::report::stat("Documents with entity links", links.len());
        Ok(links)
    }

    /// Parse JSON Lines. A repeated `doc_id` replaces the earlier line.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self> {
        let mut links = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let record: LinkRecord = serde_json::from_str(&line)
                .map_err(|e| RankauditError::malformed(source, line_no, e.to_string()))?;

            let doc_id = match record.doc_id {
                JsonValue::String(s) => DocId::from(s),
                other => {
                    return Err(RankauditError::malformed(
                        source,
                        line_no,
                        format!("doc_id must be a string, found {}", other),
                    ))
                }
            };
            let values = match record.entities {
                JsonValue::Array(values) => values,
                other => {
                    return Err(RankauditError::malformed(
                        source,
                        line_no,
                        format!("entities must be a list, found {}", other),
                    ))
                }
            };
            let mut entities = HashSet::with_capacity(values.len());
            for value in values {
                let id = match value {
                    JsonValue::String(s) => s,
                    JsonValue::Number(n) => n.to_string(),
                    other => {
                        return Err(RankauditError::malformed(
                            source,
                            line_no,
                            format!("entity identifier must be a string or number, found {}", other),
                        ))
                    }
                };
                entities.insert(EntityId::from(id));
            }
            links.insert(doc_id, entities);
        }
        Ok(links)
    }

    pub fn insert(&mut self, doc: DocId, entities: HashSet<EntityId>) {
        self.docs.insert(doc, entities);
    }

    /// Linked entities of a document, `None` if the document has no link record.
    pub fn entities(&self, doc: &DocId) -> Option<&HashSet<EntityId>> {
        self.docs.get(doc)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl FromIterator<(DocId, HashSet<EntityId>)> for EntityLinks {
    fn from_iter<I: IntoIterator<Item = (DocId, HashSet<EntityId>)>>(iter: I) -> Self {
        Self {
            docs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn coerces_numbers_and_deduplicates() {
        let data = r#"{"doc_id": "d1", "entities": [12, "12", "Q5", 7]}
{"doc_id": "d2", "entities": []}
"#;
        let links = EntityLinks::from_reader(Cursor::new(data), "links.jsonl").unwrap();
        assert_eq!(links.len(), 2);
        let d1 = links.entities(&DocId::new("d1")).unwrap();
        assert_eq!(d1.len(), 3);
        assert!(d1.contains(&EntityId::new("12")));
        assert!(d1.contains(&EntityId::new("7")));
        assert!(links.entities(&DocId::new("d2")).unwrap().is_empty());
        assert!(links.entities(&DocId::new("d3")).is_none());
    }

    #[test]
    fn later_record_replaces_earlier() {
        let data = "{\"doc_id\": \"d1\", \"entities\": [\"a\"]}\n{\"doc_id\": \"d1\", \"entities\": [\"b\"]}\n";
        let links = EntityLinks::from_reader(Cursor::new(data), "links").unwrap();
        let d1 = links.entities(&DocId::new("d1")).unwrap();
        assert!(d1.contains(&EntityId::new("b")));
        assert!(!d1.contains(&EntityId::new("a")));
    }

    #[test]
    fn numeric_doc_id_is_rejected() {
        let data = "{\"doc_id\": 5, \"entities\": []}\n";
        let err = EntityLinks::from_reader(Cursor::new(data), "links").unwrap_err();
        assert!(matches!(err, RankauditError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn missing_field_is_rejected() {
        let data = "{\"doc_id\": \"d1\"}\n";
        assert!(EntityLinks::from_reader(Cursor::new(data), "links").is_err());
    }

    #[test]
    fn null_entity_is_rejected() {
        let data = "{\"doc_id\": \"d1\", \"entities\": [null]}\n";
        assert!(EntityLinks::from_reader(Cursor::new(data), "links").is_err());
    }
}
