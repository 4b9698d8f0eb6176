//! Document repository — CRUD operations for the `documents` table.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw document row from the database.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    /// `pdf` or `docx`; parse with [`crate::convert::FileType::parse`].
    pub file_type: String,
    pub source_path: String,
    pub total_pages: u32,
    pub uploaded_at: String,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            file_type: row.get("file_type")?,
            source_path: row.get("source_path")?,
            total_pages: row.get("total_pages")?,
            uploaded_at: row.get("uploaded_at")?,
        })
    }
}

/// Inserts a new document row.
pub fn insert(db: &Database, document: &DocumentRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO documents (id, title, file_type, source_path, total_pages, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                document.id,
                document.title,
                document.file_type,
                document.source_path,
                document.total_pages,
                document.uploaded_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a document by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], DocumentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Lists all documents, most recent upload first.
pub fn list(db: &Database) -> Result<Vec<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM documents ORDER BY uploaded_at DESC, id DESC")?;
        let rows: Vec<DocumentRow> = stmt
            .query_map([], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Writes the authoritative page count. Called exactly once per document,
/// by the persistence coordinator.
pub fn set_total_pages(db: &Database, id: &str, total_pages: u32) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE documents SET total_pages = ?2 WHERE id = ?1",
            params![id, total_pages],
        )?;
        Ok(())
    })
}

/// Deletes a document; page rows go with it via `ON DELETE CASCADE`.
/// Returns whether a row was actually removed.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::page_repo;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_document(id: &str) -> DocumentRow {
        DocumentRow {
            id: id.to_string(),
            title: "Quarterly Report".to_string(),
            file_type: "pdf".to_string(),
            source_path: format!("sources/{id}.pdf"),
            total_pages: 0,
            uploaded_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        insert(&db, &sample_document("doc-1")).unwrap();

        let found = find_by_id(&db, "doc-1").unwrap().unwrap();
        assert_eq!(found.title, "Quarterly Report");
        assert_eq!(found.file_type, "pdf");
        assert_eq!(found.total_pages, 0);
    }

    #[test]
    fn test_find_nonexistent() {
        let db = test_db();
        assert!(find_by_id(&db, "nope").unwrap().is_none());
    }

    #[test]
    fn test_set_total_pages() {
        let db = test_db();
        insert(&db, &sample_document("doc-2")).unwrap();

        set_total_pages(&db, "doc-2", 7).unwrap();

        let found = find_by_id(&db, "doc-2").unwrap().unwrap();
        assert_eq!(found.total_pages, 7);
    }

    #[test]
    fn test_list_orders_most_recent_first() {
        let db = test_db();
        for (id, uploaded_at) in [
            ("old", "2026-01-01T00:00:00Z"),
            ("new", "2026-02-01T00:00:00Z"),
            ("mid", "2026-01-15T00:00:00Z"),
        ] {
            let mut doc = sample_document(id);
            doc.uploaded_at = uploaded_at.to_string();
            insert(&db, &doc).unwrap();
        }

        let ids: Vec<String> = list(&db).unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_delete_cascades_to_pages() {
        let db = test_db();
        insert(&db, &sample_document("doc-3")).unwrap();
        for n in 1..=2 {
            page_repo::insert(
                &db,
                &page_repo::PageRow {
                    id: format!("page-{n}"),
                    document_id: "doc-3".to_string(),
                    page_number: n,
                    image_path: format!("pages/doc_doc-3_page_{n}.jpg"),
                },
            )
            .unwrap();
        }

        assert!(delete(&db, "doc-3").unwrap());
        assert!(find_by_id(&db, "doc-3").unwrap().is_none());
        assert_eq!(page_repo::count_for_document(&db, "doc-3").unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_reports_false() {
        let db = test_db();
        assert!(!delete(&db, "ghost").unwrap());
    }
}
