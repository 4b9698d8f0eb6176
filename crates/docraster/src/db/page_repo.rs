//! Page repository — operations for the `document_pages` table.
//!
//! Page rows are written once by the persistence coordinator and never
//! mutated afterwards; they disappear only through the cascade when their
//! document is deleted.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw page row from the database.
#[derive(Debug, Clone)]
pub struct PageRow {
    pub id: String,
    pub document_id: String,
    /// 1-based position in the rasterized sequence.
    pub page_number: u32,
    /// Storage-relative artifact path, e.g. `pages/doc_<id>_page_<n>.jpg`.
    pub image_path: String,
}

impl PageRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            document_id: row.get("document_id")?,
            page_number: row.get("page_number")?,
            image_path: row.get("image_path")?,
        })
    }
}

/// Inserts a new page row.
pub fn insert(db: &Database, page: &PageRow) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO document_pages (id, document_id, page_number, image_path)
             VALUES (?1, ?2, ?3, ?4)",
            params![page.id, page.document_id, page.page_number, page.image_path],
        )?;
        Ok(())
    })
}

/// Lists a document's pages in page-number order.
pub fn list_for_document(db: &Database, document_id: &str) -> Result<Vec<PageRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM document_pages WHERE document_id = ?1 ORDER BY page_number",
        )?;
        let rows: Vec<PageRow> = stmt
            .query_map(params![document_id], PageRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts a document's page rows.
pub fn count_for_document(db: &Database, document_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM document_pages WHERE document_id = ?1",
            params![document_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
