//! docraster — converts uploaded documents (PDF, DOCX) into sequences of
//! JPEG page images with one persisted page record per image.
//!
//! The pipeline is deliberately small and synchronous: one document is
//! rasterized and persisted fully within the handling of one ingestion
//! request. The pieces are:
//!
//! * [`convert`] — format dispatch and rasterization. PDFs render through
//!   poppler's `pdftoppm`; DOCX files are synthetically paginated by
//!   chunking paragraph text into fixed-size blocks and painting each block
//!   onto a canvas.
//! * [`pipeline`] — the persistence coordinator. Given a document id it
//!   re-reads the record, rasterizes, stores each page image under a
//!   deterministic name and creates the page rows.
//! * [`ingest`] — the boundary the (external) web layer calls: validates
//!   the upload, creates the document record, runs the pipeline and
//!   performs compensating deletion when processing fails.
//! * [`db`] / [`storage`] — SQLite records and on-disk artifacts.
//!
//! Processing is keyed by document id rather than by passing live objects
//! through, so the rasterize-and-persist step can later move off the
//! request thread (queue/worker) without changing the contract.

pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod storage;

pub use config::ConversionConfig;
pub use convert::FileType;
pub use error::{ConvertError, DocrasterError, IngestError, Result, StorageError};
pub use ingest::{DocumentView, Ingestor, PageView, Upload};
pub use pipeline::{Pipeline, PipelineError};
pub use storage::MediaStore;
