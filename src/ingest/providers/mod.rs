// src/ingest/providers/mod.rs
pub mod archivesspace;
pub mod cartographer;

pub use archivesspace::RecordsSource;
pub use cartographer::MapSource;
