pub mod import_job;

pub use import_job::{export_summary, ImportJob};
