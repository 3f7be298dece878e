//! medcalc-export
//!
//! Printable reports for a calculation: Markdown via a Tera template, DOCX
//! from that Markdown, and a file-writing export sink.

pub mod docx;
pub mod error;
pub mod render;
pub mod sink;
pub mod styles;

pub use error::ReportError;
pub use sink::{FileExporter, ReportFormat};
