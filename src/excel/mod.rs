//! Spreadsheet input/output
//!
//! - Read: binary workbook (.xlsx, .xls, .ods) → loosely-typed sheets and rows
//! - Template: blank upload workbooks matching the expected sheet layout

mod reader;
mod template;

pub use reader::{read_workbook, read_workbook_file};
pub use template::{TemplateWriter, OFFERED_TEMPLATE_FILE, TRANSCRIPT_TEMPLATE_FILE};
