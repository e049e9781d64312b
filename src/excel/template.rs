//! Blank upload workbooks that satisfy the positional sheet contract

use crate::error::{AdvisorError, AdvisorResult};
use crate::normalize::{COURSE_CODE_HEADER, GRADE_HEADER, SEMESTER_HEADER, YEAR_HEADER};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

pub const TRANSCRIPT_TEMPLATE_FILE: &str = "transcript_template.xlsx";
pub const OFFERED_TEMPLATE_FILE: &str = "offered_courses_template.xlsx";

/// Writes the two upload templates
pub struct TemplateWriter;

impl TemplateWriter {
    /// Transcript workbook: sheet 1 is informational, completed courses go on sheet 2
    pub fn transcript_workbook() -> AdvisorResult<Workbook> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let student = workbook.add_worksheet();
        name_sheet(student, "Student")?;
        write_headers(student, &["Student_ID", "Name"], &bold)?;

        let completed = workbook.add_worksheet();
        name_sheet(completed, "Completed Courses")?;
        write_headers(
            completed,
            &[COURSE_CODE_HEADER, GRADE_HEADER, SEMESTER_HEADER, YEAR_HEADER],
            &bold,
        )?;

        Ok(workbook)
    }

    /// Offered courses workbook: a single sheet of course codes
    pub fn offered_workbook() -> AdvisorResult<Workbook> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        let offered = workbook.add_worksheet();
        name_sheet(offered, "Offered Courses")?;
        write_headers(offered, &[COURSE_CODE_HEADER], &bold)?;

        Ok(workbook)
    }

    /// Write both templates into `dir`, returning the created paths
    pub fn write_all(dir: &Path) -> AdvisorResult<Vec<std::path::PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let transcript_path = dir.join(TRANSCRIPT_TEMPLATE_FILE);
        save(&mut Self::transcript_workbook()?, &transcript_path)?;

        let offered_path = dir.join(OFFERED_TEMPLATE_FILE);
        save(&mut Self::offered_workbook()?, &offered_path)?;

        Ok(vec![transcript_path, offered_path])
    }
}

fn name_sheet(worksheet: &mut Worksheet, name: &str) -> AdvisorResult<()> {
    worksheet
        .set_name(name)
        .map_err(|e| AdvisorError::Export(format!("Failed to set worksheet name: {}", e)))?;
    Ok(())
}

fn write_headers(worksheet: &mut Worksheet, headers: &[&str], format: &Format) -> AdvisorResult<()> {
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, format)
            .map_err(|e| AdvisorError::Export(format!("Failed to write header: {}", e)))?;
    }
    Ok(())
}

fn save(workbook: &mut Workbook, path: &Path) -> AdvisorResult<()> {
    workbook
        .save(path)
        .map_err(|e| AdvisorError::Export(format!("Failed to save {}: {}", path.display(), e)))
}
