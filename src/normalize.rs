//! Record normalization - raw spreadsheet rows → canonical records
//!
//! Every row goes through a decode step that yields either an accepted
//! record or a rejection reason. Rejected rows are dropped on purpose: they
//! are lossy filtering, not errors. The only failure surfaced here is a
//! workbook that lacks the sheet a given upload type lives on.

use crate::error::{AdvisorError, AdvisorResult};
use crate::types::{OfferedCourseCode, RawRow, Sheet, TranscriptEntry, Workbook};
use tracing::debug;

pub const COURSE_CODE_HEADER: &str = "Course_Code";
pub const GRADE_HEADER: &str = "Grade";
pub const SEMESTER_HEADER: &str = "Semester";
pub const YEAR_HEADER: &str = "Year";

/// Course code headers for the offered-courses sheet, in priority order
pub const OFFERED_CODE_HEADERS: [&str; 2] = ["course_code", "Course_Code"];

/// Transcript rows live on the second sheet
pub const TRANSCRIPT_SHEET_INDEX: usize = 1;
/// Offered course codes live on the first sheet
pub const OFFERED_SHEET_INDEX: usize = 0;

/// Outcome of decoding one raw row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    Accepted(T),
    Rejected(RowRejection),
}

impl<T> RowOutcome<T> {
    pub fn accepted(self) -> Option<T> {
        match self {
            RowOutcome::Accepted(record) => Some(record),
            RowOutcome::Rejected(_) => None,
        }
    }
}

/// Why a row was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    MissingCourseCode,
    MissingGrade,
}

impl std::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowRejection::MissingCourseCode => write!(f, "missing course code"),
            RowRejection::MissingGrade => write!(f, "missing grade"),
        }
    }
}

//==============================================================================
// Transcript
//==============================================================================

/// Decode one transcript row.
///
/// `term` is `"<Semester>/<Year>"`; a missing part leaves an empty slot
/// (`"/2023"`) rather than rejecting the row.
pub fn decode_transcript_row(row: &RawRow) -> RowOutcome<TranscriptEntry> {
    let Some(course_code) = row.text(COURSE_CODE_HEADER) else {
        return RowOutcome::Rejected(RowRejection::MissingCourseCode);
    };
    let Some(grade) = row.text(GRADE_HEADER) else {
        return RowOutcome::Rejected(RowRejection::MissingGrade);
    };

    let semester = row.text(SEMESTER_HEADER).unwrap_or_default();
    let year = row.text(YEAR_HEADER).unwrap_or_default();

    RowOutcome::Accepted(TranscriptEntry {
        course_code,
        grade,
        credits_earned: 0,
        term: format!("{}/{}", semester, year),
    })
}

/// Lazy sequence of transcript entries over a sheet.
///
/// Clone it (or call [`normalize_transcript`] again) to walk the rows a
/// second time; the sheet itself is never consumed.
#[derive(Debug, Clone)]
pub struct TranscriptEntries<'a> {
    rows: std::iter::Enumerate<std::slice::Iter<'a, RawRow>>,
}

impl Iterator for TranscriptEntries<'_> {
    type Item = TranscriptEntry;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, row) in self.rows.by_ref() {
            match decode_transcript_row(row) {
                RowOutcome::Accepted(entry) => return Some(entry),
                RowOutcome::Rejected(reason) => {
                    debug!(row = index + 2, %reason, "Dropping transcript row");
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.rows.size_hint().1)
    }
}

/// Transcript entries of `sheet`, in row order, duplicates preserved
pub fn normalize_transcript(sheet: &Sheet) -> TranscriptEntries<'_> {
    TranscriptEntries {
        rows: sheet.rows.iter().enumerate(),
    }
}

/// Transcript entries from the transcript sheet of an uploaded workbook
pub fn transcript_entries(workbook: &Workbook) -> AdvisorResult<Vec<TranscriptEntry>> {
    let sheet = required_sheet(workbook, TRANSCRIPT_SHEET_INDEX, "transcript")?;
    Ok(normalize_transcript(sheet).collect())
}

//==============================================================================
// Offered Courses
//==============================================================================

/// Decode one offered-courses row: first non-empty course code header wins
pub fn decode_offered_row(row: &RawRow) -> RowOutcome<OfferedCourseCode> {
    OFFERED_CODE_HEADERS
        .iter()
        .find_map(|header| row.text(header))
        .map(|code| RowOutcome::Accepted(OfferedCourseCode(code)))
        .unwrap_or(RowOutcome::Rejected(RowRejection::MissingCourseCode))
}

/// Lazy sequence of offered course codes over a sheet
#[derive(Debug, Clone)]
pub struct OfferedCourses<'a> {
    rows: std::slice::Iter<'a, RawRow>,
}

impl Iterator for OfferedCourses<'_> {
    type Item = OfferedCourseCode;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.by_ref().find_map(|row| decode_offered_row(row).accepted())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.rows.size_hint().1)
    }
}

/// Offered course codes of `sheet`, in row order, duplicates preserved
pub fn normalize_offered_courses(sheet: &Sheet) -> OfferedCourses<'_> {
    OfferedCourses {
        rows: sheet.rows.iter(),
    }
}

/// Offered course codes from the first sheet of an uploaded workbook
pub fn offered_course_codes(workbook: &Workbook) -> AdvisorResult<Vec<OfferedCourseCode>> {
    let sheet = required_sheet(workbook, OFFERED_SHEET_INDEX, "offered courses")?;
    Ok(normalize_offered_courses(sheet).collect())
}

fn required_sheet<'a>(workbook: &'a Workbook, index: usize, purpose: &str) -> AdvisorResult<&'a Sheet> {
    workbook.sheet_at(index).ok_or_else(|| {
        AdvisorError::Decode(format!(
            "Expected the {} data on sheet {}, but the workbook has {} sheet(s)",
            purpose,
            index + 1,
            workbook.sheets.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use pretty_assertions::assert_eq;

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells.iter().cloned().collect()
    }

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_decode_transcript_row_accepts_complete_row() {
        let outcome = decode_transcript_row(&row(&[
            ("Course_Code", t("CS101")),
            ("Grade", t("A")),
            ("Semester", t("1")),
            ("Year", t("2023")),
        ]));
        assert_eq!(
            outcome,
            RowOutcome::Accepted(TranscriptEntry {
                course_code: "CS101".to_string(),
                grade: "A".to_string(),
                credits_earned: 0,
                term: "1/2023".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_transcript_row_rejections() {
        assert_eq!(
            decode_transcript_row(&row(&[("Course_Code", t("")), ("Grade", t("B"))])),
            RowOutcome::Rejected(RowRejection::MissingCourseCode)
        );
        assert_eq!(
            decode_transcript_row(&row(&[("Course_Code", t("CS102"))])),
            RowOutcome::Rejected(RowRejection::MissingGrade)
        );
    }

    #[test]
    fn test_decode_transcript_row_numeric_cells() {
        let entry = decode_transcript_row(&row(&[
            ("Course_Code", CellValue::Number(1001.0)),
            ("Grade", t("B+")),
            ("Semester", CellValue::Number(2.0)),
            ("Year", CellValue::Number(2024.0)),
        ]))
        .accepted()
        .unwrap();
        assert_eq!(entry.course_code, "1001");
        assert_eq!(entry.term, "2/2024");
    }

    #[test]
    fn test_decode_transcript_row_degraded_term() {
        let missing_semester = decode_transcript_row(&row(&[
            ("Course_Code", t("MA101")),
            ("Grade", t("C")),
            ("Year", t("2022")),
        ]))
        .accepted()
        .unwrap();
        assert_eq!(missing_semester.term, "/2022");

        let missing_both = decode_transcript_row(&row(&[("Course_Code", t("MA101")), ("Grade", t("C"))]))
            .accepted()
            .unwrap();
        assert_eq!(missing_both.term, "/");
    }

    #[test]
    fn test_decode_offered_row_priority() {
        assert_eq!(
            decode_offered_row(&row(&[("course_code", t("CS201")), ("Course_Code", t("CS999"))])),
            RowOutcome::Accepted(OfferedCourseCode::from("CS201"))
        );
        // Empty lower-case header falls through to the other spelling
        assert_eq!(
            decode_offered_row(&row(&[("course_code", t("")), ("Course_Code", t("CS202"))])),
            RowOutcome::Accepted(OfferedCourseCode::from("CS202"))
        );
        assert_eq!(
            decode_offered_row(&row(&[("COURSE_CODE", t("CS203"))])),
            RowOutcome::Rejected(RowRejection::MissingCourseCode)
        );
    }

    #[test]
    fn test_normalize_transcript_is_restartable() {
        let sheet = Sheet::with_rows(
            "Completed",
            vec![
                row(&[("Course_Code", t("CS101")), ("Grade", t("A"))]),
                row(&[("Grade", t("B"))]),
                row(&[("Course_Code", t("CS101")), ("Grade", t("F"))]),
            ],
        );

        let entries = normalize_transcript(&sheet);
        let first_pass: Vec<_> = entries.clone().collect();
        let second_pass: Vec<_> = entries.collect();

        assert_eq!(first_pass.len(), 2);
        assert_eq!(first_pass, second_pass);
        // Duplicate course codes are kept verbatim
        assert_eq!(first_pass[0].course_code, first_pass[1].course_code);
        assert_eq!(first_pass[1].grade, "F");
    }

    #[test]
    fn test_required_sheet_missing() {
        let workbook = Workbook::new(vec![Sheet::new("Only")]);
        assert!(matches!(
            transcript_entries(&workbook),
            Err(AdvisorError::Decode(_))
        ));
        assert!(offered_course_codes(&workbook).unwrap().is_empty());
        assert!(matches!(
            offered_course_codes(&Workbook::default()),
            Err(AdvisorError::Decode(_))
        ));
    }
}
