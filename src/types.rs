use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

//==============================================================================
// Workbook Model (decoded spreadsheet, loosely typed)
//==============================================================================

/// A single non-empty cell value.
///
/// Empty cells never become a `CellValue`; they are simply absent from the
/// [`RawRow`] they belong to.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Render the cell the way it would be typed into a form field.
    ///
    /// Integral numbers drop their fractional part (`2023.0` → `"2023"`).
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Empty text counts as empty; numbers and booleans never do
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One data row of a sheet, keyed by the header of its column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: BTreeMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.insert(header.into(), value);
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    /// Text of the cell under `header`, or `None` when absent or empty
    pub fn text(&self, header: &str) -> Option<String> {
        self.get(header)
            .filter(|value| !value.is_empty())
            .map(CellValue::to_text)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

/// A worksheet: its name and its data rows in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Decoded spreadsheet, sheets kept in the order stored in the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Sheet at a fixed position; names are never consulted
    pub fn sheet_at(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

//==============================================================================
// Canonical Records
//==============================================================================

/// A completed course as sent to the advising service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub course_code: String,
    pub grade: String,
    /// Always 0; the service computes authoritative credits
    pub credits_earned: u32,
    /// `"<semester>/<year>"`
    pub term: String,
}

/// A course code offered next semester
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferedCourseCode(pub String);

impl OfferedCourseCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfferedCourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OfferedCourseCode {
    fn from(code: &str) -> Self {
        OfferedCourseCode(code.to_string())
    }
}

//==============================================================================
// Session & Remote Payloads
//==============================================================================

/// Opaque session identifier issued by the advising service.
///
/// The service may answer with a JSON number or a string; both are kept in
/// their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(s) => SessionId(s),
            WireId::Int(i) => SessionId(i.to_string()),
            WireId::Float(f) => SessionId(format_number(f)),
        })
    }
}

/// Response body of session creation; other fields are ignored
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedSession {
    pub session_id: SessionId,
}

/// Body of a recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub max_credits: u32,
    pub offered_courses: Vec<OfferedCourseCode>,
}

/// Recommendation payload, moved around verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationResult(pub serde_json::Value);

/// Graduation audit payload, moved around verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditResult(pub serde_json::Value);

//==============================================================================
// Course Catalog (admin)
//==============================================================================

/// A catalog course as listed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i64,
    pub course_name: String,
    pub credits: i64,
    #[serde(default)]
    pub is_ethics_seminar: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Create/update body for a catalog course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub course_name: String,
    pub credits: u32,
    pub is_ethics_seminar: bool,
    pub is_active: bool,
}

impl Default for CourseDraft {
    fn default() -> Self {
        Self {
            course_name: String::new(),
            credits: 3,
            is_ethics_seminar: false,
            is_active: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_number_text() {
        assert_eq!(CellValue::Number(2023.0).to_text(), "2023");
        assert_eq!(CellValue::Number(3.5).to_text(), "3.5");
        assert_eq!(CellValue::Number(-1.0).to_text(), "-1");
        assert_eq!(CellValue::Bool(true).to_text(), "true");
    }

    #[test]
    fn test_cell_empty() {
        assert!(CellValue::Text(String::new()).is_empty());
        assert!(!CellValue::Text(" ".to_string()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_raw_row_text_skips_empty() {
        let row: RawRow = [
            ("Course_Code", CellValue::Text(String::new())),
            ("Year", CellValue::Number(2024.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.text("Course_Code"), None);
        assert_eq!(row.text("Year"), Some("2024".to_string()));
        assert_eq!(row.text("Grade"), None);
    }

    #[test]
    fn test_session_id_from_number_or_string() {
        let from_number: SessionId = serde_json::from_str("42").unwrap();
        let from_string: SessionId = serde_json::from_str("\"abc-1\"").unwrap();
        assert_eq!(from_number.as_str(), "42");
        assert_eq!(from_string.as_str(), "abc-1");
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"42\"");
    }

    #[test]
    fn test_created_session_ignores_extra_fields() {
        let created: CreatedSession =
            serde_json::from_str(r#"{"session_id": 7, "curriculum_id": 2}"#).unwrap();
        assert_eq!(created.session_id, SessionId::new("7"));
    }

    #[test]
    fn test_course_draft_defaults() {
        let draft = CourseDraft::default();
        assert_eq!(draft.credits, 3);
        assert!(draft.is_active);
        assert!(!draft.is_ethics_seminar);
    }

    #[test]
    fn test_recommendation_result_is_transparent() {
        let payload = serde_json::json!({"earned_credits": 60});
        let result: RecommendationResult = serde_json::from_value(payload.clone()).unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), payload);
    }
}
