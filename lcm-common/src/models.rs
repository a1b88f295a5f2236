//! Stored document shapes
//!
//! Collections:
//! - `subjects`: one document per subject, levels and lessons nested inside
//! - `levels`: level records from the two-tier revision, possibly split into parts
//! - `studentBooks`: one URL per level code

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const SUBJECTS_COLLECTION: &str = "subjects";
pub const LEVELS_COLLECTION: &str = "levels";
pub const STUDENT_BOOKS_COLLECTION: &str = "studentBooks";

const LESSON_KEY_PREFIX: &str = "lesson_";

/// Treat `null` like a missing string field
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One numbered session's content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lesson_content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub next_lesson_content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub video: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub next_requirement: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub homework_result: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deadline: String,
}

/// Level nested inside a subject document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelDocument {
    #[serde(default)]
    pub lessons: BTreeMap<String, Lesson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_book: Option<String>,
}

/// Document of the `subjects` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectDocument {
    #[serde(default)]
    pub subject_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub levels: BTreeMap<String, LevelDocument>,
}

/// Document of the `levels` collection (separate level record)
///
/// A large level may be split over several records sharing
/// `(subject_code, level_code)` and numbered by `part_number`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelRecord {
    #[serde(default)]
    pub subject_code: String,
    #[serde(default, alias = "original_level_code")]
    pub level_code: String,
    #[serde(default, alias = "subject_number", skip_serializing_if = "Option::is_none")]
    pub part_number: Option<i64>,
    #[serde(default)]
    pub lessons: BTreeMap<String, Lesson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_book: Option<String>,
}

/// Document of the `studentBooks` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentBookDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

/// Parse `lesson_<n>` into `n` (positive integers only)
pub fn parse_lesson_key(key: &str) -> Option<u32> {
    let digits = key.strip_prefix(LESSON_KEY_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Build the storage key of lesson `n`
pub fn lesson_key(number: u32) -> String {
    format!("{}{}", LESSON_KEY_PREFIX, number)
}

/// Normalize a subject or level code: trimmed, upper-cased, non-empty
///
/// Codes become document ids and field path segments, so quotes, dots and
/// slashes are rejected.
pub fn normalize_code(raw: &str) -> crate::Result<String> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        return Err(crate::Error::InvalidInput("Code must not be empty".to_string()));
    }
    if code.chars().any(|c| matches!(c, '"' | '.' | '/' | '\\') || c.is_control()) {
        return Err(crate::Error::InvalidInput(format!(
            "Code contains forbidden characters: {}",
            raw
        )));
    }
    Ok(code)
}
