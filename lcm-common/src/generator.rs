//! Class announcement composition
//!
//! Blocks are emitted in a fixed order. Each block ends with a newline and is
//! skipped when its text is blank; the optional blocks additionally need
//! their include flag. The finished text is trimmed.

use crate::catalog::Catalog;
use crate::form::{LessonForm, Selection};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Greeting used when the request does not supply one
pub const DEFAULT_GREETING: &str = "Chào cả lớp, Thầy gửi nội dung buổi học vừa qua";

const CLASS_SITUATION_HEADER: &str = "**📊 Tình hình học tập của lớp:**";
const STUDENT_BOOK_HEADER: &str = "**📚 Student Book:**";
const VIDEO_HEADER: &str = "**🎥 Link video:**";
const HOMEWORK_RESULT_HEADER: &str = "**✅ Kết quả bài tập về nhà:**";
const NEXT_REQUIREMENT_HEADER: &str = "**📋 Yêu cầu cho buổi tiếp theo:**";
const DEADLINE_HEADER: &str = "**⏰ Hạn nộp bài:**";
const NEXT_LESSON_HEADER: &str = "**📖 Nội dung buổi tới:**";

/// Which optional blocks go into the announcement (all off by default)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludedFields {
    pub student_book: bool,
    pub video: bool,
    pub homework_result: bool,
    pub next_requirement: bool,
    pub deadline: bool,
    pub next_lesson_content: bool,
}

/// Values replacing the stored ones for a single announcement
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldOverrides {
    pub lesson_content: Option<String>,
    pub student_book: Option<String>,
    pub video: Option<String>,
    pub homework_result: Option<String>,
    pub next_requirement: Option<String>,
    pub deadline: Option<String>,
    pub next_lesson_content: Option<String>,
}

/// Everything the generator needs besides the stored lesson
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnouncementRequest {
    pub subject: Option<String>,
    pub level: Option<String>,
    pub lesson_number: Option<u32>,
    /// `None` uses [`DEFAULT_GREETING`]; an empty string drops the greeting
    pub greeting: Option<String>,
    pub class_situation: String,
    pub include: IncludedFields,
    pub overrides: FieldOverrides,
}

/// Resolved block texts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementContent {
    pub greeting: String,
    pub lesson_number: u32,
    pub lesson_content: String,
    pub class_situation: String,
    pub student_book: String,
    pub video: String,
    pub homework_result: String,
    pub next_requirement: String,
    pub deadline: String,
    pub next_lesson_content: String,
}

fn push_block(out: &mut String, header: Option<&str>, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    if let Some(header) = header {
        out.push_str(header);
        out.push('\n');
    }
    out.push_str(text);
    out.push('\n');
}

/// Assemble the announcement text
pub fn render_announcement(content: &AnnouncementContent, include: &IncludedFields) -> String {
    let mut out = String::new();

    push_block(&mut out, None, &content.greeting);
    out.push_str(&format!(
        "**📌 Nội dung buổi học số {}**\n",
        content.lesson_number
    ));
    push_block(&mut out, None, &content.lesson_content);
    push_block(&mut out, Some(CLASS_SITUATION_HEADER), &content.class_situation);

    let optional = [
        (include.student_book, STUDENT_BOOK_HEADER, &content.student_book),
        (include.video, VIDEO_HEADER, &content.video),
        (include.homework_result, HOMEWORK_RESULT_HEADER, &content.homework_result),
        (include.next_requirement, NEXT_REQUIREMENT_HEADER, &content.next_requirement),
        (include.deadline, DEADLINE_HEADER, &content.deadline),
        (include.next_lesson_content, NEXT_LESSON_HEADER, &content.next_lesson_content),
    ];
    for (included, header, text) in optional {
        if included {
            push_block(&mut out, Some(header), text);
        }
    }

    out.trim().to_string()
}

/// Compose the announcement for the selected lesson
///
/// Subject, level and lesson must all be selected and exist. Stored values
/// (and the level's student book) fill every field not overridden.
pub fn compose_announcement(catalog: &Catalog, request: &AnnouncementRequest) -> Result<String> {
    let (Some(subject), Some(level), Some(number)) = (
        request.subject.as_deref(),
        request.level.as_deref(),
        request.lesson_number,
    ) else {
        return Err(Error::InvalidInput(
            "Select a subject, level and lesson before generating".to_string(),
        ));
    };

    let selection = Selection::resolve(catalog, Some(subject), Some(level), Some(number));
    if selection.lesson_number != Some(number) || selection.level.as_deref() != Some(level) {
        return Err(Error::NotFound(format!(
            "lesson {}/{}/{}",
            subject, level, number
        )));
    }

    let form = LessonForm::for_selection(catalog, &selection);
    let stored_book = catalog
        .level(subject, level)
        .map(|l| l.student_book.clone())
        .unwrap_or_default();

    let overrides = &request.overrides;
    let pick = |value: &Option<String>, stored: String| value.clone().unwrap_or(stored);

    let content = AnnouncementContent {
        greeting: request
            .greeting
            .clone()
            .unwrap_or_else(|| DEFAULT_GREETING.to_string()),
        lesson_number: number,
        lesson_content: pick(&overrides.lesson_content, form.lesson_content),
        class_situation: request.class_situation.clone(),
        student_book: pick(&overrides.student_book, stored_book),
        video: pick(&overrides.video, form.video),
        homework_result: pick(&overrides.homework_result, form.homework_result),
        next_requirement: pick(&overrides.next_requirement, form.next_requirement),
        deadline: pick(&overrides.deadline, form.deadline),
        next_lesson_content: pick(&overrides.next_lesson_content, form.next_lesson_content),
    };

    Ok(render_announcement(&content, &request.include))
}
