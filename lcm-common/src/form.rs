//! Selection and lesson form state
//!
//! The selection follows the Subject → Level → Lesson hierarchy: changing a
//! parent invalidates everything below it. The form mirrors the six editable
//! lesson fields.

use crate::catalog::Catalog;
use crate::models::Lesson;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Time a `success` status stays visible
pub const SUCCESS_RESET_DELAY: Duration = Duration::from_secs(2);

/// Time an `error` status stays visible
pub const ERROR_RESET_DELAY: Duration = Duration::from_secs(3);

/// Currently selected subject, level and lesson
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub subject: Option<String>,
    pub level: Option<String>,
    pub lesson_number: Option<u32>,
}

impl Selection {
    /// Resolve a requested selection against the catalog, applying each step in order
    pub fn resolve(
        catalog: &Catalog,
        subject: Option<&str>,
        level: Option<&str>,
        lesson_number: Option<u32>,
    ) -> Self {
        let mut selection = Self::default();
        selection.select_subject(catalog, subject);
        selection.select_level(catalog, level);
        if let Some(number) = lesson_number {
            selection.select_lesson(catalog, number);
        }
        selection
    }

    /// Select a subject; level and lesson are cleared
    ///
    /// Unknown codes leave nothing selected.
    pub fn select_subject(&mut self, catalog: &Catalog, code: Option<&str>) {
        self.subject = code
            .filter(|c| catalog.subject(c).is_some())
            .map(str::to_string);
        self.level = None;
        self.lesson_number = None;
    }

    /// Select a level of the current subject and its first lesson
    pub fn select_level(&mut self, catalog: &Catalog, code: Option<&str>) {
        let level = match (self.subject.as_deref(), code) {
            (Some(subject), Some(code)) => catalog.level(subject, code),
            _ => None,
        };

        self.level = level.map(|l| l.code.clone());
        self.lesson_number = level.and_then(|l| l.lessons.first()).map(|l| l.number);
    }

    /// Select a lesson; ignored unless it exists in the current level
    pub fn select_lesson(&mut self, catalog: &Catalog, number: u32) {
        if let (Some(subject), Some(level)) = (self.subject.as_deref(), self.level.as_deref()) {
            if catalog.lesson(subject, level, number).is_some() {
                self.lesson_number = Some(number);
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.subject.is_some() && self.level.is_some() && self.lesson_number.is_some()
    }
}

/// Editable lesson fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LessonForm {
    pub lesson_content: String,
    pub next_lesson_content: String,
    pub video: String,
    pub next_requirement: String,
    pub homework_result: String,
    pub deadline: String,
}

impl LessonForm {
    pub fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            lesson_content: lesson.lesson_content.clone(),
            next_lesson_content: lesson.next_lesson_content.clone(),
            video: lesson.video.clone(),
            next_requirement: lesson.next_requirement.clone(),
            homework_result: lesson.homework_result.clone(),
            deadline: lesson.deadline.clone(),
        }
    }

    /// Form for the selected lesson; empty when the selection is incomplete or stale
    pub fn for_selection(catalog: &Catalog, selection: &Selection) -> Self {
        match (
            selection.subject.as_deref(),
            selection.level.as_deref(),
            selection.lesson_number,
        ) {
            (Some(subject), Some(level), Some(number)) => catalog
                .lesson(subject, level, number)
                .map(|entry| Self::from_lesson(&entry.lesson))
                .unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Lesson to store when saving this form over `existing`
    ///
    /// `homework_result` and `deadline` already on the server are kept.
    pub fn apply_to(&self, existing: &Lesson) -> Lesson {
        Lesson {
            lesson_content: self.lesson_content.clone(),
            next_lesson_content: self.next_lesson_content.clone(),
            video: self.video.clone(),
            next_requirement: self.next_requirement.clone(),
            homework_result: keep_existing(&existing.homework_result, &self.homework_result),
            deadline: keep_existing(&existing.deadline, &self.deadline),
        }
    }
}

fn keep_existing(existing: &str, incoming: &str) -> String {
    if existing.is_empty() {
        incoming.to_string()
    } else {
        existing.to_string()
    }
}

/// Progress of a user action (save, create, delete, reorder)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Idle,
    Saving,
    Success,
    Error,
}

impl ActionStatus {
    /// How long the status stays visible before reverting to `Idle`
    pub fn reset_delay(self) -> Option<Duration> {
        match self {
            Self::Success => Some(SUCCESS_RESET_DELAY),
            Self::Error => Some(ERROR_RESET_DELAY),
            Self::Idle | Self::Saving => None,
        }
    }
}

/// A status together with the moment it was set
#[derive(Debug, Clone, Copy)]
pub struct StatusFlag {
    status: ActionStatus,
    since: Instant,
}

impl StatusFlag {
    pub fn new(status: ActionStatus) -> Self {
        Self::at(status, Instant::now())
    }

    pub fn at(status: ActionStatus, since: Instant) -> Self {
        Self { status, since }
    }

    /// Status as seen at `now`, reverted to `Idle` once its delay has passed
    pub fn current_at(&self, now: Instant) -> ActionStatus {
        match self.status.reset_delay() {
            Some(delay) if now.saturating_duration_since(self.since) >= delay => ActionStatus::Idle,
            _ => self.status,
        }
    }

    pub fn current(&self) -> ActionStatus {
        self.current_at(Instant::now())
    }
}
