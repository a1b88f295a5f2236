//! Admin operations over the document store
//!
//! Every operation starts from a freshly loaded [`Catalog`] so that lessons
//! are written back where they actually live: inside the subject document or
//! inside the level record part that holds them. Multi-write operations are
//! not transactional.

use crate::catalog::{load_catalog, Catalog, LessonSource, LevelEntry};
use crate::db::{DocumentStore, FieldPath, FieldUpdate};
use crate::form::LessonForm;
use crate::models::{
    lesson_key, normalize_code, parse_lesson_key, Lesson, LevelDocument, StudentBookDocument,
    SubjectDocument, LEVELS_COLLECTION, STUDENT_BOOKS_COLLECTION, SUBJECTS_COLLECTION,
};
use crate::ordering::{reorder_plan, OrderUpdate};
use crate::{Error, Result};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// One pending field update against one document
struct PendingWrite {
    collection: &'static str,
    id: String,
    updates: Vec<FieldUpdate>,
}

impl PendingWrite {
    fn set(collection: &'static str, id: &str, path: FieldPath, value: serde_json::Value) -> Self {
        Self {
            collection,
            id: id.to_string(),
            updates: vec![FieldUpdate::Set(path, value)],
        }
    }
}

fn require_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

/// One past the highest sibling `display_order`, 0 for the first sibling
fn next_display_order(orders: impl Iterator<Item = Option<i64>>) -> i64 {
    orders.flatten().max().map_or(0, |max| max + 1)
}

fn level_path(level: &str, rest: &[&str]) -> FieldPath {
    FieldPath::new(
        ["levels", level]
            .iter()
            .chain(rest.iter())
            .map(|s| s.to_string()),
    )
}

#[derive(Clone)]
pub struct LessonRepository {
    store: Arc<dyn DocumentStore>,
}

impl LessonRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn catalog(&self) -> Result<Catalog> {
        load_catalog(self.store.as_ref()).await
    }

    /// Create an empty subject at the end of the list
    pub async fn create_subject(&self, code: &str, name: &str) -> Result<String> {
        let code = normalize_code(code)?;
        let name = require_name(name)?;

        let catalog = self.catalog().await?;
        if catalog.subject(&code).is_some() {
            return Err(Error::Conflict(format!("subject {}", code)));
        }

        let document = SubjectDocument {
            subject_code: code.clone(),
            subject_name: name,
            display_order: Some(next_display_order(
                catalog.subjects.iter().map(|s| s.display_order),
            )),
            levels: Default::default(),
        };
        self.store
            .create(SUBJECTS_COLLECTION, &code, serde_json::to_value(&document)?)
            .await?;

        info!("Created subject {}", code);
        Ok(code)
    }

    pub async fn rename_subject(&self, code: &str, name: &str) -> Result<()> {
        let name = require_name(name)?;
        let catalog = self.catalog().await?;
        self.ensure_subject_document(&catalog, code).await?;

        self.store
            .update(
                SUBJECTS_COLLECTION,
                code,
                &[FieldUpdate::Set(FieldPath::new(["subject_name"]), json!(name))],
            )
            .await?;

        info!("Renamed subject {} to '{}'", code, name);
        Ok(())
    }

    /// Permanently remove a subject with its levels, level records and student books
    pub async fn delete_subject(&self, code: &str) -> Result<()> {
        let catalog = self.catalog().await?;
        let subject = catalog
            .subject(code)
            .ok_or_else(|| Error::NotFound(format!("subject {}", code)))?;

        if subject.has_document {
            self.store.delete(SUBJECTS_COLLECTION, code).await?;
        }
        for level in &subject.levels {
            self.delete_level_records(level).await?;
            self.delete_unshared_student_book(&catalog, code, &level.code)
                .await?;
        }

        info!(
            "Deleted subject {} ({} levels)",
            code,
            subject.levels.len()
        );
        Ok(())
    }

    /// Add an empty level at the end of a subject
    pub async fn create_level(&self, subject: &str, level_code: &str) -> Result<String> {
        let level_code = normalize_code(level_code)?;
        let catalog = self.catalog().await?;
        let entry = catalog
            .subject(subject)
            .ok_or_else(|| Error::NotFound(format!("subject {}", subject)))?;
        if entry.level(&level_code).is_some() {
            return Err(Error::Conflict(format!("level {}/{}", subject, level_code)));
        }

        self.ensure_subject_document(&catalog, subject).await?;

        let level = LevelDocument {
            display_order: Some(next_display_order(
                entry.levels.iter().map(|l| l.display_order),
            )),
            ..Default::default()
        };
        self.store
            .update(
                SUBJECTS_COLLECTION,
                subject,
                &[FieldUpdate::Set(
                    level_path(&level_code, &[]),
                    serde_json::to_value(&level)?,
                )],
            )
            .await?;

        info!("Created level {}/{}", subject, level_code);
        Ok(level_code)
    }

    /// Remove a level, its level records and its student book
    pub async fn delete_level(&self, subject: &str, level_code: &str) -> Result<()> {
        let catalog = self.catalog().await?;
        let level = find_level(&catalog, subject, level_code)?;

        if level.nested {
            self.store
                .update(
                    SUBJECTS_COLLECTION,
                    subject,
                    &[FieldUpdate::Remove(level_path(level_code, &[]))],
                )
                .await?;
        }
        self.delete_level_records(level).await?;
        self.delete_unshared_student_book(&catalog, subject, level_code)
            .await?;

        info!("Deleted level {}/{}", subject, level_code);
        Ok(())
    }

    /// Add an empty lesson; `None` picks the number after the highest existing one
    pub async fn create_lesson(&self, subject: &str, level_code: &str, number: Option<u32>) -> Result<u32> {
        let catalog = self.catalog().await?;
        let level = find_level(&catalog, subject, level_code)?;

        let number = match number {
            Some(0) => {
                return Err(Error::InvalidInput(
                    "Lesson number must be positive".to_string(),
                ))
            }
            Some(n) => n,
            None => level.lessons.last().map(|l| l.number + 1).unwrap_or(1),
        };
        if level.lesson(number).is_some() {
            return Err(Error::Conflict(format!(
                "lesson {}/{}/{}",
                subject, level_code, number
            )));
        }

        let key = lesson_key(number);
        let empty = serde_json::to_value(Lesson::default())?;
        match level.record_ids.last() {
            Some(record_id) if !level.nested => {
                self.store
                    .update(
                        LEVELS_COLLECTION,
                        record_id,
                        &[FieldUpdate::Set(FieldPath::new(["lessons", key.as_str()]), empty)],
                    )
                    .await?;
            }
            _ => {
                self.store
                    .update(
                        SUBJECTS_COLLECTION,
                        subject,
                        &[FieldUpdate::Set(
                            level_path(level_code, &["lessons", key.as_str()]),
                            empty,
                        )],
                    )
                    .await?;
            }
        }

        info!("Created lesson {}/{}/{}", subject, level_code, key);
        Ok(number)
    }

    /// Remove a lesson from every place that stores it
    pub async fn delete_lesson(&self, subject: &str, level_code: &str, number: u32) -> Result<()> {
        let catalog = self.catalog().await?;
        let level = find_level(&catalog, subject, level_code)?;
        if level.lesson(number).is_none() {
            return Err(Error::NotFound(format!(
                "lesson {}/{}/{}",
                subject, level_code, number
            )));
        }

        let key = lesson_key(number);
        if level.nested {
            self.store
                .update(
                    SUBJECTS_COLLECTION,
                    subject,
                    &[FieldUpdate::Remove(level_path(level_code, &["lessons", key.as_str()]))],
                )
                .await?;
        }
        for record_id in &level.record_ids {
            self.store
                .update(
                    LEVELS_COLLECTION,
                    record_id,
                    &[FieldUpdate::Remove(FieldPath::new(["lessons", key.as_str()]))],
                )
                .await?;
        }

        info!("Deleted lesson {}/{}/{}", subject, level_code, key);
        Ok(())
    }

    /// Write the form over an existing lesson and return what was stored
    pub async fn save_lesson(
        &self,
        subject: &str,
        level_code: &str,
        key: &str,
        form: &LessonForm,
    ) -> Result<Lesson> {
        let number = parse_lesson_key(key)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid lesson key: {}", key)))?;

        let catalog = self.catalog().await?;
        let entry = catalog.lesson(subject, level_code, number).ok_or_else(|| {
            Error::NotFound(format!("lesson {}/{}/{}", subject, level_code, key))
        })?;

        let lesson = form.apply_to(&entry.lesson);
        let value = serde_json::to_value(&lesson)?;
        match &entry.source {
            LessonSource::Nested => {
                self.store
                    .update(
                        SUBJECTS_COLLECTION,
                        subject,
                        &[FieldUpdate::Set(
                            level_path(level_code, &["lessons", entry.key.as_str()]),
                            value,
                        )],
                    )
                    .await?
            }
            LessonSource::Record { record_id } => {
                self.store
                    .update(
                        LEVELS_COLLECTION,
                        record_id,
                        &[FieldUpdate::Set(
                            FieldPath::new(["lessons", entry.key.as_str()]),
                            value,
                        )],
                    )
                    .await?
            }
        }

        info!("Saved lesson {}/{}/{}", subject, level_code, entry.key);
        Ok(lesson)
    }

    /// Store the student book URL of a level code (empty clears it)
    pub async fn save_student_book(&self, level_code: &str, url: &str) -> Result<()> {
        let level_code = level_code.trim();
        if level_code.is_empty() {
            return Err(Error::InvalidInput(
                "Level code must not be empty".to_string(),
            ));
        }

        let document = StudentBookDocument {
            url: url.trim().to_string(),
        };
        self.store
            .set(
                STUDENT_BOOKS_COLLECTION,
                level_code,
                serde_json::to_value(&document)?,
            )
            .await?;

        info!("Saved student book for level {}", level_code);
        Ok(())
    }

    /// Move the subject at position `from` to position `to`
    pub async fn reorder_subjects(&self, from: usize, to: usize) -> Result<Vec<OrderUpdate>> {
        let catalog = self.catalog().await?;
        let plan = reorder_plan(&catalog.subject_codes(), from, to)?;
        if plan.is_empty() {
            return Ok(plan);
        }

        for update in &plan {
            self.ensure_subject_document(&catalog, &update.code).await?;
        }

        let writes: Vec<PendingWrite> = plan
            .iter()
            .map(|u| {
                PendingWrite::set(
                    SUBJECTS_COLLECTION,
                    &u.code,
                    FieldPath::new(["display_order"]),
                    json!(u.display_order),
                )
            })
            .collect();
        self.apply_concurrently(&writes).await?;

        info!("Moved subject from position {} to {}", from, to);
        Ok(plan)
    }

    /// Move the level at position `from` to position `to` within a subject
    pub async fn reorder_levels(&self, subject: &str, from: usize, to: usize) -> Result<Vec<OrderUpdate>> {
        let catalog = self.catalog().await?;
        let entry = catalog
            .subject(subject)
            .ok_or_else(|| Error::NotFound(format!("subject {}", subject)))?;
        let plan = reorder_plan(&entry.level_codes(), from, to)?;

        let mut writes = Vec::new();
        for update in &plan {
            let Some(level) = entry.level(&update.code) else {
                continue;
            };
            let value = json!(update.display_order);
            if level.nested {
                writes.push(PendingWrite::set(
                    SUBJECTS_COLLECTION,
                    subject,
                    level_path(&level.code, &["display_order"]),
                    value.clone(),
                ));
            }
            for record_id in &level.record_ids {
                writes.push(PendingWrite::set(
                    LEVELS_COLLECTION,
                    record_id,
                    FieldPath::new(["display_order"]),
                    value.clone(),
                ));
            }
        }
        self.apply_concurrently(&writes).await?;

        if !plan.is_empty() {
            info!("Moved level of {} from position {} to {}", subject, from, to);
        }
        Ok(plan)
    }

    /// Issue all writes at once, wait for every one, then report the first failure
    async fn apply_concurrently(&self, writes: &[PendingWrite]) -> Result<()> {
        let results = join_all(
            writes
                .iter()
                .map(|w| self.store.update(w.collection, &w.id, &w.updates)),
        )
        .await;

        let mut first_error = None;
        for (write, result) in writes.iter().zip(results) {
            if let Err(e) = result {
                warn!("Order update of {}/{} failed: {}", write.collection, write.id, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Give a subject known only from level records its own document
    async fn ensure_subject_document(&self, catalog: &Catalog, code: &str) -> Result<()> {
        let subject = catalog
            .subject(code)
            .ok_or_else(|| Error::NotFound(format!("subject {}", code)))?;
        if subject.has_document {
            return Ok(());
        }

        let document = SubjectDocument {
            subject_code: subject.code.clone(),
            subject_name: subject.name.clone(),
            display_order: subject.display_order,
            levels: Default::default(),
        };
        self.store
            .create(SUBJECTS_COLLECTION, code, serde_json::to_value(&document)?)
            .await?;

        info!("Created subject document for record-only subject {}", code);
        Ok(())
    }

    async fn delete_level_records(&self, level: &LevelEntry) -> Result<()> {
        for record_id in &level.record_ids {
            match self.store.delete(LEVELS_COLLECTION, record_id).await {
                Ok(()) | Err(Error::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Student books are keyed by level code alone; keep one still used by another subject
    async fn delete_unshared_student_book(&self, catalog: &Catalog, subject: &str, level_code: &str) -> Result<()> {
        let shared = catalog
            .levels_with_code(level_code)
            .any(|(s, _)| s.code != subject);
        if shared {
            return Ok(());
        }

        match self.store.delete(STUDENT_BOOKS_COLLECTION, level_code).await {
            Ok(()) | Err(Error::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn find_level<'a>(catalog: &'a Catalog, subject: &str, level: &str) -> Result<&'a LevelEntry> {
    catalog
        .level(subject, level)
        .ok_or_else(|| Error::NotFound(format!("level {}/{}", subject, level)))
}

/// Resolve a `SUBJECT/LEVEL` sheet name, or a level code unique across subjects
pub fn resolve_sheet(catalog: &Catalog, sheet: &str) -> Result<(String, String)> {
    if let Some((subject, level)) = sheet.split_once('/') {
        let level = find_level(catalog, subject.trim(), level.trim())?;
        return Ok((subject.trim().to_string(), level.code.clone()));
    }

    let matches: Vec<_> = catalog.levels_with_code(sheet.trim()).collect();
    match matches.as_slice() {
        [(subject, level)] => Ok((subject.code.clone(), level.code.clone())),
        [] => Err(Error::NotFound(format!("sheet {}", sheet))),
        _ => Err(Error::InvalidInput(format!(
            "Sheet {} is ambiguous, use SUBJECT/LEVEL",
            sheet
        ))),
    }
}
