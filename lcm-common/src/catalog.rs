//! Catalog loading: reshapes stored documents into an ordered
//! Subject → Level → Lesson tree
//!
//! Three sources are merged:
//! 1. `subjects` documents with nested levels
//! 2. `levels` records (one or more parts per level) from the two-tier layout
//! 3. `studentBooks` documents, which override any embedded student book
//!
//! Siblings are ordered by `(display_order, code)`; entries without a
//! `display_order` come last.

use crate::db::{Document, DocumentStore};
use crate::models::{
    lesson_key, parse_lesson_key, Lesson, LevelRecord, StudentBookDocument, SubjectDocument,
    LEVELS_COLLECTION, STUDENT_BOOKS_COLLECTION, SUBJECTS_COLLECTION,
};
use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Where a lesson is physically stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonSource {
    /// Inside the subject document
    Nested,
    /// Inside the `levels` record with this id
    Record { record_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonEntry {
    pub number: u32,
    pub key: String,
    #[serde(flatten)]
    pub lesson: Lesson,
    #[serde(skip)]
    pub source: LessonSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelEntry {
    pub code: String,
    pub display_order: Option<i64>,
    pub student_book: String,
    pub lessons: Vec<LessonEntry>,
    /// Level exists inside the subject document
    #[serde(skip)]
    pub nested: bool,
    /// Ids of `levels` records contributing to this level, lowest part first
    #[serde(skip)]
    pub record_ids: Vec<String>,
}

impl LevelEntry {
    pub fn lesson(&self, number: u32) -> Option<&LessonEntry> {
        self.lessons.iter().find(|l| l.number == number)
    }

    pub fn lesson_numbers(&self) -> Vec<u32> {
        self.lessons.iter().map(|l| l.number).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectEntry {
    pub code: String,
    pub name: String,
    pub display_order: Option<i64>,
    pub levels: Vec<LevelEntry>,
    /// A `subjects` document exists (false for subjects known only from level records)
    #[serde(skip)]
    pub has_document: bool,
}

impl SubjectEntry {
    pub fn level(&self, code: &str) -> Option<&LevelEntry> {
        self.levels.iter().find(|l| l.code == code)
    }

    pub fn level_codes(&self) -> Vec<String> {
        self.levels.iter().map(|l| l.code.clone()).collect()
    }
}

/// Ordered view of every subject, level and lesson
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub subjects: Vec<SubjectEntry>,
}

impl Catalog {
    pub fn subject(&self, code: &str) -> Option<&SubjectEntry> {
        self.subjects.iter().find(|s| s.code == code)
    }

    pub fn level(&self, subject: &str, level: &str) -> Option<&LevelEntry> {
        self.subject(subject)?.level(level)
    }

    pub fn lesson(&self, subject: &str, level: &str, number: u32) -> Option<&LessonEntry> {
        self.level(subject, level)?.lesson(number)
    }

    /// Lesson numbers of a level in ascending order (empty if unknown)
    pub fn lesson_numbers(&self, subject: &str, level: &str) -> Vec<u32> {
        self.level(subject, level)
            .map(LevelEntry::lesson_numbers)
            .unwrap_or_default()
    }

    pub fn subject_codes(&self) -> Vec<String> {
        self.subjects.iter().map(|s| s.code.clone()).collect()
    }

    pub fn subject_names(&self) -> BTreeMap<String, String> {
        self.subjects
            .iter()
            .map(|s| (s.code.clone(), s.name.clone()))
            .collect()
    }

    /// Level code → student book URL (first occurrence in catalog order)
    pub fn student_books(&self) -> BTreeMap<String, String> {
        let mut books = BTreeMap::new();
        for level in self.subjects.iter().flat_map(|s| s.levels.iter()) {
            books
                .entry(level.code.clone())
                .or_insert_with(|| level.student_book.clone());
        }
        books
    }

    /// Every (subject, level) pair whose level code matches
    pub fn levels_with_code<'a>(&'a self, level: &'a str) -> impl Iterator<Item = (&'a SubjectEntry, &'a LevelEntry)> + 'a {
        self.subjects
            .iter()
            .filter_map(move |s| s.level(level).map(|l| (s, l)))
    }

    /// `data[subject][level][lesson_key] = lesson` map for clients
    pub fn nested_data(&self) -> Value {
        let mut subjects = Map::new();
        for subject in &self.subjects {
            let mut levels = Map::new();
            for level in &subject.levels {
                let mut lessons = Map::new();
                for entry in &level.lessons {
                    lessons.insert(
                        entry.key.clone(),
                        serde_json::to_value(&entry.lesson).unwrap_or(Value::Null),
                    );
                }
                levels.insert(level.code.clone(), Value::Object(lessons));
            }
            subjects.insert(subject.code.clone(), Value::Object(levels));
        }
        Value::Object(subjects)
    }
}

/// Read all collections and build the catalog
pub async fn load_catalog(store: &dyn DocumentStore) -> Result<Catalog> {
    let subject_docs = store.list(SUBJECTS_COLLECTION).await?;
    let level_docs = store.list(LEVELS_COLLECTION).await?;
    let book_docs = store.list(STUDENT_BOOKS_COLLECTION).await?;

    let catalog = build_catalog(&subject_docs, &level_docs, &book_docs);
    debug!(
        subjects = catalog.subjects.len(),
        level_records = level_docs.len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

#[derive(Default)]
struct LevelBuilder {
    display_order: Option<i64>,
    student_book: Option<String>,
    lessons: BTreeMap<u32, LessonEntry>,
    nested: bool,
    record_ids: Vec<String>,
}

impl LevelBuilder {
    fn add_lessons(&mut self, lessons: &BTreeMap<String, Lesson>, source: &LessonSource, context: &str) {
        for (key, lesson) in lessons {
            let Some(number) = parse_lesson_key(key) else {
                warn!("Skipping malformed lesson key '{}' in {}", key, context);
                continue;
            };

            // Nested lessons win over record lessons; later record parts win over earlier ones
            if let Some(existing) = self.lessons.get(&number) {
                if existing.source == LessonSource::Nested && *source != LessonSource::Nested {
                    continue;
                }
            }

            self.lessons.insert(
                number,
                LessonEntry {
                    number,
                    key: lesson_key(number),
                    lesson: lesson.clone(),
                    source: source.clone(),
                },
            );
        }
    }
}

struct SubjectBuilder {
    name: String,
    display_order: Option<i64>,
    has_document: bool,
    levels: BTreeMap<String, LevelBuilder>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn order_key(display_order: Option<i64>, code: &str) -> (bool, i64, String) {
    (display_order.is_none(), display_order.unwrap_or(0), code.to_string())
}

/// Pure reshaping step of [`load_catalog`]
///
/// Documents that fail to parse are skipped with a warning.
pub fn build_catalog(subject_docs: &[Document], level_docs: &[Document], book_docs: &[Document]) -> Catalog {
    let mut subjects: BTreeMap<String, SubjectBuilder> = BTreeMap::new();

    for doc in subject_docs {
        let parsed: SubjectDocument = match doc.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping unreadable subject document '{}': {}", doc.id, e);
                continue;
            }
        };

        let name = if parsed.subject_name.trim().is_empty() {
            doc.id.clone()
        } else {
            parsed.subject_name.clone()
        };

        let mut builder = SubjectBuilder {
            name,
            display_order: parsed.display_order,
            has_document: true,
            levels: BTreeMap::new(),
        };

        for (level_code, level) in &parsed.levels {
            let mut level_builder = LevelBuilder {
                display_order: level.display_order,
                student_book: non_empty(&level.student_book),
                nested: true,
                ..Default::default()
            };
            level_builder.add_lessons(
                &level.lessons,
                &LessonSource::Nested,
                &format!("subjects/{}/{}", doc.id, level_code),
            );
            builder.levels.insert(level_code.clone(), level_builder);
        }

        subjects.insert(doc.id.clone(), builder);
    }

    // Level records, grouped per (subject, level), lowest part first
    let mut records: Vec<(&Document, LevelRecord)> = Vec::new();
    for doc in level_docs {
        match doc.parse::<LevelRecord>() {
            Ok(record) if !record.subject_code.is_empty() && !record.level_code.is_empty() => {
                records.push((doc, record));
            }
            Ok(_) => warn!("Skipping level record '{}' without subject/level code", doc.id),
            Err(e) => warn!("Skipping unreadable level record '{}': {}", doc.id, e),
        }
    }
    records.sort_by(|(a_doc, a), (b_doc, b)| {
        (&a.subject_code, &a.level_code, a.part_number.unwrap_or(1), &a_doc.id).cmp(&(
            &b.subject_code,
            &b.level_code,
            b.part_number.unwrap_or(1),
            &b_doc.id,
        ))
    });

    for (doc, record) in &records {
        let subject = subjects
            .entry(record.subject_code.clone())
            .or_insert_with(|| SubjectBuilder {
                name: record.subject_code.clone(),
                display_order: None,
                has_document: false,
                levels: BTreeMap::new(),
            });

        let level = subject.levels.entry(record.level_code.clone()).or_default();
        level.record_ids.push(doc.id.clone());
        if level.display_order.is_none() {
            level.display_order = record.display_order;
        }
        if level.student_book.is_none() {
            level.student_book = non_empty(&record.student_book);
        }
        level.add_lessons(
            &record.lessons,
            &LessonSource::Record {
                record_id: doc.id.clone(),
            },
            &format!("levels/{}", doc.id),
        );
    }

    let mut books: BTreeMap<String, String> = BTreeMap::new();
    for doc in book_docs {
        match doc.parse::<StudentBookDocument>() {
            Ok(book) => {
                books.insert(doc.id.clone(), book.url);
            }
            Err(e) => warn!("Skipping unreadable student book '{}': {}", doc.id, e),
        }
    }

    let mut catalog = Catalog {
        subjects: subjects
            .into_iter()
            .map(|(code, builder)| {
                let mut levels: Vec<LevelEntry> = builder
                    .levels
                    .into_iter()
                    .map(|(level_code, level)| LevelEntry {
                        student_book: books
                            .get(&level_code)
                            .cloned()
                            .or(level.student_book)
                            .unwrap_or_default(),
                        code: level_code,
                        display_order: level.display_order,
                        lessons: level.lessons.into_values().collect(),
                        nested: level.nested,
                        record_ids: level.record_ids,
                    })
                    .collect();
                levels.sort_by_key(|l| order_key(l.display_order, &l.code));

                SubjectEntry {
                    code,
                    name: builder.name,
                    display_order: builder.display_order,
                    levels,
                    has_document: builder.has_document,
                }
            })
            .collect(),
    };
    catalog
        .subjects
        .sort_by_key(|s| order_key(s.display_order, &s.code));

    catalog
}
