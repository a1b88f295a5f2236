//! # LCM Common Library
//!
//! Shared code for the lesson content manager:
//! - Document store and database bootstrap
//! - Catalog reshaping (Subject → Level → Lesson)
//! - Admin operations, reorder computation, form state
//! - Announcement generator
//! - Configuration loading and password check

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod generator;
pub mod models;
pub mod ordering;
pub mod repository;

pub use error::{Error, Result};
pub use repository::LessonRepository;
