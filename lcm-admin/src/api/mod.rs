//! HTTP API handlers for lcm-admin

pub mod auth;
pub mod catalog;
pub mod form;
pub mod generate;
pub mod health;
pub mod legacy;
pub mod lessons;
pub mod levels;
pub mod order;
pub mod status;
pub mod student_books;
pub mod subjects;

pub use auth::{auth_middleware, login};
pub use catalog::get_catalog;
pub use form::get_form;
pub use generate::generate;
pub use health::health_routes;
pub use legacy::{save_data, save_student_book_by_sheet};
pub use lessons::{create_lesson, delete_lesson, save_lesson};
pub use levels::{create_level, delete_level};
pub use order::{reorder_levels, reorder_subjects};
pub use status::get_status;
pub use student_books::save_student_book;
pub use subjects::{create_subject, delete_subject, rename_subject};
