//! Datadesk DB - Relational store for described datasets and documents, using SQLite.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
