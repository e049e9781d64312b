//! CLI command handlers

pub mod commands;
pub mod present;

pub use commands::{
    audit, courses_create, courses_list, courses_update, create_session, recommendations,
    retry_recommend, status, template, upload,
};
