pub mod account;
pub mod common;
pub mod content;
pub mod course;
pub mod quiz;
