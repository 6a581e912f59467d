pub mod account;
pub mod content;
pub mod course;
pub mod forms;
pub mod health;
pub mod module;
pub mod quiz;
pub mod review;
pub mod subject;
