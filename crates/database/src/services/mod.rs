pub mod account;
pub mod badge;
pub mod content;
pub mod course;
pub mod module;
pub mod ordering;
pub mod quiz;
pub mod review;
pub mod subject;
