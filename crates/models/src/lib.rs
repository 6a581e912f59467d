pub mod content;
pub mod filters;
pub mod host;
pub mod ordering;
pub mod rating;
pub mod render;
pub mod slug;
