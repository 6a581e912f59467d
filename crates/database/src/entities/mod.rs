pub mod answer;
pub mod badge_award;
pub mod content;
pub mod course;
pub mod course_student;
pub mod file_item;
pub mod image_item;
pub mod module;
pub mod profile;
pub mod question;
pub mod quiz;
pub mod review;
pub mod student;
pub mod student_answer;
pub mod student_interest;
pub mod subject;
pub mod tag;
pub mod taken_quiz;
pub mod text_item;
pub mod user;
pub mod video_item;
