pub mod attachments;
pub mod cases;
