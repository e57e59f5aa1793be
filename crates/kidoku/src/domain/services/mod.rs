pub mod chapter;
pub mod source;
pub mod summary;
pub mod template;
pub mod unread;
