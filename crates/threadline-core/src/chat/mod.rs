//! Chat-posting collaborator abstractions.

pub mod box_poster;
pub mod poster;

pub use box_poster::BoxChatPoster;
pub use poster::ChatPoster;
