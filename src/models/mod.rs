pub mod comment;
pub mod like;

pub use comment::{Author, Comment, CommentId, LikeSet, PostId, UserId};
pub use like::LikeStatus;
