pub mod comments;

pub use comments::{CommentApi, LikeOutcome};
