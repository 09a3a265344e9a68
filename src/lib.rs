//! Client-side comment subsystem for the Atlas travel blog.
//!
//! Three layers, thinnest possible glue between them:
//!
//! - [`tree`] — the nested comment/reply tree of one post, with pure local
//!   operations (find, insert reply, edit, cascade remove, like toggle);
//! - [`services`] — the REST mutation protocol against the blog backend,
//!   including its defined reconciliation quirks (409 on like means "already
//!   liked", 404 on unlike means "already gone");
//! - [`section`] — per-post view state wiring the two together: fetch with
//!   stale-response discard, error-vs-empty distinction, display truncation
//!   windows and the best-effort like cache.
//!
//! Rendering, routing and authentication live elsewhere; a [`Session`] is
//! handed in by the caller.

pub mod config;
pub mod error;
pub mod models;
pub mod section;
pub mod services;
pub mod session;
pub mod tree;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::comment::{Author, Comment, CommentId, LikeSet, PostId, UserId};
pub use models::like::LikeStatus;
pub use section::CommentSection;
pub use services::comments::{CommentApi, LikeOutcome};
pub use session::Session;
pub use tree::CommentTree;
