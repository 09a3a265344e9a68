use crate::utils::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;
use validator::Validate;

pub type CommentId = u64;
pub type PostId = u64;
pub type UserId = u64;

/// Author snapshot embedded in comment payloads. The backend omits or nulls
/// these fields freely, so everything is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl Author {
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unknown author"
        } else {
            &self.name
        }
    }

    /// Resolve the avatar: absolute URLs pass through, relative paths are
    /// joined onto the API base, anything missing gets the fallback.
    pub fn avatar_url(&self, base: &Url, fallback: &str) -> String {
        match self.image_url.as_deref() {
            Some(raw) if raw.starts_with("http") => raw.to_string(),
            Some(raw) if !raw.trim().is_empty() => base
                .join(raw)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| fallback.to_string()),
            _ => fallback.to_string(),
        }
    }
}

/// Like state of a single comment node.
///
/// The backend speaks two dialects: the nested payload carries an array of
/// user ids, the flat payload a bare count. Both decode into this type; the
/// anonymous portion of a bare count is kept as `base` so toggling a known
/// user's like never corrupts the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeSet {
    users: BTreeSet<UserId>,
    base: u64,
}

impl LikeSet {
    pub fn from_users(users: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            users: users.into_iter().collect(),
            base: 0,
        }
    }

    pub fn from_count(count: u64) -> Self {
        Self {
            users: BTreeSet::new(),
            base: count,
        }
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.users.contains(&user_id)
    }

    pub fn count(&self) -> u64 {
        self.base + self.users.len() as u64
    }

    /// Flip membership; returns whether the user likes the node afterwards.
    pub fn toggle(&mut self, user_id: UserId) -> bool {
        if self.users.remove(&user_id) {
            false
        } else {
            self.users.insert(user_id);
            true
        }
    }

    /// Apply a backend-confirmed like change: the total moves by exactly one.
    /// On a count-only node the acting user's like lives in `base`, so a
    /// confirmed unlike of an unknown member decrements there.
    pub fn record(&mut self, user_id: UserId, liked: bool) {
        if liked {
            self.users.insert(user_id);
        } else if !self.users.remove(&user_id) {
            self.base = self.base.saturating_sub(1);
        }
    }

    /// Reconcile membership to a server-reported state without inventing a
    /// like. Marking a user liked whose like a bare count already includes
    /// (the 409 case) shifts that like out of `base` instead of adding a
    /// second one; repeating either call is a no-op.
    pub fn set_liked(&mut self, user_id: UserId, liked: bool) {
        if liked {
            if self.users.insert(user_id) && self.base > 0 {
                self.base -= 1;
            }
        } else {
            self.users.remove(&user_id);
        }
    }

    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.iter().copied()
    }

    pub(crate) fn known_users(&self) -> &BTreeSet<UserId> {
        &self.users
    }

    pub(crate) fn base_count(&self) -> u64 {
        self.base
    }
}

/// One node of a post's comment tree. Replies nest recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub post_id: Option<PostId>,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    #[serde(default)]
    pub author_id: Option<UserId>,
    #[serde(default, deserialize_with = "serde_helpers::none_as_default")]
    pub author: Author,
    #[serde(default)]
    pub content: String,
    #[serde(default, with = "serde_helpers::likes")]
    pub likes: LikeSet,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "serde_helpers::none_as_default")]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == Some(user_id)
    }

    /// Client-side mirror of the backend permission rule: the node's author
    /// and the post's author may edit or delete it. The backend re-checks.
    pub fn can_be_modified_by(&self, user_id: UserId, post_author_id: Option<UserId>) -> bool {
        self.is_authored_by(user_id) || post_author_id == Some(user_id)
    }
}

// The configured length ceiling is enforced at the submission boundary; the
// derive only guards against empty content.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1))]
    pub content: String,
}
