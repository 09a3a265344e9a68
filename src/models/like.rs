use serde::{Deserialize, Serialize};

/// Per-user like status of a single comment, as reported by
/// `GET /comments/{id}/like`. Also the unit of the section's best-effort
/// like cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub like_count: u64,
}

impl LikeStatus {
    pub fn new(is_liked: bool, like_count: u64) -> Self {
        Self {
            is_liked,
            like_count,
        }
    }
}
