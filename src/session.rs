use crate::models::comment::UserId;

/// Authenticated user context for mutation calls.
///
/// Passed explicitly into every operation that needs it; nothing in this crate
/// reads ambient storage for credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub token: String,
}

impl Session {
    pub fn new(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}
