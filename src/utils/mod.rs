pub mod profanity;
pub mod serde_helpers;
