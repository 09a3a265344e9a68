use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Backend configuration
    pub api_base_url: String,
    pub request_timeout_secs: u64,

    // Content settings
    pub max_comment_length: usize,

    // Display settings
    pub visible_comments: usize,
    pub visible_replies: usize,

    // Avatar fallback when the author snapshot carries none
    pub default_avatar_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,

            max_comment_length: env::var("MAX_COMMENT_LENGTH")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,

            visible_comments: env::var("VISIBLE_COMMENTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            visible_replies: env::var("VISIBLE_REPLIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()?,

            default_avatar_url: env::var("DEFAULT_AVATAR_URL").unwrap_or_else(|_| {
                "https://cdn-icons-png.flaticon.com/512/847/847969.png".to_string()
            }),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            max_comment_length: 5000,
            visible_comments: 3,
            visible_replies: 2,
            default_avatar_url: "https://cdn-icons-png.flaticon.com/512/847/847969.png"
                .to_string(),
        }
    }
}
