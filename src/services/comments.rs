//! HTTP side of the mutation protocol.
//!
//! Thin typed wrapper over the backend's comment endpoints. Each call either
//! succeeds with the backend's answer or maps the response status onto an
//! [`AppError`] variant; the local tree is never touched from here. The two
//! defined reconciliation quirks of the like endpoint (409 on like, 404 on
//! unlike) surface as [`LikeOutcome`] values instead of errors.

use crate::{
    config::Config,
    error::{AppError, Result},
    models::comment::{
        Comment, CommentId, CreateCommentRequest, PostId, UpdateCommentRequest,
    },
    models::like::LikeStatus,
    session::Session,
    tree::CommentTree,
    utils::profanity,
};
use reqwest::Response;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use validator::Validate;

/// Outcome of a like or unlike call, after reconciliation rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// The backend applied the change.
    Applied,
    /// Like answered 409: the like already existed server-side. Treated as
    /// success with `is_liked = true`, never as an error.
    AlreadyLiked,
    /// Unlike answered 404: there was no like to remove.
    NotLiked,
}

#[derive(Clone)]
pub struct CommentApi {
    http: reqwest::Client,
    base_url: Url,
    max_content_length: usize,
}

impl CommentApi {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        let mut api = Self::with_client(http, &config.api_base_url)?;
        api.max_content_length = config.max_comment_length;
        Ok(api)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self> {
        // A base without a trailing slash would drop its last path segment on
        // every join
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        Ok(Self {
            http,
            base_url,
            max_content_length: Config::default().max_comment_length,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Fetch the full comment list of a post. Anonymous by contract. A
    /// malformed body degrades to the empty tree; a non-2xx status is a real
    /// error the caller surfaces.
    pub async fn fetch_comments(&self, post_id: PostId) -> Result<CommentTree> {
        let url = self.url(&format!("posts/{}/comments", post_id))?;
        debug!("fetching comments for post {}", post_id);

        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        let payload: serde_json::Value = response.json().await?;
        Ok(CommentTree::from_value(payload))
    }

    /// Create a top-level comment; the backend answers with the created node
    /// (server id, timestamps, author snapshot).
    pub async fn create_comment(
        &self,
        session: &Session,
        post_id: PostId,
        content: &str,
    ) -> Result<Comment> {
        let request = prepare_create(content, self.max_content_length)?;
        let url = self.url(&format!("posts/{}/comments", post_id))?;
        debug!("creating comment on post {}", post_id);

        let response = self
            .http
            .post(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .json(&request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Reply to a comment or to another reply; nesting depth is unbounded.
    /// The caller re-fetches the tree afterwards by convention.
    pub async fn create_reply(
        &self,
        session: &Session,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Comment> {
        let request = prepare_create(content, self.max_content_length)?;
        let url = self.url(&format!("comments/{}/replies", comment_id))?;
        debug!("creating reply to comment {}", comment_id);

        let response = self
            .http
            .post(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .json(&request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    pub async fn update_comment(
        &self,
        session: &Session,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<()> {
        let request = prepare_update(content, self.max_content_length)?;
        let url = self.url(&format!("posts/{}/comments/{}", post_id, comment_id))?;
        debug!("updating comment {}", comment_id);

        let response = self
            .http
            .put(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn update_reply(
        &self,
        session: &Session,
        comment_id: CommentId,
        reply_id: CommentId,
        content: &str,
    ) -> Result<()> {
        let request = prepare_update(content, self.max_content_length)?;
        let url = self.url(&format!("comments/{}/replies/{}", comment_id, reply_id))?;
        debug!("updating reply {} of comment {}", reply_id, comment_id);

        let response = self
            .http
            .put(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .json(&request)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Delete a top-level comment. The backend takes the acting user in the
    /// request body on this route.
    pub async fn delete_comment(
        &self,
        session: &Session,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<()> {
        let url = self.url(&format!("posts/{}/comments/{}", post_id, comment_id))?;
        debug!("deleting comment {}", comment_id);

        let response = self
            .http
            .delete(url)
            .bearer_auth(&session.token)
            .json(&serde_json::json!({ "user_id": session.user_id }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Delete a reply. Unlike comment deletion, this route takes the acting
    /// user as a query parameter.
    pub async fn delete_reply(
        &self,
        session: &Session,
        comment_id: CommentId,
        reply_id: CommentId,
    ) -> Result<()> {
        let url = self.url(&format!("comments/{}/replies/{}", comment_id, reply_id))?;
        debug!("deleting reply {} of comment {}", reply_id, comment_id);

        let response = self
            .http
            .delete(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Like a comment. Duplicate submissions under latency are expected, so a
    /// 409 answer reconciles to [`LikeOutcome::AlreadyLiked`].
    pub async fn like(&self, session: &Session, comment_id: CommentId) -> Result<LikeOutcome> {
        let url = self.url(&format!("comments/{}/like", comment_id))?;
        debug!("liking comment {}", comment_id);

        let response = self
            .http
            .post(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .send()
            .await?;
        match check_status(response).await {
            Ok(_) => Ok(LikeOutcome::Applied),
            Err(err) if err.is_conflict() => {
                warn!("comment {} already liked, reconciling to liked", comment_id);
                Ok(LikeOutcome::AlreadyLiked)
            }
            Err(err) => Err(err),
        }
    }

    /// Remove a like. A 404 means it was already gone; mirrored from the 409
    /// rule on the like side.
    pub async fn unlike(&self, session: &Session, comment_id: CommentId) -> Result<LikeOutcome> {
        let url = self.url(&format!("comments/{}/like", comment_id))?;
        debug!("unliking comment {}", comment_id);

        let response = self
            .http
            .delete(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .send()
            .await?;
        match check_status(response).await {
            Ok(_) => Ok(LikeOutcome::Applied),
            Err(err) if err.is_not_found() => {
                warn!("comment {} was not liked, reconciling to unliked", comment_id);
                Ok(LikeOutcome::NotLiked)
            }
            Err(err) => Err(err),
        }
    }

    /// Current like status of a comment for the acting user, feeding the
    /// section's best-effort like cache.
    pub async fn like_status(
        &self,
        session: &Session,
        comment_id: CommentId,
    ) -> Result<LikeStatus> {
        let url = self.url(&format!("comments/{}/like", comment_id))?;

        let response = self
            .http
            .get(url)
            .query(&[("user_id", session.user_id)])
            .bearer_auth(&session.token)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

/// Trim, censor and validate user input on its way into a create request.
/// The length ceiling comes from configuration, so it is checked here rather
/// than in the derive.
fn prepare_create(content: &str, max_len: usize) -> Result<CreateCommentRequest> {
    let request = CreateCommentRequest {
        content: profanity::censor(content.trim()),
    };
    check_content_length(&request.content, max_len)?;
    request.validate()?;
    Ok(request)
}

fn prepare_update(content: &str, max_len: usize) -> Result<UpdateCommentRequest> {
    let request = UpdateCommentRequest {
        content: profanity::censor(content.trim()),
    };
    check_content_length(&request.content, max_len)?;
    request.validate()?;
    Ok(request)
}

fn check_content_length(content: &str, max_len: usize) -> Result<()> {
    if content.chars().count() > max_len {
        return Err(AppError::validation(&format!(
            "Comment content must not exceed {} characters",
            max_len
        )));
    }
    Ok(())
}

/// Map a non-success response to the matching error variant, carrying the
/// backend's message text when there is one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_default()
        .trim()
        .to_string();
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("backend request failed")
            .to_string()
    } else {
        message
    };
    Err(AppError::from_status(status, message))
}
