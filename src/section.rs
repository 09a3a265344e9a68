//! Per-post comment section state.
//!
//! Owns one [`CommentTree`] for the post being viewed and drives the
//! reconciliation contract: top-level creates append the server's response,
//! replies and edits trigger a full re-fetch, deletes remove locally only
//! after the backend confirms, and likes patch the node in place. Each
//! mutation runs idle → submitting → idle; a failure leaves the tree exactly
//! as it was.

use crate::{
    config::Config,
    error::{AppError, Result},
    models::comment::{Comment, CommentId, PostId, UserId},
    models::like::LikeStatus,
    services::comments::{CommentApi, LikeOutcome},
    session::Session,
    tree::CommentTree,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub struct CommentSection {
    api: CommentApi,
    post_id: PostId,
    post_author_id: Option<UserId>,

    tree: CommentTree,
    /// Set when a fetch failed; distinguishes "no comments" from "could not
    /// load comments".
    load_failed: bool,
    /// Stamp of the newest fetch. Responses from older generations are
    /// discarded so a navigation-superseded fetch cannot overwrite the tree.
    fetch_generation: u64,

    visible_comments: usize,
    visible_replies: usize,
    show_all_comments: bool,
    expanded_replies: HashSet<CommentId>,

    /// Best-effort like cache keyed by comment id, for the like buttons.
    like_cache: HashMap<CommentId, LikeStatus>,
}

impl CommentSection {
    pub fn new(api: CommentApi, config: &Config, post_id: PostId) -> Self {
        Self {
            api,
            post_id,
            post_author_id: None,
            tree: CommentTree::new(),
            load_failed: false,
            fetch_generation: 0,
            visible_comments: config.visible_comments,
            visible_replies: config.visible_replies,
            show_all_comments: false,
            expanded_replies: HashSet::new(),
            like_cache: HashMap::new(),
        }
    }

    /// Record the post author so the view can show edit/delete controls on
    /// the nodes this user may modify. The backend re-checks regardless.
    pub fn with_post_author(mut self, author_id: UserId) -> Self {
        self.post_author_id = Some(author_id);
        self
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn tree(&self) -> &CommentTree {
        &self.tree
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn can_modify(&self, session: &Session, id: CommentId) -> bool {
        self.tree
            .find(id)
            .map(|node| node.can_be_modified_by(session.user_id, self.post_author_id))
            .unwrap_or(false)
    }

    // --- fetch lifecycle -------------------------------------------------

    /// Stamp a new fetch. Callers that spawn the request themselves pair this
    /// with [`finish_fetch`](Self::finish_fetch); [`refresh`](Self::refresh)
    /// does both.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_generation += 1;
        self.fetch_generation
    }

    /// Reconcile a fetch result. A response stamped with a superseded
    /// generation is dropped: the tree it was fetched for is no longer the
    /// one on screen.
    pub fn finish_fetch(&mut self, generation: u64, result: Result<CommentTree>) {
        if generation != self.fetch_generation {
            debug!(
                "discarding stale comment fetch (generation {} < {})",
                generation, self.fetch_generation
            );
            return;
        }
        match result {
            Ok(tree) => {
                self.tree = tree;
                self.load_failed = false;
            }
            Err(err) => {
                warn!("failed to fetch comments for post {}: {}", self.post_id, err);
                self.tree = CommentTree::new();
                self.load_failed = true;
            }
        }
    }

    /// Fetch the comment list and replace the tree with the result.
    pub async fn refresh(&mut self) {
        let generation = self.begin_fetch();
        let result = self.api.fetch_comments(self.post_id).await;
        self.finish_fetch(generation, result);
    }

    // --- mutations -------------------------------------------------------

    /// Submit a top-level comment. Blank input is rejected before any network
    /// call; on success the server's comment is appended to the root list.
    pub async fn submit_comment(&mut self, session: &Session, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(AppError::validation("Comment content must not be empty"));
        }
        let created = self
            .api
            .create_comment(session, self.post_id, content)
            .await?;
        self.tree.push_root(created);
        Ok(())
    }

    /// Reply to a comment or reply. A target id absent from the local tree is
    /// a caller error: no request goes out and the tree stays unchanged. On
    /// success the whole list is re-fetched (full-refresh reconciliation).
    pub async fn submit_reply(
        &mut self,
        session: &Session,
        parent_id: CommentId,
        content: &str,
    ) -> Result<()> {
        if content.trim().is_empty() {
            return Err(AppError::validation("Reply content must not be empty"));
        }
        if !self.tree.contains(parent_id) {
            warn!("reply target {} is not in the local tree", parent_id);
            return Err(AppError::not_found("Parent comment"));
        }
        self.api.create_reply(session, parent_id, content).await?;
        self.refresh().await;
        Ok(())
    }

    /// Edit a top-level comment, then re-fetch.
    pub async fn edit_comment(
        &mut self,
        session: &Session,
        comment_id: CommentId,
        content: &str,
    ) -> Result<()> {
        self.api
            .update_comment(session, self.post_id, comment_id, content)
            .await?;
        self.refresh().await;
        Ok(())
    }

    /// Edit a reply, then re-fetch.
    pub async fn edit_reply(
        &mut self,
        session: &Session,
        comment_id: CommentId,
        reply_id: CommentId,
        content: &str,
    ) -> Result<()> {
        self.api
            .update_reply(session, comment_id, reply_id, content)
            .await?;
        self.refresh().await;
        Ok(())
    }

    /// Delete a top-level comment. The local node (and its subtree) is
    /// removed only after the backend confirms, never optimistically.
    pub async fn delete_comment(&mut self, session: &Session, comment_id: CommentId) -> Result<()> {
        self.api
            .delete_comment(session, self.post_id, comment_id)
            .await?;
        self.tree.remove(comment_id);
        self.like_cache.remove(&comment_id);
        Ok(())
    }

    /// Delete a reply; same confirmation-first rule as comments.
    pub async fn delete_reply(
        &mut self,
        session: &Session,
        comment_id: CommentId,
        reply_id: CommentId,
    ) -> Result<()> {
        self.api.delete_reply(session, comment_id, reply_id).await?;
        self.tree.remove(reply_id);
        self.like_cache.remove(&reply_id);
        Ok(())
    }

    /// Toggle the acting user's like on a comment. A 409 on like and a 404 on
    /// unlike are reconciled as the state already holding server-side; the
    /// count is never double-incremented.
    pub async fn toggle_like(&mut self, session: &Session, comment_id: CommentId) -> Result<bool> {
        let currently_liked = self.is_liked(session, comment_id);

        let (outcome, target_state) = if currently_liked {
            (self.api.unlike(session, comment_id).await?, false)
        } else {
            (self.api.like(session, comment_id).await?, true)
        };

        // A confirmed change moves the node's total by one; the 409/404
        // answers only align membership, the server total already holds.
        let now_liked = match outcome {
            LikeOutcome::Applied => {
                self.tree
                    .record_like(comment_id, session.user_id, target_state);
                target_state
            }
            LikeOutcome::AlreadyLiked => {
                self.tree.set_liked(comment_id, session.user_id, true);
                true
            }
            LikeOutcome::NotLiked => {
                self.tree.set_liked(comment_id, session.user_id, false);
                false
            }
        };
        let count = self
            .tree
            .find(comment_id)
            .map(|node| node.likes.count())
            .unwrap_or_else(|| {
                adjust_count(
                    self.like_cache.get(&comment_id).copied().unwrap_or_default(),
                    currently_liked,
                    now_liked,
                )
            });
        self.like_cache
            .insert(comment_id, LikeStatus::new(now_liked, count));
        Ok(now_liked)
    }

    /// Whether the acting user likes the node, preferring the cache over the
    /// tree's (possibly count-only) like data.
    pub fn is_liked(&self, session: &Session, comment_id: CommentId) -> bool {
        if let Some(status) = self.like_cache.get(&comment_id) {
            return status.is_liked;
        }
        self.tree
            .find(comment_id)
            .map(|node| node.likes.contains(session.user_id))
            .unwrap_or(false)
    }

    pub fn like_count(&self, comment_id: CommentId) -> u64 {
        if let Some(status) = self.like_cache.get(&comment_id) {
            return status.like_count;
        }
        self.tree
            .find(comment_id)
            .map(|node| node.likes.count())
            .unwrap_or(0)
    }

    /// Refresh one entry of the like cache from the backend.
    pub async fn refresh_like_status(
        &mut self,
        session: &Session,
        comment_id: CommentId,
    ) -> Result<LikeStatus> {
        let status = self.api.like_status(session, comment_id).await?;
        self.like_cache.insert(comment_id, status);
        self.tree
            .set_liked(comment_id, session.user_id, status.is_liked);
        Ok(status)
    }

    // --- display windows -------------------------------------------------

    /// Top-level comments currently visible under the truncation policy.
    pub fn visible_roots(&self) -> &[Comment] {
        let roots = self.tree.roots();
        if self.show_all_comments {
            roots
        } else {
            &roots[..roots.len().min(self.visible_comments)]
        }
    }

    pub fn hidden_root_count(&self) -> usize {
        self.tree.roots().len() - self.visible_roots().len()
    }

    pub fn toggle_show_all_comments(&mut self) {
        self.show_all_comments = !self.show_all_comments;
    }

    /// Visible replies of one node; bounded until that node is expanded.
    pub fn visible_replies<'a>(&self, comment: &'a Comment) -> &'a [Comment] {
        if self.expanded_replies.contains(&comment.id) {
            &comment.replies
        } else {
            &comment.replies[..comment.replies.len().min(self.visible_replies)]
        }
    }

    pub fn hidden_reply_count(&self, comment: &Comment) -> usize {
        comment.replies.len() - self.visible_replies(comment).len()
    }

    pub fn toggle_replies(&mut self, comment_id: CommentId) {
        if !self.expanded_replies.remove(&comment_id) {
            self.expanded_replies.insert(comment_id);
        }
    }
}

fn adjust_count(status: LikeStatus, was_liked: bool, now_liked: bool) -> u64 {
    match (was_liked, now_liked) {
        (false, true) => status.like_count + 1,
        (true, false) => status.like_count.saturating_sub(1),
        _ => status.like_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> CommentSection {
        let config = Config::default();
        let api = CommentApi::new(&config).unwrap();
        CommentSection::new(api, &config, 7)
    }

    fn tree_of(n: usize) -> CommentTree {
        let comments = (1..=n)
            .map(|id| {
                serde_json::from_value(serde_json::json!({
                    "id": id as u64,
                    "content": format!("comment {}", id)
                }))
                .unwrap()
            })
            .collect();
        CommentTree::from_comments(comments)
    }

    #[test]
    fn test_stale_fetch_response_is_discarded() {
        let mut section = section();

        let old_generation = section.begin_fetch();
        let new_generation = section.begin_fetch();

        section.finish_fetch(new_generation, Ok(tree_of(2)));
        // the older response arrives late and must not win
        section.finish_fetch(old_generation, Ok(tree_of(5)));

        assert_eq!(section.tree().len(), 2);
        assert!(!section.load_failed());
    }

    #[test]
    fn test_failed_fetch_sets_error_flag_and_empties_tree() {
        let mut section = section();
        let generation = section.begin_fetch();
        section.finish_fetch(generation, Ok(tree_of(3)));

        let generation = section.begin_fetch();
        section.finish_fetch(
            generation,
            Err(AppError::Backend {
                status: 500,
                message: "boom".into(),
            }),
        );

        assert!(section.tree().is_empty());
        assert!(section.load_failed());

        // a later successful fetch clears the flag
        let generation = section.begin_fetch();
        section.finish_fetch(generation, Ok(tree_of(1)));
        assert!(!section.load_failed());
    }

    #[test]
    fn test_empty_fetch_is_not_an_error() {
        let mut section = section();
        let generation = section.begin_fetch();
        section.finish_fetch(generation, Ok(CommentTree::new()));
        assert!(section.tree().is_empty());
        assert!(!section.load_failed());
    }

    #[test]
    fn test_visible_roots_window_and_toggle() {
        let mut section = section();
        let generation = section.begin_fetch();
        section.finish_fetch(generation, Ok(tree_of(5)));

        assert_eq!(section.visible_roots().len(), 3);
        assert_eq!(section.hidden_root_count(), 2);

        section.toggle_show_all_comments();
        assert_eq!(section.visible_roots().len(), 5);
        assert_eq!(section.hidden_root_count(), 0);

        section.toggle_show_all_comments();
        assert_eq!(section.visible_roots().len(), 3);
    }

    #[test]
    fn test_visible_replies_window_per_node() {
        let mut section = section();
        let comment: Comment = serde_json::from_value(serde_json::json!({
            "id": 1,
            "content": "root",
            "replies": [
                { "id": 2, "content": "a" },
                { "id": 3, "content": "b" },
                { "id": 4, "content": "c" }
            ]
        }))
        .unwrap();
        let generation = section.begin_fetch();
        section.finish_fetch(generation, Ok(CommentTree::from_comments(vec![comment])));

        let root = section.tree().find(1).unwrap().clone();
        assert_eq!(section.visible_replies(&root).len(), 2);
        assert_eq!(section.hidden_reply_count(&root), 1);

        section.toggle_replies(1);
        assert_eq!(section.visible_replies(&root).len(), 3);

        section.toggle_replies(1);
        assert_eq!(section.visible_replies(&root).len(), 2);
    }

    #[test]
    fn test_like_count_prefers_cache() {
        let mut section = section();
        let generation = section.begin_fetch();
        section.finish_fetch(generation, Ok(tree_of(1)));

        assert_eq!(section.like_count(1), 0);
        section.like_cache.insert(1, LikeStatus::new(true, 4));
        assert_eq!(section.like_count(1), 4);
        let session = Session::new(9, "token");
        assert!(section.is_liked(&session, 1));
    }
}
