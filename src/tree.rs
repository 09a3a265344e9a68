//! In-memory comment tree for one post.
//!
//! One post's top-level comments with their nested replies. The tree is owned
//! by the view displaying the post and rebuilt from scratch on every fetch;
//! all mutations locate their target through a single recursive walk
//! ([`find_in_mut`]), so edit, like and reply share one traversal instead of
//! four divergent ones.

use crate::models::comment::{Comment, CommentId, UserId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentTree {
    roots: Vec<Comment>,
}

impl CommentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from whatever the backend handed back. Anything that is
    /// not an array of comments degrades to the empty tree; a malformed
    /// payload must never take the comment section down with it.
    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value::<Vec<Comment>>(value) {
            Ok(comments) => Self::from_comments(comments),
            Err(err) => {
                tracing::warn!("malformed comment payload, rendering empty tree: {}", err);
                Self::new()
            }
        }
    }

    /// Normalize a comment list into nested form. The input is either already
    /// nested (replies embedded, `parent_id` unset) or flat with parent
    /// references; both come out as the same tree. A parent reference that
    /// matches no listed comment falls back to root level rather than being
    /// dropped. Sibling order is insertion order throughout.
    pub fn from_comments(comments: Vec<Comment>) -> Self {
        let listed: HashSet<CommentId> = comments.iter().map(|c| c.id).collect();

        let mut children: HashMap<CommentId, Vec<Comment>> = HashMap::new();
        let mut roots = Vec::new();
        for comment in comments {
            match comment.parent_id {
                Some(parent) if parent != comment.id && listed.contains(&parent) => {
                    children.entry(parent).or_default().push(comment)
                }
                _ => roots.push(comment),
            }
        }

        for root in &mut roots {
            attach_children(root, &mut children);
        }
        // Anything still unattached sits in a cycle; surface it at root level
        for (_, orphans) in children.drain() {
            roots.extend(orphans);
        }

        Self { roots }
    }

    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total node count across all nesting levels.
    pub fn len(&self) -> usize {
        fn count(nodes: &[Comment]) -> usize {
            nodes.len() + nodes.iter().map(|n| count(&n.replies)).sum::<usize>()
        }
        count(&self.roots)
    }

    /// Recursive lookup at any depth.
    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        find_in(&self.roots, id)
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.find(id).is_some()
    }

    /// Direct reply count of a node, for the view's truncation policy.
    pub fn reply_count(&self, id: CommentId) -> Option<usize> {
        self.find(id).map(|node| node.replies.len())
    }

    /// Append a confirmed top-level comment to the root list.
    pub fn push_root(&mut self, comment: Comment) {
        self.roots.push(comment);
    }

    /// Append a reply to its parent's reply list. A missing parent leaves the
    /// tree unchanged and reports `false`; that is a caller error, not a
    /// reason to panic.
    pub fn insert_reply(&mut self, parent_id: CommentId, reply: Comment) -> bool {
        match find_in_mut(&mut self.roots, parent_id) {
            Some(parent) => {
                parent.replies.push(reply);
                true
            }
            None => false,
        }
    }

    /// Replace a node's content, marking it edited. Every other node is left
    /// untouched.
    pub fn update_content(&mut self, id: CommentId, content: impl Into<String>) -> bool {
        match find_in_mut(&mut self.roots, id) {
            Some(node) => {
                node.content = content.into();
                node.edited = true;
                true
            }
            None => false,
        }
    }

    /// Flip `user_id`'s membership in the node's like set; returns the new
    /// liked state, or `None` when the node does not exist.
    pub fn toggle_like(&mut self, id: CommentId, user_id: UserId) -> Option<bool> {
        find_in_mut(&mut self.roots, id).map(|node| node.likes.toggle(user_id))
    }

    /// Apply a backend-confirmed like or unlike to a node, moving its total
    /// by one. Returns `false` when the node does not exist.
    pub fn record_like(&mut self, id: CommentId, user_id: UserId, liked: bool) -> bool {
        match find_in_mut(&mut self.roots, id) {
            Some(node) => {
                node.likes.record(user_id, liked);
                true
            }
            None => false,
        }
    }

    /// Reconcile a node's liked state for `user_id` against an already-liked
    /// (409) or already-unliked (404) backend answer without moving the total.
    pub fn set_liked(&mut self, id: CommentId, user_id: UserId, liked: bool) -> bool {
        match find_in_mut(&mut self.roots, id) {
            Some(node) => {
                node.likes.set_liked(user_id, liked);
                true
            }
            None => false,
        }
    }

    /// Remove a node wherever it sits. Its whole subtree goes with it
    /// (replies live inside the node); sibling order is preserved.
    pub fn remove(&mut self, id: CommentId) -> bool {
        remove_in(&mut self.roots, id)
    }
}

fn attach_children(node: &mut Comment, children: &mut HashMap<CommentId, Vec<Comment>>) {
    // Nested payloads may carry pre-embedded replies; walk those too
    for reply in &mut node.replies {
        attach_children(reply, children);
    }
    if let Some(mut adopted) = children.remove(&node.id) {
        for child in &mut adopted {
            attach_children(child, children);
        }
        node.replies.extend(adopted);
    }
}

fn find_in(nodes: &[Comment], id: CommentId) -> Option<&Comment> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.replies, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut(nodes: &mut [Comment], id: CommentId) -> Option<&mut Comment> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.replies, id) {
            return Some(found);
        }
    }
    None
}

fn remove_in(nodes: &mut Vec<Comment>, id: CommentId) -> bool {
    if let Some(index) = nodes.iter().position(|n| n.id == id) {
        nodes.remove(index);
        return true;
    }
    nodes.iter_mut().any(|n| remove_in(&mut n.replies, id))
}
