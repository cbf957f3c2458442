/// Data models for the blog service
///
/// - `Post`: blog posts with category, tags, and publication state
/// - `Comment`: moderated comments, threaded one level deep
/// - `Subscriber`: newsletter recipients
///
/// Wire representations are camelCase JSON.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: String,
    pub category: String,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub author: String,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: String,
    pub email: String,
    pub content: String,
    pub is_approved: bool,
    pub is_admin_reply: bool,
    pub parent_comment_id: Option<Uuid>,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// A comment without a parent reference is top-level; one with a parent
    /// is a reply. Nesting is exactly one level deep.
    pub fn is_top_level(&self) -> bool {
        self.parent_comment_id.is_none()
    }
}

/// A top-level comment augmented with its approved replies, oldest reply
/// first (conversational order).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Moderation-screen row: a comment together with the owning post's title.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ModerationComment {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub comment: Comment,
    pub post_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_comment(parent: Option<Uuid>) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            author: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            content: "hello".to_string(),
            is_approved: false,
            is_admin_reply: false,
            parent_comment_id: parent,
            likes: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_top_level_detection() {
        assert!(sample_comment(None).is_top_level());
        assert!(!sample_comment(Some(Uuid::new_v4())).is_top_level());
    }

    #[test]
    fn test_comment_serializes_camel_case() {
        let value = serde_json::to_value(sample_comment(None)).unwrap();
        assert!(value.get("postId").is_some());
        assert!(value.get("isApproved").is_some());
        assert!(value.get("isAdminReply").is_some());
        assert!(value.get("parentCommentId").is_some());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_thread_flattens_comment_fields() {
        let thread = CommentThread {
            comment: sample_comment(None),
            replies: vec![sample_comment(Some(Uuid::new_v4()))],
        };
        let value = serde_json::to_value(thread).unwrap();
        assert!(value.get("content").is_some());
        assert_eq!(value.get("replies").unwrap().as_array().unwrap().len(), 1);
    }
}
