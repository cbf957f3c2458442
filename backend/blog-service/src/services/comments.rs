/// Comment service - thread assembly and the moderation gate
///
/// Comments are threaded exactly one level deep: a top-level comment may
/// carry replies, a reply may not. The only path by which user-submitted
/// content becomes publicly visible is an explicit approval; admin replies
/// are the single exception and are created pre-approved.
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentThread, ModerationComment};
use crate::validators::{normalize_email, MAX_AUTHOR_LEN, MAX_COMMENT_LEN};
use futures::future::try_join_all;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const COMMENT_COLUMNS: &str = "id, post_id, author, email, content, is_approved, \
     is_admin_reply, parent_comment_id, likes, created_at, updated_at";

/// A validated public comment submission
#[derive(Debug, Clone)]
pub struct CommentSubmission {
    pub post_id: Uuid,
    pub author: String,
    pub email: String,
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
}

/// Approval-state filter for the moderation listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationStatus {
    Pending,
    Approved,
}

impl ModerationStatus {
    /// Parse the `status` query value; unknown values mean "no filter"
    pub fn from_query(status: Option<&str>) -> Option<Self> {
        match status {
            Some("pending") => Some(ModerationStatus::Pending),
            Some("approved") => Some(ModerationStatus::Approved),
            _ => None,
        }
    }

    fn is_approved(self) -> bool {
        matches!(self, ModerationStatus::Approved)
    }
}

/// One page of the moderation listing
#[derive(Debug)]
pub struct ModerationPage {
    pub comments: Vec<ModerationComment>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assemble the approved comment thread for a post.
    ///
    /// Top-level comments are ordered newest first; the replies of each are
    /// fetched concurrently and attached oldest first. A post with no
    /// approved comments (or no post at all) yields an empty thread.
    /// Unapproved comments never appear, at any level.
    pub async fn get_thread(&self, post_id: Uuid) -> Result<Vec<CommentThread>> {
        let top_level = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {}
            FROM comments
            WHERE post_id = $1 AND is_approved = TRUE AND parent_comment_id IS NULL
            ORDER BY created_at DESC
            "#,
            COMMENT_COLUMNS
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let replies = try_join_all(
            top_level
                .iter()
                .map(|comment| self.approved_replies(comment.id)),
        )
        .await?;

        Ok(top_level
            .into_iter()
            .zip(replies)
            .map(|(comment, replies)| CommentThread { comment, replies })
            .collect())
    }

    async fn approved_replies(&self, parent_id: Uuid) -> Result<Vec<Comment>> {
        let replies = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {}
            FROM comments
            WHERE parent_comment_id = $1 AND is_approved = TRUE
            ORDER BY created_at ASC
            "#,
            COMMENT_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(replies)
    }

    /// Get a comment by ID
    pub async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Submit a public comment for moderation.
    ///
    /// The target post must exist. Replies must target a top-level comment;
    /// replying to a reply is rejected rather than silently flattened.
    /// The created comment is always unapproved.
    pub async fn submit(&self, submission: CommentSubmission) -> Result<Comment> {
        let fields = validate_submission(&submission.author, &submission.email, &submission.content)?;

        let post_exists: bool =
            sqlx::query("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
                .bind(submission.post_id)
                .fetch_one(&self.pool)
                .await?
                .get(0);
        if !post_exists {
            return Err(AppError::NotFound("Blog post not found".to_string()));
        }

        if let Some(parent_id) = submission.parent_comment_id {
            self.require_top_level_parent(parent_id).await?;
        }

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (post_id, author, email, content, parent_comment_id, is_approved)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(submission.post_id)
        .bind(&fields.author)
        .bind(&fields.email)
        .bind(&fields.content)
        .bind(submission.parent_comment_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "comment submitted for moderation");
        Ok(comment)
    }

    /// Approve a comment, making it publicly visible
    pub async fn approve(&self, comment_id: Uuid) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            UPDATE comments
            SET is_approved = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        tracing::info!(%comment_id, "comment approved");
        Ok(comment)
    }

    /// Create an admin reply to a top-level comment.
    ///
    /// The reply inherits the parent's post, carries the site-author
    /// identity, and is approved on creation.
    pub async fn admin_reply(
        &self,
        parent_id: Uuid,
        content: &str,
        author_name: &str,
        author_email: &str,
    ) -> Result<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::InvalidInput("Content is required".to_string()));
        }
        if content.len() > MAX_COMMENT_LEN {
            return Err(AppError::InvalidInput(format!(
                "Content must be at most {} characters",
                MAX_COMMENT_LEN
            )));
        }

        let parent = self.require_top_level_parent(parent_id).await?;

        let reply = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (post_id, author, email, content, parent_comment_id,
                                  is_approved, is_admin_reply)
            VALUES ($1, $2, $3, $4, $5, TRUE, TRUE)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(parent.post_id)
        .bind(author_name)
        .bind(author_email)
        .bind(content)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(reply_id = %reply.id, %parent_id, "admin reply added");
        Ok(reply)
    }

    /// Delete a comment; direct replies are removed by the FK cascade
    pub async fn delete(&self, comment_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        tracing::info!(%comment_id, "comment deleted");
        Ok(())
    }

    /// Paginated moderation listing, newest first, optionally filtered by
    /// approval state. Each row carries the owning post's title.
    pub async fn list_for_moderation(
        &self,
        status: Option<ModerationStatus>,
        page: i64,
        limit: i64,
    ) -> Result<ModerationPage> {
        let page = page.max(1);
        let limit = limit.max(1);

        let comments = sqlx::query_as::<_, ModerationComment>(
            r#"
            SELECT c.id, c.post_id, c.author, c.email, c.content, c.is_approved,
                   c.is_admin_reply, c.parent_comment_id, c.likes, c.created_at,
                   c.updated_at, p.title AS post_title
            FROM comments c
            LEFT JOIN posts p ON p.id = c.post_id
            WHERE ($1::BOOLEAN IS NULL OR c.is_approved = $1)
            ORDER BY c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status.map(ModerationStatus::is_approved))
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) FROM comments WHERE ($1::BOOLEAN IS NULL OR is_approved = $1)",
        )
        .bind(status.map(ModerationStatus::is_approved))
        .fetch_one(&self.pool)
        .await?
        .get(0);

        Ok(ModerationPage {
            comments,
            total,
            total_pages: super::posts::total_pages(total, limit),
            current_page: page,
        })
    }

    /// Look up a reply target and enforce the one-level threading rule
    async fn require_top_level_parent(&self, parent_id: Uuid) -> Result<Comment> {
        let parent = self
            .get_comment(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Parent comment not found".to_string()))?;

        if !parent.is_top_level() {
            return Err(AppError::InvalidInput(
                "Replies can only target top-level comments".to_string(),
            ));
        }

        Ok(parent)
    }
}

struct ValidatedFields {
    author: String,
    email: String,
    content: String,
}

fn validate_submission(author: &str, email: &str, content: &str) -> Result<ValidatedFields> {
    let author = author.trim();
    let email = email.trim();
    let content = content.trim();

    if author.is_empty() || email.is_empty() || content.is_empty() {
        return Err(AppError::InvalidInput(
            "Author, email, and content are required".to_string(),
        ));
    }
    if author.len() > MAX_AUTHOR_LEN {
        return Err(AppError::InvalidInput(format!(
            "Author must be at most {} characters",
            MAX_AUTHOR_LEN
        )));
    }
    if content.len() > MAX_COMMENT_LEN {
        return Err(AppError::InvalidInput(format!(
            "Content must be at most {} characters",
            MAX_COMMENT_LEN
        )));
    }

    Ok(ValidatedFields {
        author: author.to_string(),
        email: normalize_email(email),
        content: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_submission_rejects_blank_fields() {
        assert!(validate_submission("", "a@b.com", "hi").is_err());
        assert!(validate_submission("Ada", "  ", "hi").is_err());
        assert!(validate_submission("Ada", "a@b.com", "   ").is_err());
    }

    #[test]
    fn test_validate_submission_trims_and_lowercases_email() {
        let fields = validate_submission(" Ada ", " Ada@Example.COM ", " hi ").unwrap();
        assert_eq!(fields.author, "Ada");
        assert_eq!(fields.email, "ada@example.com");
        assert_eq!(fields.content, "hi");
    }

    #[test]
    fn test_validate_submission_enforces_bounds() {
        let long_author = "a".repeat(MAX_AUTHOR_LEN + 1);
        assert!(validate_submission(&long_author, "a@b.com", "hi").is_err());

        let long_content = "c".repeat(MAX_COMMENT_LEN + 1);
        assert!(validate_submission("Ada", "a@b.com", &long_content).is_err());

        let max_content = "c".repeat(MAX_COMMENT_LEN);
        assert!(validate_submission("Ada", "a@b.com", &max_content).is_ok());
    }

    #[test]
    fn test_moderation_status_from_query() {
        assert_eq!(
            ModerationStatus::from_query(Some("pending")),
            Some(ModerationStatus::Pending)
        );
        assert_eq!(
            ModerationStatus::from_query(Some("approved")),
            Some(ModerationStatus::Approved)
        );
        assert_eq!(ModerationStatus::from_query(Some("anything")), None);
        assert_eq!(ModerationStatus::from_query(None), None);
    }
}
