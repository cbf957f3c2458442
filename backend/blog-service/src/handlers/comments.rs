/// Comment handlers - public thread retrieval and the moderation endpoints
use crate::config::Config;
use crate::error::Result;
use crate::services::comments::{CommentService, CommentSubmission, ModerationStatus};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

/// Approved comment thread for a post
pub async fn get_thread(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let thread = service.get_thread(*post_id).await?;

    Ok(HttpResponse::Ok().json(thread))
}

/// Submit a comment for moderation
pub async fn submit_comment(
    pool: web::Data<PgPool>,
    req: web::Json<SubmitCommentRequest>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service
        .submit(CommentSubmission {
            post_id: req.post_id,
            author: req.author.clone(),
            email: req.email.clone(),
            content: req.content.clone(),
            parent_comment_id: req.parent_comment_id,
        })
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Comment submitted for moderation",
        "comment": comment,
    })))
}

/// Paginated moderation listing, optionally filtered by approval status
pub async fn list_moderation_queue(
    pool: web::Data<PgPool>,
    query: web::Query<ModerationQuery>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let page = service
        .list_for_moderation(
            ModerationStatus::from_query(query.status.as_deref()),
            query.page,
            query.limit,
        )
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "comments": page.comments,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
        "total": page.total,
    })))
}

/// Approve a comment
pub async fn approve_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comment = service.approve(*comment_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Comment approved",
        "comment": comment,
    })))
}

/// Reply to a comment as the site author; the reply is approved on creation
pub async fn admin_reply(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    comment_id: web::Path<Uuid>,
    req: web::Json<AdminReplyRequest>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let reply = service
        .admin_reply(
            *comment_id,
            &req.content,
            &config.site.author_name,
            &config.site.author_email,
        )
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Reply added",
        "reply": reply,
    })))
}

/// Delete a comment along with its replies
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    service.delete(*comment_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Comment deleted successfully",
    })))
}

/// Request body for submitting a comment
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCommentRequest {
    pub post_id: Uuid,
    pub author: String,
    pub email: String,
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<Uuid>,
}

/// Request body for an admin reply
#[derive(Deserialize)]
pub struct AdminReplyRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct ModerationQuery {
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}
