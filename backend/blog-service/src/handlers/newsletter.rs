/// Newsletter handlers - dispatch and stats endpoints
use crate::config::Config;
use crate::error::Result;
use crate::services::{Mailer, NewsletterService, SubscriberService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

/// Send a newsletter to all active subscribers
pub async fn send_newsletter(
    pool: web::Data<PgPool>,
    mailer: web::Data<Mailer>,
    config: web::Data<Config>,
    req: web::Json<SendNewsletterRequest>,
) -> Result<HttpResponse> {
    let service = NewsletterService::new(
        (**pool).clone(),
        mailer.get_ref().clone(),
        config.site.clone(),
    );
    let report = service.send(&req.subject, &req.content).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Newsletter sent to {} subscribers", report.recipients),
        "recipients": report.recipients,
    })))
}

/// Subscriber counts
pub async fn newsletter_stats(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = SubscriberService::new((**pool).clone());
    let stats = service.stats().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "totalSubscribers": stats.total,
        "activeSubscribers": stats.active,
        "inactiveSubscribers": stats.inactive,
    })))
}

/// Request body for a newsletter dispatch
#[derive(Deserialize)]
pub struct SendNewsletterRequest {
    pub subject: String,
    pub content: String,
}
