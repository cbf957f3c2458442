/// Subscriber handlers - newsletter subscription endpoints
use crate::error::Result;
use crate::services::SubscriberService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

/// Subscribe an email address to the newsletter
pub async fn subscribe(
    pool: web::Data<PgPool>,
    req: web::Json<SubscribeRequest>,
) -> Result<HttpResponse> {
    let service = SubscriberService::new((**pool).clone());
    service.subscribe(&req.email).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Successfully subscribed to newsletter"
    })))
}

/// All subscribers, newest first
pub async fn list_subscribers(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = SubscriberService::new((**pool).clone());
    let subscribers = service.list_all().await?;

    Ok(HttpResponse::Ok().json(subscribers))
}

/// Request body for subscribing
#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}
