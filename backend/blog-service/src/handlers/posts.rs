/// Post handlers - HTTP endpoints for the post catalog
///
/// Create and update accept multipart form data so an image file can ride
/// along with the text fields; the stored image reference is a local upload
/// path, or a placeholder when no file is supplied.
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::images::{ImageStore, MAX_IMAGE_BYTES, PLACEHOLDER_IMAGE};
use crate::services::posts::{NewPost, PostFilter, PostService, PostUpdate};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Multipart field name carrying the uploaded image
const IMAGE_FIELD: &str = "featuredImage";

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// List published posts with optional category/search filters
pub async fn list_posts(
    pool: web::Data<PgPool>,
    query: web::Query<CatalogQuery>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let page = service
        .list(&PostFilter {
            category: query.category.clone(),
            search: query.search.clone(),
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "posts": page.posts,
        "totalPages": page.total_pages,
        "currentPage": page.current_page,
        "total": page.total,
    })))
}

/// All posts including unpublished ones (admin view)
pub async fn list_all_posts(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let posts = service.list_all().await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Get a single post
pub async fn get_post(pool: web::Data<PgPool>, post_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    match service.get_post(*post_id).await? {
        Some(post) => Ok(HttpResponse::Ok().json(post)),
        None => Err(AppError::NotFound("Post not found".to_string())),
    }
}

/// Create a post from a multipart form with an optional image file
pub async fn create_post(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    images: web::Data<ImageStore>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload).await?;

    let missing = missing_required_fields(&form.fields);
    if !missing.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let featured_image = match &form.image {
        Some(image) => images.save(&image.filename, &image.bytes).await?,
        None => PLACEHOLDER_IMAGE.to_string(),
    };

    let service = PostService::new((**pool).clone());
    let post = service
        .create_post(NewPost {
            title: form.fields["title"].clone(),
            excerpt: form.fields["excerpt"].clone(),
            content: form.fields["content"].clone(),
            category: form.fields["category"].clone(),
            tags: parse_tags(form.fields.get("tags").map(String::as_str))?,
            read_time: parse_read_time(form.fields.get("readTime").map(String::as_str)),
            featured_image,
            author: config.site.author_name.clone(),
            is_published: parse_published_flag(form.fields.get("isPublished").map(String::as_str)),
        })
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Update a post from a multipart form; only supplied fields change
pub async fn update_post(
    pool: web::Data<PgPool>,
    images: web::Data<ImageStore>,
    post_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload).await?;

    let featured_image = match &form.image {
        Some(image) => Some(images.save(&image.filename, &image.bytes).await?),
        None => None,
    };

    let changes = PostUpdate {
        title: form.fields.get("title").cloned(),
        excerpt: form.fields.get("excerpt").cloned(),
        content: form.fields.get("content").cloned(),
        category: form.fields.get("category").cloned(),
        tags: match form.fields.get("tags") {
            Some(raw) => Some(parse_tags(Some(raw))?),
            None => None,
        },
        read_time: form
            .fields
            .get("readTime")
            .map(|raw| parse_read_time(Some(raw))),
        featured_image,
        is_published: form
            .fields
            .get("isPublished")
            .map(|raw| parse_published_flag(Some(raw))),
    };

    let service = PostService::new((**pool).clone());
    let post = service.update_post(*post_id, changes).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post
pub async fn delete_post(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    service.delete_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Post deleted successfully"
    })))
}

struct UploadedImage {
    filename: String,
    bytes: Vec<u8>,
}

struct PostForm {
    fields: HashMap<String, String>,
    image: Option<UploadedImage>,
}

/// Drain a multipart payload into text fields and at most one image file
async fn read_post_form(mut payload: Multipart) -> Result<PostForm> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(item) = payload.next().await {
        let mut field = item
            .map_err(|e| AppError::InvalidInput(format!("Malformed multipart payload: {}", e)))?;

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| AppError::InvalidInput(format!("Error reading upload: {}", e)))?;
            bytes.extend_from_slice(&chunk);
            if bytes.len() > MAX_IMAGE_BYTES {
                return Err(AppError::InvalidInput(
                    "Image exceeds the 10MB upload limit".to_string(),
                ));
            }
        }

        match filename {
            Some(filename) if name == IMAGE_FIELD => {
                image = Some(UploadedImage { filename, bytes });
            }
            _ => {
                fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            }
        }
    }

    Ok(PostForm { fields, image })
}

fn missing_required_fields(fields: &HashMap<String, String>) -> Vec<&'static str> {
    ["title", "excerpt", "content", "category"]
        .into_iter()
        .filter(|key| fields.get(*key).map(|v| v.trim().is_empty()).unwrap_or(true))
        .collect()
}

/// Tags arrive as a JSON-serialized array of strings; absent means none
fn parse_tags(raw: Option<&str>) -> Result<Vec<String>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidInput(format!("Malformed tags list: {}", e))),
        _ => Ok(Vec::new()),
    }
}

/// Estimated read time, defaulting to 5 when absent or unparsable
fn parse_read_time(raw: Option<&str>) -> i32 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(5)
}

/// Publication flag arrives as the string "true" from the form
fn parse_published_flag(raw: Option<&str>) -> bool {
    raw == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_required_fields() {
        let complete = fields(&[
            ("title", "A"),
            ("excerpt", "B"),
            ("content", "C"),
            ("category", "Philosophy"),
        ]);
        assert!(missing_required_fields(&complete).is_empty());

        let partial = fields(&[("title", "A"), ("excerpt", "  ")]);
        let missing = missing_required_fields(&partial);
        assert_eq!(missing, vec!["excerpt", "content", "category"]);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags(Some(r#"["stoicism","habit"]"#)).unwrap(),
            vec!["stoicism".to_string(), "habit".to_string()]
        );
        assert!(parse_tags(None).unwrap().is_empty());
        assert!(parse_tags(Some("")).unwrap().is_empty());
        assert!(parse_tags(Some("not json")).is_err());
    }

    #[test]
    fn test_parse_read_time_defaults_to_five() {
        assert_eq!(parse_read_time(Some("8")), 8);
        assert_eq!(parse_read_time(Some("soon")), 5);
        assert_eq!(parse_read_time(None), 5);
    }

    #[test]
    fn test_parse_published_flag() {
        assert!(parse_published_flag(Some("true")));
        assert!(!parse_published_flag(Some("True")));
        assert!(!parse_published_flag(Some("false")));
        assert!(!parse_published_flag(None));
    }
}
