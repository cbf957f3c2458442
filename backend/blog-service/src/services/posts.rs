/// Post service - catalog listing, creation, updates, deletion
use crate::error::{AppError, Result};
use crate::models::Post;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, title, excerpt, content, featured_image, category, tags, \
     read_time, author, is_published, published_at, created_at, updated_at";

/// Sentinel category meaning "no category filter"
const CATEGORY_ALL: &str = "All";

/// Catalog filter and pagination parameters
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    /// 1-indexed page
    pub page: i64,
    pub limit: i64,
}

/// One page of the published-post catalog
#[derive(Debug)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Fields for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub featured_image: String,
    pub author: String,
    pub is_published: bool,
}

/// Partial update; absent fields keep their stored values
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub read_time: Option<i32>,
    pub featured_image: Option<String>,
    pub is_published: Option<bool>,
}

/// Number of pages needed for `total` rows at `limit` rows per page
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List published posts, newest publication first, with optional
    /// category and substring-search filters.
    ///
    /// The search term matches case-insensitively against title, excerpt,
    /// or any tag.
    pub async fn list(&self, filter: &PostFilter) -> Result<PostPage> {
        let page = filter.page.max(1);
        let limit = filter.limit.max(1);

        let mut select: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM posts", POST_COLUMNS));
        push_catalog_filters(&mut select, filter);
        select.push(" ORDER BY published_at DESC NULLS LAST");
        select.push(" LIMIT ");
        select.push_bind(limit);
        select.push(" OFFSET ");
        select.push_bind((page - 1) * limit);

        let posts = select
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?;

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM posts");
        push_catalog_filters(&mut count, filter);

        let total: i64 = count.build().fetch_one(&self.pool).await?.get(0);

        Ok(PostPage {
            posts,
            total,
            total_pages: total_pages(total, limit),
            current_page: page,
        })
    }

    /// All posts regardless of publication state, newest first (admin view)
    pub async fn list_all(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts ORDER BY created_at DESC",
            POST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Create a new post
    ///
    /// `published_at` is stamped now iff the post is created published.
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (title, excerpt, content, category, tags, read_time,
                               featured_image, author, is_published, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                    CASE WHEN $9 THEN NOW() END)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(&new_post.title)
        .bind(&new_post.excerpt)
        .bind(&new_post.content)
        .bind(&new_post.category)
        .bind(&new_post.tags)
        .bind(new_post.read_time)
        .bind(&new_post.featured_image)
        .bind(&new_post.author)
        .bind(new_post.is_published)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(post_id = %post.id, published = post.is_published, "post created");
        Ok(post)
    }

    /// Apply a partial update to a post
    ///
    /// `published_at` records the first publication: it is stamped when the
    /// published flag first transitions to true and never re-stamped.
    pub async fn update_post(&self, post_id: Uuid, changes: PostUpdate) -> Result<Post> {
        let existing = self
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let is_published = changes.is_published.unwrap_or(existing.is_published);
        let published_at = match (existing.published_at, is_published) {
            (Some(at), _) => Some(at),
            (None, true) => Some(Utc::now()),
            (None, false) => None,
        };

        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $1, excerpt = $2, content = $3, category = $4, tags = $5,
                read_time = $6, featured_image = $7, is_published = $8,
                published_at = $9, updated_at = NOW()
            WHERE id = $10
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(changes.title.unwrap_or(existing.title))
        .bind(changes.excerpt.unwrap_or(existing.excerpt))
        .bind(changes.content.unwrap_or(existing.content))
        .bind(changes.category.unwrap_or(existing.category))
        .bind(changes.tags.unwrap_or(existing.tags))
        .bind(changes.read_time.unwrap_or(existing.read_time))
        .bind(changes.featured_image.unwrap_or(existing.featured_image))
        .bind(is_published)
        .bind(published_at)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Delete a post; its comments are removed by the FK cascade
    pub async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        tracing::info!(%post_id, "post deleted");
        Ok(())
    }
}

fn push_catalog_filters(qb: &mut QueryBuilder<Postgres>, filter: &PostFilter) {
    qb.push(" WHERE is_published = TRUE");

    if let Some(category) = &filter.category {
        if category != CATEGORY_ALL {
            qb.push(" AND category = ");
            qb.push_bind(category.clone());
        }
    }

    if let Some(search) = &filter.search {
        if !search.trim().is_empty() {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR excerpt ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE ");
            qb.push_bind(pattern);
            qb.push("))");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
    }

    #[test]
    fn test_total_pages_guards_zero_limit() {
        assert_eq!(total_pages(42, 0), 0);
    }

    fn sql_of(filter: &PostFilter) -> String {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM posts");
        push_catalog_filters(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_catalog_filter_always_restricts_to_published() {
        let sql = sql_of(&PostFilter {
            category: None,
            search: None,
            page: 1,
            limit: 10,
        });
        assert!(sql.contains("is_published = TRUE"));
        assert!(!sql.contains("category ="));
    }

    #[test]
    fn test_catalog_filter_skips_sentinel_category() {
        let sql = sql_of(&PostFilter {
            category: Some("All".to_string()),
            search: None,
            page: 1,
            limit: 10,
        });
        assert!(!sql.contains("category ="));

        let sql = sql_of(&PostFilter {
            category: Some("Philosophy".to_string()),
            search: None,
            page: 1,
            limit: 10,
        });
        assert!(sql.contains("category ="));
    }

    #[test]
    fn test_catalog_filter_search_covers_title_excerpt_tags() {
        let sql = sql_of(&PostFilter {
            category: None,
            search: Some("stoic".to_string()),
            page: 1,
            limit: 10,
        });
        assert!(sql.contains("title ILIKE"));
        assert!(sql.contains("excerpt ILIKE"));
        assert!(sql.contains("unnest(tags)"));
    }

    #[test]
    fn test_catalog_filter_ignores_blank_search() {
        let sql = sql_of(&PostFilter {
            category: None,
            search: Some("   ".to_string()),
            page: 1,
            limit: 10,
        });
        assert!(!sql.contains("ILIKE"));
    }
}
