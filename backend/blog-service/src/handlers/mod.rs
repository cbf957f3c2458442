/// HTTP handlers for the blog API
///
/// - Posts: public catalog, admin listing, multipart create/update, delete
/// - Comments: public thread retrieval and submission, moderation endpoints
/// - Subscribers: newsletter subscription and listings
/// - Newsletter: dispatch and stats
pub mod comments;
pub mod newsletter;
pub mod posts;
pub mod subscribers;

// Re-export handler functions at module level
pub use comments::{
    admin_reply, approve_comment, delete_comment, get_thread, list_moderation_queue,
    submit_comment,
};
pub use newsletter::{newsletter_stats, send_newsletter};
pub use posts::{create_post, delete_post, get_post, list_all_posts, list_posts, update_post};
pub use subscribers::{list_subscribers, subscribe};
