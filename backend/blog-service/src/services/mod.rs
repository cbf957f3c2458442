/// Business logic layer for the blog service
///
/// - Post service: catalog listing, creation, updates, deletion
/// - Comment service: thread assembly and the moderation gate
/// - Subscriber service: newsletter subscriptions
/// - Newsletter service: batched dispatch to active subscribers
/// - Mailer: SMTP transport wrapper injected at startup
/// - Image store: local storage for uploaded post images
pub mod comments;
pub mod images;
pub mod mailer;
pub mod newsletter;
pub mod posts;
pub mod subscribers;

// Re-export commonly used services
pub use comments::CommentService;
pub use images::ImageStore;
pub use mailer::Mailer;
pub use newsletter::NewsletterService;
pub use posts::PostService;
pub use subscribers::SubscriberService;
