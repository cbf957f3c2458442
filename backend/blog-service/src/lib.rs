/// Blog Service Library
///
/// Backend for a blog: post catalog, moderated comment threads, and
/// newsletter dispatch to subscribers.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for posts, comments, subscribers
/// - `services`: Business logic layer
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `validators`: Input validation utilities
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
