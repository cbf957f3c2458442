/// Newsletter service - batched dispatch to active subscribers
use crate::config::SiteConfig;
use crate::error::{AppError, Result};
use crate::services::{Mailer, SubscriberService};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::PgPool;

/// Outcome of a newsletter dispatch
#[derive(Debug, Clone, Copy)]
pub struct DispatchReport {
    /// Number of recipients the batch was sent to
    pub recipients: usize,
}

pub struct NewsletterService {
    pool: PgPool,
    mailer: Mailer,
    site: SiteConfig,
}

impl NewsletterService {
    pub fn new(pool: PgPool, mailer: Mailer, site: SiteConfig) -> Self {
        Self { pool, mailer, site }
    }

    /// Send a newsletter to every active subscriber.
    ///
    /// Subject and content must be non-empty; with zero active subscribers
    /// the operation fails before any provider call is made. The whole batch
    /// is one outbound send; a provider failure aborts it.
    pub async fn send(&self, subject: &str, content: &str) -> Result<DispatchReport> {
        let subject = subject.trim();
        let content = content.trim();
        if subject.is_empty() || content.is_empty() {
            return Err(AppError::InvalidInput(
                "Subject and content are required".to_string(),
            ));
        }

        let subscribers = SubscriberService::new(self.pool.clone())
            .list_active()
            .await?;
        if subscribers.is_empty() {
            return Err(AppError::InvalidInput(
                "No active subscribers found".to_string(),
            ));
        }

        let recipients: Vec<String> = subscribers.into_iter().map(|s| s.email).collect();

        let html = render_newsletter(&self.site, subject, content);
        let text = html_to_text(&html);

        let sent = self
            .mailer
            .send_batch(&recipients, subject, &html, &text)
            .await?;

        tracing::info!(subject, recipients = sent, "newsletter dispatched");
        Ok(DispatchReport { recipients: sent })
    }
}

/// Render the fixed newsletter HTML template
pub fn render_newsletter(site: &SiteConfig, subject: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{subject}</title>
    <style>
        body {{ font-family: Georgia, serif; line-height: 1.6; color: #2c3e50; background-color: #f8f5f0; margin: 0; padding: 20px; }}
        .container {{ max-width: 600px; margin: 0 auto; background: #ffffff; padding: 40px; border: 1px solid #d4c9b9; border-radius: 8px; }}
        .header {{ text-align: center; border-bottom: 2px solid #722F37; padding-bottom: 20px; margin-bottom: 30px; }}
        .logo {{ color: #722F37; font-size: 28px; font-weight: bold; }}
        .content {{ font-size: 16px; line-height: 1.8; }}
        .signature {{ margin-top: 30px; border-top: 1px solid #d4c9b9; padding-top: 20px; color: #722F37; }}
        .footer {{ text-align: center; margin-top: 30px; font-size: 12px; color: #8B7355; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">{site_name}</div>
        </div>
        <div class="content">
            {content}
        </div>
        <div class="signature">
            <strong>{author}</strong>
        </div>
        <div class="footer">
            <p>You received this email because you subscribed to updates from {site_name}.</p>
            <p><a href="[UNSUBSCRIBE_LINK]">Unsubscribe</a></p>
        </div>
    </div>
</body>
</html>"#,
        subject = subject,
        site_name = site.name,
        content = content,
        author = site.author_name,
    )
}

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").expect("hardcoded tag regex is invalid - fix source code")
});
static BLANK_LINES_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").expect("hardcoded blank-line regex is invalid - fix source code")
});

/// Derive a plain-text fallback from an HTML body for email clients that
/// prefer plain text
pub fn html_to_text(html: &str) -> String {
    let mut text = html.replace("<br>", "\n").replace("<br/>", "\n").replace("<br />", "\n");
    text = text.replace("<p>", "\n").replace("</p>", "\n");
    let text = TAG_REGEX.replace_all(&text, "");
    let text = BLANK_LINES_REGEX.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            name: "The Examined Life".to_string(),
            author_name: "Editor".to_string(),
            author_email: "editor@example.com".to_string(),
        }
    }

    #[test]
    fn test_template_embeds_subject_content_author() {
        let html = render_newsletter(&site(), "On Habit", "<p>Some thoughts.</p>");
        assert!(html.contains("On Habit"));
        assert!(html.contains("<p>Some thoughts.</p>"));
        assert!(html.contains("Editor"));
        assert!(html.contains("The Examined Life"));
    }

    #[test]
    fn test_html_to_text_strips_markup() {
        let text = html_to_text("<p>First</p><p>Second<br>line</p>");
        assert_eq!(text, "First\n\nSecond\nline");
    }

    #[test]
    fn test_html_to_text_drops_style_tags() {
        let text = html_to_text("<div class=\"x\">kept</div>");
        assert_eq!(text, "kept");
    }
}
