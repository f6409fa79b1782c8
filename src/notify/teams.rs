use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

use super::{Announcement, Notifier};

/// Posts a legacy Office 365 connector MessageCard to a Teams incoming webhook.
#[derive(Clone)]
pub struct TeamsNotifier {
    webhook: String,
    client: Client,
}

impl TeamsNotifier {
    pub fn new(client: Client, webhook: impl Into<String>) -> Self {
        Self {
            webhook: webhook.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for TeamsNotifier {
    async fn notify(&self, announcement: &Announcement) -> Result<()> {
        let card = MessageCard::from_announcement(announcement);
        self.client
            .post(&self.webhook)
            .json(&card)
            .send()
            .await
            // the webhook path is the credential
            .map_err(|e| e.without_url())
            .context("teams post")?
            .error_for_status()
            .map_err(|e| e.without_url())
            .context("teams non-2xx")?;
        tracing::info!(
            heading = %announcement.heading,
            items = announcement.items.len(),
            "teams card posted"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageCard {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    title: String,
    summary: String,
    sections: Vec<CardSection>,
}

#[derive(Debug, Serialize)]
struct CardSection {
    title: String,
    text: String,
}

impl MessageCard {
    pub fn from_announcement(a: &Announcement) -> Self {
        // trailing spaces force Teams markdown line breaks
        let text = a
            .items
            .iter()
            .map(|it| format!("[{}]({})", escape_link_text(&it.title), it.url))
            .collect::<Vec<_>>()
            .join("   \n");
        Self {
            context: "https://schema.org/extensions",
            kind: "MessageCard",
            title: format!("{} from {}", a.heading, a.period.describe()),
            summary: format!("{} new item(s): {}", a.items.len(), a.heading),
            sections: vec![CardSection {
                title: format!("## {}", a.heading),
                text,
            }],
        }
    }
}

fn escape_link_text(s: &str) -> String {
    s.replace('[', "\\[").replace(']', "\\]")
}
