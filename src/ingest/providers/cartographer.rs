use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ingest::types::{PublishedItem, Source};
use crate::ingest::{dedup_by_identifier, dimes, normalize_title};

#[derive(Debug, Deserialize)]
struct MapList {
    #[serde(default)]
    results: Vec<MapRef>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MapRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct MapDetail {
    #[serde(default)]
    children: Vec<MapChild>,
}

#[derive(Debug, Deserialize)]
struct MapChild {
    archivesspace_uri: Option<String>,
}

/// Arrangement maps modified since a given instant, from Cartographer.
pub struct MapSource {
    client: Client,
    baseurl: String,
    dimes_base: String,
    modified_since: i64,
    max_pages: u32,
}

impl MapSource {
    pub fn new(
        client: Client,
        baseurl: impl Into<String>,
        dimes_base: impl Into<String>,
        modified_since: i64,
    ) -> Self {
        Self {
            client,
            baseurl: baseurl.into().trim_end_matches('/').to_string(),
            dimes_base: dimes_base.into(),
            modified_since,
            max_pages: 200,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("cartographer get {url}"))?
            .error_for_status()
            .with_context(|| format!("cartographer get {url} non-2xx"))?
            .text()
            .await
            .context("cartographer .text()")?;
        serde_json::from_str(&body).with_context(|| format!("parsing cartographer json from {url}"))
    }

    async fn list_maps(&self) -> Result<Vec<MapRef>> {
        let mut url = format!(
            "{}/api/maps/?modified_since={}",
            self.baseurl, self.modified_since
        );
        let mut out = Vec::new();
        for _ in 0..self.max_pages {
            let page: MapList = self.get_json(&url).await?;
            out.extend(page.results);
            match page.next {
                Some(next) if !next.trim().is_empty() => url = self.absolute(&next),
                _ => return Ok(out),
            }
        }
        tracing::warn!(
            provider = "cartographer",
            max_pages = self.max_pages,
            "page cap reached; remaining pages ignored"
        );
        Ok(out)
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}{}", self.baseurl, href)
        }
    }

    async fn resolve(&self, m: MapRef) -> Result<Option<PublishedItem>> {
        let detail: MapDetail = self.get_json(&self.absolute(&m.reference)).await?;
        let uri = detail
            .children
            .into_iter()
            .next()
            .and_then(|c| c.archivesspace_uri)
            .filter(|u| !u.trim().is_empty());
        let Some(uri) = uri else {
            tracing::warn!(
                provider = "cartographer",
                map = %m.reference,
                "map has no linked archivesspace record; skipped"
            );
            return Ok(None);
        };
        Ok(Some(PublishedItem::new(
            m.reference,
            normalize_title(&m.title),
            dimes::collection_url(&self.dimes_base, &uri),
        )))
    }
}

#[async_trait]
impl Source for MapSource {
    fn name(&self) -> &'static str {
        "cartographer"
    }

    fn heading(&self) -> &'static str {
        "Updated Arrangement Maps"
    }

    async fn fetch_published(&self) -> Result<Vec<PublishedItem>> {
        let maps = self.list_maps().await?;
        let mut raw = Vec::with_capacity(maps.len());
        for m in maps {
            if let Some(item) = self.resolve(m).await? {
                raw.push(item);
            }
        }
        let (items, dropped) = dedup_by_identifier(raw);
        tracing::debug!(
            provider = "cartographer",
            items = items.len(),
            dropped,
            modified_since = self.modified_since,
            "fetched updated maps"
        );
        Ok(items)
    }
}
