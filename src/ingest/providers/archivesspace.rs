use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::ArchivesSpaceConfig;
use crate::ingest::types::{PublishedItem, Source};
use crate::ingest::{dedup_by_identifier, dimes, normalize_title};

const SESSION_HEADER: &str = "X-ArchivesSpace-Session";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    session: String,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    this_page: u32,
    #[serde(default)]
    last_page: u32,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: Option<String>,
    uri: Option<String>,
}

/// Published resource records from ArchivesSpace.
pub struct RecordsSource {
    client: Client,
    cfg: ArchivesSpaceConfig,
    dimes_base: String,
    page_size: u32,
    max_pages: u32,
}

impl RecordsSource {
    pub fn new(client: Client, cfg: ArchivesSpaceConfig, dimes_base: impl Into<String>) -> Self {
        Self {
            client,
            cfg,
            dimes_base: dimes_base.into(),
            page_size: 50,
            max_pages: 200,
        }
    }

    pub fn with_paging(mut self, page_size: u32, max_pages: u32) -> Self {
        self.page_size = page_size.max(1);
        self.max_pages = max_pages.max(1);
        self
    }

    fn base(&self) -> &str {
        self.cfg.baseurl.trim_end_matches('/')
    }

    async fn login(&self) -> Result<String> {
        let url = login_url(self.base(), &self.cfg.username)?;
        let resp: LoginResponse = self
            .client
            .post(url)
            .form(&[("password", self.cfg.password.as_str())])
            .send()
            .await
            .context("archivesspace login")?
            .error_for_status()
            .context("archivesspace login non-2xx")?
            .json()
            .await
            .context("archivesspace login body")?;
        if resp.session.trim().is_empty() {
            return Err(anyhow!("archivesspace login returned an empty session"));
        }
        Ok(resp.session)
    }

    async fn search_page(&self, session: &str, page: u32) -> Result<SearchPage> {
        let url = format!("{}/search", self.base());
        let page_s = page.to_string();
        let size_s = self.page_size.to_string();
        let body = self
            .client
            .get(url)
            .header(SESSION_HEADER, session)
            .query(&[
                ("q", "publish:true"),
                ("type[]", "resource"),
                ("fields[]", "title,uri"),
                ("page", page_s.as_str()),
                ("page_size", size_s.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("archivesspace search page {page}"))?
            .error_for_status()
            .with_context(|| format!("archivesspace search page {page} non-2xx"))?
            .text()
            .await
            .context("archivesspace search .text()")?;
        parse_search_page(&body)
    }

    fn to_item(&self, r: SearchResult) -> Option<PublishedItem> {
        let (Some(uri), Some(title)) = (r.uri, r.title) else {
            tracing::warn!(provider = "archivesspace", "search result without uri/title skipped");
            return None;
        };
        let title = normalize_title(&title);
        let url = dimes::collection_url(&self.dimes_base, &uri);
        Some(PublishedItem::new(uri, title, url))
    }
}

/// `{base}/users/{username}/login` with the username as one encoded segment.
fn login_url(base: &str, username: &str) -> Result<Url> {
    let mut url = Url::parse(base).context("archivesspace base url")?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("archivesspace base url cannot carry a path"))?
        .pop_if_empty()
        .extend(["users", username, "login"]);
    Ok(url)
}

fn parse_search_page(s: &str) -> Result<SearchPage> {
    serde_json::from_str(s).context("parsing archivesspace search json")
}

#[async_trait]
impl Source for RecordsSource {
    fn name(&self) -> &'static str {
        "archivesspace"
    }

    fn heading(&self) -> &'static str {
        "Newly Published Collections"
    }

    async fn fetch_published(&self) -> Result<Vec<PublishedItem>> {
        let session = self.login().await?;

        let mut raw = Vec::new();
        let mut page = 1u32;
        loop {
            let sp = self.search_page(&session, page).await?;
            raw.extend(sp.results.into_iter().filter_map(|r| self.to_item(r)));

            if sp.this_page >= sp.last_page {
                break;
            }
            if page >= self.max_pages {
                tracing::warn!(
                    provider = "archivesspace",
                    last_page = sp.last_page,
                    max_pages = self.max_pages,
                    "page cap reached; remaining pages ignored"
                );
                break;
            }
            page += 1;
        }

        let (items, dropped) = dedup_by_identifier(raw);
        tracing::debug!(
            provider = "archivesspace",
            items = items.len(),
            dropped,
            pages = page,
            "fetched published resources"
        );
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_tolerates_missing_fields() {
        let sp = parse_search_page(
            r#"{"first_page":1,"last_page":3,"this_page":2,"total_hits":7,
                "results":[{"title":"A","uri":"/repositories/2/resources/1"},{"title":"no uri"}]}"#,
        )
        .unwrap();
        assert_eq!(sp.this_page, 2);
        assert_eq!(sp.last_page, 3);
        assert_eq!(sp.results.len(), 2);
        assert!(sp.results[1].uri.is_none());
    }

    #[test]
    fn parse_page_empty_search() {
        let sp = parse_search_page("{}").unwrap();
        assert!(sp.results.is_empty());
        assert!(sp.this_page >= sp.last_page);
    }

    #[test]
    fn login_url_encodes_username_as_one_segment() {
        let url = login_url("https://as.example.org/api", "ops/bot?x#y").unwrap();
        assert_eq!(
            url.as_str(),
            "https://as.example.org/api/users/ops%2Fbot%3Fx%23y/login"
        );
        let url = login_url("http://as.local:8089", "notifier").unwrap();
        assert_eq!(url.as_str(), "http://as.local:8089/users/notifier/login");
    }

    #[test]
    fn parse_page_rejects_garbage() {
        assert!(parse_search_page("<html>login required</html>").is_err());
    }
}
