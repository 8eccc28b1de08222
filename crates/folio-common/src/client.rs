//! HTTP client for the content store's query API.

use std::borrow::Cow;

use miette::NamedSource;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;
use url::Url;

use crate::config::SanityConfig;
use crate::error::{FolioError, ParseError};
use crate::groq;
use crate::model::{Category, Post, Tag};
use crate::perf::TimingGuard;

/// Response envelope of the query endpoint.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
}

pub struct ContentClient {
    config: SanityConfig,
    http: reqwest::Client,
}

impl ContentClient {
    pub fn new(config: SanityConfig) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    pub fn with_http(config: SanityConfig, http: reqwest::Client) -> Self {
        Self {
            config: config.normalized(),
            http,
        }
    }

    pub fn config(&self) -> &SanityConfig {
        &self.config
    }

    /// Builds the GET URL for a query. Parameters are passed as `$name`
    /// query pairs holding JSON-encoded values.
    pub fn query_url(&self, query: &str, params: &[(&str, Value)]) -> Result<Url, FolioError> {
        if !self.config.is_configured() {
            return Err(FolioError::NotConfigured("missing project id"));
        }
        let host = if self.config.use_cdn { "apicdn" } else { "api" };
        let mut url = Url::parse(&format!(
            "https://{}.{}.sanity.io/v{}/data/query/{}",
            self.config.project_id, host, self.config.api_version, self.config.dataset
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (name, value) in params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, Value)],
    ) -> Result<T, FolioError> {
        let url = self.query_url(query, params)?;
        tracing::debug!(url = %url, "issuing content query");
        let _timing = TimingGuard::new("content query");

        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .header(reqwest::header::PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "content query failed");
            return Err(FolioError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        match serde_json::from_str::<QueryResponse<T>>(&text) {
            Ok(envelope) => Ok(envelope.result),
            Err(err) => Err(ParseError::from(err)
                .with_source(NamedSource::new(url.path(), Cow::Owned(text)))
                .into()),
        }
    }

    pub async fn posts(&self) -> Result<Vec<Post>, FolioError> {
        self.fetch_list(&groq::posts(), &[]).await
    }

    /// `Ok(None)` when no post has this slug.
    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, FolioError> {
        self.fetch(&groq::post_by_slug(), &[("slug", Value::from(slug))])
            .instrument(tracing::info_span!("post_by_slug", slug))
            .await
    }

    pub async fn posts_by_category(&self, category_slug: &str) -> Result<Vec<Post>, FolioError> {
        self.fetch_list(
            &groq::posts_by_category(),
            &[("categorySlug", Value::from(category_slug))],
        )
        .await
    }

    pub async fn posts_by_tag(&self, tag_slug: &str) -> Result<Vec<Post>, FolioError> {
        self.fetch_list(&groq::posts_by_tag(), &[("tagSlug", Value::from(tag_slug))])
            .await
    }

    pub async fn featured_posts(&self) -> Result<Vec<Post>, FolioError> {
        self.fetch_list(&groq::featured_posts(), &[]).await
    }

    pub async fn search_posts(&self, search: &str) -> Result<Vec<Post>, FolioError> {
        self.fetch_list(
            &groq::search_posts(),
            &[("searchQuery", Value::from(search))],
        )
        .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, FolioError> {
        self.fetch_list(groq::CATEGORIES, &[]).await
    }

    pub async fn tags(&self) -> Result<Vec<Tag>, FolioError> {
        self.fetch_list(groq::TAGS, &[]).await
    }

    /// List queries answer `null` instead of `[]` on some datasets.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, Value)],
    ) -> Result<Vec<T>, FolioError> {
        Ok(self
            .fetch::<Option<Vec<T>>>(query, params)
            .await?
            .unwrap_or_default())
    }
}
