//! Minimal client for the Notion REST API: page search and block listing.
//!
//! Only the fields the content gateway reads are modelled; everything else in
//! the upstream payloads is ignored during deserialization.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::Config;

#[derive(thiserror::Error, Debug)]
pub enum NotionError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, code: String, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RichText {
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToDoContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

/// A block as returned by `blocks/{id}/children`, keyed on its `type` tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    #[serde(rename = "paragraph")]
    Paragraph {
        #[serde(default)]
        paragraph: TextContent,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        #[serde(default)]
        heading_1: TextContent,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        #[serde(default)]
        heading_2: TextContent,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        #[serde(default)]
        heading_3: TextContent,
    },
    #[serde(rename = "bulleted_list_item")]
    BulletedListItem {
        #[serde(default)]
        bulleted_list_item: TextContent,
    },
    #[serde(rename = "numbered_list_item")]
    NumberedListItem {
        #[serde(default)]
        numbered_list_item: TextContent,
    },
    #[serde(rename = "to_do")]
    ToDo {
        #[serde(default)]
        to_do: ToDoContent,
    },
    #[serde(other)]
    Unsupported,
}

/// A search hit. `properties` stays untyped because its shape depends on
/// the parent database schema.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    results: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Decode raw block objects, skipping entries without a string `type` tag.
pub fn decode_blocks(raw: Vec<Value>) -> Result<Vec<Block>, NotionError> {
    let mut blocks = Vec::with_capacity(raw.len());
    for value in raw {
        if !value.get("type").is_some_and(Value::is_string) {
            debug!(id = ?value.get("id"), "skipping untyped block");
            continue;
        }
        blocks.push(serde_json::from_value(value)?);
    }
    Ok(blocks)
}

#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Every page the integration token can see (first result page only).
    async fn search_pages(&self, token: &str) -> Result<Vec<SearchResult>, NotionError>;
    /// Direct children of a block or page; nested children are not fetched.
    async fn block_children(&self, token: &str, block_id: &str) -> Result<Vec<Block>, NotionError>;
}

#[derive(Clone)]
pub struct NotionHttpClient {
    http: reqwest::Client,
    base_url: String,
    version: String,
}

impl NotionHttpClient {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            version: version.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.notion_api_base.clone(), cfg.notion_version.clone())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        token: &str,
    ) -> Result<T, NotionError> {
        let resp = req
            .bearer_auth(token)
            .header("Notion-Version", &self.version)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = if parsed.message.is_empty() {
                format!("upstream returned {status}")
            } else {
                parsed.message
            };
            debug!(status = status.as_u16(), code = %parsed.code, "notion request failed");
            return Err(NotionError::Api { status: status.as_u16(), code: parsed.code, message });
        }
        Ok(resp.json::<T>().await?)
    }
}

#[async_trait]
impl NotionApi for NotionHttpClient {
    async fn search_pages(&self, token: &str) -> Result<Vec<SearchResult>, NotionError> {
        let req = self
            .http
            .post(format!("{}/v1/search", self.base_url))
            .json(&json!({
                "query": "",
                "filter": { "property": "object", "value": "page" }
            }));
        let list: ListResponse<SearchResult> = self.send(req, token).await?;
        Ok(list.results)
    }

    async fn block_children(&self, token: &str, block_id: &str) -> Result<Vec<Block>, NotionError> {
        let url = format!(
            "{}/v1/blocks/{}/children",
            self.base_url,
            urlencoding::encode(block_id)
        );
        let list: ListResponse<Value> = self.send(self.http.get(url), token).await?;
        decode_blocks(list.results)
    }
}
