//! Content gateway: page listing and block-to-text flattening on top of
//! [`NotionApi`].

use std::sync::Arc;

use tracing::error;

use crate::models::{PageSummary, UserRecord};
use crate::notion::{Block, NotionApi, NotionError, RichText, SearchResult};

pub const UNTITLED: &str = "Untitled";

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("no Notion API token stored for this user")]
    MissingToken,
    #[error(transparent)]
    Upstream(#[from] NotionError),
}

fn first_text(segments: &[RichText]) -> Option<&str> {
    segments
        .first()
        .map(|s| s.plain_text.as_deref().unwrap_or_default())
}

fn push_line(out: &mut String, prefix: &str, text: &str) {
    out.push_str(prefix);
    out.push_str(text);
    out.push('\n');
}

/// Render one block. Unsupported kinds and blocks without text add nothing.
pub fn render_block(block: &Block, out: &mut String) {
    match block {
        Block::Paragraph { paragraph } => {
            for text in paragraph.rich_text.iter().filter_map(|s| s.plain_text.as_deref()) {
                push_line(out, "", text);
            }
        }
        Block::Heading1 { heading_1: c } => {
            if let Some(t) = first_text(&c.rich_text) { push_line(out, "# ", t) }
        }
        Block::Heading2 { heading_2: c } => {
            if let Some(t) = first_text(&c.rich_text) { push_line(out, "## ", t) }
        }
        Block::Heading3 { heading_3: c } => {
            if let Some(t) = first_text(&c.rich_text) { push_line(out, "### ", t) }
        }
        Block::BulletedListItem { bulleted_list_item: c } => {
            if let Some(t) = first_text(&c.rich_text) { push_line(out, "* ", t) }
        }
        // Every item renders as "1." regardless of position.
        Block::NumberedListItem { numbered_list_item: c } => {
            if let Some(t) = first_text(&c.rich_text) { push_line(out, "1. ", t) }
        }
        Block::ToDo { to_do } => {
            if let Some(t) = first_text(&to_do.rich_text) {
                push_line(out, if to_do.checked { "[x] " } else { "[ ] " }, t)
            }
        }
        Block::Unsupported => {}
    }
}

/// Concatenate rendered blocks in the order given.
pub fn flatten_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        render_block(block, &mut out);
    }
    out
}

/// First segment of the property literally named `title`, else "Untitled".
pub fn page_title(result: &SearchResult) -> String {
    result
        .properties
        .get("title")
        .and_then(|prop| prop.get("title"))
        .and_then(|segments| segments.as_array())
        .and_then(|segments| segments.first())
        .and_then(|seg| seg.get("plain_text"))
        .and_then(|text| text.as_str())
        .unwrap_or(UNTITLED)
        .to_string()
}

#[derive(Clone)]
pub struct ContentGateway {
    api: Arc<dyn NotionApi>,
}

impl ContentGateway {
    pub fn new(api: Arc<dyn NotionApi>) -> Self {
        Self { api }
    }

    fn token(user: &UserRecord) -> Result<&str, GatewayError> {
        user.notion_api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(GatewayError::MissingToken)
    }

    pub async fn list_pages(&self, user: &UserRecord) -> Result<Vec<PageSummary>, GatewayError> {
        let token = Self::token(user)?;
        let results = self.api.search_pages(token).await.map_err(|e| {
            error!(username = %user.username, "notion search failed: {e}");
            e
        })?;
        Ok(results
            .iter()
            .filter(|r| r.object == "page")
            .map(|r| PageSummary { id: r.id.clone(), title: page_title(r) })
            .collect())
    }

    pub async fn get_page_text(&self, user: &UserRecord, page_id: &str) -> Result<String, GatewayError> {
        let token = Self::token(user)?;
        let blocks = self.api.block_children(token, page_id).await.map_err(|e| {
            error!(username = %user.username, page_id = %page_id, "notion block listing failed: {e}");
            e
        })?;
        Ok(flatten_blocks(&blocks))
    }
}
