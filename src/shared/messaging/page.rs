//! Pagination Metadata
//!
//! Shapes returned by the read API. The metadata layout (page, limit, total,
//! is_last_page) is a client contract and must not change field names.

use serde::{Deserialize, Serialize};

use super::message::MessageView;

/// Direction of anchor-relative pagination
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnchorDirection {
    /// Messages strictly older than the anchor
    Older,
    /// Messages strictly newer than the anchor
    Newer,
}

impl AnchorDirection {
    /// Parse from a query-string value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "older" => Some(AnchorDirection::Older),
            "newer" => Some(AnchorDirection::Newer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorDirection::Older => "older",
            AnchorDirection::Newer => "newer",
        }
    }
}

/// Pagination metadata attached to every page of results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    /// Total matching messages (channel total for offset pages, direction
    /// total for anchor pages)
    pub total: u64,
    pub is_last_page: bool,
}

impl PageMeta {
    /// Build metadata for a page, deriving `is_last_page` from the total
    ///
    /// `is_last_page = page >= ceil(total / limit) - 1`. An empty result set
    /// has no pages beyond page 0, so page 0 reports last.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let page_count = total.div_ceil(limit as u64);
        let is_last_page = (page as u64) >= page_count.saturating_sub(1);
        Self {
            page,
            limit,
            total,
            is_last_page,
        }
    }
}

/// One page of rendered messages plus its metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagePage {
    pub items: Vec<MessageView>,
    pub meta: PageMeta,
}
