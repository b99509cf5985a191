//! Page-number pagination.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::fields::{number_field_optional, DocOptions, NumberOptions};
use crate::schema::ModelSchema;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size", alias = "page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationQuery {
    /// Field rules for `page` and `pageSize`: optional positive integers
    pub fn schema() -> ModelSchema {
        let positive = |description: &str, example: u32| {
            number_field_optional(NumberOptions {
                doc: DocOptions {
                    description: Some(description.to_string()),
                    example: Some(json!(example)),
                    ..Default::default()
                },
                int: true,
                minimum: Some(1.0),
                ..Default::default()
            })
        };
        ModelSchema::new("PaginationDto")
            .field("page", positive("page", DEFAULT_PAGE))
            .field("pageSize", positive("pageSize", DEFAULT_PAGE_SIZE))
    }

    /// Number of items to skip
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.page_size as usize
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_page: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let total_page = if page_size > 0 {
            total.div_ceil(u64::from(page_size))
        } else {
            0
        };
        Self {
            data,
            total,
            page,
            page_size,
            total_page,
        }
    }

    /// Slice one page out of a complete result set
    pub fn from_slice(items: &[T], query: &PaginationQuery) -> Self
    where
        T: Clone,
    {
        let data = items
            .iter()
            .skip(query.offset())
            .take(query.page_size as usize)
            .cloned()
            .collect();
        Self::new(data, items.len() as u64, query.page, query.page_size)
    }
}
