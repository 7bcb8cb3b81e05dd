use rocket::FromForm;
use serde::{Deserialize, Serialize};

/// Pagination query parameters, usable via `<pagination..>` in a route URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromForm, Serialize, Deserialize)]
pub struct PaginationRequest {
    #[field(default = 1)]
    pub page_num: u32,
    #[field(default = 50)]
    pub page_size: u32,
}

impl PaginationRequest {
    /// How many documents to skip before this page.
    /// A page number of zero is treated as the first page.
    pub fn skip(&self) -> u32 {
        self.page_num.saturating_sub(1) * self.page_size
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Wrap up a page of items with its pagination metadata.
    pub fn to_paginated<T>(self, total: u64, items: Vec<T>) -> Paginated<T> {
        Paginated {
            items,
            pagination: PaginationResponse {
                page_num: self.page_num,
                page_size: self.page_size,
                total,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub page_num: u32,
    pub page_size: u32,
    pub total: u64,
}

/// A page of items plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationResponse,
}
