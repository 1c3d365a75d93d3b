//! Keyword/status filtering, sorting and pagination over the store.
//!
//! The engine validates the query and delegates the scan to the store; the
//! ordering and slicing helpers live here and are shared by store adapters so
//! pagination is reproducible across repeated calls regardless of backend.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{ContributorStatus, ContributorSummary};
use super::repository::{ContributorStore, StoreError};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Listing order. Name and date orders break ties by id ascending so page
/// boundaries are stable; id orders are total on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    NameAsc,
    NameDesc,
    DateAsc,
    #[default]
    DateDesc,
    IdAsc,
    IdDesc,
}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name_asc" => Ok(SortOrder::NameAsc),
            "name_desc" => Ok(SortOrder::NameDesc),
            "date_asc" => Ok(SortOrder::DateAsc),
            "date_desc" => Ok(SortOrder::DateDesc),
            "id_asc" => Ok(SortOrder::IdAsc),
            "id_desc" => Ok(SortOrder::IdDesc),
            _ => Err(UnknownSortOrder(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order '{0}'")]
pub struct UnknownSortOrder(pub String);

/// A validated-on-use listing request. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub status: Option<ContributorStatus>,
    pub sort: SortOrder,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            status: None,
            sort: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    /// Reject out-of-contract paging parameters instead of clamping them.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page_size == 0 {
            return Err(QueryError::InvalidPageSize);
        }
        if self.page == 0 {
            return Err(QueryError::InvalidPage);
        }
        Ok(())
    }

    /// Lowercased keyword, or `None` when blank — a blank keyword applies no
    /// text filter.
    pub fn normalized_keyword(&self) -> Option<String> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("page_size must be greater than zero")]
    InvalidPageSize,
    #[error("page is 1-based and must be greater than zero")]
    InvalidPage,
}

/// One page of results plus the totals the pager needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page: u32,
    pub page_size: u32,
}

pub fn total_pages(total_elements: u64, page_size: u32) -> u32 {
    let pages = total_elements.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Case-insensitive substring match against the store's normalized name and
/// email projection. `needle` must already be lowercased.
pub fn keyword_matches(summary: &ContributorSummary, needle: &str) -> bool {
    summary.display_name.to_lowercase().contains(needle)
        || summary.email.to_lowercase().contains(needle)
}

/// Total order for the requested sort, with the id-ascending tiebreak.
pub fn compare_summaries(
    sort: SortOrder,
    a: &ContributorSummary,
    b: &ContributorSummary,
) -> Ordering {
    let primary = match sort {
        SortOrder::NameAsc => a
            .display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase()),
        SortOrder::NameDesc => b
            .display_name
            .to_lowercase()
            .cmp(&a.display_name.to_lowercase()),
        SortOrder::DateAsc => a.created_at.cmp(&b.created_at),
        SortOrder::DateDesc => b.created_at.cmp(&a.created_at),
        SortOrder::IdAsc => a.id.cmp(&b.id),
        SortOrder::IdDesc => b.id.cmp(&a.id),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Shared scan path for store adapters: filter, order, slice.
///
/// A `page` beyond the last one yields an empty `items` slice with the totals
/// still populated; it is never an error. The query must already be
/// validated.
pub fn filter_sort_paginate(
    all: Vec<ContributorSummary>,
    query: &SearchQuery,
) -> Page<ContributorSummary> {
    let needle = query.normalized_keyword();
    let mut matched: Vec<ContributorSummary> = all
        .into_iter()
        .filter(|summary| query.status.map_or(true, |status| summary.status == status))
        .filter(|summary| {
            needle
                .as_deref()
                .map_or(true, |needle| keyword_matches(summary, needle))
        })
        .collect();

    matched.sort_by(|a, b| compare_summaries(query.sort, a, b));

    let total_elements = matched.len() as u64;
    let total_pages = total_pages(total_elements, query.page_size);
    let offset = (query.page as usize - 1).saturating_mul(query.page_size as usize);
    let items = if offset >= matched.len() {
        Vec::new()
    } else {
        matched
            .into_iter()
            .skip(offset)
            .take(query.page_size as usize)
            .collect()
    };

    Page {
        items,
        total_elements,
        total_pages,
        page: query.page,
        page_size: query.page_size,
    }
}

/// Listing facade over a store. Validates the request, then lets the store
/// run the scan with the shared helpers above.
pub struct ContributorSearch<S> {
    store: Arc<S>,
}

impl<S: ContributorStore> ContributorSearch<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Page<ContributorSummary>, SearchError> {
        query.validate()?;
        Ok(self.store.search(query)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
