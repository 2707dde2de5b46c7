//! This modules defines the common functionality for paging data.

use maud::{Markup, html};
use serde::Serialize;

use crate::{Error, html::LINK_STYLE};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

/// One page of a larger, ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// The items on this page, at most `page_size` of them.
    pub items: Vec<T>,
    /// The one-based page number.
    pub page: u64,
    /// The maximum number of items per page.
    pub page_size: u64,
    /// The number of items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// The number of pages needed to show `total` items, at least one.
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.page_size).max(1)
    }
}

/// Check `page` and `page_size` and return the SQL `(LIMIT, OFFSET)` pair.
///
/// # Errors
///
/// Returns [Error::Validation] if either value is zero.
pub fn limit_offset(page: u64, page_size: u64) -> Result<(i64, i64), Error> {
    if page == 0 {
        return Err(Error::Validation("page must be at least 1".to_owned()));
    }

    if page_size == 0 {
        return Err(Error::Validation("page size must be at least 1".to_owned()));
    }

    let limit = i64::try_from(page_size)
        .map_err(|_| Error::Validation("page size is too large".to_owned()))?;
    let offset = (page - 1)
        .checked_mul(page_size)
        .and_then(|offset| i64::try_from(offset).ok())
        .ok_or_else(|| Error::Validation("page is too large".to_owned()))?;

    Ok((limit, offset))
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render pagination links, using `page_url` to build the link for a page number.
pub fn pagination_nav(
    indicators: &[PaginationIndicator],
    page_url: impl Fn(u64) -> String,
) -> Markup {
    html! {
        nav class="flex justify-center mt-4" aria-label="Pagination"
        {
            ul class="inline-flex gap-2 text-sm"
            {
                @for indicator in indicators
                {
                    li
                    {
                        @match indicator
                        {
                            PaginationIndicator::BackButton(page) => a href=(page_url(*page)) class=(LINK_STYLE) { "Back" }
                            PaginationIndicator::Page(page) => a href=(page_url(*page)) class=(LINK_STYLE) { (page) }
                            PaginationIndicator::CurrPage(page) => span aria-current="page" class="font-bold" { (page) }
                            PaginationIndicator::Ellipsis => span { "..." }
                            PaginationIndicator::NextButton(page) => a href=(page_url(*page)) class=(LINK_STYLE) { "Next" }
                        }
                    }
                }
            }
        }
    }
}
