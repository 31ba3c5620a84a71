//! Pagination controls.
//!
//! Renders page links the way GitHub does on its issue lists:
//!
//! ```text
//! Previous [1] 2 3 4 5 … 14 15 Next
//! Previous 1 2 … 5 6 [7] 8 9 … 14 15 Next
//! ```
//!
//! Five contextual pages surround the current one, the first two and last
//! two pages are always visible, and a gap of exactly one page is filled
//! with that page instead of an ellipsis.

use crate::error::{Error, Result};
use crate::url::RequestUrl;
use serde::Serialize;

/// Query parameter carrying the page number.
pub const PAGE_PARAM: &str = "page";

/// Text of the gap marker.
pub const ELLIPSIS: &str = "…";

/// One entry of the pager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControl {
    pub text: String,
    /// `None` for controls that can't be followed.
    pub url: Option<String>,
    pub is_active: bool,
    pub is_disabled: bool,
}

impl PageControl {
    fn link(text: impl Into<String>, url: String) -> Self {
        Self {
            text: text.into(),
            url: Some(url),
            is_active: false,
            is_disabled: false,
        }
    }

    fn disabled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            is_active: false,
            is_disabled: true,
        }
    }
}

/// Inclusive range `start..=end`, clipped to `1..=cutoff`.
pub fn inclusive_range(start: i64, end: i64, cutoff: i64) -> Vec<i64> {
    let start = start.max(1);
    let end = end.min(cutoff);
    (start..=end).collect()
}

/// Page number from the query string. Missing or non-numeric means 1.
pub fn get_page_number(url: &RequestUrl) -> i64 {
    url.get(PAGE_PARAM)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

/// Number of pages needed for `count` rows; never less than one.
pub fn total_pages(count: usize, page_size: usize) -> i64 {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1) as i64
}

/// Clamp a requested page into `1..=total_pages`.
pub fn clamp_page(requested: i64, total_pages: i64) -> i64 {
    requested.min(total_pages).max(1)
}

/// Row offset of the first row on `page` (1-based).
pub fn page_offset(page: i64, page_size: usize) -> usize {
    (page.max(1) as usize - 1) * page_size
}

/// Build pagination controls.
///
/// `link(Some(n))` must produce a URL for page `n`; `link(None)` the URL
/// with the page parameter removed, which is what page 1 links to.
///
/// The caller clamps `current_page` first; out-of-range input is reported as
/// [`Error::PreconditionViolation`].
pub fn page_controls<F>(current_page: i64, total_pages: i64, link: F) -> Result<Vec<PageControl>>
where
    F: Fn(Option<i64>) -> String,
{
    if total_pages < 1 {
        return Err(Error::PreconditionViolation(format!(
            "total_pages must be at least 1, got {total_pages}"
        )));
    }
    if current_page < 1 || current_page > total_pages {
        return Err(Error::PreconditionViolation(format!(
            "current_page {current_page} outside 1..={total_pages}"
        )));
    }

    if total_pages == 1 {
        return Ok(Vec::new());
    }

    let main_block = if current_page <= 2 {
        inclusive_range(1, 5, total_pages)
    } else if current_page >= total_pages - 1 {
        inclusive_range(total_pages - 4, total_pages, total_pages)
    } else {
        inclusive_range(current_page - 2, current_page + 2, total_pages)
    };
    // total_pages >= 2 and the block always contains current_page.
    let main_first = main_block.first().copied().unwrap_or(current_page);
    let main_last = main_block.last().copied().unwrap_or(current_page);

    // `None` marks an ellipsis.
    let mut start_block: Vec<Option<i64>> =
        inclusive_range(1, 2, total_pages).into_iter().map(Some).collect();
    if main_first == 4 {
        start_block.push(Some(3));
    } else if main_first > 4 {
        start_block.push(None);
    }

    let mut end_block: Vec<Option<i64>> = Vec::new();
    if main_last == total_pages - 3 {
        end_block.push(Some(total_pages - 2));
    } else if main_last < total_pages - 3 {
        end_block.push(None);
    }
    end_block.extend(
        inclusive_range(total_pages - 1, total_pages, total_pages)
            .into_iter()
            .map(Some),
    );

    let mut controls = Vec::new();

    controls.push(match current_page {
        1 => PageControl::disabled("Previous"),
        2 => PageControl::link("Previous", link(None)),
        n => PageControl::link("Previous", link(Some(n - 1))),
    });

    let mut seen = Vec::new();
    let entries = start_block
        .into_iter()
        .chain(main_block.into_iter().map(Some))
        .chain(end_block);
    for entry in entries {
        match entry {
            None => controls.push(PageControl::disabled(ELLIPSIS)),
            Some(page) if !seen.contains(&page) => {
                seen.push(page);
                let url = if page == 1 { link(None) } else { link(Some(page)) };
                controls.push(PageControl {
                    text: page.to_string(),
                    url: Some(url),
                    is_active: page == current_page,
                    is_disabled: false,
                });
            }
            Some(_) => {}
        }
    }

    controls.push(if current_page == total_pages {
        PageControl::disabled("Next")
    } else {
        PageControl::link("Next", link(Some(current_page + 1)))
    });

    Ok(controls)
}

/// [`page_controls`] with links derived from the current request URL.
pub fn page_controls_for_url(
    url: &RequestUrl,
    current_page: i64,
    total_pages: i64,
) -> Result<Vec<PageControl>> {
    page_controls(current_page, total_pages, |page| match page {
        Some(n) => url.include_query_param(PAGE_PARAM, n).to_string(),
        None => url.remove_query_param(PAGE_PARAM).to_string(),
    })
}
