//! Page windowing.
//!
//! The slicer does no bounds correction; keeping the page in range is the
//! grid's job (see [`clamp_page`]).

/// Items `[(page - 1) * page_size, page * page_size)`, clipped to the slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let end = page.saturating_mul(page_size).min(items.len());
    if start >= end {
        return &[];
    }
    &items[start..end]
}

/// `max(1, ceil(total_items / page_size))`.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}
