/// Case-insensitive substring match; an empty term matches everything.
pub fn matches(label: &str, term: &str) -> bool {
    term.is_empty() || label.to_lowercase().contains(&term.to_lowercase())
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// One-based page slice. Pages past the end are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + size).min(items.len());
    &items[start..end]
}
