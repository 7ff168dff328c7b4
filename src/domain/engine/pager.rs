pub const PAGE_SIZE: usize = 50;

pub const PREVIEW_ROWS: usize = 5;

/// 1-based page slice. Page 0, pages past the end and a zero page size all
/// yield an empty slice.
pub fn paginate<T>(rows: &[T], page_size: usize, page: usize) -> &[T] {
    if page_size == 0 || page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    row_count.div_ceil(page_size)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

pub fn preview<T>(rows: &[T], limit: usize) -> &[T] {
    &rows[..rows.len().min(limit)]
}
