pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Returns the 1-based `page` of `records`. Pages past the end are empty.
pub fn paginate<T>(records: &[T], page_size: usize, page: usize) -> &[T] {
    if page_size == 0 || page == 0 {
        return &[];
    }

    let start = (page - 1).saturating_mul(page_size);
    if start >= records.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(records.len());
    &records[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Current page of a paged table, clamped to the pages that exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn previous(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn next(&mut self, len: usize) {
        let last = total_pages(len, self.page_size).max(1);
        self.page = (self.page + 1).min(last);
    }

    /// Jumps to `page`, clamped to `1..=total_pages`.
    pub fn go_to(&mut self, page: usize, len: usize) {
        let last = total_pages(len, self.page_size).max(1);
        self.page = page.clamp(1, last);
    }

    pub fn slice<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        paginate(records, self.page_size, self.page)
    }

    /// 1-based inclusive bounds of the rows shown, `None` for an empty page.
    pub fn showing(&self, len: usize) -> Option<(usize, usize)> {
        let first = (self.page - 1) * self.page_size + 1;
        if first > len {
            return None;
        }
        Some((first, (self.page * self.page_size).min(len)))
    }
}
