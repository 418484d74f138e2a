/// 1-based page request, already clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(1, 20)
    }
}

#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn clamps_page_and_limit() {
        assert_eq!(Page::new(0, 500), Page { page: 1, limit: 100 });
        assert_eq!(Page::new(-3, 0), Page { page: 1, limit: 1 });
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(Page::new(1, 20).offset(), 0);
        assert_eq!(Page::new(3, 20).offset(), 40);
    }
}
