use serde::Serialize;
use utoipa::ToSchema;

/// Normalized 1-indexed pagination input. Listings default to 20 per page
/// and are clamped to 100.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

impl PageParams {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        PageParams {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        let total = total.max(0) as u64;
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
            total_pages: total.div_ceil(self.limit),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 20)]
    pub limit: u64,
    #[schema(example = 57)]
    pub total: u64,
    #[schema(example = 3)]
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let p = PageParams::new(None, None);
        assert_eq!((p.page, p.limit, p.offset()), (1, 20, 0));

        let p = PageParams::new(Some(0), Some(500));
        assert_eq!((p.page, p.limit), (1, 100));

        let p = PageParams::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let p = PageParams::new(Some(1), Some(20));
        assert_eq!(p.meta(57).total_pages, 3);
        assert_eq!(p.meta(60).total_pages, 3);
        assert_eq!(p.meta(0).total_pages, 0);
    }
}
