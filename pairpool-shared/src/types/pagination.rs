use serde::{Deserialize, Serialize};

const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 { 1 }
fn default_per_page() -> i64 { 20 }

impl PageParams {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, per_page: 20 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: &PageParams) -> Self {
        Self {
            items,
            total,
            page: params.page.max(1),
            per_page: params.limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_starts_at_zero() {
        let params = PageParams { page: 1, per_page: 20 };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn per_page_is_clamped() {
        let params = PageParams { page: 2, per_page: 500 };
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 100);
    }

    #[test]
    fn zero_page_is_treated_as_first() {
        let params = PageParams { page: 0, per_page: 10 };
        assert_eq!(params.offset(), 0);
    }
}
