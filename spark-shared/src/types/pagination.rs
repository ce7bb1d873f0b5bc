use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl PaginationParams {
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }

    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, 100)
    }

    /// Offset as a SQL `OFFSET` operand.
    pub fn sql_offset(&self) -> i64 {
        i64::try_from(self.offset()).unwrap_or(i64::MAX)
    }

    /// Limit as a SQL `LIMIT` operand.
    pub fn sql_limit(&self) -> i64 {
        self.limit() as i64
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: 20 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let per_page = params.limit();
        let total_pages = if total == 0 { 0 } else { (total + per_page - 1) / per_page };
        Self {
            items,
            total,
            page: params.page.max(1),
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_uses_clamped_page_size() {
        let params = PaginationParams { page: 3, per_page: 500 };
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 200);

        let zero = PaginationParams { page: 0, per_page: 0 };
        assert_eq!(zero.limit(), 1);
        assert_eq!(zero.offset(), 0);
    }

    #[test]
    fn total_pages_round_up() {
        let params = PaginationParams { page: 1, per_page: 20 };
        let page = Paginated::new(vec![1u8; 20], 41, &params);
        assert_eq!(page.total_pages, 3);

        let empty: Paginated<u8> = Paginated::new(vec![], 0, &params);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn defaults_apply_when_query_is_empty() {
        let params: PaginationParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
    }
}
