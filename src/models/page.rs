use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn first_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: first_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self, AppError> {
        let request = Self { page, limit };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page == 0 {
            return Err(AppError::InvalidArgument("Page must be at least 1".into()));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_SIZE {
            return Err(AppError::InvalidArgument(format!(
                "Limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Cuts one page out of an already ordered result set.
    pub fn paginate<T>(&self, items: Vec<T>) -> Result<Page<T>, AppError> {
        self.validate()?;

        let total = items.len() as u64;
        let limit = self.limit as usize;
        let offset = (self.page as usize - 1).saturating_mul(limit);
        let items = items.into_iter().skip(offset).take(limit).collect();
        let total_pages = total.div_ceil(u64::from(self.limit));
        let current_page = u64::from(self.page);

        Ok(Page {
            items,
            pagination: Pagination {
                current_page,
                total_pages,
                total,
                has_next: current_page < total_pages,
                has_prev: current_page > 1,
            },
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_middle_page() {
        let page = PageRequest::new(2, 3)
            .unwrap()
            .paginate((1..=8).collect::<Vec<_>>())
            .unwrap();

        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.pagination.total, 8);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = PageRequest::new(5, 10)
            .unwrap()
            .paginate(vec![1, 2])
            .unwrap();

        assert!(page.items.is_empty());
        assert!(!page.pagination.has_next);
    }

    #[test]
    fn rejects_out_of_range_requests() {
        assert!(PageRequest::new(0, 10).is_err());
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());
    }
}
