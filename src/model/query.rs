//! Pagination and sorting parameters shared by every listing.
//!
//! Raw query values are accepted as-is and normalized here: unset or
//! non-positive page values fall back to defaults, page size is clamped, unknown
//! sort fields fall back to `created_at`, and any direction other than `asc`
//! means descending.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl PaginationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn page(&self) -> u64 {
        match self.page {
            Some(page) if page > 0 => page as u64,
            _ => DEFAULT_PAGE,
        }
    }

    pub fn page_size(&self) -> u64 {
        match self.page_size {
            Some(size) if size > 0 => (size as u64).min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn offset(&self) -> usize {
        let offset = (self.page() - 1).saturating_mul(self.page_size());
        usize::try_from(offset).unwrap_or(usize::MAX)
    }

    pub fn limit(&self) -> usize {
        self.page_size() as usize
    }

    pub fn direction(&self) -> SortDirection {
        match self.order.as_deref() {
            Some(order) if order.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    pub fn sort_field<F: SortField>(&self) -> F {
        self.sort_by
            .as_deref()
            .and_then(|raw| F::parse(raw.trim()))
            .unwrap_or_default()
    }

    pub fn metadata(&self, total: u64) -> PaginationMetadata {
        PaginationMetadata::new(self.page(), self.page_size(), total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sortable column of some listing. The default is the fallback column.
pub trait SortField: Copy + Default {
    fn parse(raw: &str) -> Option<Self>;
    fn column(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderSortField {
    Id,
    UserId,
    /// Lowest product id in the order.
    ProductId,
    /// Total quantity over all lines.
    Quantity,
    TotalPrice,
    Status,
    #[default]
    CreatedAt,
}

impl SortField for OrderSortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Self::Id),
            "user_id" => Some(Self::UserId),
            "product_id" | "items" => Some(Self::ProductId),
            "quantity" => Some(Self::Quantity),
            "total_price" => Some(Self::TotalPrice),
            "status" => Some(Self::Status),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::UserId => "user_id",
            Self::ProductId => "product_id",
            Self::Quantity => "quantity",
            Self::TotalPrice => "total_price",
            Self::Status => "status",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSortField {
    Id,
    Name,
    Price,
    Stock,
    #[default]
    CreatedAt,
}

impl SortField for ProductSortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "price" => Some(Self::Price),
            "stock" => Some(Self::Stock),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price",
            Self::Stock => "stock",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMetadata {
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        Self {
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size.max(1)),
        }
    }
}
