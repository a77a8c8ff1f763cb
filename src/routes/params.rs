use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    entity::sea_orm_active_enums::OrderItemStatus,
    error::{AppError, AppResult},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderItemListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

// Query strings are flat: serde_urlencoded cannot parse numbers through `flatten`.
impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

impl OrderItemListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn status_filter(&self) -> AppResult<Option<OrderItemStatus>> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<OrderItemStatus>()
                    .map_err(|e| AppError::InvalidInput(e.to_string()))
            })
            .transpose()
    }
}
