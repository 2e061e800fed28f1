pub mod sqlite;
pub mod sqlite_queries;

use crate::models;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepo {
    async fn get_product(&self, product_id: i64) -> anyhow::Result<Option<models::product::Product>>;

    async fn get_all_products(&self) -> anyhow::Result<Vec<models::product::Product>>;

    /// Inserts the order and returns its id
    async fn insert_order(&self, order: &models::order::Order) -> anyhow::Result<i64>;

    async fn insert_order_line_item(
        &self,
        line_item: &models::order::OrderLineItem,
    ) -> anyhow::Result<i64>;

    async fn update_order_totals(&self, order: &models::order::Order) -> anyhow::Result<()>;

    /// Deletes the order along with its line items
    async fn delete_order(&self, order_id: i64) -> anyhow::Result<()>;

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> anyhow::Result<Option<models::order::Order>>;

    async fn find_matching_order(
        &self,
        order_match: &models::order::OrderMatch,
    ) -> anyhow::Result<Option<models::order::Order>>;

    async fn get_order_line_details(
        &self,
        order_id: i64,
    ) -> anyhow::Result<Vec<models::order::OrderLineDetails>>;

    async fn attach_order_to_profile(&self, order_id: i64, profile_id: i64)
    -> anyhow::Result<()>;

    async fn get_profile_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<models::profile::UserProfile>>;

    async fn update_profile_defaults(
        &self,
        profile_id: i64,
        defaults: &models::profile::ProfileDefaults,
    ) -> anyhow::Result<()>;

    /// Orders of a profile, newest first
    async fn get_profile_orders(&self, profile_id: i64)
    -> anyhow::Result<Vec<models::order::Order>>;
}

pub type ImplAppRepo = Box<dyn AppRepo>;
