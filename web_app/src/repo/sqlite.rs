use crate::models;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, SqlitePool, sqlite::SqliteRow};
use std::str::FromStr;

use super::{AppRepo, sqlite_queries};

#[derive(Clone)]
pub struct SqlxSqliteRepo {
    pub db_pool: SqlitePool,
}

/// Money is kept as TEXT with two decimals so equality checks stay exact.
fn money_text(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

fn try_get_decimal(row: &SqliteRow, column: &str) -> sqlx::Result<Decimal> {
    let value: String = row.try_get(column)?;
    Decimal::from_str(&value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn try_get_opt_decimal(row: &SqliteRow, column: &str) -> sqlx::Result<Option<Decimal>> {
    let value: Option<String> = row.try_get(column)?;
    value
        .filter(|v| !v.is_empty())
        .map(|v| Decimal::from_str(&v))
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

impl FromRow<'_, SqliteRow> for models::product::Product {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            has_sizes: row.try_get("has_sizes")?,
            price: try_get_decimal(row, "price")?,
            rating: try_get_opt_decimal(row, "rating")?,
            image_url: row.try_get("image_url")?,
            image: row.try_get("image")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::order::Order {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            user_profile_id: row.try_get("user_profile_id")?,
            details: models::order::DeliveryDetails {
                full_name: row.try_get("full_name")?,
                email: row.try_get("email")?,
                phone_number: row.try_get("phone_number")?,
                country: row.try_get("country")?,
                postcode: row.try_get("postcode")?,
                town_or_city: row.try_get("town_or_city")?,
                street_address1: row.try_get("street_address1")?,
                street_address2: row.try_get("street_address2")?,
                county: row.try_get("county")?,
            },
            date: row.try_get("date")?,
            delivery_cost: try_get_decimal(row, "delivery_cost")?,
            order_total: try_get_decimal(row, "order_total")?,
            grand_total: try_get_decimal(row, "grand_total")?,
            original_bag: row.try_get("original_bag")?,
            stripe_pid: row.try_get("stripe_pid")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::order::OrderLineDetails {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_name: row.try_get("product_name")?,
            product_sku: row.try_get("product_sku")?,
            product_size: row.try_get("product_size")?,
            quantity: row.try_get("quantity")?,
            lineitem_total: try_get_decimal(row, "lineitem_total")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::profile::UserProfile {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            defaults: models::profile::ProfileDefaults {
                default_phone_number: row.try_get("default_phone_number")?,
                default_country: row.try_get("default_country")?,
                default_postcode: row.try_get("default_postcode")?,
                default_town_or_city: row.try_get("default_town_or_city")?,
                default_street_address1: row.try_get("default_street_address1")?,
                default_street_address2: row.try_get("default_street_address2")?,
                default_county: row.try_get("default_county")?,
            },
        })
    }
}

#[async_trait]
impl AppRepo for SqlxSqliteRepo {
    async fn get_product(
        &self,
        product_id: i64,
    ) -> anyhow::Result<Option<models::product::Product>> {
        Ok(
            sqlx::query_as::<_, models::product::Product>(sqlite_queries::QUERY_GET_PRODUCT)
                .bind(product_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_all_products(&self) -> anyhow::Result<Vec<models::product::Product>> {
        Ok(
            sqlx::query_as::<_, models::product::Product>(sqlite_queries::QUERY_GET_ALL_PRODUCTS)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_order(&self, order: &models::order::Order) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_ORDER)
            .bind(&order.order_number)
            .bind(order.user_profile_id)
            .bind(&order.details.full_name)
            .bind(&order.details.email)
            .bind(&order.details.phone_number)
            .bind(&order.details.country)
            .bind(&order.details.postcode)
            .bind(&order.details.town_or_city)
            .bind(&order.details.street_address1)
            .bind(&order.details.street_address2)
            .bind(&order.details.county)
            .bind(order.date)
            .bind(money_text(order.delivery_cost))
            .bind(money_text(order.order_total))
            .bind(money_text(order.grand_total))
            .bind(&order.original_bag)
            .bind(&order.stripe_pid)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn insert_order_line_item(
        &self,
        line_item: &models::order::OrderLineItem,
    ) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_ORDER_LINE_ITEM)
            .bind(line_item.order_id)
            .bind(line_item.product_id)
            .bind(&line_item.product_size)
            .bind(line_item.quantity)
            .bind(money_text(line_item.lineitem_total))
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn update_order_totals(&self, order: &models::order::Order) -> anyhow::Result<()> {
        Ok(sqlx::query(sqlite_queries::QUERY_UPDATE_ORDER_TOTALS)
            .bind(order.id)
            .bind(money_text(order.delivery_cost))
            .bind(money_text(order.order_total))
            .bind(money_text(order.grand_total))
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn delete_order(&self, order_id: i64) -> anyhow::Result<()> {
        let mut transaction = self.db_pool.begin().await?;

        sqlx::query("DELETE FROM order_line_item WHERE order_id=$1;")
            .bind(order_id)
            .execute(&mut *transaction)
            .await?;

        sqlx::query("DELETE FROM order_checkout WHERE id=$1;")
            .bind(order_id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(())
    }

    async fn get_order_by_number(
        &self,
        order_number: &str,
    ) -> anyhow::Result<Option<models::order::Order>> {
        Ok(
            sqlx::query_as::<_, models::order::Order>(sqlite_queries::QUERY_GET_ORDER_BY_NUMBER)
                .bind(order_number)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn find_matching_order(
        &self,
        order_match: &models::order::OrderMatch,
    ) -> anyhow::Result<Option<models::order::Order>> {
        let details = &order_match.details;

        Ok(
            sqlx::query_as::<_, models::order::Order>(sqlite_queries::QUERY_FIND_MATCHING_ORDER)
                .bind(&details.full_name)
                .bind(&details.email)
                .bind(&details.phone_number)
                .bind(&details.country)
                .bind(&details.postcode)
                .bind(&details.town_or_city)
                .bind(&details.street_address1)
                .bind(&details.street_address2)
                .bind(&details.county)
                .bind(money_text(order_match.grand_total))
                .bind(&order_match.original_bag)
                .bind(&order_match.stripe_pid)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_order_line_details(
        &self,
        order_id: i64,
    ) -> anyhow::Result<Vec<models::order::OrderLineDetails>> {
        Ok(sqlx::query_as::<_, models::order::OrderLineDetails>(
            sqlite_queries::QUERY_GET_ORDER_LINE_DETAILS,
        )
        .bind(order_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn attach_order_to_profile(
        &self,
        order_id: i64,
        profile_id: i64,
    ) -> anyhow::Result<()> {
        Ok(
            sqlx::query("UPDATE order_checkout SET user_profile_id=$1 WHERE id=$2;")
                .bind(profile_id)
                .bind(order_id)
                .execute(&self.db_pool)
                .await
                .map(|_| ())?,
        )
    }

    async fn get_profile_by_username(
        &self,
        username: &str,
    ) -> anyhow::Result<Option<models::profile::UserProfile>> {
        Ok(sqlx::query_as::<_, models::profile::UserProfile>(
            sqlite_queries::QUERY_GET_PROFILE_BY_USERNAME,
        )
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn update_profile_defaults(
        &self,
        profile_id: i64,
        defaults: &models::profile::ProfileDefaults,
    ) -> anyhow::Result<()> {
        Ok(sqlx::query(sqlite_queries::QUERY_UPDATE_PROFILE_DEFAULTS)
            .bind(profile_id)
            .bind(&defaults.default_phone_number)
            .bind(&defaults.default_country)
            .bind(&defaults.default_postcode)
            .bind(&defaults.default_town_or_city)
            .bind(&defaults.default_street_address1)
            .bind(&defaults.default_street_address2)
            .bind(&defaults.default_county)
            .bind(Utc::now())
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn get_profile_orders(
        &self,
        profile_id: i64,
    ) -> anyhow::Result<Vec<models::order::Order>> {
        Ok(
            sqlx::query_as::<_, models::order::Order>(sqlite_queries::QUERY_GET_PROFILE_ORDERS)
                .bind(profile_id)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }
}
