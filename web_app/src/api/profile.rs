use crate::{models, repo};

/// Profile of `username` with its past orders, newest first
pub async fn get_profile_with_orders(
    repo: &repo::ImplAppRepo,
    username: &str,
) -> anyhow::Result<Option<(models::profile::UserProfile, Vec<models::order::Order>)>> {
    let Some(profile) = repo.get_profile_by_username(username).await? else {
        return Ok(None);
    };

    let orders = repo.get_profile_orders(profile.id).await?;

    Ok(Some((profile, orders)))
}

pub async fn update_delivery_defaults(
    repo: &repo::ImplAppRepo,
    profile_id: i64,
    defaults: &models::profile::ProfileDefaults,
) -> anyhow::Result<()> {
    repo.update_profile_defaults(profile_id, defaults).await
}

/// A past order of `username` with its line items. Orders of other users
/// are reported as missing.
pub async fn get_order_history(
    repo: &repo::ImplAppRepo,
    username: &str,
    order_number: &str,
) -> anyhow::Result<Option<(models::order::Order, Vec<models::order::OrderLineDetails>)>> {
    let Some(profile) = repo.get_profile_by_username(username).await? else {
        return Ok(None);
    };

    let order = match repo.get_order_by_number(order_number).await? {
        Some(order) if order.user_profile_id == Some(profile.id) => order,
        _ => return Ok(None),
    };

    let line_items = repo.get_order_line_details(order.id).await?;

    Ok(Some((order, line_items)))
}
