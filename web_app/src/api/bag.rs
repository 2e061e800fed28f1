use derive_more::{Display, Error};
use log::warn;
use rust_decimal::Decimal;

use crate::{
    consts,
    models::{
        self,
        bag::{Bag, BagLine, BagSummary, DeliveryPolicy},
    },
    repo,
};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum BagError {
    #[display("product {_0} does not exist")]
    ProductNotFound(#[error(not(source))] i64),
    #[display("quantity must be between 1 and {}", consts::MAX_BAG_ITEM_QUANTITY)]
    InvalidQuantity,
    #[display("a valid size is required for {_0}")]
    InvalidSize(#[error(not(source))] String),
}

/// Resolves every bag entry against the catalogue and prices the bag.
/// Entries pointing at unknown products are skipped.
pub async fn bag_contents(
    bag: &Bag,
    repo: &repo::ImplAppRepo,
    policy: &DeliveryPolicy,
) -> anyhow::Result<BagSummary> {
    let mut bag_items = Vec::new();
    let mut total = Decimal::ZERO;
    let mut product_count = 0;

    for (item_id, size, quantity) in bag.entries() {
        let Some(product) = repo.get_product(item_id).await? else {
            warn!("bag references unknown product {item_id}, skipping it");
            continue;
        };

        let subtotal = product.price * Decimal::from(quantity);
        total += subtotal;
        product_count += quantity;

        bag_items.push(BagLine {
            item_id,
            quantity,
            product,
            size,
            subtotal,
        });
    }

    let (delivery, free_delivery_delta) = policy.delivery_for(total);

    Ok(BagSummary {
        bag_items,
        total,
        product_count,
        delivery,
        free_delivery_delta,
        free_delivery_threshold: policy.free_delivery_threshold,
        grand_total: total + delivery,
    })
}

/// Adds a product to the bag after checking it can be bought as requested.
pub async fn add_to_bag(
    bag: &mut Bag,
    repo: &repo::ImplAppRepo,
    item_id: i64,
    quantity: u32,
    size: Option<&str>,
) -> anyhow::Result<models::product::Product> {
    let product = repo
        .get_product(item_id)
        .await?
        .ok_or(BagError::ProductNotFound(item_id))?;

    if quantity == 0 || quantity > consts::MAX_BAG_ITEM_QUANTITY {
        return Err(BagError::InvalidQuantity.into());
    }

    let size = size.map(str::trim).filter(|s| !s.is_empty());
    match size {
        Some(size) if product.has_sizes && models::product::is_valid_size(size) => {
            bag.add(item_id, quantity, Some(size))
        }
        None if !product.has_sizes => bag.add(item_id, quantity, None),
        _ => return Err(BagError::InvalidSize(product.name).into()),
    }

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MockAppRepo;
    use mockall::predicate::*;
    use rust_decimal_macros::dec;

    fn product(id: i64, price: Decimal, has_sizes: bool) -> models::product::Product {
        models::product::Product {
            id,
            sku: Some(format!("sku-{id}")),
            name: format!("Product {id}"),
            description: String::new(),
            has_sizes,
            price,
            rating: None,
            image_url: None,
            image: None,
        }
    }

    fn catalogue_repo() -> repo::ImplAppRepo {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_product().returning(|id| match id {
            1 => Ok(Some(product(1, dec!(10.00), false))),
            2 => Ok(Some(product(2, dec!(7.50), true))),
            _ => Ok(None),
        });
        Box::new(mock_repo)
    }

    #[ntex::test]
    async fn test_bag_contents_prices_lines_and_delivery() {
        let bag = Bag::from_json_lossy(r#"{"1": 2, "2": {"items_by_size": {"m": 1, "l": 1}}}"#);

        let summary = bag_contents(&bag, &catalogue_repo(), &DeliveryPolicy::default())
            .await
            .unwrap();

        assert_eq!(summary.bag_items.len(), 3);
        assert_eq!(summary.total, dec!(35.00));
        assert_eq!(summary.product_count, 4);
        assert_eq!(summary.delivery, dec!(3.50));
        assert_eq!(summary.free_delivery_delta, dec!(15.00));
        assert_eq!(summary.free_delivery_threshold, dec!(50));
        assert_eq!(summary.grand_total, dec!(38.50));
    }

    #[ntex::test]
    async fn test_bag_contents_skips_unknown_products() {
        let bag = Bag::from_json_lossy(r#"{"1": 5, "99": 1, "oops": 3}"#);

        let summary = bag_contents(&bag, &catalogue_repo(), &DeliveryPolicy::default())
            .await
            .unwrap();

        assert_eq!(summary.bag_items.len(), 1);
        assert_eq!(summary.total, dec!(50.00));
        assert_eq!(summary.delivery, Decimal::ZERO);
        assert_eq!(summary.grand_total, dec!(50.00));
    }

    #[ntex::test]
    async fn test_add_to_bag_checks_sizes() {
        let repo = catalogue_repo();
        let mut bag = Bag::default();

        assert!(add_to_bag(&mut bag, &repo, 2, 1, Some("m")).await.is_ok());
        assert!(add_to_bag(&mut bag, &repo, 1, 3, None).await.is_ok());

        let err = add_to_bag(&mut bag, &repo, 2, 1, None).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<BagError>(),
            Some(&BagError::InvalidSize("Product 2".into()))
        );

        let err = add_to_bag(&mut bag, &repo, 1, 1, Some("xxl"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BagError>(),
            Some(BagError::InvalidSize(_))
        ));

        assert_eq!(bag.entries().len(), 2);
    }

    #[ntex::test]
    async fn test_add_to_bag_rejects_unknown_product_and_quantity() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_product()
            .with(eq(42))
            .times(2)
            .returning(|_| Ok(None));
        mock_repo
            .expect_get_product()
            .with(eq(1))
            .returning(|_| Ok(Some(product(1, dec!(1), false))));
        let repo: repo::ImplAppRepo = Box::new(mock_repo);
        let mut bag = Bag::default();

        let err = add_to_bag(&mut bag, &repo, 42, 1, None).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<BagError>(),
            Some(&BagError::ProductNotFound(42))
        );
        assert!(add_to_bag(&mut bag, &repo, 42, 1, None).await.is_err());

        let err = add_to_bag(&mut bag, &repo, 1, 0, None).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<BagError>(),
            Some(&BagError::InvalidQuantity)
        );
        assert!(bag.is_empty());
    }
}
