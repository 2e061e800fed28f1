pub const QUERY_GET_PRODUCT: &str = r#"
SELECT
    id,sku,name,description,has_sizes,price,rating,image_url,image
FROM product
WHERE id=$1;
"#;

pub const QUERY_GET_ALL_PRODUCTS: &str = r#"
SELECT
    id,sku,name,description,has_sizes,price,rating,image_url,image
FROM product
ORDER BY name;
"#;

pub const QUERY_INSERT_ORDER: &str = r#"
INSERT INTO order_checkout (
    order_number,user_profile_id,full_name,email,phone_number,
    country,postcode,town_or_city,street_address1,street_address2,county,
    date,delivery_cost,order_total,grand_total,original_bag,stripe_pid
) VALUES(
    $1,$2,$3,$4,$5,
    $6,$7,$8,$9,$10,$11,
    $12,$13,$14,$15,$16,$17
);
"#;

pub const QUERY_INSERT_ORDER_LINE_ITEM: &str = r#"
INSERT INTO order_line_item (
    order_id,product_id,product_size,quantity,lineitem_total
) VALUES($1,$2,$3,$4,$5);
"#;

pub const QUERY_UPDATE_ORDER_TOTALS: &str = r#"
UPDATE order_checkout
SET delivery_cost=$2, order_total=$3, grand_total=$4
WHERE id=$1;
"#;

pub const QUERY_GET_ORDER_BY_NUMBER: &str = r#"
SELECT
    id,order_number,user_profile_id,full_name,email,phone_number,
    country,postcode,town_or_city,street_address1,street_address2,county,
    date,delivery_cost,order_total,grand_total,original_bag,stripe_pid
FROM order_checkout
WHERE order_number=$1;
"#;

/// Optional text fields match when both sides are empty or NULL.
pub const QUERY_FIND_MATCHING_ORDER: &str = r#"
SELECT
    id,order_number,user_profile_id,full_name,email,phone_number,
    country,postcode,town_or_city,street_address1,street_address2,county,
    date,delivery_cost,order_total,grand_total,original_bag,stripe_pid
FROM order_checkout
WHERE
    LOWER(full_name)=LOWER($1) AND
    LOWER(email)=LOWER($2) AND
    LOWER(phone_number)=LOWER($3) AND
    LOWER(country)=LOWER($4) AND
    LOWER(COALESCE(postcode,''))=LOWER(COALESCE($5,'')) AND
    LOWER(town_or_city)=LOWER($6) AND
    LOWER(street_address1)=LOWER($7) AND
    LOWER(COALESCE(street_address2,''))=LOWER(COALESCE($8,'')) AND
    LOWER(COALESCE(county,''))=LOWER(COALESCE($9,'')) AND
    grand_total=$10 AND
    original_bag=$11 AND
    stripe_pid=$12
LIMIT 1;
"#;

pub const QUERY_GET_ORDER_LINE_DETAILS: &str = r#"
SELECT
    p.name AS product_name,
    p.sku AS product_sku,
    oli.product_size,
    oli.quantity,
    oli.lineitem_total
FROM order_line_item AS oli
INNER JOIN product AS p ON (p.id=oli.product_id)
WHERE oli.order_id=$1
ORDER BY oli.id;
"#;

pub const QUERY_GET_PROFILE_BY_USERNAME: &str = r#"
SELECT
    id,username,email,first_name,last_name,
    default_phone_number,default_country,default_postcode,default_town_or_city,
    default_street_address1,default_street_address2,default_county
FROM user_profile
WHERE username=$1;
"#;

pub const QUERY_UPDATE_PROFILE_DEFAULTS: &str = r#"
UPDATE user_profile
SET
    default_phone_number=$2,
    default_country=$3,
    default_postcode=$4,
    default_town_or_city=$5,
    default_street_address1=$6,
    default_street_address2=$7,
    default_county=$8,
    updated_at=$9
WHERE id=$1;
"#;

pub const QUERY_GET_PROFILE_ORDERS: &str = r#"
SELECT
    id,order_number,user_profile_id,full_name,email,phone_number,
    country,postcode,town_or_city,street_address1,street_address2,county,
    date,delivery_cost,order_total,grand_total,original_bag,stripe_pid
FROM order_checkout
WHERE user_profile_id=$1
ORDER BY date DESC;
"#;
