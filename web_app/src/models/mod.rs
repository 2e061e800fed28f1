pub mod bag;
pub mod order;
pub mod product;
pub mod profile;
pub mod stripe;
pub mod user;
