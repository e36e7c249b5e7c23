pub mod actor;
pub mod effect;
pub mod order;
pub mod product;
pub mod user;
