pub mod order;
pub mod preference;
pub mod product;
pub mod review;
