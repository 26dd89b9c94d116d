pub mod model;
pub mod score;
pub mod store;
pub mod logo;
pub mod seed;
