pub mod meals;
pub mod vehicle;
