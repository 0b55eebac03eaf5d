// Catalog is the core: category forest, scoped product queries, items
pub mod catalog;

pub mod features;
pub mod health;
pub mod media;
