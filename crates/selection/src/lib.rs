//! Advertisement selection — walks a marketplace's content, evaluates each
//! item's targeting groups, and returns the eligible content with the highest
//! click-through rate.

pub mod catalog;
pub mod dao;
pub mod engine;

pub use catalog::Catalog;
pub use dao::{ContentStore, ReadableDao, TargetingGroupStore};
pub use engine::AdvertisementSelectionEngine;
