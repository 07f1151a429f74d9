pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AdResult, AdSelectionError};
pub use types::{
    Advertisement, AdvertisementContent, GeneratedAdvertisement, PredicateResult, RequestContext,
};
