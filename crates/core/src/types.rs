use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies who the advertisement is for and where it will render.
/// Shared read-only with every predicate evaluated for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub customer_id: String,
    pub marketplace_id: String,
}

impl RequestContext {
    pub fn new(customer_id: impl Into<String>, marketplace_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            marketplace_id: marketplace_id.into(),
        }
    }
}

/// A piece of advertising content as held by the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertisementContent {
    pub content_id: String,
    pub marketplace_id: String,
    #[serde(default)]
    pub renderable_content: String,
}

impl AdvertisementContent {
    pub fn new(
        content_id: impl Into<String>,
        marketplace_id: impl Into<String>,
        renderable_content: impl Into<String>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            marketplace_id: marketplace_id.into(),
            renderable_content: renderable_content.into(),
        }
    }

    /// Blank or whitespace-only content can never be shown.
    pub fn is_renderable(&self) -> bool {
        !self.renderable_content.trim().is_empty()
    }
}

/// A selected advertisement, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: Uuid,
    pub content: AdvertisementContent,
}

impl Advertisement {
    pub fn new(content: AdvertisementContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
        }
    }
}

/// Outcome of a selection request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GeneratedAdvertisement {
    Populated(Advertisement),
    /// Nothing could be produced for the request.
    Empty,
}

impl GeneratedAdvertisement {
    pub fn populated(content: AdvertisementContent) -> Self {
        GeneratedAdvertisement::Populated(Advertisement::new(content))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GeneratedAdvertisement::Empty)
    }

    pub fn content(&self) -> Option<&AdvertisementContent> {
        match self {
            GeneratedAdvertisement::Populated(ad) => Some(&ad.content),
            GeneratedAdvertisement::Empty => None,
        }
    }
}

/// Result of evaluating one targeting predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateResult {
    True,
    False,
    /// The predicate lacked the data to decide.
    Indeterminate,
}

impl PredicateResult {
    pub fn is_true(self) -> bool {
        self == PredicateResult::True
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            PredicateResult::True
        } else {
            PredicateResult::False
        }
    }

    /// Swaps `True` and `False`; `Indeterminate` stays as is.
    pub fn invert(self) -> Self {
        match self {
            PredicateResult::True => PredicateResult::False,
            PredicateResult::False => PredicateResult::True,
            PredicateResult::Indeterminate => PredicateResult::Indeterminate,
        }
    }
}
