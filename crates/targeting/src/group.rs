use crate::predicate::SharedPredicate;

/// A set of predicates attached to one piece of content, scored by its
/// click-through rate. A group with no predicates matches every request.
#[derive(Debug, Clone)]
pub struct TargetingGroup {
    pub targeting_group_id: String,
    pub content_id: String,
    pub click_through_rate: f64,
    pub predicates: Vec<SharedPredicate>,
}

impl TargetingGroup {
    pub fn new(
        targeting_group_id: impl Into<String>,
        content_id: impl Into<String>,
        click_through_rate: f64,
        predicates: Vec<SharedPredicate>,
    ) -> Self {
        Self {
            targeting_group_id: targeting_group_id.into(),
            content_id: content_id.into(),
            click_through_rate,
            predicates,
        }
    }
}
