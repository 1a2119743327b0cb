use crate::AggregateId;

/// Filter for the administrative event listing.
///
/// Lists stored events joined to their outbox entry, filterable by aggregate
/// id, aggregate type and delivery status.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    /// Filter by aggregate ID.
    pub aggregate_id: Option<AggregateId>,

    /// Filter by aggregate type.
    pub aggregate_type: Option<String>,

    /// Filter by outbox delivery status.
    pub published: Option<bool>,

    /// Maximum number of events to return.
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Creates an empty query matching all events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by aggregate ID.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Filters by aggregate type.
    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Filters by outbox delivery status.
    pub fn published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    /// Limits the number of events returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_chain() {
        let id = AggregateId::new();
        let query = EventQuery::new()
            .aggregate_id(id)
            .aggregate_type("contact")
            .published(false)
            .limit(50);

        assert_eq!(query.aggregate_id, Some(id));
        assert_eq!(query.aggregate_type.as_deref(), Some("contact"));
        assert_eq!(query.published, Some(false));
        assert_eq!(query.limit, Some(50));
    }

    #[test]
    fn empty_query_has_no_filters() {
        let query = EventQuery::new();
        assert!(query.aggregate_id.is_none());
        assert!(query.aggregate_type.is_none());
        assert!(query.published.is_none());
        assert!(query.limit.is_none());
    }
}
