use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ Event envelope wrapping all domain events.
///
/// Routing key format: `spark.{domain}.{entity}.{action}`
/// Example: `spark.relations.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<i64>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    pub const RELATIONS_LIKE_SENT: &str = "spark.relations.like.sent";
    pub const RELATIONS_MATCH_CREATED: &str = "spark.relations.match.created";
    pub const RELATIONS_USER_BLOCKED: &str = "spark.relations.user.blocked";
    pub const RELATIONS_USER_UNBLOCKED: &str = "spark.relations.user.unblocked";
}

/// Event data payloads
pub mod payloads {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LikeSent {
        pub like_id: i64,
        pub liker_id: i64,
        pub liked_id: i64,
    }

    /// Participants are published in canonical order (`user_a_id < user_b_id`).
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: i64,
        pub user_a_id: i64,
        pub user_b_id: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserBlocked {
        pub blocker_id: i64,
        pub blocked_id: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct UserUnblocked {
        pub blocker_id: i64,
        pub blocked_id: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_user_and_payload() {
        let event = Event::new(
            "spark-relations",
            routing_keys::RELATIONS_MATCH_CREATED,
            payloads::MatchCreated { match_id: 9, user_a_id: 3, user_b_id: 7 },
        )
        .with_user(7);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "spark.relations.match.created");
        assert_eq!(value["user_id"], 7);
        assert_eq!(value["data"]["user_a_id"], 3);
        assert!(value["correlation_id"].is_null());
    }
}
