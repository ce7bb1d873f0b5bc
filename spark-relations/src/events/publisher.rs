use spark_shared::clients::rabbitmq::RabbitMQClient;
use spark_shared::types::event::{payloads, routing_keys, Event};

const SOURCE: &str = "spark-relations";

pub async fn publish_like_sent(rabbitmq: &RabbitMQClient, like_id: i64, liker_id: i64, liked_id: i64) {
    let event = Event::new(
        SOURCE,
        routing_keys::RELATIONS_LIKE_SENT,
        payloads::LikeSent {
            like_id,
            liker_id,
            liked_id,
        },
    )
    .with_user(liker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::RELATIONS_LIKE_SENT, &event).await {
        tracing::error!(error = %e, "failed to publish like.sent event");
    }
}

/// `user_a_id` / `user_b_id` must already be in canonical order.
pub async fn publish_match_created(rabbitmq: &RabbitMQClient, match_id: i64, user_a_id: i64, user_b_id: i64) {
    let event = Event::new(
        SOURCE,
        routing_keys::RELATIONS_MATCH_CREATED,
        payloads::MatchCreated {
            match_id,
            user_a_id,
            user_b_id,
        },
    );

    if let Err(e) = rabbitmq.publish(routing_keys::RELATIONS_MATCH_CREATED, &event).await {
        tracing::error!(error = %e, match_id, "failed to publish match.created event");
    }
}

pub async fn publish_user_blocked(rabbitmq: &RabbitMQClient, blocker_id: i64, blocked_id: i64) {
    let event = Event::new(
        SOURCE,
        routing_keys::RELATIONS_USER_BLOCKED,
        payloads::UserBlocked {
            blocker_id,
            blocked_id,
        },
    )
    .with_user(blocker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::RELATIONS_USER_BLOCKED, &event).await {
        tracing::error!(error = %e, "failed to publish user.blocked event");
    }
}

pub async fn publish_user_unblocked(rabbitmq: &RabbitMQClient, blocker_id: i64, blocked_id: i64) {
    let event = Event::new(
        SOURCE,
        routing_keys::RELATIONS_USER_UNBLOCKED,
        payloads::UserUnblocked {
            blocker_id,
            blocked_id,
        },
    )
    .with_user(blocker_id);

    if let Err(e) = rabbitmq.publish(routing_keys::RELATIONS_USER_UNBLOCKED, &event).await {
        tracing::error!(error = %e, "failed to publish user.unblocked event");
    }
}
