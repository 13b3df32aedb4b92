use anyhow::{Context, Result};
use domain::{protocol, Answer};
use matrix_sdk::{
    ruma::{
        events::AnyMessageLikeEventContent, serde::Raw, EventId, OwnedEventId, OwnedUserId, UserId,
    },
    Room,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Forbidden,
    NotOwner,
}

// 投稿频道的发布与删除。记录本体就是频道里的那条消息；
// owners 表是结构化的归属旁路，重启前发布的记录退回正文包含检查
#[derive(Clone)]
pub struct SubmissionManager {
    channel: Room,
    owners: Arc<Mutex<HashMap<OwnedEventId, OwnedUserId>>>,
}

impl SubmissionManager {
    pub fn new(channel: Room) -> Self {
        Self {
            channel,
            owners: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn channel_id(&self) -> &matrix_sdk::ruma::RoomId {
        self.channel.room_id()
    }

    pub async fn publish(&self, author: &UserId, answers: &[Answer]) -> Result<OwnedEventId> {
        let body = protocol::render_submission(author.as_str(), answers);
        let raw: Raw<AnyMessageLikeEventContent> =
            serde_json::from_value(protocol::build_text_event(&body))?;

        let response = self
            .channel
            .send_raw("m.room.message", raw)
            .await
            .context("Failed to post submission to the curator channel")?;

        let event_id = response.event_id;
        self.owners
            .lock()
            .unwrap()
            .insert(event_id.clone(), author.to_owned());
        info!("Submission {} published by {}", event_id, author);
        Ok(event_id)
    }

    pub async fn delete(&self, raw_id: &str, requester: &UserId) -> DeleteOutcome {
        let event_id = match EventId::parse(raw_id) {
            Ok(id) => id,
            Err(_) => return DeleteOutcome::NotFound,
        };

        let fetched = match self.channel.event(&event_id).await {
            Ok(ev) => ev,
            Err(e) => {
                warn!("Submission {} not fetchable: {:?}", event_id, e);
                return DeleteOutcome::NotFound;
            }
        };

        let table_hit = self
            .owners
            .lock()
            .unwrap()
            .get(&event_id)
            .map(|owner| owner == requester);
        let is_owner = match table_hit {
            Some(hit) => hit,
            None => match fetched.event.deserialize_as::<serde_json::Value>() {
                Ok(json) => protocol::extract_event_body(&json)
                    .map(|body| protocol::is_submission_author(body, requester.as_str()))
                    .unwrap_or(false),
                Err(_) => false,
            },
        };
        if !is_owner {
            return DeleteOutcome::NotOwner;
        }

        match self.channel.redact(&event_id, None, None).await {
            Ok(_) => {
                self.owners.lock().unwrap().remove(&event_id);
                info!("Submission {} deleted by {}", event_id, requester);
                DeleteOutcome::Deleted
            }
            Err(e) => {
                warn!("Redaction of {} refused: {:?}", event_id, e);
                DeleteOutcome::Forbidden
            }
        }
    }

    /// 记录在频道里被带外撤回时同步清掉归属表
    pub fn forget(&self, event_id: &EventId) {
        self.owners.lock().unwrap().remove(event_id);
    }
}
