use anyhow::{Context, Result};
use async_trait::async_trait;
use matrix_sdk::{
    config::SyncSettings,
    matrix_auth::{MatrixSession, MatrixSessionTokens},
    ruma::{
        events::{
            room::message::OriginalSyncRoomMessageEvent,
            room::redaction::OriginalSyncRoomRedactionEvent,
        },
        OwnedRoomId, OwnedUserId, RoomAliasId, RoomId,
    },
    Client, Room, SessionMeta,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::handlers::{handle_redaction_event, handle_sync_event, BotContext};
use crate::common::reply_router::ReplyRouter;
use crate::curator::submissions::SubmissionManager;
use crate::traits::ChatDriver;

#[derive(Clone)]
pub struct BotConfig {
    pub homeserver_url: String,
    pub user_id: OwnedUserId,
    pub access_token: String,
    pub device_id: String,
    /// 投稿频道：房间 ID (!xxx:server) 或别名 (#xxx:server)
    pub channel: String,
    pub reply_timeout: Duration,
}

pub struct BotDriver {
    config: BotConfig,
}

impl BotDriver {
    pub fn new(config: BotConfig) -> Self {
        Self { config }
    }
}

async fn resolve_channel(client: &Client, channel: &str) -> Result<Room> {
    let room_id: OwnedRoomId = if channel.starts_with('#') {
        let alias = RoomAliasId::parse(channel)
            .with_context(|| format!("Invalid channel alias: {}", channel))?;
        client
            .resolve_room_alias(&alias)
            .await
            .with_context(|| format!("Failed to resolve channel alias {}", alias))?
            .room_id
    } else {
        RoomId::parse(channel).with_context(|| format!("Invalid channel room ID: {}", channel))?
    };

    match client.get_room(&room_id) {
        Some(room) => Ok(room),
        None => client
            .join_room_by_id(&room_id)
            .await
            .with_context(|| format!("Failed to join submission channel {}", room_id)),
    }
}

#[async_trait]
impl ChatDriver for BotDriver {
    async fn run(&self, cancel_token: CancellationToken) -> Result<()> {
        // --- 1. Client 初始化 ---
        let client = Client::builder()
            .homeserver_url(&self.config.homeserver_url)
            .build()
            .await?;

        let session = MatrixSession {
            meta: SessionMeta {
                user_id: self.config.user_id.clone(),
                device_id: self.config.device_id.clone().into(),
            },
            tokens: MatrixSessionTokens {
                access_token: self.config.access_token.clone(),
                refresh_token: None,
            },
        };

        client.matrix_auth().restore_session(session).await?;
        info!("Matrix Client logged in as {}", self.config.user_id);

        // 初始同步在挂接事件处理器之前完成，历史消息不会被当成新命令重放
        let initial = client
            .sync_once(SyncSettings::default())
            .await
            .context("Initial sync failed")?;

        let channel = resolve_channel(&client, &self.config.channel).await?;
        info!("Submission channel resolved: {}", channel.room_id());

        let ctx = BotContext {
            bot_user_id: self.config.user_id.clone(),
            router: ReplyRouter::new(),
            submissions: SubmissionManager::new(channel),
            reply_timeout: self.config.reply_timeout,
        };

        // --- 2. 事件处理 ---
        let ctx_msg = ctx.clone();
        client.add_event_handler(move |ev: OriginalSyncRoomMessageEvent, room: Room| {
            let ctx = ctx_msg.clone();
            async move {
                if let Err(e) = handle_sync_event(ev, room, ctx).await {
                    error!("Message handling failed: {:?}", e);
                }
            }
        });

        let ctx_redact = ctx.clone();
        client.add_event_handler(move |ev: OriginalSyncRoomRedactionEvent, room: Room| {
            let ctx = ctx_redact.clone();
            async move {
                handle_redaction_event(ev, room, ctx);
            }
        });

        // --- 3. Sync Loop ---
        info!("Starting Matrix Sync Loop...");
        let mut sync_token = Some(initial.next_batch);

        loop {
            tokio::select! {
                sync_result = async {
                    let mut settings = SyncSettings::default().timeout(Duration::from_secs(30));
                    if let Some(ref token) = sync_token {
                        settings = settings.token(token);
                    }
                    client.sync_once(settings).await
                } => {
                    match sync_result {
                        Ok(response) => {
                            sync_token = Some(response.next_batch);
                        }
                        Err(e) => {
                            error!("Matrix sync failed: {:?}. Retrying...", e);
                            if cancel_token.is_cancelled() { break; }
                            tokio::time::sleep(Duration::from_secs(5)).await;
                        }
                    }
                },
                _ = cancel_token.cancelled() => break,
            }
        }

        Ok(())
    }
}
