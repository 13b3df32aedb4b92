use anyhow::Result;
use async_trait::async_trait;
use domain::{parse_command, protocol, CuratorCommand, FormOutcome, Reply};
use matrix_sdk::{
    ruma::{
        events::{
            room::message::OriginalSyncRoomMessageEvent,
            room::redaction::OriginalSyncRoomRedactionEvent, AnyMessageLikeEventContent,
        },
        serde::Raw,
        OwnedUserId,
    },
    Room,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::common::reply_router::ReplyRouter;
use crate::curator::sequencer::run_form;
use crate::curator::submissions::{DeleteOutcome, SubmissionManager};
use crate::traits::Conversation;

const USAGE_TEXT: &str =
    "Use `!curator add` to start submitting your theme or `!curator help` to get more information.";

const HELP_TEXT: &str = "**Commands available under !curator:**

`!curator add` - Start the theme submission process. The bot will ask you a series of questions.

`!curator delete <message_id>` - Delete your theme submission by its message ID. Only the user who submitted the theme can delete it.";

const DELETE_PROMPT: &str =
    "Please provide the message ID of the theme submission you wish to delete.";
const SESSION_ACTIVE: &str =
    "You already have a theme submission in progress. Finish it or type 'cancel' first.";
const SUBMIT_OK: &str = "Your theme has been submitted successfully!";
const SUBMIT_FAILED: &str =
    "Something went wrong while posting your submission. Please try again later.";
const DELETE_OK: &str = "Your theme submission has been deleted successfully!";
const DELETE_NOT_FOUND: &str = "Could not find the message with that ID.";
const DELETE_FORBIDDEN: &str = "I do not have permission to delete this message.";
const DELETE_NOT_OWNER: &str = "You can only delete your own submissions.";

// 每个命令处理器拿到的显式上下文，不依赖全局单例
#[derive(Clone)]
pub struct BotContext {
    pub bot_user_id: OwnedUserId,
    pub router: ReplyRouter,
    pub submissions: SubmissionManager,
    pub reply_timeout: Duration,
}

pub async fn send_text(room: &Room, body: &str) -> Result<()> {
    let raw: Raw<AnyMessageLikeEventContent> =
        serde_json::from_value(protocol::build_text_event(body))?;
    room.send_raw("m.room.message", raw).await?;
    Ok(())
}

pub async fn handle_sync_event(
    event: OriginalSyncRoomMessageEvent,
    room: Room,
    ctx: BotContext,
) -> Result<()> {
    // 忽略机器人自己的消息
    if event.sender == ctx.bot_user_id {
        return Ok(());
    }

    let content_json = serde_json::to_value(&event.content)?;
    let reply = protocol::extract_reply(&content_json);

    // 进行中的会话优先消费该用户在该房间的下一条消息
    if ctx.router.deliver(room.room_id(), &event.sender, reply.clone()) {
        return Ok(());
    }

    let Some(cmd) = parse_command(&reply.text) else {
        return Ok(());
    };
    info!("Command from {} in {}: {:?}", event.sender, room.room_id(), cmd);

    match cmd {
        CuratorCommand::Usage => send_text(&room, USAGE_TEXT).await,
        CuratorCommand::Help => send_text(&room, HELP_TEXT).await,
        CuratorCommand::Delete { message_id: None } => send_text(&room, DELETE_PROMPT).await,
        CuratorCommand::Delete {
            message_id: Some(id),
        } => {
            let outcome = ctx.submissions.delete(&id, &event.sender).await;
            send_text(&room, delete_message(outcome)).await
        }
        CuratorCommand::Add => start_submission(ctx, room, event.sender).await,
    }
}

pub fn handle_redaction_event(event: OriginalSyncRoomRedactionEvent, room: Room, ctx: BotContext) {
    if room.room_id() != ctx.submissions.channel_id() {
        return;
    }
    if let Some(redacts) = event.redacts {
        ctx.submissions.forget(&redacts);
    }
}

fn delete_message(outcome: DeleteOutcome) -> &'static str {
    match outcome {
        DeleteOutcome::Deleted => DELETE_OK,
        DeleteOutcome::NotFound => DELETE_NOT_FOUND,
        DeleteOutcome::Forbidden => DELETE_FORBIDDEN,
        DeleteOutcome::NotOwner => DELETE_NOT_OWNER,
    }
}

async fn start_submission(ctx: BotContext, room: Room, requester: OwnedUserId) -> Result<()> {
    // 同一用户的并发 add 直接拒绝，避免两个会话抢同一条回复
    let Some((claim, rx)) = ctx.router.claim(room.room_id(), &requester) else {
        return send_text(&room, SESSION_ACTIVE).await;
    };

    // 表单要挂起等待后续消息，必须独立成任务，否则会阻塞 sync 事件分发
    tokio::spawn(async move {
        let _claim = claim;
        let mut convo = MatrixConversation {
            room: room.clone(),
            rx,
            timeout: ctx.reply_timeout,
        };

        let outcome = match run_form(&mut convo).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Form session for {} failed: {:?}", requester, e);
                return;
            }
        };

        if let FormOutcome::Completed(answers) = outcome {
            match ctx.submissions.publish(&requester, &answers).await {
                Ok(event_id) => {
                    info!("Theme submitted by {} as {}", requester, event_id);
                    let _ = send_text(&room, SUBMIT_OK).await;
                }
                Err(e) => {
                    warn!("Publish failed for {}: {:?}", requester, e);
                    let _ = send_text(&room, SUBMIT_FAILED).await;
                }
            }
        }
    });

    Ok(())
}

struct MatrixConversation {
    room: Room,
    rx: mpsc::Receiver<Reply>,
    timeout: Duration,
}

#[async_trait]
impl Conversation for MatrixConversation {
    async fn say(&mut self, text: &str) -> Result<()> {
        send_text(&self.room, text).await
    }

    async fn wait_reply(&mut self) -> Result<Option<Reply>> {
        match tokio::time::timeout(self.timeout, self.rx.recv()).await {
            Ok(Some(reply)) => Ok(Some(reply)),
            // 通道关闭或超时都按超时收尾
            Ok(None) | Err(_) => Ok(None),
        }
    }
}
