use serde::Deserialize;
use serde_json::Value;

use crate::session::{Answer, Attachment, Reply};

pub const SUBMITTED_BY: &str = "**Submitted by:**";

// 身份令牌：提及形式，既用于展示也用于归属校验
pub fn mention(user_id: &str) -> String {
    format!("<@{}>", user_id.trim_start_matches('@'))
}

pub fn render_submission(author_id: &str, answers: &[Answer]) -> String {
    let mut body = format!("{} {}", SUBMITTED_BY, mention(author_id));
    for answer in answers {
        body.push_str(&format!("\n**{}:** {}", answer.label, answer.value.as_str()));
    }
    body
}

pub fn is_submission_author(body: &str, user_id: &str) -> bool {
    body.contains(&mention(user_id))
}

pub fn build_text_event(body: &str) -> Value {
    serde_json::json!({
        "msgtype": "m.text",
        "body": body,
    })
}

#[derive(Deserialize)]
struct MediaInfo {
    mimetype: Option<String>,
}

// 从 m.room.message 的 content 中提取文本与附件（m.image / m.file 等带 url 的消息）
pub fn extract_reply(content: &Value) -> Reply {
    let text = content
        .get("body")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let mut attachments = Vec::new();
    if let Some(url) = content.get("url").and_then(|v| v.as_str()) {
        let content_type = content
            .get("info")
            .and_then(|info| serde_json::from_value::<MediaInfo>(info.clone()).ok())
            .and_then(|info| info.mimetype);
        attachments.push(Attachment {
            url: url.to_string(),
            content_type,
        });
    }

    Reply { text, attachments }
}

// 取回的完整事件 JSON 中的正文
pub fn extract_event_body(event: &Value) -> Option<&str> {
    event.pointer("/content/body").and_then(|v| v.as_str())
}
