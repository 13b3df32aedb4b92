use anyhow::Result;
use domain::{
    classify_reply, theme_fields, FormOutcome, FormSession, Progress, MSG_CANCELLED, MSG_INTRO,
    MSG_TIMED_OUT,
};
use tracing::info;

use crate::traits::Conversation;

// 逐字段走完整张表单；每一步都挂起等待同一用户在同一房间的下一条消息
pub async fn run_form<C: Conversation>(convo: &mut C) -> Result<FormOutcome> {
    let mut session = FormSession::new(theme_fields());
    convo.say(MSG_INTRO).await?;

    loop {
        convo.say(session.current_field().prompt).await?;

        let reply = match convo.wait_reply().await? {
            Some(reply) => reply,
            None => {
                convo.say(MSG_TIMED_OUT).await?;
                return Ok(FormOutcome::TimedOut);
            }
        };

        match session.apply(classify_reply(reply)) {
            Progress::Continue => {}
            Progress::Notice(text) => convo.say(&text).await?,
            Progress::Cancelled => {
                convo.say(MSG_CANCELLED).await?;
                return Ok(FormOutcome::Cancelled);
            }
            Progress::Completed(answers) => {
                info!("Form completed with {} answers", answers.len());
                return Ok(FormOutcome::Completed(answers));
            }
        }
    }
}
