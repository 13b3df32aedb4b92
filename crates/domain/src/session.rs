use crate::fields::FieldSpec;

pub const MSG_INTRO: &str = "Let's submit your theme! I'll ask you a few questions. Type 'cancel' at any time to quit, or 'back' to return to the previous question.";
pub const MSG_CANCELLED: &str = "Theme submission has been canceled.";
pub const MSG_TIMED_OUT: &str = "You took too long to respond. Please try again later.";
pub const MSG_AT_FIRST: &str = "You are already at the first question.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(false, |t| t.starts_with("image/"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValue {
    Text(String),
    Image(String),
}

impl AnswerValue {
    pub fn as_str(&self) -> &str {
        match self {
            AnswerValue::Text(s) | AnswerValue::Image(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub label: &'static str,
    pub value: AnswerValue,
}

// 每一步的输入：正常回答，或导航关键字
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Answered(Reply),
    Cancelled,
    WentBack,
}

pub fn classify_reply(reply: Reply) -> StepOutcome {
    match reply.text.trim().to_lowercase().as_str() {
        "cancel" => StepOutcome::Cancelled,
        "back" => StepOutcome::WentBack,
        _ => StepOutcome::Answered(reply),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// 游标已移动，重新发送当前问题即可
    Continue,
    /// 先发送提示文案，再重复当前问题
    Notice(String),
    Cancelled,
    Completed(Vec<Answer>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Completed(Vec<Answer>),
    Cancelled,
    TimedOut,
}

pub struct FormSession {
    fields: &'static [FieldSpec],
    cursor: usize,
    answers: Vec<Option<Answer>>,
}

impl FormSession {
    pub fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
            cursor: 0,
            answers: vec![None; fields.len()],
        }
    }

    pub fn current_field(&self) -> &FieldSpec {
        &self.fields[self.cursor]
    }

    pub fn apply(&mut self, outcome: StepOutcome) -> Progress {
        match outcome {
            StepOutcome::Cancelled => Progress::Cancelled,
            StepOutcome::WentBack => {
                if self.cursor == 0 {
                    Progress::Notice(MSG_AT_FIRST.to_string())
                } else {
                    // 回退即作废旧答案，用户需要重新回答
                    self.cursor -= 1;
                    self.answers[self.cursor] = None;
                    Progress::Continue
                }
            }
            StepOutcome::Answered(reply) => {
                let field = &self.fields[self.cursor];
                match field.kind.validate(&reply) {
                    Err(e) => Progress::Notice(e.to_string()),
                    Ok(value) => {
                        self.answers[self.cursor] = Some(Answer {
                            label: field.label,
                            value,
                        });
                        self.cursor += 1;
                        if self.cursor == self.fields.len() {
                            Progress::Completed(self.answers.drain(..).flatten().collect())
                        } else {
                            Progress::Continue
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{theme_fields, ValidationError};

    fn text(s: &str) -> Reply {
        Reply {
            text: s.to_string(),
            attachments: vec![],
        }
    }

    fn image(url: &str) -> Reply {
        Reply {
            text: "screenshot.png".to_string(),
            attachments: vec![Attachment {
                url: url.to_string(),
                content_type: Some("image/png".to_string()),
            }],
        }
    }

    // 按字段类型给出一条合法回答
    fn valid_reply(session: &FormSession) -> Reply {
        match session.current_field().kind {
            crate::fields::FieldKind::Text => text("free text"),
            crate::fields::FieldKind::HexColor => text("282a36ff"),
            crate::fields::FieldKind::Image => image("mxc://hs/media"),
        }
    }

    #[test]
    fn classify_detects_keywords_case_insensitively() {
        assert!(matches!(classify_reply(text("cancel")), StepOutcome::Cancelled));
        assert!(matches!(classify_reply(text("CANCEL")), StepOutcome::Cancelled));
        assert!(matches!(classify_reply(text("  Cancel ")), StepOutcome::Cancelled));
        assert!(matches!(classify_reply(text("Back")), StepOutcome::WentBack));
        assert!(matches!(classify_reply(text("Dracula")), StepOutcome::Answered(_)));
    }

    #[test]
    fn cancel_aborts_at_any_index() {
        let mut session = FormSession::new(theme_fields());
        assert_eq!(session.apply(StepOutcome::Cancelled), Progress::Cancelled);

        let mut session = FormSession::new(theme_fields());
        for _ in 0..5 {
            let reply = valid_reply(&session);
            assert_eq!(session.apply(classify_reply(reply)), Progress::Continue);
        }
        assert_eq!(session.apply(StepOutcome::Cancelled), Progress::Cancelled);
    }

    #[test]
    fn back_at_first_question_keeps_cursor_and_notifies() {
        let mut session = FormSession::new(theme_fields());
        assert_eq!(
            session.apply(StepOutcome::WentBack),
            Progress::Notice(MSG_AT_FIRST.to_string())
        );
        assert_eq!(session.current_field().label, "Theme Name");
    }

    #[test]
    fn back_discards_previous_answer_until_reanswered() {
        let mut session = FormSession::new(theme_fields());
        assert_eq!(session.apply(classify_reply(text("Dracula"))), Progress::Continue);
        assert_eq!(session.current_field().label, "Font");

        assert_eq!(session.apply(StepOutcome::WentBack), Progress::Continue);
        assert_eq!(session.current_field().label, "Theme Name");

        assert_eq!(session.apply(classify_reply(text("Nord"))), Progress::Continue);

        let answers = loop {
            let reply = valid_reply(&session);
            match session.apply(classify_reply(reply)) {
                Progress::Continue => continue,
                Progress::Completed(answers) => break answers,
                other => panic!("unexpected progress: {:?}", other),
            }
        };
        assert_eq!(answers[0].value, AnswerValue::Text("Nord".to_string()));
    }

    #[test]
    fn invalid_answer_reprompts_the_same_field() {
        let mut session = FormSession::new(theme_fields());
        session.apply(classify_reply(text("Dracula")));
        session.apply(classify_reply(text("Fira Code")));
        assert_eq!(session.current_field().label, "Background Color");

        assert_eq!(
            session.apply(classify_reply(text("1A2B3C4D"))),
            Progress::Notice(ValidationError::NotHex8.to_string())
        );
        assert_eq!(session.current_field().label, "Background Color");

        assert_eq!(session.apply(classify_reply(text("1a2b3c4d"))), Progress::Continue);
        assert_eq!(session.current_field().label, "Input Color");
    }

    #[test]
    fn missing_attachment_reprompts_the_image_field() {
        let mut session = FormSession::new(theme_fields());
        while session.current_field().label != "Preview" {
            let reply = valid_reply(&session);
            session.apply(classify_reply(reply));
        }
        assert_eq!(
            session.apply(classify_reply(text("here is a link instead"))),
            Progress::Notice(ValidationError::NotAnImage.to_string())
        );
        assert_eq!(session.current_field().label, "Preview");
    }

    #[test]
    fn full_walk_yields_answers_in_declaration_order() {
        let mut session = FormSession::new(theme_fields());
        let answers = loop {
            let reply = valid_reply(&session);
            match session.apply(classify_reply(reply)) {
                Progress::Continue => continue,
                Progress::Completed(answers) => break answers,
                other => panic!("unexpected progress: {:?}", other),
            }
        };
        assert_eq!(answers.len(), 13);
        let labels: Vec<&str> = answers.iter().map(|a| a.label).collect();
        let expected: Vec<&str> = theme_fields().iter().map(|f| f.label).collect();
        assert_eq!(labels, expected);
        assert_eq!(
            answers[12].value,
            AnswerValue::Image("mxc://hs/media".to_string())
        );
    }
}
