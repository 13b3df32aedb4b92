use thiserror::Error;

use crate::session::{AnswerValue, Reply};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    HexColor,
    Image,
}

// 校验失败的固定提示文案由错误类型自己携带
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("That is not a valid color code. Please reply with exactly 8 lowercase hex characters, e.g. `282a36ff`.")]
    NotHex8,
    #[error("Please attach an image file for this step.")]
    NotAnImage,
}

impl FieldKind {
    pub fn validate(&self, reply: &Reply) -> Result<AnswerValue, ValidationError> {
        match self {
            FieldKind::Text => Ok(AnswerValue::Text(reply.text.clone())),
            FieldKind::HexColor => {
                if is_hex8(&reply.text) {
                    Ok(AnswerValue::Text(reply.text.clone()))
                } else {
                    Err(ValidationError::NotHex8)
                }
            }
            FieldKind::Image => reply
                .attachments
                .iter()
                .find(|a| a.is_image())
                .map(|a| AnswerValue::Image(a.url.clone()))
                .ok_or(ValidationError::NotAnImage),
        }
    }
}

// 必须恰好 8 位小写十六进制（rrggbbaa），大写一律拒绝
fn is_hex8(s: &str) -> bool {
    s.len() == 8 && s.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub prompt: &'static str,
    pub kind: FieldKind,
}

pub fn theme_fields() -> &'static [FieldSpec] {
    &THEME_FIELDS
}

static THEME_FIELDS: [FieldSpec; 13] = [
    FieldSpec {
        label: "Theme Name",
        prompt: "What is the name of your theme?",
        kind: FieldKind::Text,
    },
    FieldSpec {
        label: "Font",
        prompt: "Which font does your theme use?",
        kind: FieldKind::Text,
    },
    FieldSpec {
        label: "Background Color",
        prompt: "What is the background color? (8 lowercase hex digits, e.g. `282a36ff`)",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Input Color",
        prompt: "What is the input color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Command Color",
        prompt: "What is the command color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Normal Text & Arrow Color",
        prompt: "What is the normal text & arrow color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Error Text Color",
        prompt: "What is the error text color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Positive Text Color",
        prompt: "What is the positive text color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Warning Text Color",
        prompt: "What is the warning text color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Suggestions Color",
        prompt: "What is the suggestions color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Suggestion Bar Color",
        prompt: "What is the suggestion bar color?",
        kind: FieldKind::HexColor,
    },
    FieldSpec {
        label: "Preview",
        prompt: "Please upload a preview screenshot of your theme.",
        kind: FieldKind::Image,
    },
    FieldSpec {
        label: "Background",
        prompt: "Please upload the background image of your theme.",
        kind: FieldKind::Image,
    },
];
