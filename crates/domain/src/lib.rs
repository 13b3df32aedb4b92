mod commands;
mod fields;
mod session;
pub mod protocol;

pub use commands::{parse_command, CuratorCommand, COMMAND_PREFIX};
pub use fields::{theme_fields, FieldKind, FieldSpec, ValidationError};
pub use session::{
    classify_reply, Answer, AnswerValue, Attachment, FormOutcome, FormSession, Progress, Reply,
    StepOutcome, MSG_AT_FIRST, MSG_CANCELLED, MSG_INTRO, MSG_TIMED_OUT,
};
