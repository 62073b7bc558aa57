use serde::{Deserialize, Serialize};

/// Who produced a turn in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Visitor,
    Assistant,
}

/// One exchange unit in a session transcript. Position in the transcript is
/// the only identity; turns carry no ids of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    pub fn visitor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Visitor,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}
