use serde::{Deserialize, Serialize};

/// `reply` value of a post that starts a thread.
pub const TOP_LEVEL: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "rowid")]
    pub id: i64,
    #[serde(rename = "reply")]
    pub reply_to: i64,
    pub content: String,
    /// Tripcode digest computed by the server.
    pub hash: String,
}

impl Post {
    pub fn is_top_level(&self) -> bool {
        self.reply_to == TOP_LEVEL
    }

    pub fn parent_id(&self) -> Option<i64> {
        (!self.is_top_level()).then_some(self.reply_to)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPost {
    pub rowid: i64,
}
