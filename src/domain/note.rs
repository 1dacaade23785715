use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub owner_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
}

/// Offset pagination over an owner's notes, which are always ordered by id.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct Page {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
