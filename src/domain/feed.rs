use serde::{Deserialize, Serialize};

use crate::domain::id::unique_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
}

impl Feed {
    pub fn new(url: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: unique_id("feed"),
            url: url.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            self.title.trim()
        }
    }
}
