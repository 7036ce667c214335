use serde::{Deserialize, Serialize};

use crate::domain::id::unique_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub feed_url: String,
    pub title: String,
    pub description: String,
    pub url: String,
}

impl Post {
    pub fn new(
        feed_url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: unique_id("post"),
            feed_url: feed_url.into(),
            title: title.into(),
            description: description.into(),
            url: url.into(),
        }
    }

    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "(Untitled)"
        } else {
            title
        }
    }

    pub fn link(&self) -> Option<&str> {
        let url = self.url.trim();
        (!url.is_empty()).then_some(url)
    }
}
