use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::canvas::error::{CanvasError, CanvasResult};

pub const DETAIL_LIMIT: usize = 200;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Assignment,
    Announcement,
    Quiz,
}

impl ResourceKind {
    /// Processing order within a cycle.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Assignment,
        ResourceKind::Announcement,
        ResourceKind::Quiz,
    ];

    /// Path under `/courses/{id}/`, including any fixed query.
    pub fn endpoint(self) -> &'static str {
        match self {
            ResourceKind::Assignment => "assignments",
            ResourceKind::Announcement => "discussion_topics?only_announcements=true",
            ResourceKind::Quiz => "quizzes",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            ResourceKind::Assignment => "assignments",
            ResourceKind::Announcement => "announcements",
            ResourceKind::Quiz => "quizzes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Assignment => "Assignment",
            ResourceKind::Announcement => "Announcement",
            ResourceKind::Quiz => "Quiz",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: i64,
    pub title: String,
    /// Due date for assignments and quizzes, message body for announcements.
    pub detail: Option<String>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct AssignmentPayload {
    id: i64,
    name: String,
    due_at: Option<String>,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct AnnouncementPayload {
    id: i64,
    title: String,
    message: Option<String>,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    id: i64,
    title: String,
    due_at: Option<String>,
    #[serde(default)]
    html_url: String,
}

impl RemoteItem {
    pub fn from_json(kind: ResourceKind, value: Value) -> CanvasResult<Self> {
        let decode = |err: serde_json::Error| CanvasError::Decode(format!("{kind}: {err}"));
        let item = match kind {
            ResourceKind::Assignment => {
                let payload: AssignmentPayload = serde_json::from_value(value).map_err(decode)?;
                RemoteItem {
                    id: payload.id,
                    title: payload.name,
                    detail: due_detail(payload.due_at),
                    url: payload.html_url,
                }
            }
            ResourceKind::Announcement => {
                let payload: AnnouncementPayload =
                    serde_json::from_value(value).map_err(decode)?;
                RemoteItem {
                    id: payload.id,
                    title: payload.title,
                    detail: payload
                        .message
                        .filter(|message| !message.trim().is_empty())
                        .map(|message| truncate_detail(&message, DETAIL_LIMIT)),
                    url: payload.html_url,
                }
            }
            ResourceKind::Quiz => {
                let payload: QuizPayload = serde_json::from_value(value).map_err(decode)?;
                RemoteItem {
                    id: payload.id,
                    title: payload.title,
                    detail: due_detail(payload.due_at),
                    url: payload.html_url,
                }
            }
        };
        Ok(item)
    }
}

fn due_detail(due_at: Option<String>) -> Option<String> {
    due_at
        .filter(|due| !due.trim().is_empty())
        .map(|due| format!("Due: {due}"))
}

/// Keeps the first `limit` characters and marks the cut with an ellipsis.
pub fn truncate_detail(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}
