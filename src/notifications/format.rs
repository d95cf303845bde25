use crate::canvas::item::{RemoteItem, ResourceKind};
use crate::notifications::channel::Notification;

pub const ASSIGNMENT_COLOR: u32 = 0x2ECC71;
pub const ANNOUNCEMENT_COLOR: u32 = 0xE67E22;
pub const QUIZ_COLOR: u32 = 0xE74C3C;

pub fn category_color(kind: ResourceKind) -> u32 {
    match kind {
        ResourceKind::Assignment => ASSIGNMENT_COLOR,
        ResourceKind::Announcement => ANNOUNCEMENT_COLOR,
        ResourceKind::Quiz => QUIZ_COLOR,
    }
}

fn fallback_body(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Assignment | ResourceKind::Quiz => "No due date",
        ResourceKind::Announcement => "No details",
    }
}

pub fn build_notification(kind: ResourceKind, item: &RemoteItem) -> Notification {
    Notification {
        title: format!("New {}: {}", kind.label(), item.title),
        body: item
            .detail
            .clone()
            .unwrap_or_else(|| fallback_body(kind).to_string()),
        url: item.url.clone(),
        color: category_color(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::{ANNOUNCEMENT_COLOR, build_notification};
    use crate::canvas::item::{RemoteItem, ResourceKind};

    fn item(detail: Option<&str>) -> RemoteItem {
        RemoteItem {
            id: 1,
            title: "Week 4".to_string(),
            detail: detail.map(str::to_string),
            url: "https://canvas.example.edu/x".to_string(),
        }
    }

    #[test]
    fn templates_per_kind() {
        let assignment = build_notification(ResourceKind::Assignment, &item(Some("Due: soon")));
        assert_eq!(assignment.title, "New Assignment: Week 4");
        assert_eq!(assignment.body, "Due: soon");

        let quiz = build_notification(ResourceKind::Quiz, &item(None));
        assert_eq!(quiz.title, "New Quiz: Week 4");
        assert_eq!(quiz.body, "No due date");

        let announcement = build_notification(ResourceKind::Announcement, &item(None));
        assert_eq!(announcement.title, "New Announcement: Week 4");
        assert_eq!(announcement.body, "No details");
        assert_eq!(announcement.color, ANNOUNCEMENT_COLOR);
        assert_eq!(announcement.url, "https://canvas.example.edu/x");
    }
}
