use std::sync::Arc;

use crate::canvas::item::{RemoteItem, ResourceKind};
use crate::notifications::service::Notifier;
use crate::scheduler::report::KindReport;
use crate::store::seen::SeenStore;

/// Walks a fetched collection in order and announces each id not yet in the store.
///
/// Each item is checked, recorded and only then announced, one at a time. An
/// interruption between recording and sending drops that notification instead
/// of repeating it after a restart.
#[derive(Clone)]
pub struct ChangeDetector {
    store: Arc<dyn SeenStore>,
    notifier: Notifier,
}

impl ChangeDetector {
    pub fn new(store: Arc<dyn SeenStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn process(&self, kind: ResourceKind, items: &[RemoteItem]) -> KindReport {
        let mut report = KindReport::new(kind);
        report.fetched = items.len();
        for item in items {
            match self.store.exists(kind, item.id) {
                Ok(true) => {
                    report.already_seen += 1;
                    continue;
                }
                Ok(false) => {}
                Err(err) => {
                    report.store_failures += 1;
                    tracing::warn!(
                        event = "seen_lookup_failed",
                        kind = %kind,
                        item_id = item.id,
                        error = %err,
                        "skipping item"
                    );
                    continue;
                }
            }
            if let Err(err) = self.store.record(kind, item.id) {
                report.store_failures += 1;
                tracing::warn!(
                    event = "seen_record_failed",
                    kind = %kind,
                    item_id = item.id,
                    error = %err,
                    "not notifying unrecorded item"
                );
                continue;
            }
            tracing::info!(
                event = "new_item",
                kind = %kind,
                item_id = item.id,
                title = %item.title,
                "new item detected"
            );
            match self.notifier.notify(kind, item).await {
                Ok(()) => report.notified += 1,
                // Stays recorded; a failed delivery is never retried.
                Err(_) => report.delivery_failures += 1,
            }
        }
        report
    }
}
