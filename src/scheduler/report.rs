use crate::canvas::item::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindReport {
    pub kind: ResourceKind,
    pub fetched: usize,
    pub already_seen: usize,
    pub notified: usize,
    pub store_failures: usize,
    pub delivery_failures: usize,
    pub fetch_error: Option<String>,
}

impl KindReport {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            fetched: 0,
            already_seen: 0,
            notified: 0,
            store_failures: 0,
            delivery_failures: 0,
            fetch_error: None,
        }
    }

    pub fn failed(kind: ResourceKind, error: String) -> Self {
        Self {
            fetch_error: Some(error),
            ..Self::new(kind)
        }
    }

    /// Items recorded as seen during this cycle, whether or not delivery succeeded.
    pub fn recorded(&self) -> usize {
        self.notified + self.delivery_failures
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Set when the output channel was unreachable and nothing was processed.
    pub skipped: bool,
    pub kinds: Vec<KindReport>,
}

impl CycleReport {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            kinds: Vec::new(),
        }
    }

    pub fn kind(&self, kind: ResourceKind) -> Option<&KindReport> {
        self.kinds.iter().find(|report| report.kind == kind)
    }

    pub fn notified(&self) -> usize {
        self.kinds.iter().map(|report| report.notified).sum()
    }
}
