use log::info;
use std::time::Instant;

/// 記錄單一階段的耗時
pub struct TimeCost {
    label: String,
    start: Instant,
}

impl TimeCost {
    #[must_use]
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("[{label}] 開始");
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn end(self) {
        info!("[{}] 結束，耗時 {:.2?}", self.label, self.start.elapsed());
    }
}
