use serde::Serialize;

const RECENT_WINDOW: usize = 20;

/// Evaluation outcomes over the lifetime of one mission screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvalStats {
    pub evaluations: u32,
    pub passes: u32,
    pub recent: Vec<bool>,
    /// 1-based index of the first passing evaluation.
    pub first_pass_at: Option<u32>,
}

impl EvalStats {
    pub fn new() -> Self {
        Self {
            evaluations: 0,
            passes: 0,
            recent: Vec::with_capacity(RECENT_WINDOW),
            first_pass_at: None,
        }
    }

    pub fn record(&mut self, passed: bool) {
        self.evaluations += 1;
        if passed {
            self.passes += 1;
            if self.first_pass_at.is_none() {
                self.first_pass_at = Some(self.evaluations);
            }
        }

        self.recent.push(passed);
        if self.recent.len() > RECENT_WINDOW {
            self.recent.remove(0);
        }
    }

    pub fn pass_rate(&self) -> f32 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.passes as f32 / self.evaluations as f32
        }
    }

    pub fn recent_rate(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.0;
        }
        let passes = self.recent.iter().filter(|&&x| x).count();
        passes as f32 / self.recent.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_first_pass_and_rates() {
        let mut stats = EvalStats::new();
        assert_eq!(stats.pass_rate(), 0.0);

        stats.record(false);
        stats.record(false);
        stats.record(true);
        stats.record(true);

        assert_eq!(stats.evaluations, 4);
        assert_eq!(stats.passes, 2);
        assert_eq!(stats.first_pass_at, Some(3));
        assert!((stats.pass_rate() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn recent_window_is_bounded() {
        let mut stats = EvalStats::new();
        for _ in 0..RECENT_WINDOW {
            stats.record(false);
        }
        for _ in 0..5 {
            stats.record(true);
        }
        assert_eq!(stats.recent.len(), RECENT_WINDOW);
        assert!((stats.recent_rate() - 0.25).abs() < 1e-6);
        assert_eq!(stats.evaluations, RECENT_WINDOW as u32 + 5);
    }
}
