use chrono::{DateTime, Duration, Utc};

use crate::session::mode::InterventionMode;
use crate::session::result::SessionResult;

/// Most recent completed benchmark in `history`.
pub fn last_benchmark(history: &[SessionResult]) -> Option<DateTime<Utc>> {
    history
        .iter()
        .filter(|r| r.mode == InterventionMode::Benchmark)
        .map(|r| r.completed_at)
        .max()
}

/// True when the student has never been benchmarked or the last benchmark is
/// at least `interval_days` old.
pub fn is_benchmark_due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval_days: u32) -> bool {
    match last {
        None => true,
        Some(last) => now - last >= Duration::days(i64::from(interval_days)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::result::SessionRecorder;

    fn finished(mode: InterventionMode, at: DateTime<Utc>) -> SessionResult {
        let mut result = SessionRecorder::new(mode).finalize(60_000, true);
        result.completed_at = at;
        result
    }

    #[test]
    fn due_when_never_benchmarked() {
        assert!(is_benchmark_due(None, Utc::now(), 7));
    }

    #[test]
    fn not_due_inside_interval() {
        let now = Utc::now();
        assert!(!is_benchmark_due(Some(now - Duration::days(3)), now, 7));
    }

    #[test]
    fn due_on_interval_boundary() {
        let now = Utc::now();
        assert!(is_benchmark_due(Some(now - Duration::days(7)), now, 7));
        assert!(is_benchmark_due(Some(now - Duration::days(30)), now, 7));
    }

    #[test]
    fn last_benchmark_ignores_other_modes() {
        let now = Utc::now();
        let history = vec![
            finished(InterventionMode::Benchmark, now - Duration::days(10)),
            finished(InterventionMode::CoverCopyCompare, now - Duration::days(1)),
            finished(InterventionMode::Benchmark, now - Duration::days(4)),
        ];
        assert_eq!(last_benchmark(&history), Some(now - Duration::days(4)));
        assert!(!is_benchmark_due(last_benchmark(&history), now, 7));
    }
}
