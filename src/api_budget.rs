use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

/// Daily allowance of language-model calls, reset at UTC midnight.
///
/// Once spent, roasts come from the local rule table until the next day so a
/// shared fallback key can't be drained by one busy client.
pub struct ApiCallBudget {
    daily_limit: u32,
    calls_today: AtomicU32,
    current_day: AtomicI64,
}

impl ApiCallBudget {
    pub fn new(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            calls_today: AtomicU32::new(0),
            current_day: AtomicI64::new(Self::utc_day_now()),
        }
    }

    /// Count a call. `false` means the allowance is spent and the call should not be made.
    pub fn record_call(&self) -> bool {
        self.maybe_reset();
        let prev = self.calls_today.fetch_add(1, Ordering::Relaxed);
        let allowed = prev < self.daily_limit;

        metrics::gauge!("sassy_skies_generation_budget_remaining")
            .set(self.daily_limit.saturating_sub(prev.saturating_add(1)) as f64);

        if !allowed && prev == self.daily_limit {
            tracing::warn!(daily_limit = self.daily_limit, "Generation budget exhausted for today");
        }

        allowed
    }

    pub fn remaining(&self) -> u32 {
        self.maybe_reset();
        let used = self.calls_today.load(Ordering::Relaxed);
        self.daily_limit.saturating_sub(used)
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Reset counter if the UTC day has changed (compare-and-swap).
    fn maybe_reset(&self) {
        let today = Self::utc_day_now();
        let stored = self.current_day.load(Ordering::Relaxed);
        if today != stored
            && self
                .current_day
                .compare_exchange(stored, today, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
        {
            self.calls_today.store(0, Ordering::Relaxed);
        }
    }

    fn utc_day_now() -> i64 {
        chrono::Utc::now().timestamp() / 86400
    }
}
