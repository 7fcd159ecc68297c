/// Counters for evaluator resolution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionMetrics {
    /// Total number of resolve calls
    pub lookups: u64,
    /// Resolutions answered from the cache
    pub cache_hits: u64,
    /// Resolutions that had to scan the descriptor list
    pub cache_misses: u64,
    /// Resolutions that produced no evaluator
    pub failures: u64,
}

impl ResolutionMetrics {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, cache_hit: bool, resolved: bool) {
        self.lookups += 1;
        if cache_hit {
            self.cache_hits += 1;
        } else {
            self.cache_misses += 1;
        }
        if !resolved {
            self.failures += 1;
        }
    }

    /// Get cache hit rate
    #[inline]
    pub fn cache_hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.lookups as f64
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
