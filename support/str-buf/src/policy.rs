/// How a [`StrBuf`](crate::StrBuf) picks its next capacity when an append
/// does not fit.
///
/// The next capacity is the largest of `current * factor`, the exact number
/// of bytes required, and `min_capacity`. Geometric growth keeps the cost of
/// `n` single-byte appends at O(n) total with O(log n) reallocations.
///
/// ```
/// use ibpc_str_buf::GrowthPolicy;
///
/// let policy = GrowthPolicy::DEFAULT;
/// assert_eq!(policy.next_capacity(4, 5), 8);
/// assert_eq!(policy.next_capacity(4, 10), 10);
/// assert_eq!(policy.next_capacity(0, 1), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrowthPolicy {
    factor: usize,
    min_capacity: usize,
}

impl GrowthPolicy {
    /// Doubling, no minimum.
    pub const DEFAULT: Self = Self {
        factor: 2,
        min_capacity: 0,
    };

    /// Create a policy. A `factor` below 2 is raised to 2.
    pub const fn new(factor: usize, min_capacity: usize) -> Self {
        let factor = if factor < 2 { 2 } else { factor };
        Self {
            factor,
            min_capacity,
        }
    }

    pub const fn factor(&self) -> usize {
        self.factor
    }

    pub const fn min_capacity(&self) -> usize {
        self.min_capacity
    }

    /// Capacity to grow to from `current` so that at least `required` bytes fit.
    pub fn next_capacity(&self, current: usize, required: usize) -> usize {
        current
            .saturating_mul(self.factor)
            .max(required)
            .max(self.min_capacity)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
