/// the largest value, in bytes, a node stores unless configured otherwise
pub const MAX_VALUE_LEN: usize = 99;

/// what a node does with a value longer than [`ListConfig::max_value_len`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// fail with [`crate::error::ListError::InvalidInput`]
    #[default]
    Reject,
    /// keep the longest prefix that fits and ends on a char boundary
    Truncate,
}

/// per-list settings, fixed at construction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListConfig {
    pub max_value_len: usize,
    pub overflow: OverflowPolicy,
}

impl ListConfig {
    pub const fn new(max_value_len: usize, overflow: OverflowPolicy) -> Self {
        Self {
            max_value_len,
            overflow,
        }
    }

    pub const fn truncating(max_value_len: usize) -> Self {
        Self::new(max_value_len, OverflowPolicy::Truncate)
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::new(MAX_VALUE_LEN, OverflowPolicy::Reject)
    }
}
