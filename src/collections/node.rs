#[cfg(feature = "no-std")]
use alloc::string::String;

use crate::collections::node_arena::NodeId;
use crate::config::{ListConfig, OverflowPolicy};
use crate::error::{ListError, ListResult};

/// a single chain element: an owned string and the ids of its neighbors
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    value: String,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl Node {
    /// copy `value` into a new node, bounding it according to `config`
    pub fn new(
        value: &str,
        prev: Option<NodeId>,
        next: Option<NodeId>,
        config: &ListConfig,
    ) -> ListResult<Self> {
        Ok(Self {
            value: bounded_copy(value, config)?,
            prev,
            next,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub(crate) fn set_prev(&mut self, prev: Option<NodeId>) {
        self.prev = prev;
    }

    pub(crate) fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }

    pub(crate) fn into_value(self) -> String {
        self.value
    }
}

fn bounded_copy(value: &str, config: &ListConfig) -> ListResult<String> {
    let max = config.max_value_len;
    if value.len() <= max {
        return Ok(String::from(value));
    }

    match config.overflow {
        OverflowPolicy::Reject => Err(ListError::InvalidInput {
            len: value.len(),
            max,
        }),
        OverflowPolicy::Truncate => {
            // index 0 is always a boundary, so this terminates
            let mut end = max;
            while !value.is_char_boundary(end) {
                end -= 1;
            }
            Ok(String::from(&value[..end]))
        }
    }
}
