#[cfg(feature = "no-std")]
use alloc::string::String;
use core::fmt;
use core::iter::FusedIterator;

use tracing::{debug, instrument, warn};

use crate::collections::node::Node;
use crate::collections::node_arena::{NodeArena, NodeId};
use crate::config::ListConfig;
use crate::error::{ListError, ListResult};

/// a doubly-linked list of bounded strings. nodes live in an arena and refer
/// to their neighbors by [`NodeId`], so a stale link can at worst name a
/// vacant slot, never freed memory
///
/// a list always starts out holding one value; it only becomes empty by
/// deleting its last node
pub struct DoublyLinkedList {
    nodes: NodeArena<Node>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
    config: ListConfig,
}

impl DoublyLinkedList {
    /// create a list holding `initial_value`, using the default [`ListConfig`]
    pub fn new(initial_value: &str) -> ListResult<Self> {
        Self::with_config(initial_value, ListConfig::default())
    }

    pub fn with_config(initial_value: &str, config: ListConfig) -> ListResult<Self> {
        let mut list = Self {
            nodes: NodeArena::new(),
            head: None,
            tail: None,
            len: 0,
            config,
        };
        list.append(initial_value)?;
        Ok(list)
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// number of node slots currently allocated in the arena. always equal
    /// to `len`
    pub fn live_nodes(&self) -> usize {
        self.nodes.live()
    }

    pub fn head(&self) -> Option<&str> {
        self.head.map(|id| self.nodes[id].value())
    }

    pub fn tail(&self) -> Option<&str> {
        self.tail.map(|id| self.nodes[id].value())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.locate(index).map(|id| self.nodes[id].value())
    }

    /// inspect the node at `index` together with its links
    pub fn node_at(&self, index: usize) -> Option<NodeView<'_>> {
        self.locate(index).map(|id| NodeView {
            id,
            node: &self.nodes[id],
        })
    }

    /// zero-based position of the first value equal to `target`
    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, target: &str) -> Option<usize> {
        self.traverse().position(|value| value == target)
    }

    /// values from head to tail. the walk borrows the list, so it can be
    /// cloned or restarted freely
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            list: self,
            cursor: self.head,
            remaining: self.len,
            backward: false,
        }
    }

    /// values from tail to head
    pub fn traverse_back(&self) -> Traverse<'_> {
        Traverse {
            list: self,
            cursor: self.tail,
            remaining: self.len,
            backward: true,
        }
    }

    pub fn append(&mut self, value: &str) -> ListResult<()> {
        let node = Node::new(value, self.tail, None, &self.config)?;
        let id = self.nodes.alloc(node)?;

        match self.tail {
            // empty list
            None => self.head = Some(id),
            Some(tail) => self.nodes[tail].set_next(Some(id)),
        }
        self.tail = Some(id);
        self.len += 1;

        debug!(node = %id, len = self.len, "appended node");
        Ok(())
    }

    /// insert `value` so that it ends up at `index`, shifting later values
    /// one position toward the tail. `index == len` appends
    pub fn insert(&mut self, index: usize, value: &str) -> ListResult<()> {
        if index > self.len {
            warn!(index, len = self.len, "cannot insert past the end of the list");
            return Err(ListError::OutOfRange {
                index,
                len: self.len,
            });
        }

        if index == self.len {
            return self.append(value);
        }

        let target = self.locate(index).ok_or(ListError::OutOfRange {
            index,
            len: self.len,
        })?;
        let prev = self.nodes[target].prev();

        let node = Node::new(value, prev, Some(target), &self.config)?;
        let id = self.nodes.alloc(node)?;

        match prev {
            Some(prev) => self.nodes[prev].set_next(Some(id)),
            None => self.head = Some(id),
        }
        self.nodes[target].set_prev(Some(id));
        self.len += 1;

        debug!(index, node = %id, len = self.len, "inserted node");
        Ok(())
    }

    /// remove the node at `index` and hand back its value
    pub fn delete(&mut self, index: usize) -> ListResult<String> {
        if index >= self.len {
            warn!(index, len = self.len, "no node at index");
            return Err(ListError::OutOfRange {
                index,
                len: self.len,
            });
        }

        let target = self.locate(index).ok_or(ListError::OutOfRange {
            index,
            len: self.len,
        })?;
        let (prev, next) = {
            let node = &self.nodes[target];
            (node.prev(), node.next())
        };

        // a missing neighbor means `target` was the head or tail, so the
        // list's own boundary moves instead
        match prev {
            Some(prev) => self.nodes[prev].set_next(next),
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].set_prev(prev),
            None => self.tail = prev,
        }
        self.len -= 1;

        let removed = self.nodes.release(target).ok_or(ListError::OutOfRange {
            index,
            len: self.len,
        })?;

        debug!(index, node = %target, len = self.len, "deleted node");
        Ok(removed.into_value())
    }

    /// release every node and the list itself, returning how many nodes were
    /// released
    pub fn destroy(mut self) -> usize {
        let released = self.release_all();
        debug!(released, "destroyed list");
        released
    }

    /// walk `index` links forward from the head
    #[instrument(level = "trace", skip(self))]
    fn locate(&self, index: usize) -> Option<NodeId> {
        if index >= self.len {
            return None;
        }

        let mut cursor = self.head?;
        for _ in 0..index {
            cursor = self.nodes[cursor].next()?;
        }
        Some(cursor)
    }

    fn release_all(&mut self) -> usize {
        let mut released = 0;
        let mut cursor = self.tail;
        while let Some(node) = cursor.and_then(|id| self.nodes.release(id)) {
            cursor = node.prev();
            released += 1;
        }

        self.head = None;
        self.tail = None;
        self.len = 0;
        released
    }
}

impl Drop for DoublyLinkedList {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// renders as `v1->v2->...->NULL`
impl fmt::Display for DoublyLinkedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in self.traverse() {
            write!(f, "{value}->")?;
        }
        f.write_str("NULL")
    }
}

impl fmt::Debug for DoublyLinkedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.traverse()).finish()
    }
}

impl<'a> IntoIterator for &'a DoublyLinkedList {
    type Item = &'a str;
    type IntoIter = Traverse<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.traverse()
    }
}

/// a borrowed walk over a list's values, in either direction
#[derive(Clone)]
pub struct Traverse<'a> {
    list: &'a DoublyLinkedList,
    cursor: Option<NodeId>,
    remaining: usize,
    backward: bool,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = &self.list.nodes[id];
        self.cursor = if self.backward {
            node.prev()
        } else {
            node.next()
        };
        self.remaining = self.remaining.saturating_sub(1);
        Some(node.value())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Traverse<'_> {}

impl FusedIterator for Traverse<'_> {}

/// a read-only look at one node and its links
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeView<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn value(&self) -> &'a str {
        self.node.value()
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.node.prev()
    }

    pub fn next(&self) -> Option<NodeId> {
        self.node.next()
    }
}

impl fmt::Display for NodeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn link(f: &mut fmt::Formatter<'_>, id: Option<NodeId>) -> fmt::Result {
            match id {
                Some(id) => write!(f, "{id}"),
                None => f.write_str("NULL"),
            }
        }

        write!(f, "Node {}: {}, Previous: ", self.id, self.value())?;
        link(f, self.prev())?;
        f.write_str(", Next: ")?;
        link(f, self.next())
    }
}

#[cfg(test)]
impl DoublyLinkedList {
    /// panics if the head/tail boundaries, the mutual prev/next links or the
    /// node count disagree with each other
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.nodes.live(), self.len, "live slots must match len");

        match self.len {
            0 => {
                assert!(self.head.is_none(), "empty list has a head");
                assert!(self.tail.is_none(), "empty list has a tail");
                return;
            }
            1 => {
                assert_eq!(self.head, self.tail, "single node must be head and tail");
            }
            _ => {
                assert_ne!(self.head, self.tail, "head and tail must differ");
            }
        }

        let head = self.head.expect("non-empty list must have a head");
        let tail = self.tail.expect("non-empty list must have a tail");
        assert!(self.nodes[head].prev().is_none(), "head has a prev link");
        assert!(self.nodes[tail].next().is_none(), "tail has a next link");

        let mut forward = 0;
        let mut cursor = Some(head);
        let mut last = head;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            if let Some(next) = node.next() {
                assert_eq!(self.nodes[next].prev(), Some(id), "next.prev must point back");
            }
            if let Some(prev) = node.prev() {
                assert_eq!(self.nodes[prev].next(), Some(id), "prev.next must point back");
            }
            forward += 1;
            assert!(forward <= self.len, "forward walk overran len");
            last = id;
            cursor = node.next();
        }
        assert_eq!(forward, self.len, "forward walk length");
        assert_eq!(last, tail, "forward walk must end at tail");

        let mut backward = 0;
        let mut cursor = Some(tail);
        let mut last = tail;
        while let Some(id) = cursor {
            backward += 1;
            assert!(backward <= self.len, "backward walk overran len");
            last = id;
            cursor = self.nodes[id].prev();
        }
        assert_eq!(backward, self.len, "backward walk length");
        assert_eq!(last, head, "backward walk must end at head");
    }

    pub(crate) fn values(&self) -> Vec<String> {
        self.traverse().map(String::from).collect()
    }
}


// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test))]
mod proptests {
    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::test_runner::Config;
    use proptest_derive::Arbitrary;
    use proptest_state_machine::{ReferenceStateMachine, StateMachineTest};
    use rand::Rng;

    use super::*;

    fn list_from(values: &[String]) -> DoublyLinkedList {
        let mut list = DoublyLinkedList::new(&values[0]).expect("failed to create list");
        for value in &values[1..] {
            list.append(value).expect("failed to append");
        }
        list
    }

    proptest_state_machine::prop_state_machine! {
        #![proptest_config(Config {
            failure_persistence: None,
            .. Config::default()
        })]

        #[test]
        fn doubly_linked_list_state_machine_test(
            sequential
            1..200
            =>
            DoublyLinkedList
        );
    }

    #[derive(Clone, Debug)]
    pub enum Transition {
        Append(String),
        Insert(usize, String),
        Delete(usize),
        Find(String),
    }

    pub struct DoublyLinkedListStateMachine;

    impl ReferenceStateMachine for DoublyLinkedListStateMachine {
        type State = Vec<String>;
        type Transition = Transition;

        fn init_state() -> BoxedStrategy<Self::State> {
            Just(vec![String::from("Head")]).boxed()
        }

        fn transitions(state: &Self::State) -> BoxedStrategy<Self::Transition> {
            // one past the valid range so the out-of-range paths get exercised
            let bound = state.len() + 1;
            let value = "[a-c]{0,3}";
            prop_oneof![
                2 => value.prop_map(Transition::Append),
                3 => (0..=bound, value).prop_map(|(i, v)| Transition::Insert(i, v)),
                3 => (0..=bound).prop_map(Transition::Delete),
                1 => value.prop_map(Transition::Find),
            ]
            .boxed()
        }

        fn apply(mut state: Self::State, transition: &Self::Transition) -> Self::State {
            match transition {
                Transition::Append(value) => state.push(value.clone()),
                Transition::Insert(index, value) => {
                    if *index <= state.len() {
                        state.insert(*index, value.clone());
                    }
                }
                Transition::Delete(index) => {
                    if *index < state.len() {
                        state.remove(*index);
                    }
                }
                Transition::Find(_) => {}
            }
            state
        }
    }

    impl StateMachineTest for DoublyLinkedList {
        type SystemUnderTest = Self;
        type Reference = DoublyLinkedListStateMachine;

        fn init_test(
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) -> Self::SystemUnderTest {
            list_from(ref_state)
        }

        fn apply(
            mut state: Self::SystemUnderTest,
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
            transition: Transition,
        ) -> Self::SystemUnderTest {
            let len = state.len();
            match transition {
                Transition::Append(value) => {
                    state.append(&value).expect("append must succeed");
                }
                Transition::Insert(index, value) => {
                    let result = state.insert(index, &value);
                    if index > len {
                        assert_eq!(result, Err(ListError::OutOfRange { index, len }));
                    } else {
                        assert_eq!(result, Ok(()));
                    }
                }
                Transition::Delete(index) => {
                    let result = state.delete(index);
                    if index >= len {
                        assert_eq!(result, Err(ListError::OutOfRange { index, len }));
                    } else {
                        assert!(result.is_ok());
                    }
                }
                Transition::Find(target) => {
                    let expected = ref_state.iter().position(|value| *value == target);
                    assert_eq!(state.find(&target), expected);
                }
            }
            state
        }

        fn check_invariants(
            state: &Self::SystemUnderTest,
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) {
            state.assert_invariants();
            assert_eq!(&state.values(), ref_state);
        }
    }

    proptest! {
        #[test]
        fn insert_then_delete_restores_list(
            values in vec("[a-z]{1,5}", 1..16),
            position in any::<prop::sample::Index>(),
            value in "[a-z]{1,5}",
        ) {
            let mut list = list_from(&values);
            let index = position.index(list.len() + 1);

            list.insert(index, &value).unwrap();
            list.assert_invariants();
            prop_assert_eq!(list.delete(index).unwrap(), value);
            list.assert_invariants();
            prop_assert_eq!(list.values(), values);
        }

        #[test]
        fn append_matches_insert_at_len(
            values in vec("[a-z]{1,5}", 1..16),
            value in "[a-z]{1,5}",
        ) {
            let mut appended = list_from(&values);
            let mut inserted = list_from(&values);

            appended.append(&value).unwrap();
            let len = inserted.len();
            inserted.insert(len, &value).unwrap();

            prop_assert_eq!(appended.values(), inserted.values());
            inserted.assert_invariants();
        }

        #[test]
        fn out_of_range_leaves_list_unchanged(values in vec("[a-z]{1,5}", 1..16)) {
            let mut list = list_from(&values);
            let len = list.len();

            prop_assert_eq!(
                list.insert(len + 1, "x"),
                Err(ListError::OutOfRange { index: len + 1, len })
            );
            prop_assert_eq!(list.delete(len), Err(ListError::OutOfRange { index: len, len }));
            prop_assert_eq!(list.values(), values);
            list.assert_invariants();
        }

        #[test]
        fn destroy_releases_exactly_len_nodes(values in vec("[a-z]{1,5}", 1..64)) {
            let list = list_from(&values);
            prop_assert_eq!(list.live_nodes(), values.len());
            prop_assert_eq!(list.destroy(), values.len());
        }
    }

    #[derive(Arbitrary, Debug)]
    enum Operation {
        Append(#[proptest(regex = "[a-d]{1,3}")] String),
        Insert(#[proptest(regex = "[a-d]{1,3}")] String),
        Delete,
        Find(#[proptest(regex = "[a-d]{1,3}")] String),
        Traverse,
    }

    proptest! {
        #[test]
        fn longform(ops in vec(any::<Operation>(), 512)) {
            let mut reference = vec![String::from("Head")];
            let mut list = DoublyLinkedList::new("Head").unwrap();

            for op in ops.iter() {
                match op {
                    Operation::Append(value) => {
                        reference.push(value.clone());
                        list.append(value).unwrap();
                    }
                    Operation::Insert(value) => {
                        let index = rand::thread_rng().gen_range(0..=reference.len());
                        reference.insert(index, value.clone());
                        list.insert(index, value).unwrap();
                    }
                    Operation::Delete => {
                        if !reference.is_empty() {
                            let index = rand::thread_rng().gen_range(0..reference.len());
                            let expected = reference.remove(index);
                            prop_assert_eq!(list.delete(index).unwrap(), expected);
                        }
                    }
                    Operation::Find(target) => {
                        let expected = reference.iter().position(|value| value == target);
                        prop_assert_eq!(list.find(target), expected);
                    }
                    Operation::Traverse => {
                        prop_assert!(list.traverse().eq(reference.iter().map(String::as_str)));
                        prop_assert!(list.traverse_back().eq(reference.iter().rev().map(String::as_str)));
                    }
                }
                list.assert_invariants();
            }
        }
    }
}
