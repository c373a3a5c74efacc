pub mod doubly_linked_list;
pub mod node;
pub mod node_arena;

pub use doubly_linked_list::{DoublyLinkedList, NodeView, Traverse};
pub use node::Node;
pub use node_arena::{NodeArena, NodeId};
