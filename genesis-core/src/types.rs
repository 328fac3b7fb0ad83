use std::fmt;

slotmap::new_key_type! {
    /// Handle to a [`crate::node::Node`] stored in a [`crate::scene::Scene`].
    ///
    /// Handles are generational: once a node is swept from the scene its
    /// handle stops resolving, even if the slot is later reused.
    pub struct NodeId;
}

/// Identifier of a trait attached to a node.
///
/// Allocated by the owning [`crate::scene::Scene`] and unique within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraitId(pub u64);

impl fmt::Display for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
