//! Indirect command buffer layout definitions

use bytemuck::{Pod, Zeroable};

/// Indexed indirect draw command as consumed by the indirect-draw pass.
/// Total size: 20 bytes.
///
/// The culler only ever writes 0 or 1 into `instance_count`; every other
/// field is passed through from the input command unchanged.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawElementsIndirectCommand {
    /// Number of indices to draw
    pub index_count: u32,

    /// Number of instances to draw (0 = culled)
    pub instance_count: u32,

    /// Offset into the index buffer
    pub first_index: u32,

    /// Value added to each index before fetching vertex
    pub base_vertex: i32,

    /// Offset into the instance buffer
    pub base_instance: u32,
}

impl DrawElementsIndirectCommand {
    /// Create a new draw command
    pub fn new(index_count: u32, instance_count: u32) -> Self {
        Self {
            index_count,
            instance_count,
            first_index: 0,
            base_vertex: 0,
            base_instance: 0,
        }
    }

    /// Create a draw command with offsets
    pub fn with_offsets(
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        base_instance: u32,
    ) -> Self {
        Self {
            index_count,
            instance_count,
            first_index,
            base_vertex,
            base_instance,
        }
    }

    /// The command with `instance_count` replaced, everything else intact
    pub fn with_instance_count(mut self, instance_count: u32) -> Self {
        self.instance_count = instance_count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_layout_is_20_bytes() {
        assert_eq!(std::mem::size_of::<DrawElementsIndirectCommand>(), 20);
    }

    #[test]
    fn with_instance_count_preserves_other_fields() {
        let command = DrawElementsIndirectCommand::with_offsets(96, 0, 12, -4, 7);
        let updated = command.with_instance_count(1);

        assert_eq!(updated.instance_count, 1);
        assert_eq!(updated.index_count, 96);
        assert_eq!(updated.first_index, 12);
        assert_eq!(updated.base_vertex, -4);
        assert_eq!(updated.base_instance, 7);
    }
}
