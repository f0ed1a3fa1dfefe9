/*!
 * Core Types
 * Common types used across the simulator
 */

/// Size of a block or of the whole address space, in simulation units (MB)
pub type Size = usize;

/// Offset of a block from the start of the address space
pub type Offset = usize;

/// Sequence number assigned to each command a session executes
pub type CommandSeq = u64;
