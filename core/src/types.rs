//! Shared primitive types used across the entire engine.

/// Identifier of a pet configuration. Unique within one EngineState.
pub type PetId = String;

/// Identifier of a skill or sub-config entry owned by a pet.
pub type EntryId = String;

/// The queue always has exactly this many slots.
pub const QUEUE_SLOTS: usize = 6;

/// A pet never holds more sub-config entries than this.
pub const MAX_SUB_CONFIGS: usize = 4;

/// Version tag written into every export blob.
/// Blobs without a tag are treated as version 1.
pub const EXPORT_FORMAT_VERSION: u32 = 1;
