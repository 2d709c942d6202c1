/*!
 * # Editing Core Module
 *
 * The document model and command layer for comment composition.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: Immutable Snapshots
 * - The comment being composed is a [`Document`]: typed blocks of styled
 *   runs plus the current selection
 * - Documents are value types; every edit produces a **new** snapshot via
 *   [`Document::apply`], so re-render triggers reduce to comparing
 *   [`Document::version`] and undo/redo reduces to keeping old snapshots
 *
 * ### 2. Command-Based Editing
 * - All edits are represented as **Commands** ([`Cmd`]) applied through one
 *   entry point; commands are pure and total on well-formed documents
 * - Key events resolve to commands through [`map_key`], so every frontend
 *   binds Tab, Enter and the Ctrl chords identically
 *
 * ### 3. Run Invariants
 * - Block text is stored as runs with style sets; normalization after every
 *   mutation guarantees no two adjacent runs share a style set and every
 *   block keeps at least one run
 *
 * ### 4. Read API: Control Surface
 * - [`controls`] derives toolbar state (which block type / inline styles
 *   are active at the selection) from a snapshot, with no side effects
 *
 * ## Module Structure
 *
 * - **`style`**: inline style vocabulary and membership sets
 * - **`block`**: block types, stable block keys, runs and run surgery
 * - **`document`**: the `Document` snapshot, selection and validation
 * - **`commands`**: the `Cmd` enum, key binding map and command application
 * - **`controls`**: static toolbar catalogs and derived active states
 */

pub mod block;
pub mod commands;
pub mod controls;
pub mod document;
pub mod style;

pub use block::{Block, BlockKey, BlockType, MAX_LIST_DEPTH, Run};
pub use commands::{Cmd, Key, KeyCommand, KeyPress, map_key};
pub use controls::{
    BLOCK_TYPES, BlockControl, ControlState, INLINE_STYLES, InlineControl, block_controls,
    inline_controls,
};
pub use document::{Document, EditError, Point, Selection};
pub use style::{InlineStyle, StyleSet};
