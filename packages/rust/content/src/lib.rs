//! Content normalization: rendered element trees → ordered content blocks.
//!
//! The pipeline is three pure steps:
//! 1. [`tree`]: an owned snapshot ([`Node`]) of a rendered container
//! 2. [`extract()`]: classify children into [`ContentBlock`]s in document order
//! 3. [`regroup()`]: merge runs of quoted lines into quote groups
//!
//! Nothing here performs I/O or holds state between calls, so it can run on
//! any number of pages concurrently.

pub mod extract;
pub mod normalize;
pub mod regroup;
pub mod tree;

use qaharvest_shared::ContentBlock;
use tracing::trace;

pub use extract::extract;
pub use normalize::normalize;
pub use regroup::regroup;
pub use tree::{Descendants, Node, Tag};

/// Extract and regroup a body container in one step.
pub fn content_blocks(container: &Node) -> Vec<ContentBlock> {
    let blocks = regroup(extract(container));
    trace!(tag = %container.tag, blocks = blocks.len(), "extracted content blocks");
    blocks
}
