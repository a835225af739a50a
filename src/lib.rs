//! # csr-graph — Immutable CSR Graph Topology
//!
//! The topology layer of a graph analytics library: a static directed graph
//! stored in compressed sparse-row form, cheap typed handles over it, and
//! dtype-indexed template types that stand for a whole family of
//! element-specialized implementations.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphTopology` is the contract every graph-like
//!    handle satisfies, so specialized call sites never care which one they got
//! 2. **Immutable after build**: no locks, no interior mutability, readers scale
//! 3. **Zero-copy handles**: `GraphHandle<T>` is an `Arc` plus a type marker
//! 4. **Explicit dispatch**: `TemplateType` maps a runtime dtype tag to the
//!    concrete variant instead of relying on type-system tricks
//!
//! ## Quick Start
//!
//! ```rust
//! use csr_graph::{CsrTopology, GraphTopology, NodeId, EdgeRange};
//!
//! # fn example() -> csr_graph::Result<()> {
//! // Node 0 has no out-edges, node 1 owns edges [0, 2), node 2 has none.
//! let graph = CsrTopology::from_raw(vec![0, 2, 2], vec![0, 2])?;
//!
//! assert_eq!(graph.len(), 3);
//! assert_eq!(graph.out_edges(NodeId(1))?, EdgeRange::new(0, 2));
//!
//! for node in graph.nodes() {
//!     let range = graph.out_edges(node)?;
//!     println!("{node}: {} out-edges", range.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Template Types
//!
//! | Tag | Variant |
//! |-----|---------|
//! | `"int32"`, `"i4"`, `DType::Int32` | `GraphHandle<i32>` |
//! | `"float64"`, `"f8"`, `"float"` | `GraphHandle<f64>` |
//! | ... | one per supported `DType` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod handle;
pub mod template;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{DType, Element, DTypeTag, EdgeId, EdgeRange, NodeId};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{
    BuildOptions, CsrBuilder, CsrTopology, GraphTopology, Nodes, OutEdges,
    divide_by_node, divide_range,
};
pub use storage::partition::{NodeRanges, WorkRanges};

// ============================================================================
// Re-exports: Handles & templates
// ============================================================================

pub use handle::{GraphHandle, NodeArray, graph_template};
pub use template::{Specialization, StaticSurface, TemplateType, TypeInfo, Variant};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: u64,
        len: u64,
    },

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Template '{0}' must be built with at least one variant")]
    EmptyRegistry(String),

    #[error("Template '{template}' declares dtype {dtype} more than once")]
    DuplicateVariant { template: String, dtype: DType },

    #[error("Template '{template}' has no variant for '{tag}'")]
    UnknownVariant { template: String, tag: String },

    #[error("{0} cannot be instantiated directly. Select a specific type with {0}[...].")]
    DirectInstantiation(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
