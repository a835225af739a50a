//! # Graph Model
//!
//! Plain value types shared by every layer: node and edge identifiers,
//! edge ranges, and the element datatypes that template types are keyed by.
//!
//! Design rule: this module is pure data — no storage, no state, no I/O.

pub mod node;
pub mod edge;
pub mod dtype;

pub use node::NodeId;
pub use edge::{EdgeId, EdgeRange};
pub use dtype::{DType, DTypeTag, Element};
