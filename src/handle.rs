//! Typed graph handles.
//!
//! A `GraphHandle<T>` is an `Arc<CsrTopology>` tagged with an element type.
//! Cloning one bumps a reference count; the CSR arrays are never copied, and
//! handles of different element types can share one topology.
//!
//! Every `GraphHandle<T>` instantiation is a variant of the process-wide
//! [`graph_template`], so code that only knows a dtype at runtime can still
//! reach the right specialization.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use crate::model::{DType, Element, NodeId};
use crate::storage::{CsrTopology, GraphTopology};
use crate::template::{Specialization, StaticSurface, TemplateType, Variant};
use crate::{Error, Result};

// ============================================================================
// GraphHandle
// ============================================================================

/// Zero-copy, element-typed view of a shared topology.
pub struct GraphHandle<T: Element> {
    topology: Arc<CsrTopology>,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> GraphHandle<T> {
    pub fn new(topology: Arc<CsrTopology>) -> Self {
        Self {
            topology,
            _element: PhantomData,
        }
    }

    pub fn from_topology(topology: CsrTopology) -> Self {
        Self::new(Arc::new(topology))
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    pub fn topology(&self) -> &CsrTopology {
        &self.topology
    }

    pub fn shared(&self) -> &Arc<CsrTopology> {
        &self.topology
    }

    /// Whether both handles wrap the same topology allocation.
    pub fn ptr_eq<U: Element>(&self, other: &GraphHandle<U>) -> bool {
        Arc::ptr_eq(&self.topology, &other.topology)
    }

    /// The same topology under another element type.
    pub fn retype<U: Element>(&self) -> GraphHandle<U> {
        GraphHandle::new(Arc::clone(&self.topology))
    }

    /// A dense per-node array of `T`, every slot set to `fill`.
    pub fn node_array(&self, fill: T) -> NodeArray<T> {
        NodeArray::new(self.node_count(), fill)
    }
}

impl<T: Element> Clone for GraphHandle<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.topology))
    }
}

impl<T: Element> fmt::Debug for GraphHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphHandle")
            .field("dtype", &T::DTYPE)
            .field("nodes", &self.topology.node_count())
            .field("edges", &self.topology.edge_count())
            .finish()
    }
}

impl<T: Element> GraphTopology for GraphHandle<T> {
    fn node_count(&self) -> u64 {
        self.topology.node_count()
    }

    fn edge_count(&self) -> u64 {
        self.topology.edge_count()
    }

    fn edge_range_end(&self, node: NodeId) -> Result<u64> {
        self.topology.edge_range_end(node)
    }
}

const HANDLE_METHODS: &[&str] = &[
    "node_count",
    "edge_count",
    "edge_range_end",
    "out_edges",
    "nodes",
    "len",
    "dtype",
    "topology",
    "node_array",
];

impl<T: Element> Specialization for GraphHandle<T> {
    type Args = Arc<CsrTopology>;
    type Elem = T;

    fn instantiate(topology: Arc<CsrTopology>) -> Self {
        Self::new(topology)
    }

    fn surface() -> StaticSurface {
        StaticSurface {
            type_name: std::any::type_name::<Self>(),
            doc: "Zero-copy, element-typed view of a shared CSR topology.",
            methods: HANDLE_METHODS,
            itemsize: T::DTYPE.itemsize(),
        }
    }
}

// ============================================================================
// Process-wide template
// ============================================================================

static GRAPH_TEMPLATE: LazyLock<TemplateType<Arc<CsrTopology>>> = LazyLock::new(|| {
    TemplateType::build(
        "GraphHandle",
        [
            Variant::of::<GraphHandle<i64>>(),
            Variant::of::<GraphHandle<i32>>(),
            Variant::of::<GraphHandle<i16>>(),
            Variant::of::<GraphHandle<i8>>(),
            Variant::of::<GraphHandle<u64>>(),
            Variant::of::<GraphHandle<u32>>(),
            Variant::of::<GraphHandle<u16>>(),
            Variant::of::<GraphHandle<u8>>(),
            Variant::of::<GraphHandle<f64>>(),
            Variant::of::<GraphHandle<f32>>(),
            Variant::of::<GraphHandle<bool>>(),
        ],
    )
    .expect("GraphHandle variants have distinct dtypes")
});

/// The `GraphHandle` template: one variant per supported `DType`, each
/// constructed from an `Arc<CsrTopology>`. The representative is
/// `GraphHandle<i64>`.
pub fn graph_template() -> &'static TemplateType<Arc<CsrTopology>> {
    &GRAPH_TEMPLATE
}

// ============================================================================
// NodeArray
// ============================================================================

/// Dense per-node working storage for algorithms (distances, labels, ranks).
#[derive(Debug, Clone, PartialEq)]
pub struct NodeArray<T: Element> {
    values: Box<[T]>,
}

impl<T: Element> NodeArray<T> {
    pub fn new(len: u64, fill: T) -> Self {
        Self {
            values: vec![fill; len as usize].into_boxed_slice(),
        }
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    pub fn len(&self) -> u64 {
        self.values.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Result<T> {
        self.values
            .get(node.index())
            .copied()
            .ok_or(Error::IndexOutOfRange {
                kind: "node",
                index: node.0,
                len: self.len(),
            })
    }

    pub fn set(&mut self, node: NodeId, value: T) -> Result<()> {
        let len = self.len();
        let slot = self.values.get_mut(node.index()).ok_or(Error::IndexOutOfRange {
            kind: "node",
            index: node.0,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// `(node, value)` pairs in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (NodeId(i as u64), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeRange;

    fn shared() -> Arc<CsrTopology> {
        Arc::new(CsrTopology::from_raw(vec![0, 2, 2], vec![0, 2]).unwrap())
    }

    #[test]
    fn test_handle_delegates_topology() {
        let h = GraphHandle::<i32>::new(shared());
        assert_eq!(h.len(), 3);
        assert_eq!(h.edge_count(), 2);
        assert_eq!(h.out_edges(NodeId(1)).unwrap(), EdgeRange::new(0, 2));
        assert!(h.edge_range_end(NodeId(3)).is_err());
        assert_eq!(h.dtype(), DType::Int32);
    }

    #[test]
    fn test_clone_shares_storage() {
        let topo = shared();
        let a = GraphHandle::<f64>::new(Arc::clone(&topo));
        let b = a.clone();
        let c: GraphHandle<u8> = a.retype();
        assert!(a.ptr_eq(&b));
        assert!(a.ptr_eq(&c));
        assert_eq!(Arc::strong_count(&topo), 4);
        drop((a, b, c));
        assert_eq!(Arc::strong_count(&topo), 1);
    }

    #[test]
    fn test_graph_template_resolves_every_dtype() {
        let t = graph_template();
        assert_eq!(t.name(), "GraphHandle");
        assert_eq!(t.len(), DType::ALL.len());
        for dtype in DType::ALL {
            let variant = t.resolve(dtype).unwrap();
            assert_eq!(variant.dtype(), dtype);
            assert_eq!(variant.surface().itemsize, dtype.itemsize());
        }
        assert_eq!(t.representative().dtype(), DType::Int64);
    }

    #[test]
    fn test_graph_template_constructs_handles() {
        let t = graph_template();
        let h: GraphHandle<i32> = t.resolve("i4").unwrap().instantiate_as(shared()).unwrap();
        assert_eq!(h.node_count(), 3);
        assert!(t.is_instance(&h));
        assert!(!t.is_instance(&*h.topology()));

        let boxed = t.resolve("float32").unwrap().instantiate(shared());
        assert!(boxed.downcast_ref::<GraphHandle<f32>>().is_some());

        assert!(matches!(
            t.instantiate(shared()),
            Err(Error::DirectInstantiation(ref name)) if name == "GraphHandle"
        ));
        assert!(t.has_method("out_edges"));
    }

    #[test]
    fn test_node_array() {
        let h = GraphHandle::<u32>::new(shared());
        let mut dist = h.node_array(u32::MAX);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist.dtype(), DType::UInt32);
        dist.set(NodeId(0), 0).unwrap();
        assert_eq!(dist.get(NodeId(0)).unwrap(), 0);
        assert_eq!(dist.get(NodeId(2)).unwrap(), u32::MAX);
        assert!(dist.set(NodeId(3), 1).is_err());
        assert!(matches!(
            dist.get(NodeId(9)),
            Err(Error::IndexOutOfRange { index: 9, len: 3, .. })
        ));
        dist.fill(7);
        assert!(dist.iter().all(|(_, v)| v == 7));
    }
}
