//! # Template Types
//!
//! One name standing for a family of dtype-specialized concrete types.
//!
//! A `TemplateType` is built once from a fixed list of `Variant`s and is
//! read-only afterward. It answers three questions:
//!
//! - **Which type?** `resolve(tag)` normalizes a dtype-like tag and returns
//!   the matching variant.
//! - **Is this one of ours?** `is_instance` / `is_subtype` are true against
//!   *any* variant.
//! - **What does the family look like?** The first-declared variant is the
//!   representative; its `StaticSurface` is the template's own surface.
//!
//! The template itself is never constructed. `TemplateType::instantiate`
//! always fails with `Error::DirectInstantiation`; construct through
//! `resolve(tag)?.instantiate(args)`.
//!
//! ```text
//! TemplateType "GraphHandle"
//!   int64  → GraphHandle<i64>   (representative)
//!   int32  → GraphHandle<i32>
//!   ...
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::model::{DType, DTypeTag, Element};
use crate::{Error, Result};

// ============================================================================
// TypeInfo
// ============================================================================

/// Runtime identity of a Rust type.
///
/// Equality is by `TypeId`; the name is only for messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// StaticSurface — the delegation table
// ============================================================================

/// Class-level surface of a concrete type: everything a template forwards
/// from its representative. Instance state is never part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSurface {
    pub type_name: &'static str,
    pub doc: &'static str,
    pub methods: &'static [&'static str],
    /// Bytes per element of the specialized dtype.
    pub itemsize: usize,
}

impl StaticSurface {
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains(&name)
    }
}

// ============================================================================
// Specialization
// ============================================================================

/// A concrete, dtype-specialized type that can be registered in a template.
///
/// `Args` is what every variant of one template is constructed from, so the
/// erased constructor has the same signature across the family.
pub trait Specialization: Any + Send + Sync + Sized {
    type Args;
    type Elem: Element;

    fn instantiate(args: Self::Args) -> Self;

    fn surface() -> StaticSurface;
}

// ============================================================================
// Variant
// ============================================================================

/// Type-erased entry of a template: one concrete type and its constructor.
pub struct Variant<A> {
    dtype: DType,
    type_info: TypeInfo,
    surface: StaticSurface,
    construct: fn(A) -> Box<dyn Any + Send + Sync>,
}

impl<A: 'static> Variant<A> {
    pub fn of<S: Specialization<Args = A>>() -> Self {
        Self {
            dtype: S::Elem::DTYPE,
            type_info: TypeInfo::of::<S>(),
            surface: S::surface(),
            construct: construct_boxed::<S>,
        }
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    pub fn surface(&self) -> &StaticSurface {
        &self.surface
    }

    /// Construct an instance, type-erased.
    pub fn instantiate(&self, args: A) -> Box<dyn Any + Send + Sync> {
        (self.construct)(args)
    }

    /// Construct an instance as `S`, which must be this variant's type.
    pub fn instantiate_as<S: Specialization<Args = A>>(&self, args: A) -> Result<S> {
        if TypeInfo::of::<S>() != self.type_info {
            return Err(Error::TypeMismatch {
                expected: self.type_info.name().into(),
                got: std::any::type_name::<S>().into(),
            });
        }
        Ok(S::instantiate(args))
    }

    /// Also accepts the box returned by `instantiate` and checks its
    /// contents, so `&boxed` and `&*boxed` agree.
    pub fn is_instance(&self, value: &dyn Any) -> bool {
        let value: &dyn Any = match value.downcast_ref::<Box<dyn Any + Send + Sync>>() {
            Some(boxed) => &**boxed,
            None => value,
        };
        value.type_id() == self.type_info.id()
    }

    /// Rust has no inheritance between concrete types: a subtype is the
    /// type itself.
    pub fn is_subtype(&self, candidate: TypeInfo) -> bool {
        candidate == self.type_info
    }
}

fn construct_boxed<S: Specialization>(args: S::Args) -> Box<dyn Any + Send + Sync> {
    Box::new(S::instantiate(args))
}

impl<A> fmt::Debug for Variant<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("dtype", &self.dtype)
            .field("type", &self.type_info.name())
            .finish()
    }
}

// ============================================================================
// TemplateType
// ============================================================================

/// The façade over a family of variants.
pub struct TemplateType<A> {
    name: String,
    /// Declaration order; index 0 is the representative.
    variants: Vec<Variant<A>>,
    by_dtype: HashMap<DType, usize>,
}

impl<A: 'static> TemplateType<A> {
    /// Build a template. The first variant becomes the representative.
    ///
    /// Fails with `Error::EmptyRegistry` for an empty list and
    /// `Error::DuplicateVariant` when two variants share a dtype.
    pub fn build<I>(name: impl Into<String>, variants: I) -> Result<Self>
    where
        I: IntoIterator<Item = Variant<A>>,
    {
        let name = name.into();
        let variants: Vec<Variant<A>> = variants.into_iter().collect();
        if variants.is_empty() {
            return Err(Error::EmptyRegistry(name));
        }

        let mut by_dtype = HashMap::with_capacity(variants.len());
        for (i, variant) in variants.iter().enumerate() {
            if by_dtype.insert(variant.dtype, i).is_some() {
                return Err(Error::DuplicateVariant {
                    template: name,
                    dtype: variant.dtype,
                });
            }
        }

        debug!(
            template = %name,
            variants = variants.len(),
            representative = variants[0].type_info.name(),
            "built template type"
        );

        Ok(Self {
            name,
            variants,
            by_dtype,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn representative(&self) -> &Variant<A> {
        &self.variants[0]
    }

    /// Variants in declaration order.
    pub fn variants(&self) -> impl Iterator<Item = &Variant<A>> {
        self.variants.iter()
    }

    pub fn dtypes(&self) -> impl Iterator<Item = DType> + '_ {
        self.variants.iter().map(|v| v.dtype)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Always false: a template has at least one variant.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Lookup without an error: `None` for unknown or unparsable tags.
    pub fn get(&self, tag: impl DTypeTag) -> Option<&Variant<A>> {
        self.lookup(tag.to_dtype()?)
    }

    fn lookup(&self, dtype: DType) -> Option<&Variant<A>> {
        self.by_dtype.get(&dtype).map(|&i| &self.variants[i])
    }

    pub fn contains(&self, tag: impl DTypeTag) -> bool {
        self.get(tag).is_some()
    }

    /// Normalize `tag` and return the matching variant.
    pub fn resolve(&self, tag: impl DTypeTag) -> Result<&Variant<A>> {
        let variant = tag
            .to_dtype()
            .and_then(|dtype| self.lookup(dtype))
            .ok_or_else(|| Error::UnknownVariant {
                template: self.name.clone(),
                tag: tag.describe(),
            })?;
        trace!(template = %self.name, dtype = %variant.dtype, "resolved variant");
        Ok(variant)
    }

    /// Variant for the Rust element type `T`.
    pub fn resolve_element<T: Element>(&self) -> Result<&Variant<A>> {
        self.resolve(T::DTYPE)
    }

    /// True iff `value` is an instance of any variant. A
    /// `Box<dyn Any + Send + Sync>` from `Variant::instantiate` is checked
    /// by its contents.
    pub fn is_instance(&self, value: &dyn Any) -> bool {
        self.variants.iter().any(|v| v.is_instance(value))
    }

    /// True iff `candidate` is a subtype of any variant.
    pub fn is_subtype(&self, candidate: TypeInfo) -> bool {
        self.variants.iter().any(|v| v.is_subtype(candidate))
    }

    /// The template cannot be constructed; select a variant first.
    pub fn instantiate(&self, _args: A) -> Result<Box<dyn Any + Send + Sync>> {
        Err(Error::DirectInstantiation(self.name.clone()))
    }

    // ========================================================================
    // Forwarded from the representative
    // ========================================================================

    pub fn surface(&self) -> &StaticSurface {
        self.representative().surface()
    }

    pub fn doc(&self) -> &'static str {
        self.surface().doc
    }

    pub fn methods(&self) -> &'static [&'static str] {
        self.surface().methods
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.surface().has_method(name)
    }
}

impl<A> fmt::Display for TemplateType<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<template class '{}'>", self.name)
    }
}

impl<A> fmt::Debug for TemplateType<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateType")
            .field("name", &self.name)
            .field("variants", &self.variants)
            .finish()
    }
}
