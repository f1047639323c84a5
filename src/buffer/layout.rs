//! Descriptions of how the bytes of a vertex buffer map to vertex attributes.

use gl;
use gl::types::*;

use crate::error::{Error, Result};

/// The numeric type of the components of a vertex attribute.
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Float         = gl::FLOAT,
    Int           = gl::INT,
    UnsignedInt   = gl::UNSIGNED_INT,
    Short         = gl::SHORT,
    UnsignedShort = gl::UNSIGNED_SHORT,
    Byte          = gl::BYTE,
    UnsignedByte  = gl::UNSIGNED_BYTE,
}

impl ElementKind {
    /// The size of a single component of this kind, in bytes.
    pub fn size(self) -> usize {
        match self {
            ElementKind::Float | ElementKind::Int | ElementKind::UnsignedInt => 4,
            ElementKind::Short | ElementKind::UnsignedShort                 => 2,
            ElementKind::Byte  | ElementKind::UnsignedByte                  => 1,
        }
    }

    pub fn gl_enum(self) -> GLenum {
        self as GLenum
    }
}

/// This trait is used to mark rust primitives which can be pushed onto a [`VertexLayout`]. You
/// should not implement this trait yourself.
///
/// [`VertexLayout`]: struct.VertexLayout.html
pub trait LayoutPrimitive {
    const KIND: ElementKind;
    /// Whether integer values of this type are mapped to `0.0..1.0` (or `-1.0..1.0`) when read
    /// by a shader, unless specified otherwise.
    const NORMALIZED: bool;
}

impl LayoutPrimitive for f32 { const KIND: ElementKind = ElementKind::Float;         const NORMALIZED: bool = false; }
impl LayoutPrimitive for i32 { const KIND: ElementKind = ElementKind::Int;           const NORMALIZED: bool = false; }
impl LayoutPrimitive for u32 { const KIND: ElementKind = ElementKind::UnsignedInt;   const NORMALIZED: bool = false; }
impl LayoutPrimitive for i16 { const KIND: ElementKind = ElementKind::Short;         const NORMALIZED: bool = false; }
impl LayoutPrimitive for u16 { const KIND: ElementKind = ElementKind::UnsignedShort; const NORMALIZED: bool = false; }
impl LayoutPrimitive for i8  { const KIND: ElementKind = ElementKind::Byte;          const NORMALIZED: bool = true; }
impl LayoutPrimitive for u8  { const KIND: ElementKind = ElementKind::UnsignedByte;  const NORMALIZED: bool = true; }

/// One attribute of a vertex record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexElement {
    /// The number of components, between 1 and 4. e.g.: `3` presents the attribute as a
    /// `vec3` in glsl.
    pub count: usize,
    pub kind: ElementKind,
    /// If set to true, integer types will be parsed as floats and mapped to the range `0.0..1.0`
    /// for unsigned integers and `-1.0..1.0` for signed integers.
    pub normalized: bool,
}

impl VertexElement {
    /// The component count is checked when the layout is bound to a vertex array, see
    /// [`VertexLayout::validate`](struct.VertexLayout.html#method.validate).
    pub fn new(count: usize, kind: ElementKind, normalized: bool) -> VertexElement {
        VertexElement { count, kind, normalized }
    }

    /// The number of bytes this element occupies in a vertex record.
    pub fn size(&self) -> usize {
        self.count * self.kind.size()
    }
}

/// A vertex element together with the attribute slot and byte offset it is bound at. Produced
/// by [`VertexLayout::attributes`].
///
/// [`VertexLayout::attributes`]: struct.VertexLayout.html#method.attributes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub slot: usize,
    pub element: VertexElement,
    /// The distance, in bytes, from the start of a vertex record to this attribute.
    pub offset: usize,
}

/// An ordered list of the attributes in one interleaved vertex record. Elements are pushed in
/// memory order, and their position in the list is their attribute slot.
///
/// # Example
/// ```rust
/// use easel::buffer::VertexLayout;
///
/// let mut layout = VertexLayout::new();
/// layout.push::<f32>(2); // Position
/// layout.push::<f32>(2); // Texture coordinate
///
/// assert_eq!(layout.stride(), 16);
/// let offsets: Vec<usize> = layout.attributes().map(|a| a.offset).collect();
/// assert_eq!(offsets, vec![0, 8]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    elements: Vec<VertexElement>,
    stride: usize,
}

impl VertexLayout {
    pub fn new() -> VertexLayout {
        VertexLayout::default()
    }

    /// Appends an element of `count` components of type `T`.
    pub fn push<T: LayoutPrimitive>(&mut self, count: usize) -> &mut VertexLayout {
        self.push_element(VertexElement::new(count, T::KIND, T::NORMALIZED))
    }

    pub fn push_element(&mut self, element: VertexElement) -> &mut VertexLayout {
        self.stride += element.size();
        self.elements.push(element);
        self
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    /// Fails with `Error::InvalidElement` for the first element which does not have between 1
    /// and 4 components.
    pub fn validate(&self) -> Result<()> {
        match self.elements.iter().find(|element| !(1..=4).contains(&element.count)) {
            Some(element) => Err(Error::InvalidElement { count: element.count }),
            None          => Ok(()),
        }
    }

    /// The distance, in bytes, between the starts of two consecutive vertex records.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Yields every element with its slot and byte offset. The offset of an element is the
    /// summed size of all elements before it.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        self.elements.iter()
            .scan(0, |offset, element| {
                let start = *offset;
                *offset += element.size();
                Some((start, *element))
            })
            .enumerate()
            .map(|(slot, (offset, element))| Attribute { slot, element, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_sums_element_sizes() {
        let mut layout = VertexLayout::new();
        layout.push::<f32>(3).push::<u8>(4).push::<u32>(1);
        assert_eq!(layout.stride(), 3*4 + 4*1 + 1*4);
        assert_eq!(layout.elements().len(), 3);
    }

    #[test]
    fn offsets_exclude_own_size() {
        let mut layout = VertexLayout::new();
        layout.push::<f32>(2).push::<u8>(4).push::<f32>(3).push::<i16>(2);

        let attributes: Vec<Attribute> = layout.attributes().collect();
        let offsets: Vec<usize> = attributes.iter().map(|a| a.offset).collect();
        let slots: Vec<usize> = attributes.iter().map(|a| a.slot).collect();
        assert_eq!(offsets, vec![0, 8, 12, 24]);
        assert_eq!(slots, vec![0, 1, 2, 3]);

        let last = attributes.last().unwrap();
        assert_eq!(last.offset + last.element.size(), layout.stride());
    }

    #[test]
    fn bytes_default_to_normalized() {
        let mut layout = VertexLayout::new();
        layout.push::<u8>(4).push::<f32>(2);
        assert!(layout.elements()[0].normalized);
        assert!(!layout.elements()[1].normalized);
    }

    #[test]
    fn empty_layout() {
        let layout = VertexLayout::new();
        assert_eq!(layout.stride(), 0);
        assert_eq!(layout.attributes().count(), 0);
    }

    #[test]
    fn component_counts_outside_one_to_four_are_rejected() {
        let mut layout = VertexLayout::new();
        layout.push::<f32>(2).push::<f32>(5);
        match layout.validate() {
            Err(Error::InvalidElement { count }) => assert_eq!(count, 5),
            other => panic!("Expected an invalid element error, got {:?}", other),
        }

        let mut layout = VertexLayout::new();
        layout.push::<u8>(0);
        assert!(layout.validate().is_err());

        let mut layout = VertexLayout::new();
        layout.push::<f32>(1).push::<f32>(4);
        assert!(layout.validate().is_ok());
    }
}
