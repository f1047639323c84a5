use std::rc::Rc;

use gl::types::*;

use super::{Buffer, BufferTarget, ElementKind};
use crate::context::Context;
use crate::error::Result;

/// A buffer holding `u32` indices into the vertices of a vertex array. Each index must be
/// smaller than the number of vertices drawn with it. This is not checked, and out of range
/// indices read undefined vertex data.
#[derive(Debug)]
pub struct IndexBuffer {
    buffer: Buffer,
    count: usize,
}

impl IndexBuffer {
    /// The type of the indices stored in every index buffer.
    pub const INDEX_KIND: ElementKind = ElementKind::UnsignedInt;

    pub fn new(ctx: &Rc<Context>, indices: &[u32]) -> Result<IndexBuffer> {
        let buffer = Buffer::new(ctx, BufferTarget::ElementArray, bytemuck::cast_slice(indices))?;
        Ok(IndexBuffer { buffer, count: indices.len() })
    }

    /// The number of indices in this buffer.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bind(&self) -> Result<()> {
        self.buffer.bind()
    }

    pub fn unbind(&self) -> Result<()> {
        self.buffer.unbind()
    }

    pub fn handle(&self) -> GLuint {
        self.buffer.handle()
    }
}
