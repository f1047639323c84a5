use std::rc::Rc;

use bytemuck::Pod;
use gl::types::*;

use super::{Buffer, BufferTarget};
use crate::context::Context;
use crate::error::Result;

/// A buffer holding interleaved vertex records. How the bytes are interpreted is described by a
/// [`VertexLayout`] when the buffer is added to a [`VertexArray`].
///
/// [`VertexLayout`]: struct.VertexLayout.html
/// [`VertexArray`]:  ../vertex_array/struct.VertexArray.html
#[derive(Debug)]
pub struct VertexBuffer {
    buffer: Buffer,
}

impl VertexBuffer {
    /// Uploads the given raw bytes. The data is uploaded once and never modified.
    pub fn new(ctx: &Rc<Context>, data: &[u8]) -> Result<VertexBuffer> {
        Ok(VertexBuffer { buffer: Buffer::new(ctx, BufferTarget::Array, data)? })
    }

    /// Uploads a slice of plain values, e.g. the `f32` components of all vertices.
    pub fn from_slice<T: Pod>(ctx: &Rc<Context>, data: &[T]) -> Result<VertexBuffer> {
        VertexBuffer::new(ctx, bytemuck::cast_slice(data))
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

    pub fn bytes(&self) -> usize {
        self.buffer.bytes()
    }
}
