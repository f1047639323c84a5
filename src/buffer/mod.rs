//! GPU buffers holding vertex and index data, and the layouts describing vertex data.

mod layout;
mod vertex_buffer;
mod index_buffer;

pub use self::layout::*;
pub use self::vertex_buffer::*;
pub use self::index_buffer::*;

use std::rc::Rc;

use gl;
use gl::types::*;
use log::debug;

use crate::context::Context;
use crate::error::Result;

/// Represents a target to which a buffer can be bound
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array        = gl::ARRAY_BUFFER,
    ElementArray = gl::ELEMENT_ARRAY_BUFFER,
}

/// Represents different gl buffer usage hints. Note that these are hints,
/// and drivers will not necessarily respect these.
///
/// * Static - Data is set once and used often
/// * Dynamic - Data is set frequently and used frequently
/// * Stream - Data is set once and used at most a few times
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw  = gl::STATIC_DRAW,
    DynamicDraw = gl::DYNAMIC_DRAW,
    StreamDraw  = gl::STREAM_DRAW,
}

/// Owns one driver buffer object and the bytes uploaded to it at creation. The buffer is
/// deleted when this is dropped. [`VertexBuffer`] and [`IndexBuffer`] wrap this with the
/// target they bind to.
///
/// [`VertexBuffer`]: struct.VertexBuffer.html
/// [`IndexBuffer`]:  struct.IndexBuffer.html
#[derive(Debug)]
pub struct Buffer {
    ctx: Rc<Context>,
    handle: GLuint,
    target: BufferTarget,
    bytes: usize,
}

impl Buffer {
    /// Allocates a buffer and uploads `data` to it. The buffer is left bound to `target`.
    pub fn new(ctx: &Rc<Context>, target: BufferTarget, data: &[u8]) -> Result<Buffer> {
        Buffer::with_usage(ctx, target, data, BufferUsage::StaticDraw)
    }

    pub fn with_usage(ctx: &Rc<Context>, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<Buffer> {
        let handle = gl_call!(ctx, gen_buffer())?;

        // Owned from here on, so the handle is released even if the upload fails
        let buffer = Buffer {
            ctx: ctx.clone(),
            handle,
            target,
            bytes: data.len(),
        };

        buffer.bind()?;
        gl_call!(ctx, buffer_data(target, data, usage))?;

        debug!("Created {:?} buffer {} with {} bytes", target, handle, data.len());
        Ok(buffer)
    }

    /// Binds this buffer to the target specified in the constructor
    pub fn bind(&self) -> Result<()> {
        gl_call!(self.ctx, bind_buffer(self.target, self.handle))
    }

    /// Clears the binding of the target this buffer binds to.
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.ctx, bind_buffer(self.target, 0))
    }

    pub fn handle(&self) -> GLuint {
        self.handle
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// The number of bytes uploaded to this buffer
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        gl_call!(release self.ctx, delete_buffer(self.handle));
        debug!("Deleted {:?} buffer {}", self.target, self.handle);
    }
}
