//! Clearing and issuing draw calls.

use std::rc::Rc;

use gl;
use gl::types::*;

use crate::backend::PrimitiveMode;
use crate::buffer::IndexBuffer;
use crate::color::Color;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::shader::Shader;
use crate::vertex_array::VertexArray;

/// Issues clears and draw calls. Holds no state of its own apart from the context; the clear
/// color is part of the context's global state.
#[derive(Debug, Clone)]
pub struct Renderer {
    ctx: Rc<Context>,
}

impl Renderer {
    pub fn new(ctx: &Rc<Context>) -> Renderer {
        Renderer { ctx: ctx.clone() }
    }

    /// Sets the region of the framebuffer drawn to, in pixels from the lower left corner.
    /// Fails with `Error::OutOfRange` for values above `i32::MAX`.
    pub fn set_viewport(&self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        let x = to_driver_int("viewport x", x)?;
        let y = to_driver_int("viewport y", y)?;
        let width = to_driver_int("viewport width", width)?;
        let height = to_driver_int("viewport height", height)?;
        gl_call!(self.ctx, viewport(x, y, width, height))
    }

    /// Sets the color used by subsequent calls to [`clear`](#method.clear).
    pub fn set_clear_color(&self, color: Color) -> Result<()> {
        gl_call!(self.ctx, clear_color(color))
    }

    /// Clears the color buffer of the currently bound framebuffer.
    pub fn clear(&self) -> Result<()> {
        gl_call!(self.ctx, clear(gl::COLOR_BUFFER_BIT))
    }

    /// If `true`, fragments are blended with source alpha / one minus source alpha. Needed to
    /// draw textures with transparency.
    pub fn set_blending(&self, enabled: bool) -> Result<()> {
        gl_call!(self.ctx, set_blending(enabled))
    }

    /// Binds `shader`, `array` and `indices`, in that order, and draws all indices as a list
    /// of triangles.
    pub fn draw(&self, array: &VertexArray, indices: &IndexBuffer, shader: &Shader) -> Result<()> {
        let count = GLsizei::try_from(indices.count())
            .map_err(|_| Error::OutOfRange { name: "index count", value: indices.count() as u64 })?;

        shader.bind()?;
        array.bind()?;
        indices.bind()?;

        gl_call!(self.ctx, draw_elements(PrimitiveMode::Triangles, count, IndexBuffer::INDEX_KIND))
    }
}

fn to_driver_int(name: &'static str, value: u32) -> Result<GLint> {
    GLint::try_from(value).map_err(|_| Error::OutOfRange { name, value: u64::from(value) })
}
