use std::rc::Rc;

use gl::types::*;
use log::debug;

use crate::buffer::{VertexBuffer, VertexLayout};
use crate::context::Context;
use crate::error::Result;

/// Contains information on how to pull vertex attributes from one or more vertex buffers. The
/// bindings are recorded by the driver when a buffer is added, the wrapper itself only owns the
/// handle.
#[derive(Debug)]
pub struct VertexArray {
    ctx: Rc<Context>,
    array: GLuint,
}

impl VertexArray {
    pub fn new(ctx: &Rc<Context>) -> Result<VertexArray> {
        let array = gl_call!(ctx, gen_vertex_array())?;
        debug!("Created vertex array {}", array);

        Ok(VertexArray {
            ctx: ctx.clone(),
            array,
        })
    }

    /// Binds the attributes described by `layout` to attribute slots `0..n`, pulling data from
    /// `buffer`.
    pub fn add_buffer(&self, buffer: &VertexBuffer, layout: &VertexLayout) -> Result<()> {
        self.add_buffer_at(buffer, layout, 0)
    }

    /// Binds the attributes described by `layout` to consecutive attribute slots starting at
    /// `first_slot`, pulling data from `buffer`. This is used when a second buffer supplies
    /// additional attributes. These are accessed from glsl through
    /// `layout(location = slot) in ...;`
    ///
    /// Fails with `Error::InvalidElement` before touching any driver state if an element of
    /// `layout` does not have between 1 and 4 components.
    pub fn add_buffer_at(&self, buffer: &VertexBuffer, layout: &VertexLayout, first_slot: usize) -> Result<()> {
        layout.validate()?;

        self.bind()?;
        buffer.bind()?;

        let stride = layout.stride() as GLsizei;
        for attribute in layout.attributes() {
            let index = (first_slot + attribute.slot) as GLuint;
            let element = attribute.element;

            gl_call!(self.ctx, enable_vertex_attrib_array(index))?;
            gl_call!(self.ctx, vertex_attrib_pointer(
                index, element.count as GLint,
                element.kind, element.normalized,
                stride, attribute.offset,
            ))?;
        }

        Ok(())
    }

    pub fn bind(&self) -> Result<()> {
        gl_call!(self.ctx, bind_vertex_array(self.array))
    }

    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.ctx, bind_vertex_array(0))
    }

    pub fn handle(&self) -> GLuint {
        self.array
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        gl_call!(release self.ctx, delete_vertex_array(self.array));
        debug!("Deleted vertex array {}", self.array);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Call, RecordingBackend};
    use crate::buffer::{BufferTarget, ElementKind};
    use crate::{ContextConfig, Error, ErrorPolicy};

    fn pointers(calls: &[Call]) -> Vec<(GLuint, usize, GLsizei)> {
        calls.iter().filter_map(|call| match *call {
            Call::VertexAttribPointer { index, offset, stride, .. } => Some((index, offset, stride)),
            _ => None,
        }).collect()
    }

    #[test]
    fn array_and_buffer_are_bound_before_attributes() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());

        let vertices = VertexBuffer::from_slice(&ctx, &[0.0f32; 8]).unwrap();
        let array = VertexArray::new(&ctx).unwrap();
        let mut layout = VertexLayout::new();
        layout.push::<f32>(2);

        backend.clear_calls();
        array.add_buffer(&vertices, &layout).unwrap();

        assert_eq!(backend.calls(), vec![
            Call::BindVertexArray(array.handle()),
            Call::BindBuffer(BufferTarget::Array, vertices.handle()),
            Call::EnableVertexAttribArray(0),
            Call::VertexAttribPointer {
                index: 0,
                count: 2,
                kind: ElementKind::Float,
                normalized: false,
                stride: 8,
                offset: 0,
            },
        ]);
    }

    #[test]
    fn offsets_accumulate_over_previous_elements() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());

        let vertices = VertexBuffer::new(&ctx, &[0u8; 64]).unwrap();
        let array = VertexArray::new(&ctx).unwrap();
        let mut layout = VertexLayout::new();
        layout.push::<f32>(3).push::<u8>(4).push::<f32>(2);

        backend.clear_calls();
        array.add_buffer(&vertices, &layout).unwrap();

        assert_eq!(pointers(&backend.calls()), vec![(0, 0, 24), (1, 12, 24), (2, 16, 24)]);
    }

    #[test]
    fn second_buffer_continues_at_given_slot() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());

        let positions = VertexBuffer::new(&ctx, &[0u8; 32]).unwrap();
        let colors = VertexBuffer::new(&ctx, &[0u8; 16]).unwrap();
        let array = VertexArray::new(&ctx).unwrap();

        let mut position_layout = VertexLayout::new();
        position_layout.push::<f32>(2);
        let mut color_layout = VertexLayout::new();
        color_layout.push::<u8>(4);

        array.add_buffer(&positions, &position_layout).unwrap();
        backend.clear_calls();
        array.add_buffer_at(&colors, &color_layout, 1).unwrap();

        assert_eq!(pointers(&backend.calls()), vec![(1, 0, 4)]);
    }

    #[test]
    fn invalid_layout_is_an_error_under_collect() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig { error_policy: ErrorPolicy::Collect });

        let vertices = VertexBuffer::new(&ctx, &[0u8; 64]).unwrap();
        let array = VertexArray::new(&ctx).unwrap();
        let mut layout = VertexLayout::new();
        layout.push::<f32>(2).push::<f32>(5);

        backend.clear_calls();
        match array.add_buffer(&vertices, &layout) {
            Err(Error::InvalidElement { count }) => assert_eq!(count, 5),
            other => panic!("Expected an invalid element error, got {:?}", other),
        }
        assert!(backend.calls().is_empty());
    }
}
