//! Thin, owning wrappers around OpenGL buffers, vertex arrays, shader programs and textures,
//! plus a renderer which issues indexed draw calls with them.
//!
//! Every wrapper owns exactly one driver handle, which it deletes when dropped. Wrappers can not
//! be cloned. All driver calls go through a [`Context`], which checks for driver errors after
//! each call and reports them according to its [`ErrorPolicy`].
//!
//! # Example
//! ```rust,no_run
//! use easel::{Context, ContextConfig, Renderer, Shader, VertexArray, Color};
//! use easel::buffer::{VertexBuffer, IndexBuffer, VertexLayout};
//!
//! # fn main() -> easel::Result<()> {
//! // `gl::load_with` has been called with a current context
//! let ctx = Context::native(ContextConfig::default());
//!
//! let positions: [f32; 8] = [-0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, 0.5];
//! let vertices = VertexBuffer::from_slice(&ctx, &positions)?;
//! let mut layout = VertexLayout::new();
//! layout.push::<f32>(2);
//!
//! let array = VertexArray::new(&ctx)?;
//! array.add_buffer(&vertices, &layout)?;
//! let indices = IndexBuffer::new(&ctx, &[0, 1, 2, 2, 3, 0])?;
//!
//! let mut shader = Shader::from_file(&ctx, "res/shaders/basic.shader")?;
//! shader.bind()?;
//! shader.set_uniform_4f("u_Color", 0.8, 0.3, 0.8, 1.0)?;
//!
//! let renderer = Renderer::new(&ctx);
//! renderer.set_clear_color(Color::hex_int(0x1e1e1e))?;
//! renderer.clear()?;
//! renderer.draw(&array, &indices, &shader)?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Context`]:     context/struct.Context.html
//! [`ErrorPolicy`]: context/enum.ErrorPolicy.html

#[macro_use]
pub mod context;
pub mod backend;
pub mod error;
pub mod color;
pub mod math;
pub mod buffer;
pub mod vertex_array;
pub mod shader;
pub mod texture;
pub mod renderer;

pub use crate::buffer::{IndexBuffer, VertexBuffer, VertexLayout};
pub use crate::color::Color;
pub use crate::context::{Context, ContextConfig, ErrorPolicy};
pub use crate::error::{Error, GlErrorCode, Result};
pub use crate::math::Mat4;
pub use crate::renderer::Renderer;
pub use crate::shader::{Shader, ShaderSource, ShaderStage};
pub use crate::texture::{RawImage, Texture};
pub use crate::vertex_array::VertexArray;
