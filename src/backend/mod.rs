//! The raw graphics calls issued by the wrappers in this crate.
//!
//! Every wrapper talks to the driver through a [`Backend`] owned by its [`Context`]. The
//! [`NativeBackend`] forwards to the loaded OpenGL function pointers, while the
//! [`RecordingBackend`] stands in for a driver when no context is available, e.g. in tests.
//!
//! [`Backend`]:          trait.Backend.html
//! [`Context`]:          ../context/struct.Context.html
//! [`NativeBackend`]:    struct.NativeBackend.html
//! [`RecordingBackend`]: recording/struct.RecordingBackend.html

mod native;
pub mod recording;

pub use self::native::NativeBackend;
pub use self::recording::{Call, RecordingBackend};

use gl::types::*;

use crate::buffer::{BufferTarget, BufferUsage, ElementKind};
use crate::shader::{ShaderStage, Uniform};
use crate::Color;

/// Represents different types of primitives which can be drawn on the GPU.
#[repr(u32)] // GLenum is u32
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points          = gl::POINTS,
    Lines           = gl::LINES,
    LineStrip       = gl::LINE_STRIP,
    Triangles       = gl::TRIANGLES,
    TriangleStrip   = gl::TRIANGLE_STRIP,
    TriangleFan     = gl::TRIANGLE_FAN,
}

/// A texture parameter set through `glTexParameteri` on the `TEXTURE_2D` target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureParameter {
    MinFilter(TextureFilter),
    MagFilter(TextureFilter),
    WrapS(TextureWrap),
    WrapT(TextureWrap),
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest = gl::NEAREST,
    Linear  = gl::LINEAR,
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureWrap {
    ClampToEdge = gl::CLAMP_TO_EDGE,
    Repeat      = gl::REPEAT,
}

/// The driver surface used by this crate. Handles are the raw names generated by the driver,
/// and `0` always means "no object". All methods take `&self`, as the state they modify is
/// global to the current rendering context.
pub trait Backend {
    /// Returns the oldest pending error flag and resets it, or `gl::NO_ERROR`.
    fn get_error(&self) -> GLenum;

    fn gen_buffer(&self) -> GLuint;
    fn bind_buffer(&self, target: BufferTarget, buffer: GLuint);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    fn delete_buffer(&self, buffer: GLuint);

    fn gen_vertex_array(&self) -> GLuint;
    fn bind_vertex_array(&self, array: GLuint);
    fn delete_vertex_array(&self, array: GLuint);
    fn enable_vertex_attrib_array(&self, index: GLuint);
    /// `offset` is given in bytes from the start of the bound array buffer.
    fn vertex_attrib_pointer(&self, index: GLuint, count: GLint, kind: ElementKind,
                             normalized: bool, stride: GLsizei, offset: usize);

    fn create_shader(&self, stage: ShaderStage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn link_status(&self, program: GLuint) -> bool;
    fn validate_program(&self, program: GLuint);
    fn validate_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);
    /// Returns `-1` if the program has no active uniform with the given name.
    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint;
    fn uniform(&self, location: GLint, value: &Uniform);

    fn gen_texture(&self) -> GLuint;
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: GLuint);
    fn tex_parameter(&self, parameter: TextureParameter);
    /// Uploads tightly packed RGBA8 pixels to mip level 0 of the bound 2D texture.
    fn tex_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]);
    fn delete_texture(&self, texture: GLuint);

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn clear_color(&self, color: Color);
    fn clear(&self, mask: GLbitfield);
    fn set_blending(&self, enabled: bool);
    /// Draws `count` indices from the bound element array buffer, starting at its first byte.
    fn draw_elements(&self, mode: PrimitiveMode, count: GLsizei, index_kind: ElementKind);
}
