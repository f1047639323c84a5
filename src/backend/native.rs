use std::ffi::CString;
use std::ptr;

use gl;
use gl::types::*;
use log::warn;

use super::{Backend, PrimitiveMode, TextureParameter};
use crate::buffer::{BufferTarget, BufferUsage, ElementKind};
use crate::shader::{ShaderStage, Uniform};
use crate::Color;

/// Forwards every call to the OpenGL function pointers loaded through `gl::load_with`. A
/// context must be current on the calling thread for any of these calls to be valid.
#[derive(Debug, Default)]
pub struct NativeBackend;

impl NativeBackend {
    pub fn new() -> NativeBackend {
        NativeBackend
    }
}

fn c_string(value: &str) -> CString {
    // Interior nul bytes can not be passed to the driver, cut the string at the first one
    let bytes = value.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    if end != bytes.len() {
        warn!("String passed to OpenGL contains a nul byte, truncating it at byte {}", end);
    }
    CString::new(&bytes[..end]).unwrap_or_default()
}

fn read_log(len: GLint, fetch: impl FnOnce(GLsizei, *mut GLchar)) -> String {
    if len <= 1 {
        return String::new();
    }

    let mut buffer = vec![0u8; len as usize];
    fetch(len, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate((len as usize) - 1); // Skip null terminator

    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

impl Backend for NativeBackend {
    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: GLuint) {
        unsafe { gl::BindBuffer(target as GLenum, buffer) };
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let pointer = if data.is_empty() { ptr::null() } else { data.as_ptr() as *const GLvoid };
        unsafe {
            gl::BufferData(target as GLenum, data.len() as GLsizeiptr, pointer, usage as GLenum);
        }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) };
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut array = 0;
        unsafe { gl::GenVertexArrays(1, &mut array) };
        array
    }

    fn bind_vertex_array(&self, array: GLuint) {
        unsafe { gl::BindVertexArray(array) };
    }

    fn delete_vertex_array(&self, array: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &array) };
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn vertex_attrib_pointer(&self, index: GLuint, count: GLint, kind: ElementKind,
                             normalized: bool, stride: GLsizei, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index, count,
                kind as GLenum, normalized as GLboolean,
                stride, offset as *const GLvoid,
            );
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let source = c_string(source);
        unsafe { gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null()) };
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) };
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut len = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            read_log(len, |len, buffer| gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buffer))
        }
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) };
    }

    fn link_status(&self, program: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn validate_program(&self, program: GLuint) {
        unsafe { gl::ValidateProgram(program) };
    }

    fn validate_status(&self, program: GLuint) -> bool {
        let mut status = gl::FALSE as GLint;
        unsafe { gl::GetProgramiv(program, gl::VALIDATE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut len = 0;
        unsafe {
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            read_log(len, |len, buffer| gl::GetProgramInfoLog(program, len, ptr::null_mut(), buffer))
        }
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) };
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        let name = c_string(name);
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform(&self, location: GLint, value: &Uniform) {
        unsafe { match *value {
            Uniform::Int(v)             => gl::Uniform1i(location, v),
            Uniform::Float(v)           => gl::Uniform1f(location, v),
            Uniform::Vec2([x, y])       => gl::Uniform2f(location, x, y),
            Uniform::Vec3([x, y, z])    => gl::Uniform3f(location, x, y, z),
            Uniform::Vec4([x, y, z, w]) => gl::Uniform4f(location, x, y, z, w),
            Uniform::Mat4(ref m)        => gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr()),
        } }
    }

    fn gen_texture(&self) -> GLuint {
        let mut texture = 0;
        unsafe { gl::GenTextures(1, &mut texture) };
        texture
    }

    fn active_texture(&self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0.saturating_add(unit)) };
    }

    fn bind_texture(&self, texture: GLuint) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, texture) };
    }

    fn tex_parameter(&self, parameter: TextureParameter) {
        let (name, value) = match parameter {
            TextureParameter::MinFilter(filter) => (gl::TEXTURE_MIN_FILTER, filter as GLenum),
            TextureParameter::MagFilter(filter) => (gl::TEXTURE_MAG_FILTER, filter as GLenum),
            TextureParameter::WrapS(wrap)       => (gl::TEXTURE_WRAP_S, wrap as GLenum),
            TextureParameter::WrapT(wrap)       => (gl::TEXTURE_WRAP_T, wrap as GLenum),
        };
        unsafe { gl::TexParameteri(gl::TEXTURE_2D, name, value as GLint) };
    }

    fn tex_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        let pointer = if pixels.is_empty() { ptr::null() } else { pixels.as_ptr() as *const GLvoid };
        unsafe {
            gl::TexImage2D(gl::TEXTURE_2D, 0, // Mipmap level
                           gl::RGBA8 as GLint, // Internal format
                           width as GLsizei, height as GLsizei, 0, // Size and border
                           gl::RGBA, gl::UNSIGNED_BYTE, pointer);
        }
    }

    fn delete_texture(&self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) };
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn clear_color(&self, color: Color) {
        unsafe { gl::ClearColor(color.r, color.g, color.b, color.a) };
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) };
    }

    fn set_blending(&self, enabled: bool) {
        unsafe {
            if enabled {
                gl::Enable(gl::BLEND);
                gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
            } else {
                gl::Disable(gl::BLEND);
            }
        }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: GLsizei, index_kind: ElementKind) {
        unsafe {
            gl::DrawElements(mode as GLenum, count, index_kind as GLenum, ptr::null());
        }
    }
}
