//! A stand-in driver which records calls instead of executing them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use gl;
use gl::types::*;

use super::{Backend, PrimitiveMode, TextureParameter};
use crate::buffer::{BufferTarget, BufferUsage, ElementKind};
use crate::shader::{ShaderStage, Uniform};
use crate::Color;

/// A single call made against a [`RecordingBackend`](struct.RecordingBackend.html). Queries
/// (`get_error`, status and log reads) are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GenBuffer(GLuint),
    BindBuffer(BufferTarget, GLuint),
    BufferData { target: BufferTarget, data: Vec<u8>, usage: BufferUsage },
    DeleteBuffer(GLuint),

    GenVertexArray(GLuint),
    BindVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    EnableVertexAttribArray(GLuint),
    VertexAttribPointer {
        index: GLuint,
        count: GLint,
        kind: ElementKind,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    },

    CreateShader(ShaderStage, GLuint),
    ShaderSource(GLuint, String),
    CompileShader(GLuint),
    DeleteShader(GLuint),

    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    ValidateProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
    GetUniformLocation(GLuint, String),
    Uniform(GLint, Uniform),

    GenTexture(GLuint),
    ActiveTexture(u32),
    BindTexture(GLuint),
    TexParameter(TextureParameter),
    TexImage { width: u32, height: u32, pixels: usize },
    DeleteTexture(GLuint),

    Viewport(GLint, GLint, GLsizei, GLsizei),
    ClearColor(Color),
    Clear(GLbitfield),
    SetBlending(bool),
    DrawElements { mode: PrimitiveMode, count: GLsizei, index_kind: ElementKind },
}

impl Call {
    /// The snake case name of the backend method which produced this call.
    pub fn name(&self) -> &'static str {
        match *self {
            Call::GenBuffer(..)               => "gen_buffer",
            Call::BindBuffer(..)              => "bind_buffer",
            Call::BufferData { .. }           => "buffer_data",
            Call::DeleteBuffer(..)            => "delete_buffer",
            Call::GenVertexArray(..)          => "gen_vertex_array",
            Call::BindVertexArray(..)         => "bind_vertex_array",
            Call::DeleteVertexArray(..)       => "delete_vertex_array",
            Call::EnableVertexAttribArray(..) => "enable_vertex_attrib_array",
            Call::VertexAttribPointer { .. }  => "vertex_attrib_pointer",
            Call::CreateShader(..)            => "create_shader",
            Call::ShaderSource(..)            => "shader_source",
            Call::CompileShader(..)           => "compile_shader",
            Call::DeleteShader(..)            => "delete_shader",
            Call::CreateProgram(..)           => "create_program",
            Call::AttachShader(..)            => "attach_shader",
            Call::LinkProgram(..)             => "link_program",
            Call::ValidateProgram(..)         => "validate_program",
            Call::UseProgram(..)              => "use_program",
            Call::DeleteProgram(..)           => "delete_program",
            Call::GetUniformLocation(..)      => "get_uniform_location",
            Call::Uniform(..)                 => "uniform",
            Call::GenTexture(..)              => "gen_texture",
            Call::ActiveTexture(..)           => "active_texture",
            Call::BindTexture(..)             => "bind_texture",
            Call::TexParameter(..)            => "tex_parameter",
            Call::TexImage { .. }             => "tex_image_rgba8",
            Call::DeleteTexture(..)           => "delete_texture",
            Call::Viewport(..)                => "viewport",
            Call::ClearColor(..)              => "clear_color",
            Call::Clear(..)                   => "clear",
            Call::SetBlending(..)             => "set_blending",
            Call::DrawElements { .. }         => "draw_elements",
        }
    }
}

/// Records every call made through it and hands out sequential, never reused, handles starting
/// at `1`. Compile and link outcomes, the set of active uniforms and raised error flags can be
/// scripted before exercising the wrappers.
///
/// # Example
/// ```rust
/// use std::rc::Rc;
/// use easel::{Context, ContextConfig, IndexBuffer};
/// use easel::backend::{Call, RecordingBackend};
///
/// let backend = Rc::new(RecordingBackend::new());
/// let ctx = Context::new(backend.clone(), ContextConfig::default());
///
/// let indices = IndexBuffer::new(&ctx, &[0, 1, 2]).unwrap();
/// assert_eq!(indices.count(), 3);
/// assert!(backend.calls().iter().any(|call| call.name() == "buffer_data"));
/// ```
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<Call>>,
    next_handle: Cell<GLuint>,

    pending_errors: RefCell<Vec<GLenum>>,
    raise_after: RefCell<HashMap<&'static str, GLenum>>,

    shader_stages: RefCell<HashMap<GLuint, ShaderStage>>,
    compile_failures: RefCell<HashMap<ShaderStage, String>>,
    link_failure: RefCell<Option<String>>,
    validate_failure: RefCell<Option<String>>,
    uniforms: RefCell<HashMap<String, GLint>>,
}

impl RecordingBackend {
    pub fn new() -> RecordingBackend {
        RecordingBackend::default()
    }

    /// A snapshot of all calls recorded so far, in call order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Forgets all recorded calls. Scripted behaviour is kept.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// All recorded `draw_elements` calls.
    pub fn draws(&self) -> Vec<Call> {
        self.calls.borrow().iter()
            .filter(|call| matches!(call, Call::DrawElements { .. }))
            .cloned()
            .collect()
    }

    /// Makes the next compile of a shader for `stage` fail with the given log.
    pub fn fail_compile(&self, stage: ShaderStage, log: &str) {
        self.compile_failures.borrow_mut().insert(stage, log.to_string());
    }

    /// Makes the next program link fail with the given log.
    pub fn fail_link(&self, log: &str) {
        *self.link_failure.borrow_mut() = Some(log.to_string());
    }

    /// Declares an active uniform, which will be reported at `location` by any program.
    pub fn declare_uniform(&self, name: &str, location: GLint) {
        self.uniforms.borrow_mut().insert(name.to_string(), location);
    }

    /// Raises `code` as if the driver flagged it during the previous call.
    pub fn push_error(&self, code: GLenum) {
        self.pending_errors.borrow_mut().push(code);
    }

    /// Raises `code` every time the backend method called `call` (see [`Call::name`]) runs.
    /// Besides recorded calls this also covers `shader_info_log`.
    ///
    /// [`Call::name`]: enum.Call.html#method.name
    pub fn raise_after(&self, call: &'static str, code: GLenum) {
        self.raise_after.borrow_mut().insert(call, code);
    }

    /// Makes the next program validation fail with the given log.
    pub fn fail_validate(&self, log: &str) {
        *self.validate_failure.borrow_mut() = Some(log.to_string());
    }

    fn record(&self, call: Call) {
        self.raise_for(call.name());
        self.calls.borrow_mut().push(call);
    }

    // Queries are not recorded, but may still raise scripted errors
    fn raise_for(&self, name: &str) {
        if let Some(&code) = self.raise_after.borrow().get(name) {
            self.pending_errors.borrow_mut().push(code);
        }
    }

    fn next_handle(&self) -> GLuint {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        handle
    }
}

impl Backend for RecordingBackend {
    fn get_error(&self) -> GLenum {
        let mut pending = self.pending_errors.borrow_mut();
        if pending.is_empty() {
            gl::NO_ERROR
        } else {
            pending.remove(0)
        }
    }

    fn gen_buffer(&self) -> GLuint {
        let handle = self.next_handle();
        self.record(Call::GenBuffer(handle));
        handle
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: GLuint) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        self.record(Call::BufferData { target, data: data.to_vec(), usage });
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.record(Call::DeleteBuffer(buffer));
    }

    fn gen_vertex_array(&self) -> GLuint {
        let handle = self.next_handle();
        self.record(Call::GenVertexArray(handle));
        handle
    }

    fn bind_vertex_array(&self, array: GLuint) {
        self.record(Call::BindVertexArray(array));
    }

    fn delete_vertex_array(&self, array: GLuint) {
        self.record(Call::DeleteVertexArray(array));
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(&self, index: GLuint, count: GLint, kind: ElementKind,
                             normalized: bool, stride: GLsizei, offset: usize) {
        self.record(Call::VertexAttribPointer { index, count, kind, normalized, stride, offset });
    }

    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        let handle = self.next_handle();
        self.shader_stages.borrow_mut().insert(handle, stage);
        self.record(Call::CreateShader(stage, handle));
        handle
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        self.record(Call::ShaderSource(shader, source.to_string()));
    }

    fn compile_shader(&self, shader: GLuint) {
        self.record(Call::CompileShader(shader));
    }

    fn compile_status(&self, shader: GLuint) -> bool {
        match self.shader_stages.borrow().get(&shader) {
            Some(stage) => !self.compile_failures.borrow().contains_key(stage),
            None        => false,
        }
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        self.raise_for("shader_info_log");
        let stage = match self.shader_stages.borrow().get(&shader) {
            Some(&stage) => stage,
            None         => return String::new(),
        };
        // The failure is consumed once its log has been read
        self.compile_failures.borrow_mut().remove(&stage).unwrap_or_default()
    }

    fn delete_shader(&self, shader: GLuint) {
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> GLuint {
        let handle = self.next_handle();
        self.record(Call::CreateProgram(handle));
        handle
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(Call::AttachShader(program, shader));
    }

    fn link_program(&self, program: GLuint) {
        self.record(Call::LinkProgram(program));
    }

    fn link_status(&self, _program: GLuint) -> bool {
        self.link_failure.borrow().is_none()
    }

    fn validate_program(&self, program: GLuint) {
        self.record(Call::ValidateProgram(program));
    }

    fn validate_status(&self, _program: GLuint) -> bool {
        self.validate_failure.borrow().is_none()
    }

    fn program_info_log(&self, _program: GLuint) -> String {
        if let Some(log) = self.link_failure.borrow_mut().take() {
            return log;
        }
        self.validate_failure.borrow_mut().take().unwrap_or_default()
    }

    fn use_program(&self, program: GLuint) {
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.record(Call::DeleteProgram(program));
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        self.record(Call::GetUniformLocation(program, name.to_string()));
        self.uniforms.borrow().get(name).cloned().unwrap_or(-1)
    }

    fn uniform(&self, location: GLint, value: &Uniform) {
        self.record(Call::Uniform(location, *value));
    }

    fn gen_texture(&self) -> GLuint {
        let handle = self.next_handle();
        self.record(Call::GenTexture(handle));
        handle
    }

    fn active_texture(&self, unit: u32) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, texture: GLuint) {
        self.record(Call::BindTexture(texture));
    }

    fn tex_parameter(&self, parameter: TextureParameter) {
        self.record(Call::TexParameter(parameter));
    }

    fn tex_image_rgba8(&self, width: u32, height: u32, pixels: &[u8]) {
        self.record(Call::TexImage { width, height, pixels: pixels.len() });
    }

    fn delete_texture(&self, texture: GLuint) {
        self.record(Call::DeleteTexture(texture));
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        self.record(Call::Viewport(x, y, width, height));
    }

    fn clear_color(&self, color: Color) {
        self.record(Call::ClearColor(color));
    }

    fn clear(&self, mask: GLbitfield) {
        self.record(Call::Clear(mask));
    }

    fn set_blending(&self, enabled: bool) {
        self.record(Call::SetBlending(enabled));
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: GLsizei, index_kind: ElementKind) {
        self.record(Call::DrawElements { mode, count, index_kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_sequential_and_nonzero() {
        let backend = RecordingBackend::new();
        assert_eq!(backend.gen_buffer(), 1);
        assert_eq!(backend.gen_vertex_array(), 2);
        assert_eq!(backend.create_program(), 3);
    }

    #[test]
    fn errors_are_raised_after_the_named_call() {
        let backend = RecordingBackend::new();
        backend.raise_after("bind_buffer", gl::INVALID_ENUM);

        assert_eq!(backend.get_error(), gl::NO_ERROR);
        backend.bind_buffer(BufferTarget::Array, 4);
        assert_eq!(backend.get_error(), gl::INVALID_ENUM);
        assert_eq!(backend.get_error(), gl::NO_ERROR);
    }

    #[test]
    fn compile_failures_are_reported_once() {
        let backend = RecordingBackend::new();
        backend.fail_compile(ShaderStage::Vertex, "bad vertex");

        let vertex = backend.create_shader(ShaderStage::Vertex);
        let fragment = backend.create_shader(ShaderStage::Fragment);
        assert!(!backend.compile_status(vertex));
        assert!(backend.compile_status(fragment));
        assert_eq!(backend.shader_info_log(vertex), "bad vertex");
        assert!(backend.compile_status(vertex));
    }

    #[test]
    fn undeclared_uniforms_have_no_location() {
        let backend = RecordingBackend::new();
        backend.declare_uniform("u_Color", 2);
        assert_eq!(backend.get_uniform_location(1, "u_Color"), 2);
        assert_eq!(backend.get_uniform_location(1, "u_Missing"), -1);
    }
}
