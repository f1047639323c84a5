//! Compiling, linking and feeding uniforms to glsl shader programs.

mod source;
mod uniform;

pub use self::source::*;
pub use self::uniform::*;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use gl;
use gl::types::*;
use log::{debug, error, warn};

use crate::context::Context;
use crate::error::{Error, Result};
use crate::math::Mat4;

/// The location the driver reports for uniforms which are not active in a program.
pub const INVALID_LOCATION: GLint = -1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex   => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ShaderStage::Vertex   => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Compiles a single stage. On failure the stage is deleted and its info log returned.
fn compile(ctx: &Context, stage: ShaderStage, source: &str) -> Result<GLuint> {
    let shader = gl_call!(ctx, create_shader(stage))?;

    let compiled = gl_call!(ctx, shader_source(shader, source))
        .and_then(|()| gl_call!(ctx, compile_shader(shader)))
        .and_then(|()| gl_call!(ctx, compile_status(shader)));

    match compiled {
        Ok(true) => Ok(shader),
        Ok(false) => {
            let log = match gl_call!(ctx, shader_info_log(shader)) {
                Ok(log) => log,
                Err(err) => {
                    warn!("Could not read the {} shader info log: {}", stage, err);
                    format!("(info log unavailable: {})", err)
                },
            };
            gl_call!(release ctx, delete_shader(shader));

            error!("Failed to compile {} shader:\n{}", stage, log);
            Err(Error::Compile { stage, log })
        },
        Err(err) => {
            gl_call!(release ctx, delete_shader(shader));
            Err(err)
        },
    }
}

/// A linked shader program. Uniform locations are looked up by name on first use and cached for
/// the lifetime of the program.
///
/// Uniforms are written to the program which is currently bound. Call [`bind`] before setting
/// uniforms, this is not checked.
///
/// [`bind`]: #method.bind
pub struct Shader {
    ctx: Rc<Context>,
    program: GLuint,
    uniform_cache: HashMap<String, GLint>,
}

impl Shader {
    /// Compiles both stages and links them into a program. If a stage fails to compile the
    /// returned error names the stage and carries the driver's diagnostic log. No handles are
    /// leaked on failure.
    pub fn from_source(ctx: &Rc<Context>, vertex_source: &str, fragment_source: &str) -> Result<Shader> {
        let program = gl_call!(ctx, create_program())?;
        let shader = Shader {
            ctx: ctx.clone(),
            program,
            uniform_cache: HashMap::new(),
        };

        let vertex = compile(ctx, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile(ctx, ShaderStage::Fragment, fragment_source) {
            Ok(fragment) => fragment,
            Err(err) => {
                gl_call!(release ctx, delete_shader(vertex));
                return Err(err);
            },
        };

        let linked = shader.link(vertex, fragment);

        // The program keeps the compiled code once linked
        gl_call!(release ctx, delete_shader(vertex));
        gl_call!(release ctx, delete_shader(fragment));

        linked?;
        debug!("Created shader program {}", program);
        Ok(shader)
    }

    /// Compiles a program from parsed annotated source. Fails with `Error::MissingStage` if
    /// either block is missing.
    pub fn from_sources(ctx: &Rc<Context>, source: &ShaderSource) -> Result<Shader> {
        for &stage in [ShaderStage::Vertex, ShaderStage::Fragment].iter() {
            if source.stage(stage).trim().is_empty() {
                return Err(Error::MissingStage { stage });
            }
        }
        Shader::from_source(ctx, &source.vertex, &source.fragment)
    }

    /// Loads, parses and compiles an annotated shader file. See [`ShaderSource`] for the format.
    ///
    /// [`ShaderSource`]: struct.ShaderSource.html
    pub fn from_file<P: AsRef<Path>>(ctx: &Rc<Context>, path: P) -> Result<Shader> {
        let source = ShaderSource::from_file(path.as_ref())?;
        debug!("Loaded shader source from {}", path.as_ref().display());
        Shader::from_sources(ctx, &source)
    }

    fn link(&self, vertex: GLuint, fragment: GLuint) -> Result<()> {
        let ctx = &self.ctx;
        gl_call!(ctx, attach_shader(self.program, vertex))?;
        gl_call!(ctx, attach_shader(self.program, fragment))?;
        gl_call!(ctx, link_program(self.program))?;

        if !gl_call!(ctx, link_status(self.program))? {
            let log = gl_call!(ctx, program_info_log(self.program))?;
            error!("Failed to link shader program:\n{}", log);
            return Err(Error::Link { log });
        }

        gl_call!(ctx, validate_program(self.program))?;
        if !gl_call!(ctx, validate_status(self.program))? {
            let log = gl_call!(ctx, program_info_log(self.program))?;
            warn!("Shader program {} did not validate: {}", self.program, log);
        }

        Ok(())
    }

    /// Binds this shader, replacing the previously bound shader. Subsequent draw calls and
    /// uniform writes will use this shader.
    pub fn bind(&self) -> Result<()> {
        gl_call!(self.ctx, use_program(self.program))
    }

    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.ctx, use_program(0))
    }

    pub fn handle(&self) -> GLuint {
        self.program
    }

    /// Retrieves the location of the given uniform, looking it up only on first use. Returns
    /// `INVALID_LOCATION` if the program has no such active uniform, e.g. because the compiler
    /// optimized it out.
    pub fn uniform_location(&mut self, name: &str) -> Result<GLint> {
        if let Some(&location) = self.uniform_cache.get(name) {
            return Ok(location);
        }

        let location = gl_call!(self.ctx, get_uniform_location(self.program, name))?;
        if location == INVALID_LOCATION {
            warn!("Uniform \"{}\" does not exist in shader program {}", name, self.program);
        }
        self.uniform_cache.insert(name.to_string(), location);
        Ok(location)
    }

    /// Like `uniform_location`, but fails if the uniform does not exist.
    pub fn require_uniform(&mut self, name: &str) -> Result<GLint> {
        match self.uniform_location(name)? {
            INVALID_LOCATION => Err(Error::MissingUniform { name: name.to_string() }),
            location         => Ok(location),
        }
    }

    /// Writes a value to the named uniform. Writing to a uniform which does not exist does
    /// nothing.
    pub fn set_uniform<T: UniformValue + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let location = self.uniform_location(name)?;
        if location == INVALID_LOCATION {
            return Ok(());
        }
        gl_call!(self.ctx, uniform(location, &value.to_uniform()))
    }

    pub fn set_uniform_1i(&mut self, name: &str, value: i32) -> Result<()> {
        self.set_uniform(name, &value)
    }

    pub fn set_uniform_1f(&mut self, name: &str, value: f32) -> Result<()> {
        self.set_uniform(name, &value)
    }

    pub fn set_uniform_4f(&mut self, name: &str, v0: f32, v1: f32, v2: f32, v3: f32) -> Result<()> {
        self.set_uniform(name, &[v0, v1, v2, v3])
    }

    pub fn set_uniform_mat4f(&mut self, name: &str, matrix: &Mat4) -> Result<()> {
        self.set_uniform(name, matrix)
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        gl_call!(release self.ctx, delete_program(self.program));
        debug!("Deleted shader program {}", self.program);
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("uniforms", &self.uniform_cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Call, RecordingBackend};
    use crate::{ContextConfig, ErrorPolicy};

    fn setup() -> (Rc<RecordingBackend>, Rc<Context>) {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());
        (backend, ctx)
    }

    fn deleted_shaders(calls: &[Call]) -> usize {
        calls.iter().filter(|call| matches!(call, Call::DeleteShader(_))).count()
    }

    #[test]
    fn stages_are_released_after_linking() {
        let (backend, ctx) = setup();
        let shader = Shader::from_source(&ctx, "vs", "fs").unwrap();

        let calls = backend.calls();
        assert!(calls.contains(&Call::LinkProgram(shader.handle())));
        assert!(calls.contains(&Call::ValidateProgram(shader.handle())));
        assert_eq!(deleted_shaders(&calls), 2);
        assert!(!calls.contains(&Call::DeleteProgram(shader.handle())));
    }

    #[test]
    fn vertex_compile_failure_names_the_stage() {
        let (backend, ctx) = setup();
        backend.fail_compile(ShaderStage::Vertex, "0:3: 'vec5' : undeclared identifier");

        let err = Shader::from_source(&ctx, "vs", "fs").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("vertex"), "{}", message);
        assert!(message.contains("vec5"), "{}", message);

        // Fragment is never compiled, program and vertex stage are released
        let calls = backend.calls();
        assert!(!calls.contains(&Call::CreateShader(ShaderStage::Fragment, 3)));
        assert_eq!(deleted_shaders(&calls), 1);
        assert!(calls.iter().any(|call| matches!(call, Call::DeleteProgram(_))));
    }

    #[test]
    fn fragment_compile_failure_releases_vertex_stage() {
        let (backend, ctx) = setup();
        backend.fail_compile(ShaderStage::Fragment, "syntax error");

        match Shader::from_source(&ctx, "vs", "fs") {
            Err(Error::Compile { stage, .. }) => assert_eq!(stage, ShaderStage::Fragment),
            other => panic!("Expected a compile error, got {:?}", other),
        }
        assert_eq!(deleted_shaders(&backend.calls()), 2);
    }

    #[test]
    fn link_failure_is_reported() {
        let (backend, ctx) = setup();
        backend.fail_link("missing main");

        match Shader::from_source(&ctx, "vs", "fs") {
            Err(Error::Link { log }) => assert_eq!(log, "missing main"),
            other => panic!("Expected a link error, got {:?}", other),
        }
        let calls = backend.calls();
        assert_eq!(deleted_shaders(&calls), 2);
        assert!(calls.iter().any(|call| matches!(call, Call::DeleteProgram(_))));
    }

    #[test]
    fn unreadable_compile_log_keeps_the_driver_error() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig { error_policy: ErrorPolicy::Collect });
        backend.fail_compile(ShaderStage::Vertex, "unused");
        backend.raise_after("shader_info_log", gl::INVALID_OPERATION);

        match Shader::from_source(&ctx, "vs", "fs") {
            Err(Error::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(log.contains("Invalid operation"), "{}", log);
            },
            other => panic!("Expected a compile error, got {:?}", other),
        }
        assert_eq!(deleted_shaders(&backend.calls()), 1);
    }

    #[test]
    fn validation_failure_still_yields_a_program() {
        let (backend, ctx) = setup();
        backend.fail_validate("no vertex array bound");

        let shader = Shader::from_source(&ctx, "vs", "fs").unwrap();
        let calls = backend.calls();
        assert!(calls.contains(&Call::ValidateProgram(shader.handle())));
        assert!(!calls.contains(&Call::DeleteProgram(shader.handle())));
        assert_eq!(deleted_shaders(&calls), 2);
    }

    #[test]
    fn missing_stage_is_rejected_before_compiling() {
        let (backend, ctx) = setup();
        let source = ShaderSource::parse("#shader vertex\nvoid main() {}\n");

        match Shader::from_sources(&ctx, &source) {
            Err(Error::MissingStage { stage }) => assert_eq!(stage, ShaderStage::Fragment),
            other => panic!("Expected a missing stage error, got {:?}", other),
        }
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn uniform_locations_are_cached() {
        let (backend, ctx) = setup();
        backend.declare_uniform("u_Color", 4);
        let mut shader = Shader::from_source(&ctx, "vs", "fs").unwrap();

        shader.bind().unwrap();
        shader.set_uniform_4f("u_Color", 0.2, 0.3, 0.8, 1.0).unwrap();
        shader.set_uniform_4f("u_Color", 0.4, 0.3, 0.8, 1.0).unwrap();

        let calls = backend.calls();
        let lookups = calls.iter()
            .filter(|call| matches!(call, Call::GetUniformLocation(_, name) if name == "u_Color"))
            .count();
        assert_eq!(lookups, 1);
        assert!(calls.contains(&Call::Uniform(4, Uniform::Vec4([0.4, 0.3, 0.8, 1.0]))));
    }

    #[test]
    fn unknown_uniform_is_a_no_op() {
        let (backend, ctx) = setup();
        let mut shader = Shader::from_source(&ctx, "vs", "fs").unwrap();

        shader.set_uniform_1i("u_Texture", 0).unwrap();
        shader.set_uniform_1i("u_Texture", 1).unwrap();

        assert!(!backend.calls().iter().any(|call| matches!(call, Call::Uniform(..))));
        assert_eq!(shader.uniform_location("u_Texture").unwrap(), INVALID_LOCATION);
    }

    #[test]
    fn required_uniform_must_exist() {
        let (backend, ctx) = setup();
        backend.declare_uniform("u_MVP", 0);
        let mut shader = Shader::from_source(&ctx, "vs", "fs").unwrap();

        assert_eq!(shader.require_uniform("u_MVP").unwrap(), 0);
        match shader.require_uniform("u_Missing") {
            Err(Error::MissingUniform { name }) => assert_eq!(name, "u_Missing"),
            other => panic!("Expected a missing uniform error, got {:?}", other),
        }
    }

    #[test]
    fn matrices_are_written_column_major() {
        let (backend, ctx) = setup();
        backend.declare_uniform("u_MVP", 1);
        let mut shader = Shader::from_source(&ctx, "vs", "fs").unwrap();

        shader.set_uniform_mat4f("u_MVP", &Mat4::translation(1.0, 2.0, 3.0)).unwrap();
        let written = backend.calls().into_iter().find_map(|call| match call {
            Call::Uniform(1, Uniform::Mat4(m)) => Some(m),
            _ => None,
        }).unwrap();
        assert_eq!(&written[12..15], &[1.0, 2.0, 3.0]);
    }
}
