//! The error type shared by all wrappers in this crate.

use std::fmt;
use std::io;

use gl;
use gl::types::*;
use thiserror::Error;

use crate::shader::ShaderStage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// One or more error flags were raised by the driver while executing `call`.
    #[error("OpenGL error {} in `{call}` at {file}:{line}", DisplayCodes(.codes))]
    Driver {
        codes: Vec<GlErrorCode>,
        call: &'static str,
        file: &'static str,
        line: u32,
    },

    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("failed to link shader program: {log}")]
    Link { log: String },

    /// The annotated shader source has no block for the given stage.
    #[error("shader source has no {stage} block")]
    MissingStage { stage: ShaderStage },

    #[error("uniform `{name}` does not exist in the linked program")]
    MissingUniform { name: String },

    /// Pixel data does not match the `width * height * 4` bytes of an RGBA8 image.
    #[error("expected {expected} bytes of RGBA8 pixel data, got {actual}")]
    InvalidImage { expected: usize, actual: usize },

    /// A vertex element has a component count outside `1..=4`.
    #[error("vertex elements need between 1 and 4 components, got {count}")]
    InvalidElement { count: usize },

    /// An argument does not fit the integer type the driver takes it as.
    #[error("{name} of {value} is out of range for the driver")]
    OutOfRange { name: &'static str, value: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// A raw error code, as returned by `glGetError`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GlErrorCode(pub GLenum);

impl GlErrorCode {
    /// Retrieves the name of this error code. Returns `None` for codes which are not
    /// defined by core OpenGL.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            gl::INVALID_VALUE                   => "Invalid value",
            gl::INVALID_ENUM                    => "Invalid enum",
            gl::INVALID_OPERATION               => "Invalid operation",
            gl::INVALID_FRAMEBUFFER_OPERATION   => "Invalid framebuffer operation",
            gl::OUT_OF_MEMORY                   => "Out of memory",
            _                                   => return None,
        };
        Some(name)
    }
}

impl fmt::Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:x})", name, self.0),
            None       => write!(f, "Unknown error code (0x{:x})", self.0),
        }
    }
}

struct DisplayCodes<'a>(&'a [GlErrorCode]);

impl<'a> fmt::Display for DisplayCodes<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_names() {
        assert_eq!(GlErrorCode(gl::INVALID_OPERATION).name(), Some("Invalid operation"));
        assert_eq!(GlErrorCode(0x1234).name(), None);
        assert_eq!(GlErrorCode(gl::INVALID_ENUM).to_string(), "Invalid enum (0x500)");
    }

    #[test]
    fn driver_error_lists_every_code() {
        let err = Error::Driver {
            codes: vec![GlErrorCode(gl::INVALID_ENUM), GlErrorCode(gl::INVALID_VALUE)],
            call: "bind_buffer(target, 3)",
            file: "src/buffer/mod.rs",
            line: 10,
        };
        let message = err.to_string();
        assert!(message.contains("Invalid enum"));
        assert!(message.contains("Invalid value"));
        assert!(message.contains("bind_buffer(target, 3)"));
        assert!(message.contains("src/buffer/mod.rs:10"));
    }

    #[test]
    fn compile_error_names_stage() {
        let err = Error::Compile { stage: ShaderStage::Fragment, log: "0:1: syntax error".into() };
        assert!(err.to_string().contains("fragment"));
    }
}
