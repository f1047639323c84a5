//! Shared rendering state and the error checking bracket around driver calls.
//!
//! Every wrapper holds a reference counted [`Context`], which owns the [`Backend`] the wrapper
//! talks to. All driver calls go through [`gl_call!`], which drains stale error flags before
//! the call and checks for new ones afterwards:
//!
//! ```rust,ignore
//! gl_call!(self.ctx, bind_buffer(BufferTarget::Array, self.handle))?;
//! ```
//!
//! What happens when the driver raises an error is decided by the contexts [`ErrorPolicy`].
//!
//! [`Context`]:     struct.Context.html
//! [`Backend`]:     ../backend/trait.Backend.html
//! [`gl_call!`]:    ../macro.gl_call.html
//! [`ErrorPolicy`]: enum.ErrorPolicy.html

use std::fmt;
use std::rc::Rc;

use gl;
use log::{debug, error, warn};

use crate::backend::{Backend, NativeBackend};
use crate::error::{Error, GlErrorCode, Result};

/// Upper bound on the number of flags drained per check. A lost context keeps reporting
/// `GL_CONTEXT_LOST` forever, so polling has to stop at some point.
const MAX_PENDING_ERRORS: usize = 32;

/// Decides what happens when a driver call raises an error flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorPolicy {
    /// Panic on the first error. Useful while developing and in tests, as the panic points
    /// straight at the failing call.
    Abort,
    /// Log the error and return it to the caller, which may continue rendering.
    Collect,
}

impl Default for ErrorPolicy {
    /// `Abort` in debug builds, `Collect` in release builds.
    fn default() -> ErrorPolicy {
        if cfg!(debug_assertions) {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Collect
        }
    }
}

#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextConfig {
    pub error_policy: ErrorPolicy,
}

/// The rendering state of one OpenGL context. Its lifetime should match the lifetime of the
/// underlying context: all wrappers created from it release their handles through it when
/// dropped.
pub struct Context {
    backend: Rc<dyn Backend>,
    config: ContextConfig,
}

impl Context {
    pub fn new(backend: Rc<dyn Backend>, config: ContextConfig) -> Rc<Context> {
        debug!("Created rendering context with {:?}", config);
        Rc::new(Context { backend, config })
    }

    /// Creates a context which calls into OpenGL directly. `gl::load_with` must already have
    /// been called with a current context.
    pub fn native(config: ContextConfig) -> Rc<Context> {
        Context::new(Rc::new(NativeBackend::new()), config)
    }

    pub fn backend(&self) -> &dyn Backend {
        &*self.backend
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Discards all pending error flags, so that a following check only sees errors raised
    /// by the next call.
    pub fn clear_errors(&self) {
        for _ in 0..MAX_PENDING_ERRORS {
            if self.backend.get_error() == gl::NO_ERROR {
                return;
            }
        }
        warn!("Error flags are still raised after {} reads, the context might be lost", MAX_PENDING_ERRORS);
    }

    /// Collects all error flags raised since the last call to `clear_errors`.
    pub fn poll_errors(&self) -> Vec<GlErrorCode> {
        let mut codes = Vec::new();
        while codes.len() < MAX_PENDING_ERRORS {
            match self.backend.get_error() {
                gl::NO_ERROR => break,
                code         => codes.push(GlErrorCode(code)),
            }
        }
        codes
    }

    /// Checks for errors raised by `call`, which was made at `file:line`. Each raised error is
    /// logged. Depending on the error policy this then either panics or returns the errors.
    pub fn check(&self, call: &'static str, file: &'static str, line: u32) -> Result<()> {
        let codes = self.poll_errors();
        if codes.is_empty() {
            return Ok(());
        }

        for code in codes.iter() {
            error!("[OpenGL error] ({}): {} {}:{}", code, call, file, line);
        }
        let err = Error::Driver { codes, call, file, line };

        match self.config.error_policy {
            ErrorPolicy::Abort   => panic!("{}", err),
            ErrorPolicy::Collect => Err(err),
        }
    }

    /// Like `check`, but never panics. Used when releasing handles from `Drop`, where there is
    /// no caller to report to.
    pub fn check_release(&self, call: &'static str, file: &'static str, line: u32) {
        for code in self.poll_errors() {
            error!("[OpenGL error] ({}): {} {}:{}", code, call, file, line);
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .finish()
    }
}

/// Calls a [`Backend`] method through the given context, bracketed by error checks. Evaluates
/// to a `Result` holding the value returned by the backend.
///
/// The `release` form is meant for `Drop` implementations. It evaluates to the backend's
/// return value directly, and only logs raised errors.
///
/// [`Backend`]: backend/trait.Backend.html
#[macro_export]
macro_rules! gl_call {
    (release $ctx:expr, $method:ident ( $($arg:expr),* $(,)? )) => {{
        let ctx: &$crate::Context = &*$ctx;
        ctx.clear_errors();
        let value = ctx.backend().$method($($arg),*);
        ctx.check_release(
            concat!(stringify!($method), "(", stringify!($($arg),*), ")"),
            file!(), line!(),
        );
        value
    }};
    ($ctx:expr, $method:ident ( $($arg:expr),* $(,)? )) => {{
        let ctx: &$crate::Context = &*$ctx;
        ctx.clear_errors();
        let value = ctx.backend().$method($($arg),*);
        ctx.check(
            concat!(stringify!($method), "(", stringify!($($arg),*), ")"),
            file!(), line!(),
        ).map(|()| value)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::buffer::BufferTarget;

    fn collecting(backend: &Rc<RecordingBackend>) -> Rc<Context> {
        Context::new(backend.clone(), ContextConfig { error_policy: ErrorPolicy::Collect })
    }

    #[test]
    fn stale_errors_are_not_attributed_to_the_next_call() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = collecting(&backend);

        backend.push_error(gl::INVALID_VALUE);
        assert!(gl_call!(ctx, bind_buffer(BufferTarget::Array, 1)).is_ok());
    }

    #[test]
    fn collect_policy_returns_every_raised_code() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = collecting(&backend);
        backend.raise_after("bind_buffer", gl::INVALID_ENUM);

        match gl_call!(ctx, bind_buffer(BufferTarget::Array, 1)) {
            Err(Error::Driver { codes, call, .. }) => {
                assert_eq!(codes, vec![GlErrorCode(gl::INVALID_ENUM)]);
                assert!(call.starts_with("bind_buffer("));
            },
            other => panic!("Expected a driver error, got {:?}", other),
        }
    }

    #[test]
    #[should_panic(expected = "Invalid operation")]
    fn abort_policy_panics() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig { error_policy: ErrorPolicy::Abort });
        backend.raise_after("clear", gl::INVALID_OPERATION);

        let _ = gl_call!(ctx, clear(gl::COLOR_BUFFER_BIT));
    }

    #[test]
    fn release_never_panics() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig { error_policy: ErrorPolicy::Abort });
        backend.raise_after("delete_buffer", gl::INVALID_VALUE);

        gl_call!(release ctx, delete_buffer(7));
        assert_eq!(backend.get_error(), gl::NO_ERROR);
    }

    #[test]
    fn polling_stops_on_a_lost_context() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = collecting(&backend);
        for _ in 0..(MAX_PENDING_ERRORS + 8) {
            backend.push_error(gl::OUT_OF_MEMORY);
        }

        assert_eq!(ctx.poll_errors().len(), MAX_PENDING_ERRORS);
    }
}
