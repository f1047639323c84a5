use std::path::{Path, PathBuf};
use std::rc::Rc;

use gl;
use gl::types::*;
use log::debug;

use crate::backend::{TextureFilter, TextureParameter, TextureWrap};
use crate::context::Context;
use crate::error::{Error, Result};

/// Decoded RGBA8 pixel data. Rows are stored bottom to top, which is the order OpenGL expects
/// for texture coordinates with the origin in the lower left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// The number of channels in the source image, before conversion to RGBA.
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl RawImage {
    /// Wraps already decoded, bottom to top, RGBA8 pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<RawImage> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidImage { expected, actual: pixels.len() });
        }
        Ok(RawImage { width, height, channels: 4, pixels })
    }

    /// Decodes an image file, converting it to RGBA8 and flipping it vertically.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RawImage> {
        let image = image::open(path.as_ref())?;
        let channels = image.color().channel_count();
        let image = image.flipv().to_rgba8();

        Ok(RawImage {
            width: image.width(),
            height: image.height(),
            channels,
            pixels: image.into_raw(),
        })
    }
}

/// A wrapper around an OpenGL 2D texture object. Textures use linear filtering and are clamped
/// at their edges.
#[derive(Debug)]
pub struct Texture {
    ctx: Rc<Context>,
    texture: GLuint,
    source_file: Option<PathBuf>, // If this texture did not originate from a file, this will be None

    width: u32,
    height: u32,
    channels: u8,
}

impl Texture {
    /// Creates a texture with the image data from a file
    pub fn from_file<P: AsRef<Path>>(ctx: &Rc<Context>, path: P) -> Result<Texture> {
        let image = RawImage::load(path.as_ref())?;
        let mut texture = Texture::from_image(ctx, &image)?;
        texture.source_file = Some(path.as_ref().to_path_buf());
        Ok(texture)
    }

    pub fn from_image(ctx: &Rc<Context>, image: &RawImage) -> Result<Texture> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.pixels.len() != expected {
            return Err(Error::InvalidImage { expected, actual: image.pixels.len() });
        }

        let handle = gl_call!(ctx, gen_texture())?;
        let texture = Texture {
            ctx: ctx.clone(),
            texture: handle,
            source_file: None,

            width: image.width,
            height: image.height,
            channels: image.channels,
        };

        gl_call!(ctx, bind_texture(handle))?;
        for &parameter in [
            TextureParameter::MinFilter(TextureFilter::Linear),
            TextureParameter::MagFilter(TextureFilter::Linear),
            TextureParameter::WrapS(TextureWrap::ClampToEdge),
            TextureParameter::WrapT(TextureWrap::ClampToEdge),
        ].iter() {
            gl_call!(ctx, tex_parameter(parameter))?;
        }
        gl_call!(ctx, tex_image_rgba8(image.width, image.height, &image.pixels))?;
        gl_call!(ctx, bind_texture(0))?;

        debug!("Created {}x{} texture {}", image.width, image.height, handle);
        Ok(texture)
    }

    /// Binds this texture to the given texture unit, which shaders sample from through a
    /// `sampler2D` uniform set to `slot`.
    ///
    /// Fails with `Error::OutOfRange` if `slot` can not name a texture unit.
    pub fn bind(&self, slot: u32) -> Result<()> {
        if gl::TEXTURE0.checked_add(slot).is_none() {
            return Err(Error::OutOfRange { name: "texture slot", value: u64::from(slot) });
        }
        gl_call!(self.ctx, active_texture(slot))?;
        gl_call!(self.ctx, bind_texture(self.texture))
    }

    /// Clears the texture binding of the active texture unit.
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.ctx, bind_texture(0))
    }

    pub fn handle(&self) -> GLuint {
        self.texture
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        gl_call!(release self.ctx, delete_texture(self.texture));
        debug!("Deleted texture {}", self.texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Call, RecordingBackend};
    use crate::ContextConfig;

    #[test]
    fn upload_records_size_and_parameters() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());

        let image = RawImage::new(2, 3, vec![255; 2 * 3 * 4]).unwrap();
        let texture = Texture::from_image(&ctx, &image).unwrap();
        assert_eq!((texture.width(), texture.height(), texture.channels()), (2, 3, 4));

        let calls = backend.calls();
        assert!(calls.contains(&Call::TexImage { width: 2, height: 3, pixels: 24 }));
        assert!(calls.contains(&Call::TexParameter(TextureParameter::MinFilter(TextureFilter::Linear))));
        assert!(calls.contains(&Call::TexParameter(TextureParameter::WrapT(TextureWrap::ClampToEdge))));
    }

    #[test]
    fn bind_activates_the_slot_first() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());
        let image = RawImage::new(1, 1, vec![0, 0, 0, 255]).unwrap();
        let texture = Texture::from_image(&ctx, &image).unwrap();

        backend.clear_calls();
        texture.bind(3).unwrap();
        assert_eq!(backend.calls(), vec![Call::ActiveTexture(3), Call::BindTexture(texture.handle())]);
    }

    #[test]
    fn slot_past_the_last_unit_is_rejected() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());
        let image = RawImage::new(1, 1, vec![0, 0, 0, 255]).unwrap();
        let texture = Texture::from_image(&ctx, &image).unwrap();

        backend.clear_calls();
        match texture.bind(u32::MAX) {
            Err(Error::OutOfRange { name, .. }) => assert_eq!(name, "texture slot"),
            other => panic!("Expected an out of range error, got {:?}", other),
        }
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn mismatched_pixel_data_is_rejected() {
        match RawImage::new(4, 4, vec![0; 10]) {
            Err(Error::InvalidImage { expected, actual }) => assert_eq!((expected, actual), (64, 10)),
            other => panic!("Expected an invalid image error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let backend = Rc::new(RecordingBackend::new());
        let ctx = Context::new(backend.clone(), ContextConfig::default());

        assert!(Texture::from_file(&ctx, "does/not/exist.png").is_err());
        assert!(backend.calls().is_empty());
    }
}
