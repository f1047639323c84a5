//! Opens a window and draws an animated quad with the `easel` wrappers.
//!
//! Usage: `sandbox [texture.png]`. The shader is read from `res/shaders/basic.shader`, or from
//! the path in `EASEL_SHADER` if set. Log output is controlled through `RUST_LOG`.

use std::error::Error;
use std::ffi::CString;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::ptr;
use std::rc::Rc;
use std::time::Instant;

use easel::buffer::{IndexBuffer, VertexBuffer, VertexLayout};
use easel::{Color, Context, ContextConfig, Mat4, Renderer, Shader, Texture, VertexArray};

use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext,
                      PossiblyCurrentContext, Version};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::raw_window_handle::HasWindowHandle;
use winit::window::{Window, WindowId};

const WIDTH: f32 = 960.0;
const HEIGHT: f32 = 540.0;

// x, y, u, v
const QUAD: [f32; 16] = [
    -50.0, -50.0, 0.0, 0.0,
     50.0, -50.0, 1.0, 0.0,
     50.0,  50.0, 1.0, 1.0,
    -50.0,  50.0, 0.0, 1.0,
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

struct SandboxConfig {
    title: String,
    shader_path: PathBuf,
    texture_path: Option<PathBuf>,
    context: ContextConfig,
}

impl SandboxConfig {
    fn from_env() -> SandboxConfig {
        SandboxConfig {
            title: String::from("easel sandbox"),
            shader_path: std::env::var_os("EASEL_SHADER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("res/shaders/basic.shader")),
            texture_path: std::env::args_os().nth(1).map(PathBuf::from),
            context: ContextConfig::default(),
        }
    }
}

/// Everything drawn each frame. Owns GPU resources, so it has to be dropped while the context
/// is still current.
struct Scene {
    renderer: Renderer,
    shader: Shader,
    array: VertexArray,
    indices: IndexBuffer,
    // Kept alive for as long as `array` references it
    _vertices: VertexBuffer,
    texture: Option<Texture>,
    start: Instant,
}

impl Scene {
    fn new(ctx: &Rc<Context>, config: &SandboxConfig) -> easel::Result<Scene> {
        let renderer = Renderer::new(ctx);
        renderer.set_blending(true)?;

        let vertices = VertexBuffer::from_slice(ctx, &QUAD)?;
        let mut layout = VertexLayout::new();
        layout.push::<f32>(2); // Position
        layout.push::<f32>(2); // Texture coordinate

        let array = VertexArray::new(ctx)?;
        array.add_buffer(&vertices, &layout)?;
        let indices = IndexBuffer::new(ctx, &QUAD_INDICES)?;

        let texture = match config.texture_path {
            Some(ref path) => Some(Texture::from_file(ctx, path)?),
            None => None,
        };

        let mut shader = Shader::from_file(ctx, &config.shader_path)?;
        shader.bind()?;
        shader.set_uniform_1i("u_UseTexture", texture.is_some() as i32)?;
        if let Some(ref texture) = texture {
            texture.bind(0)?;
            shader.set_uniform_1i("u_Texture", 0)?;
        }

        array.unbind()?;
        vertices.unbind()?;
        indices.unbind()?;
        shader.unbind()?;

        Ok(Scene {
            renderer,
            shader,
            array,
            indices,
            _vertices: vertices,
            texture,
            start: Instant::now(),
        })
    }

    fn draw(&mut self) -> easel::Result<()> {
        let time = self.start.elapsed().as_secs_f32();

        self.renderer.set_clear_color(Color::hex_int(0x1e1e24))?;
        self.renderer.clear()?;

        let projection = Mat4::ortho(0.0, WIDTH, 0.0, HEIGHT, -1.0, 1.0);
        let positions = [(WIDTH*0.3, HEIGHT*0.5), (WIDTH*0.7, HEIGHT*0.5)];

        if let Some(ref texture) = self.texture {
            texture.bind(0)?;
        }
        for (i, &(x, y)) in positions.iter().enumerate() {
            let offset = (time + i as f32).sin() * 100.0;
            let model = Mat4::translation(x, y + offset, 0.0);
            let color = Color::hsl(time*0.1 + i as f32*0.5, 0.7, 0.6);

            self.shader.bind()?;
            self.shader.set_uniform_mat4f("u_MVP", &(projection * model))?;
            self.shader.set_uniform("u_Color", &color)?;
            self.renderer.draw(&self.array, &self.indices, &self.shader)?;
        }

        Ok(())
    }
}

struct Graphics {
    // Declared first, so it is dropped before the context
    scene: Scene,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
}

impl Graphics {
    fn new(event_loop: &ActiveEventLoop, config: &SandboxConfig) -> Result<Graphics, Box<dyn Error>> {
        info!("Creating OpenGL window and context...");

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(WIDTH, HEIGHT));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() { config } else { accum }
                    })
                    .expect("No OpenGL config available")
            })?;
        let window = window.ok_or("Failed to create a window")?;

        let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(raw_window_handle);

        let gl_display = gl_config.display();
        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes)? };

        let surface_attributes = window.build_surface_attributes(Default::default())?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes)? };
        let context = not_current.make_current(&surface)?;

        if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            warn!("Failed to enable vsync: {}", err);
        }

        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(&symbol),
            Err(_)     => ptr::null(),
        });

        let ctx = Context::native(config.context.clone());
        let scene = Scene::new(&ctx, config)?;

        let size = window.inner_size();
        scene.renderer.set_viewport(0, 0, size.width, size.height)?;

        info!("OpenGL window & context initialized");
        Ok(Graphics { scene, surface, context, window })
    }

    fn resize(&self, width: u32, height: u32) -> easel::Result<()> {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, width, height);
            self.scene.renderer.set_viewport(0, 0, width.get(), height.get())?;
        }
        Ok(())
    }

    fn frame(&mut self) -> Result<(), Box<dyn Error>> {
        self.scene.draw()?;
        self.surface.swap_buffers(&self.context)?;
        Ok(())
    }
}

struct App {
    config: SandboxConfig,
    graphics: Option<Graphics>,
    failed: bool,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: &dyn Error) {
        error!("{}", err);
        self.failed = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        match Graphics::new(event_loop, &self.config) {
            Ok(graphics) => self.graphics = Some(graphics),
            Err(err)     => self.fail(event_loop, &*err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let result: Result<(), Box<dyn Error>> = match (event, self.graphics.as_mut()) {
            (WindowEvent::CloseRequested, _) => {
                event_loop.exit();
                Ok(())
            },
            (WindowEvent::Resized(size), Some(graphics)) => {
                graphics.resize(size.width, size.height).map_err(Into::into)
            },
            (WindowEvent::RedrawRequested, Some(graphics)) => graphics.frame(),
            _ => Ok(()),
        };

        if let Err(err) = result {
            self.fail(event_loop, &*err);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref graphics) = self.graphics {
            graphics.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release GPU resources while the context is still alive
        self.graphics = None;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = App {
        config: SandboxConfig::from_env(),
        graphics: None,
        failed: false,
    };

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    if app.failed {
        return Err("sandbox exited after an error".into());
    }
    Ok(())
}
