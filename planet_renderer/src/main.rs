//! Planet Renderer - Earth, Moon and Moon's Moon
//!
//! Real-time rendering of a small hierarchical system:
//! - Earth with day/night blending, specular oceans and a cloud layer
//! - A moon orbiting Earth and a smaller moon orbiting it
//! - Shadow mapping from a slowly rotating sun
//! - Orbit cameras for each body and a free first-person camera
//!
//! Controls:
//! - P/O: Next/previous camera mode
//! - Mouse drag: Rotate view
//! - Scroll: Zoom (orbit) or dolly (first person)
//! - WASD: Move (first person)
//! - L/K: Speed up/slow down time

mod camera;
mod clock;
mod config;
mod frame;
mod input;
mod renderer;
mod scene;
mod shadow;

use std::path::Path;
use std::time::Instant;

use common::GraphicsContext;
use config::{AppConfig, CONFIG_FILE};
use frame::FrameContext;
use input::InputSink;
use renderer::Renderer;
use winit::{
    event::{Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::ControlFlow,
    keyboard::PhysicalKey,
};

struct App {
    ctx: GraphicsContext,
    renderer: Renderer,
    frame: FrameContext,
    /// Set while the window has a zero-sized surface
    minimized: bool,
}

impl App {
    fn new(ctx: GraphicsContext, config: &AppConfig) -> anyhow::Result<Self> {
        let renderer = Renderer::new(&ctx, config)?;
        let frame = FrameContext::new(ctx.size.width, ctx.size.height);
        Ok(Self {
            ctx,
            renderer,
            frame,
            minimized: false,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.minimized = new_size.width == 0 || new_size.height == 0;
        if self.minimized {
            return;
        }
        self.ctx.resize(new_size);
        self.frame.on_resize(new_size.width, new_size.height);
        self.renderer.resize(&self.ctx.device, new_size.width, new_size.height);
    }

    fn render(&mut self, dt: f32) -> Result<(), wgpu::SurfaceError> {
        let snapshot = self.frame.advance(dt);

        let output = self.ctx.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.prepare(&self.ctx.queue, &snapshot);

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        self.renderer.render(&mut encoder, &view);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn print_controls() {
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║                     PLANET RENDERER                       ║");
    println!("╠═══════════════════════════════════════════════════════════╣");
    println!("║ Controls:                                                 ║");
    println!("║   P/O       - Next/previous camera mode                   ║");
    println!("║   Drag      - Rotate view                                 ║");
    println!("║   Scroll    - Zoom (orbit) / move (first person)          ║");
    println!("║   WASD      - Move (first person)                         ║");
    println!("║   L/K       - Speed up/slow down time                     ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
}

fn run() -> anyhow::Result<()> {
    let (config, config_error) = AppConfig::load_or_default(Path::new(CONFIG_FILE));

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    match config_error {
        Some(e) => log::warn!("{:#}; using defaults", e),
        None => log::debug!("Config: {:?}", config),
    }

    print_controls();

    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    ))?;

    let mut app = App::new(ctx, &config)?;
    let mut last_time = Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => app.resize(size),
                WindowEvent::MouseInput { state, button, .. } => {
                    app.frame.on_button(button.into(), state.into());
                }
                WindowEvent::CursorMoved { position, .. } => {
                    app.frame.on_pointer_move(position.x, position.y);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(key),
                            state,
                            repeat: false,
                            ..
                        },
                    ..
                } => app.frame.on_key(key.into(), state.into()),
                WindowEvent::MouseWheel { delta, .. } => {
                    let (dx, dy) = match delta {
                        MouseScrollDelta::LineDelta(x, y) => (x as f64, y as f64),
                        MouseScrollDelta::PixelDelta(pos) => (pos.x / 100.0, pos.y / 100.0),
                    };
                    app.frame.on_scroll(dx, dy);
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_time).as_secs_f32();
                    last_time = now;

                    if app.minimized {
                        return;
                    }

                    match app.render(dt) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
