use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use walkabout_common::Rgba;
use walkabout_input::InputState;
use walkabout_render::SoftwareCanvas;
use walkabout_render_wgpu::CanvasPresenter;
use walkabout_scheduler::{Clock, DemoConfig, FixedRate, Game, SystemClock};
use walkabout_tools::GameInspector;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Page color behind the canvas.
const BACKGROUND: Rgba = Rgba::WHITE;

#[derive(Parser)]
#[command(name = "walkabout-desktop", about = "Walk a sprite around a top-down world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// `RUST_LOG` when set, otherwise `debug` or `info` depending on `--verbose`.
fn log_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Binding name for a physical key, matching the default bindings.
fn key_name(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        KeyCode::ShiftLeft => "ShiftLeft",
        KeyCode::ShiftRight => "ShiftRight",
        _ => return None,
    })
}

/// Simulation side: everything that does not touch the GPU.
struct AppState {
    game: Game,
    canvas: SoftwareCanvas,
    input: InputState,
    clock: SystemClock,
    rate: FixedRate,
}

impl AppState {
    fn new(config: &DemoConfig) -> Result<Self> {
        let game = Game::from_config(config)?;
        let mut canvas = SoftwareCanvas::new(config.viewport.width, config.viewport.height);
        game.prepare_surface(&mut canvas);
        Ok(Self {
            game,
            canvas,
            input: InputState::new(),
            clock: SystemClock::new(),
            rate: config.fixed_rate()?,
        })
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        let Some(name) = key_name(code) else {
            return;
        };
        if pressed {
            self.input.press(name);
        } else {
            self.input.release(name);
        }
    }

    /// Run every tick that is due. Returns how many ran.
    fn update(&mut self) -> u32 {
        let due = self.rate.due(self.clock.now());
        for _ in 0..due {
            let report = self
                .game
                .run_tick(self.clock.now(), &self.input, &mut self.canvas);
            if report.tick % 600 == 0 {
                tracing::debug!("{}", GameInspector::summary(&self.game));
            }
        }
        due
    }
}

/// GPU side, created once the window exists.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    presenter: CanvasPresenter,
}

impl Gpu {
    fn new(window: Arc<Window>, canvas_size: (u32, u32)) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("walkabout_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let presenter = CanvasPresenter::new(
            &device,
            surface_format,
            canvas_size.0,
            canvas_size.1,
            BACKGROUND,
        );

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            presenter,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    fn present(&mut self, canvas: &SoftwareCanvas) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.presenter
            .present(&self.device, &self.queue, &view, canvas.image());
        output.present();
    }
}

struct App {
    config: DemoConfig,
    state: Option<AppState>,
    gpu: Option<Gpu>,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        Self {
            config,
            state: None,
            gpu: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let state = AppState::new(&self.config)?;
        let viewport = state.game.viewport();
        let attrs = Window::default_attributes()
            .with_title("Walkabout")
            .with_inner_size(PhysicalSize::new(viewport.width, viewport.height));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let gpu = Gpu::new(window, (viewport.width, viewport.height))?;
        self.state = Some(state);
        self.gpu = Some(gpu);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            tracing::error!("startup failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(state), Some(gpu)) = (&mut self.state, &mut self.gpu) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("{}", GameInspector::summary(&state.game));
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                state.game.request_resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(false) => {
                // Releases can be missed while unfocused.
                state.input.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape && key_state == ElementState::Pressed {
                    event_loop.exit();
                    return;
                }
                state.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => {
                state.update();
                gpu.present(&state.canvas);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .init();

    let config = match &cli.config {
        Some(path) => DemoConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DemoConfig::default(),
    };

    tracing::info!("walkabout-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
