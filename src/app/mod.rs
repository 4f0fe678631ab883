//! Windowed application: winit event handling around the visualizer.

mod clock;
mod controls;
mod render_loop;

use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::camera::PerspectiveCamera;
use crate::cli::Args;
use crate::params::{RenderConfig, SceneParams};
use crate::rendering::{InstanceRaw, RenderSystem, SceneMeshes, Uniforms};
use crate::visualizer::Visualizer;

// Re-export public types
pub use clock::{epoch_millis, FrameClock};
pub use controls::{command_for, window_title, Command, APP_TITLE};
pub use render_loop::{LoopState, RenderLoop};

/// Main application state
pub struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    camera: Option<PerspectiveCamera>,

    visualizer: Visualizer,
    scene_params: SceneParams,
    render_config: RenderConfig,

    render_loop: RenderLoop,
    clock: FrameClock,
    title: String,

    /// Startup failure to report once the event loop returns
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let scene_params = args.scene_params();
        let mut visualizer = Visualizer::new(
            &scene_params,
            args.motion_params(),
            args.analyser_config(),
        )?
        .with_autoplay(args.autoplay)
        .with_audio_output(!args.silent);

        if let Some(path) = &args.file {
            visualizer.open_file(path);
        }

        Ok(Self {
            window: None,
            render_system: None,
            camera: None,
            visualizer,
            scene_params,
            render_config: args.render_config(),
            render_loop: RenderLoop::new(),
            clock: FrameClock::new(),
            title: String::new(),
            failure: None,
        })
    }

    /// Error that stopped the app during startup, if any
    pub fn finish(mut self) -> anyhow::Result<()> {
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(APP_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();

        let meshes = SceneMeshes::build(self.visualizer.scene(), &self.scene_params);
        log::debug!(
            "Scene: {} objects, {} vertices",
            meshes.instance_count(),
            meshes.vertices.len()
        );

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &meshes,
            self.render_config.clear_color,
        ))?;

        self.camera = Some(PerspectiveCamera::new(
            &self.render_config,
            size.width,
            size.height,
        ));
        self.window = Some(window);
        self.render_system = Some(render_system);
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.render_loop.stop();
        event_loop.exit();
    }

    fn handle_command(&mut self, command: Command, event_loop: &ActiveEventLoop) {
        match command {
            Command::TogglePlayback => {
                // Disabled until a file has loaded
                if self.visualizer.toggle_playback().is_none() {
                    log::debug!("Nothing loaded, ignoring play/pause");
                }
            }
            Command::Quit => self.stop(event_loop),
        }
    }

    fn open_dropped(&mut self, path: PathBuf) {
        log::info!("Dropped {}", path.display());
        self.visualizer.open_file(path);
    }

    fn refresh_title(&mut self) {
        let title = window_title(self.visualizer.load_state(), self.visualizer.is_playing());
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        if !self.render_loop.begin_frame() {
            return;
        }

        let delta_s = self.clock.delta();
        self.visualizer.poll_loader();
        self.visualizer.tick(delta_s, epoch_millis());
        self.refresh_title();

        let (Some(render_system), Some(camera)) = (&mut self.render_system, &self.camera) else {
            return;
        };

        let scene = self.visualizer.scene();
        let instances: Vec<InstanceRaw> = scene.instances().iter().map(InstanceRaw::from).collect();
        render_system.update_instances(&instances);
        render_system.update_uniforms(&Uniforms::new(camera.view_proj(), camera.position, scene));

        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                render_system.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, stopping");
                self.render_loop.stop();
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.render_loop.is_running() {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        match self.init(event_loop) {
            Ok(()) => {
                log::info!("Running. Space/P: play/pause, drop a file to load, Esc: quit");
                self.render_loop.start();
                self.refresh_title();
            }
            Err(e) => {
                log::error!("Startup failed: {:#}", e);
                self.failure = Some(e);
                self.stop(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(command) = command_for(key) {
                    self.handle_command(command, event_loop);
                }
            }
            WindowEvent::DroppedFile(path) => self.open_dropped(path),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
                if let Some(camera) = &mut self.camera {
                    camera.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}
