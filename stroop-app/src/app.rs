use anyhow::{Context, Result};
use pixels::{Pixels, SurfaceTexture};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stroop_app::{JsonLinesSink, key_for};
use stroop_core::{Effect, HostControls, TrialRecord};
use stroop_experiment::{ResultSummary, StroopConfig, StroopStateMachine, dispatch};
use stroop_render::{SkiaSurface, paint};
use stroop_timing::{HighPrecisionTimer, Timer};
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

/// Window size the task shrinks to once it is over.
const CLOSING_SIZE: LogicalSize<u32> = LogicalSize::new(740, 600);

/// Host controls backed by the task window.
#[derive(Default)]
struct WindowHost {
    window: Option<Arc<Window>>,
    continue_revealed: bool,
}

impl HostControls for WindowHost {
    fn exit_fullscreen(&mut self) {
        if let Some(window) = &self.window {
            window.set_fullscreen(None);
        }
    }

    fn reveal_continue(&mut self) {
        self.continue_revealed = true;
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        info!("task finished, press SPACE or close the window to continue");
    }

    fn shrink_surface(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.request_inner_size(CLOSING_SIZE);
        }
    }
}

/// Once the task has stopped, Space continues only after the closing screen
/// revealed it; Escape always leaves.
fn exit_requested(code: KeyCode, continue_revealed: bool) -> bool {
    match code {
        KeyCode::Escape => true,
        KeyCode::Space => continue_revealed,
        _ => false,
    }
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    surface: Option<SkiaSurface>,
    task: StroopStateMachine<HighPrecisionTimer, StdRng>,
    sink: JsonLinesSink,
    host: WindowHost,
    records: Vec<TrialRecord>,
    refresh_rate: Option<f64>,
    last_frame_ns: Option<u64>,
    should_exit: bool,
}

impl App {
    pub fn new(config: StroopConfig, data_path: &Path) -> Result<Self> {
        let rng = StdRng::from_rng(&mut rand::rng());
        let task = StroopStateMachine::new(config, HighPrecisionTimer::new(), rng)?;
        let sink = JsonLinesSink::open(data_path)
            .with_context(|| format!("opening data file {}", data_path.display()))?;

        Ok(Self {
            window: None,
            pixels: None,
            surface: None,
            task,
            sink,
            host: WindowHost::default(),
            records: Vec::new(),
            refresh_rate: None,
            last_frame_ns: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            data = %self.sink.path().display(),
            "stroop task starting"
        );
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .context("no monitor available")?;
        self.refresh_rate = monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let attributes = Window::default_attributes()
            .with_title("Stroop")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            refresh_hz = self.refresh_rate.unwrap_or_default(),
            "display ready"
        );

        let texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, texture)?);
        self.surface = Some(SkiaSurface::new(size.width, size.height)?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.host.window = Some(window.clone());
        self.window = Some(window);
        Ok(())
    }

    /// One display frame: step the task, route its effects, paint the screen.
    fn frame(&mut self) -> Result<()> {
        let now = self.task.timer.now();
        if let Some(prev) = self.last_frame_ns.replace(now) {
            self.task
                .timer
                .record_frame(Duration::from_nanos(now.saturating_sub(prev)));
        }

        let frame = self.task.step();
        dispatch(&frame.effects, &mut self.sink, &mut self.host)?;
        for effect in &frame.effects {
            if let Effect::Trial { key, record } = effect {
                if !key.starts_with("pracStroop") {
                    self.records.push(record.clone());
                }
            }
        }

        if let (Some(surface), Some(pixels)) = (self.surface.as_mut(), self.pixels.as_mut()) {
            paint(&frame.screen, surface);
            surface.copy_to(pixels.frame_mut());
            pixels.render()?;
        }
        Ok(())
    }

    fn handle_input(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        if !self.task.is_running() {
            if exit_requested(code, self.host.continue_revealed) {
                self.cleanup_and_exit(event_loop);
            }
            return;
        }
        if let Some(key) = key_for(code) {
            self.task.press(key);
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        if let Some(surface) = &mut self.surface {
            if let Err(e) = surface.resize(size.width, size.height) {
                warn!(error = %e, "failed to resize canvas");
            }
        }
        info!(width = size.width, height = size.height, "display resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }

        let stats = self.task.timer.calibration_stats();
        info!(
            fps = format_args!("{:.1}", stats.effective_fps),
            frame_ms = format_args!("{:.3}", stats.average_frame_time_ns / 1e6),
            jitter_ms = format_args!("{:.3}", stats.jitter_ns / 1e6),
            "frame timing"
        );
        ResultSummary::from_records(&self.records).log();
        info!(phase = %self.task.phase(), "task closed");

        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(error = %e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    error!(error = %e, "frame failed");
                    self.cleanup_and_exit(event_loop);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
