//! Desktop host for a [`Gauge`]: a winit window backed by a pixels surface.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::config::Rgba;
use crate::error::GaugeError;
use crate::font;
use crate::raster::Canvas;
use crate::Gauge;

/// Updates sent to a running gauge window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GaugeCommand {
    SetValue(f64),
    /// Move the value by a signed amount.
    Nudge(f64),
}

#[derive(Debug, Clone, Builder)]
pub struct WindowOptions {
    #[builder(into, default = "Custom Gauge".to_string())]
    pub title: String,
    #[builder(default = 300)]
    pub width: u32,
    #[builder(default = 300)]
    pub height: u32,
    #[builder(default = 200)]
    pub min_size: u32,
    #[builder(default = true)]
    pub resizable: bool,
    /// Upper bound on how often commands are polled and frames presented.
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    /// Font file for the labels; the configured family is searched otherwise.
    pub font_path: Option<PathBuf>,
    /// Value change per arrow key press.
    #[builder(default = 1.0)]
    pub key_step: f64,
    #[builder(default = Rgba::WHITE)]
    pub background: Rgba,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn window_error(e: impl std::fmt::Display) -> GaugeError {
    GaugeError::Window(e.to_string())
}

impl Gauge {
    pub fn apply(&mut self, command: GaugeCommand) {
        match command {
            GaugeCommand::SetValue(value) => self.set_value(value),
            GaugeCommand::Nudge(delta) => self.set_value(self.value() + delta),
        }
    }

    /// Map a key press to a command: arrows step the value, Home and End jump
    /// to the bounds.
    pub fn key_command(&self, key: &Key, step: f64) -> Option<GaugeCommand> {
        match key {
            Key::Named(NamedKey::ArrowUp | NamedKey::ArrowRight) => Some(GaugeCommand::Nudge(step)),
            Key::Named(NamedKey::ArrowDown | NamedKey::ArrowLeft) => {
                Some(GaugeCommand::Nudge(-step))
            }
            Key::Named(NamedKey::Home) => Some(GaugeCommand::SetValue(self.config().min_value)),
            Key::Named(NamedKey::End) => Some(GaugeCommand::SetValue(self.config().max_value)),
            _ => None,
        }
    }

    /// Open a window and drive it from keyboard input only.
    pub fn show(&mut self, options: &WindowOptions) -> Result<(), GaugeError> {
        self.run_window(options, None)
    }

    /// Open a window that also applies every command arriving on `receiver`.
    pub fn show_with_commands(
        &mut self,
        options: &WindowOptions,
        receiver: Receiver<GaugeCommand>,
    ) -> Result<(), GaugeError> {
        self.run_window(options, Some(receiver))
    }

    fn run_window(
        &mut self,
        options: &WindowOptions,
        receiver: Option<Receiver<GaugeCommand>>,
    ) -> Result<(), GaugeError> {
        let event_loop = EventLoop::new().map_err(window_error)?;
        let window = WindowBuilder::new()
            .with_title(&options.title)
            .with_inner_size(LogicalSize::new(options.width as f64, options.height as f64))
            .with_min_inner_size(LogicalSize::new(
                options.min_size as f64,
                options.min_size as f64,
            ))
            .with_resizable(options.resizable)
            .build(&event_loop)
            .map_err(window_error)?;
        let window = Arc::new(window);

        let label_font = match font::load_family(
            &self.config().number_font_family,
            options.font_path.as_deref(),
        ) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("tick labels disabled: {e}");
                None
            }
        };

        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width;
        let mut fb_height = size.height;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels =
            Pixels::new(size.width, size.height, surface_texture).map_err(window_error)?;

        let frame_duration = Duration::from_secs_f64(1.0 / options.max_framerate.max(1.0));
        info!(title = %options.title, width = fb_width, height = fb_height, "gauge window open");

        event_loop
            .run(move |event, window_target| match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if new_size.width == 0 || new_size.height == 0 {
                            debug!("window minimized, keeping previous surface");
                            return;
                        }
                        if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                            warn!("buffer resize failed: {e}");
                            return;
                        }
                        if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                            warn!("surface resize failed: {e}");
                        }
                        fb_width = new_size.width;
                        fb_height = new_size.height;
                        window_clone.request_redraw();
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state == ElementState::Pressed {
                            if let Some(command) = self.key_command(&event.logical_key, options.key_step)
                            {
                                self.apply(command);
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(
                            frame,
                            fb_width as usize,
                            fb_height as usize,
                            label_font.as_ref(),
                        );
                        canvas.clear(options.background);
                        self.paint(fb_width, fb_height, &mut canvas);
                        if let Err(e) = pixels.render() {
                            warn!("present failed: {e}");
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if let Some(ref receiver) = receiver {
                        while let Ok(command) = receiver.try_recv() {
                            self.apply(command);
                        }
                    }
                    if self.take_redraw_request() {
                        window_clone.request_redraw();
                    }
                    window_target
                        .set_control_flow(ControlFlow::WaitUntil(Instant::now() + frame_duration));
                }
                _ => {}
            })
            .map_err(window_error)?;

        Ok(())
    }
}
