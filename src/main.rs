use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use dendroview_rs::app::{App, SampleSource};
use dendroview_rs::config::ViewerConfig;
use dendroview_rs::layout::Size;
use dendroview_rs::render::RenderState;
use dendroview_rs::tree::ResponseNode;
use dendroview_rs::ui::input::{self, InputAction};

/// Interactive binary dendrogram viewer.
#[derive(Parser, Debug)]
#[command(name = "dendroview", version, about)]
struct Args {
    /// JSON tree to display; a random sample tree is generated when omitted
    #[arg(long)]
    tree: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Height of the generated sample tree
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=16))]
    levels: u32,

    /// Seed for the sample tree generator
    #[arg(long)]
    seed: Option<u64>,
}

/// Main application handler for winit's event loop.
struct DendroViewApp {
    app: App,
    render_state: Option<RenderState>,
    window: Option<Arc<Window>>,
}

impl DendroViewApp {
    fn new(app: App) -> Self {
        Self {
            app,
            render_state: None,
            window: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: InputAction) {
        if action == InputAction::Exit {
            event_loop.exit();
            return;
        }
        if self.app.handle_action(action) {
            self.request_redraw();
        }
    }
}

impl ApplicationHandler for DendroViewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("DendroView-rs")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(RenderState::new(window.clone())) {
            Ok(state) => {
                let size = window.inner_size();
                tracing::info!(
                    "Window initialized: scale_factor={:.3}, physical_size={}x{}",
                    window.scale_factor(),
                    size.width,
                    size.height
                );
                self.app.resize(size.width, size.height);
                self.render_state = Some(state);
                window.request_redraw();
            }
            Err(e) => {
                tracing::error!("Failed to initialize GPU: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(render) = &mut self.render_state {
                    render.resize(size.width, size.height);
                    self.app.resize(size.width, size.height);
                    self.request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                tracing::info!("Scale factor changed: {:.3}", scale_factor);
                if let (Some(render), Some(window)) = (&mut self.render_state, &self.window) {
                    let size = window.inner_size();
                    render.resize(size.width, size.height);
                    self.app.resize(size.width, size.height);
                    window.request_redraw();
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let action =
                    input::process_cursor_moved(&mut self.app.mouse, position.x as f32, position.y as f32);
                self.handle_action(event_loop, action);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let action = input::process_mouse_button(button, state, &mut self.app.mouse);
                self.handle_action(event_loop, action);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.handle_action(event_loop, input::process_wheel(delta));
            }

            WindowEvent::PinchGesture { delta, .. } => {
                self.handle_action(event_loop, input::process_pinch(delta));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let action = input::process_key(event.logical_key.clone(), event.state);
                self.handle_action(event_loop, action);
            }

            WindowEvent::RedrawRequested => {
                if self.app.needs_relayout {
                    self.app.relayout();
                }

                self.app.rebuild_scene();

                if let Some(render) = &mut self.render_state {
                    if let Err(e) = render.render(&self.app.scene, self.app.style.background) {
                        tracing::error!("Render error: {}", e);
                    }
                }
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dendroview_rs=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = ViewerConfig::load_or_default(args.config.as_deref())?;

    let mut app = App::new(config, Size::new(1280.0, 800.0));
    match &args.tree {
        Some(path) => {
            let tree = ResponseNode::from_json_file(path)
                .with_context(|| format!("loading tree {}", path.display()))?;
            app.set_tree(tree);
        }
        None => app.set_sample(SampleSource {
            levels: args.levels,
            seed: args.seed.unwrap_or_else(rand::random),
        }),
    }
    app.set_tap_handler(|| tracing::info!("Dendrogram tapped"));

    tracing::info!("DendroView-rs starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut handler = DendroViewApp::new(app);
    event_loop.run_app(&mut handler)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_height_is_bounded() {
        assert!(Args::try_parse_from(["prog", "--levels", "16"]).is_ok());
        assert!(Args::try_parse_from(["prog", "--levels", "40"]).is_err());
        assert!(Args::try_parse_from(["prog", "--levels", "0"]).is_err());
    }
}
