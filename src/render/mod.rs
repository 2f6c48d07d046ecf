pub mod colors;
pub mod raster;
pub mod scene;
pub mod text;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use vello::wgpu;
use vello::{AaConfig, RenderParams, Renderer, RendererOptions, Scene};
use winit::window::Window;

use crate::layout::{DrawCommand, Point};
use crate::ui::viewport::ViewportTransform;
use colors::{depth_color, Rgba};

/// A drawing target that receives screen-space primitives.
///
/// Implemented once per back-end: [`scene::SceneSurface`] records a retained
/// vello scene, [`raster::RasterSurface`] paints pixels immediately.
pub trait Surface {
    fn line(&mut self, from: Point, to: Point, color: Rgba, width: f32);
    fn text(&mut self, text: &str, top_left: Point, font_size: f32, color: Rgba);
}

/// Rendering options as read from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub background: String,
    pub line_color: String,
    /// Stroke width in screen pixels
    pub line_width: f32,
    /// Color connector lines by the depth of the child they lead to
    pub color_lines_by_depth: bool,
    /// TTF used for labels; a system font is tried when absent
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".into(),
            line_color: "#000000".into(),
            line_width: 1.0,
            color_lines_by_depth: false,
            font_path: None,
        }
    }
}

impl RenderConfig {
    /// Resolve color strings; malformed values fall back to white/black.
    pub fn style(&self, font_size: f32) -> RenderStyle {
        let parse = |s: &str, fallback: Rgba| {
            Rgba::parse(s).unwrap_or_else(|e| {
                tracing::warn!("{} in render config", e);
                fallback
            })
        };
        RenderStyle {
            background: parse(&self.background, Rgba::WHITE),
            line_color: parse(&self.line_color, Rgba::BLACK),
            line_width: self.line_width,
            color_lines_by_depth: self.color_lines_by_depth,
            font_size,
        }
    }
}

/// Resolved rendering options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: Rgba,
    pub line_color: Rgba,
    pub line_width: f32,
    pub color_lines_by_depth: bool,
    /// Label font size in world units
    pub font_size: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderConfig::default().style(10.0)
    }
}

/// Replay layout commands onto `surface` through one frame's transform.
///
/// The transform is taken by value so the whole frame uses a single,
/// consistent snapshot of it.
pub fn draw_commands(
    commands: &[DrawCommand],
    transform: ViewportTransform,
    style: &RenderStyle,
    surface: &mut dyn Surface,
) {
    for command in commands {
        match command {
            DrawCommand::Line {
                from, to, depth, ..
            } => {
                let color = if style.color_lines_by_depth {
                    depth_color(*depth)
                } else {
                    style.line_color
                };
                surface.line(
                    transform.to_screen(*from),
                    transform.to_screen(*to),
                    color,
                    style.line_width,
                );
            }
            DrawCommand::Label {
                text,
                top_left,
                color,
                ..
            } => {
                surface.text(
                    text,
                    transform.to_screen(*top_left),
                    style.font_size * transform.scale,
                    *color,
                );
            }
        }
    }
}

/// Holds all GPU rendering state.
pub struct RenderState {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub renderer: Renderer,
    scene_target: wgpu::Texture,
    scene_target_view: wgpu::TextureView,
    blitter: wgpu::util::TextureBlitter,
}

impl RenderState {
    /// Initialize the GPU rendering pipeline.
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No compatible GPU adapter found"))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Surface reported no supported formats"))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let renderer = Renderer::new(
            &device,
            RendererOptions {
                use_cpu: false,
                antialiasing_support: vello::AaSupport::all(),
                num_init_threads: None,
                pipeline_cache: None,
            },
        )?;

        // Vello always renders to an Rgba8Unorm storage image; then we blit to swapchain format.
        let scene_target = create_scene_target(&device, surface_config.width, surface_config.height);
        let scene_target_view = scene_target.create_view(&wgpu::TextureViewDescriptor::default());
        let blitter = wgpu::util::TextureBlitter::new(&device, format);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            renderer,
            scene_target,
            scene_target_view,
            blitter,
        })
    }

    /// Resize the surface (call on window resize).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
        self.scene_target =
            create_scene_target(&self.device, self.surface_config.width, self.surface_config.height);
        self.scene_target_view = self
            .scene_target
            .create_view(&wgpu::TextureViewDescriptor::default());
    }

    /// Render a scene to the surface.
    pub fn render(&mut self, scene: &Scene, background: Rgba) -> Result<()> {
        let surface_texture = self.surface.get_current_texture()?;

        let render_params = RenderParams {
            base_color: background.to_peniko(),
            width: self.surface_config.width,
            height: self.surface_config.height,
            antialiasing_method: AaConfig::Msaa16,
        };

        self.renderer.render_to_texture(
            &self.device,
            &self.queue,
            scene,
            &self.scene_target_view,
            &render_params,
        )?;

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("present blit encoder"),
            });
        self.blitter
            .copy(&self.device, &mut encoder, &self.scene_target_view, &surface_view);
        self.queue.submit(Some(encoder.finish()));

        surface_texture.present();
        Ok(())
    }
}

fn create_scene_target(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("scene offscreen target"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}
