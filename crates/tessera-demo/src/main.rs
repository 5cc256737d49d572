use std::f32::consts::TAU;
use std::time::Instant;

use anyhow::Result;
use tessera_engine::batch::{BatchKind, StencilGroup, TriParams, TriVert};
use tessera_engine::camera::{Camera, CameraId, CameraMask, CameraSet};
use tessera_engine::coords::{Color, Rect, Vec2, Viewport};
use tessera_engine::core::{App, AppControl, FrameCtx};
use tessera_engine::device::{Gpu, GpuInit};
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::render::{initialize, RendererConfig, ShaderType, TriRenderer, WgpuTriResources};
use tessera_engine::window::{Runtime, RuntimeConfig};
use tessera_engine::RenderError;
use winit::event::WindowEvent;
use winit::keyboard::{Key, NamedKey};

const MAIN_VIEW: CameraMask = CameraMask::bit(0);
const MINIMAP_VIEW: CameraMask = CameraMask::bit(1);

const CLIP: Option<StencilGroup> = StencilGroup::new(0);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let demo = Demo::new();
    Runtime::run(
        RuntimeConfig {
            title: "tessera demo".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        demo,
    )
}

struct Demo {
    started: Instant,
    renderer: Option<(TriRenderer, WgpuTriResources)>,
    cameras: CameraSet,
    main: CameraId,
    minimap: CameraId,
}

impl Demo {
    fn new() -> Self {
        let mut cameras = CameraSet::new();
        let main = cameras.add(Camera::orthographic(Rect::new(0.0, 0.0, 1.0, 1.0)).with_mask(MAIN_VIEW));
        let minimap = cameras.add(Camera::orthographic(Rect::new(0.0, 0.0, 1.0, 1.0)).with_mask(MINIMAP_VIEW));

        Self {
            started: Instant::now(),
            renderer: None,
            cameras,
            main,
            minimap,
        }
    }

    /// Main camera covers the window; the minimap shows the same world in the bottom-right corner.
    fn update_cameras(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        let world = Rect::from_viewport(viewport);
        *self.cameras.get_mut(self.main)? = Camera::orthographic(world).with_mask(MAIN_VIEW);

        let (w, h) = (viewport.width * 0.25, viewport.height * 0.25);
        let region = Rect::new(viewport.width - w - 16.0, viewport.height - h - 16.0, w, h);
        *self.cameras.get_mut(self.minimap)? = Camera::orthographic(world)
            .with_mask(MINIMAP_VIEW)
            .with_region(region);
        Ok(())
    }
}

impl App for Demo {
    fn on_window_event(&mut self, _id: winit::window::WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state.is_pressed() && event.logical_key == Key::Named(NamedKey::Escape) {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn on_surface_resized(&mut self, _id: winit::window::WindowId, gpu: &Gpu<'_>) {
        if let Some((_, resources)) = self.renderer.as_mut() {
            resources.resize(gpu.device(), gpu.viewport().texel_size());
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let viewport = ctx.gpu.viewport();

        if self.renderer.is_none() {
            match initialize(&ctx.gpu.render_ctx(), RendererConfig::default()) {
                Ok(pair) => self.renderer = Some(pair),
                Err(e) => {
                    log::error!("failed to initialize renderer: {e}");
                    return AppControl::Exit;
                }
            }
        }

        if let Err(e) = self.update_cameras(viewport) {
            log::error!("camera update failed: {e}");
            return AppControl::Exit;
        }

        let t = self.started.elapsed().as_secs_f32();
        let cameras = &self.cameras;
        let Some((renderer, resources)) = self.renderer.as_mut() else {
            return AppControl::Exit;
        };

        if let Err(e) = build_scene(renderer, cameras, viewport, t) {
            log::error!("scene submission failed: {e}");
            return AppControl::Exit;
        }

        let mut result = Ok(Default::default());
        let control = ctx.render(Color::from_u8(18, 20, 28, 255), |rctx, target| {
            result = resources.draw(rctx, target, renderer, cameras);
        });
        renderer.clear_frame();

        match result {
            Ok(stats) if ctx.frame_index % 600 == 0 => {
                log::info!(
                    "frame {}: {} draw calls, {} triangles dropped",
                    ctx.frame_index,
                    stats.total_draw_calls(),
                    stats.triangles_dropped.iter().sum::<u32>()
                );
            }
            Ok(_) => {}
            Err(e) => {
                log::error!("render failed: {e}");
                return AppControl::Exit;
            }
        }

        control
    }
}

fn build_scene(r: &mut TriRenderer, cameras: &CameraSet, viewport: Viewport, t: f32) -> Result<(), RenderError> {
    let (w, h) = (viewport.width, viewport.height);
    let center = Vec2::new(w * 0.5, h * 0.5);

    // Checkerboard floor.
    let cell = 48.0;
    let (cols, rows) = ((w / cell).ceil() as i32, (h / cell).ceil() as i32);
    for y in 0..rows {
        for x in 0..cols {
            let color = if (x + y) % 2 == 0 {
                Color::from_u8(40, 44, 58, 255)
            } else {
                Color::from_u8(32, 35, 46, 255)
            };
            let cell_rect = Rect::new(x as f32 * cell, y as f32 * cell, cell, cell);
            r.submit_quad(cameras, quad(cell_rect, color), &TriParams::default(), BatchKind::Solid)?;
        }
    }

    // Rotating clip shape, and a striped field only visible through it.
    let radius = h.min(w) * 0.3;
    let clip = TriParams::default().with_stencil_group(CLIP);
    for tri in fan(center, radius, 6, t * 0.5, Color::WHITE) {
        r.submit(cameras, tri, &clip, BatchKind::Stencil)?;
    }

    let clipped = TriParams::default().with_stencil_group(CLIP).with_depth(1);
    let stripe = 24.0;
    for i in 0..((w / stripe).ceil() as i32) {
        let color = if i % 2 == 0 {
            Color::from_u8(230, 120, 60, 255)
        } else {
            Color::from_u8(250, 200, 80, 255)
        };
        let stripe_rect = Rect::new(i as f32 * stripe, 0.0, stripe, h);
        r.submit_quad(cameras, quad(stripe_rect, color), &clipped, BatchKind::Solid)?;
    }

    // Overlapping translucent triangles, drawn back to front.
    for (i, color) in [
        Color::new(0.2, 0.6, 1.0, 0.5),
        Color::new(0.3, 1.0, 0.5, 0.5),
        Color::new(1.0, 0.3, 0.6, 0.5),
    ]
    .into_iter()
    .enumerate()
    {
        let phase = t + i as f32 * TAU / 3.0;
        let c = center + Vec2::new(phase.cos(), phase.sin()) * radius * 0.6;
        let p = TriParams::default().with_depth(2 + i as i8);
        for tri in fan(c, radius * 0.5, 3, -t, color) {
            r.submit(cameras, tri, &p, BatchKind::Transparent)?;
        }
    }

    // Soft-edged marker through the distance-field shader; main view only.
    let marker = TriParams::default()
        .with_shader(ShaderType::SimpleSdf)
        .with_aux(0.05)
        .with_camera_mask(MAIN_VIEW)
        .with_depth(10);
    r.submit_quad(cameras, quad(Rect::new(16.0, 16.0, 32.0, 32.0), Color::WHITE), &marker, BatchKind::Solid)?;

    Ok(())
}

fn quad(r: Rect, color: Color) -> [TriVert; 4] {
    let max = r.max();
    [
        TriVert::new(r.origin, Vec2::new(0.0, 0.0), color),
        TriVert::new(Vec2::new(max.x, r.origin.y), Vec2::new(1.0, 0.0), color),
        TriVert::new(max, Vec2::new(1.0, 1.0), color),
        TriVert::new(Vec2::new(r.origin.x, max.y), Vec2::new(0.0, 1.0), color),
    ]
}

/// Regular polygon as a triangle fan.
fn fan(center: Vec2, radius: f32, sides: u32, angle: f32, color: Color) -> Vec<[TriVert; 3]> {
    let point = |i: u32| {
        let a = angle + i as f32 * TAU / sides as f32;
        TriVert::solid(center + Vec2::new(a.cos(), a.sin()) * radius, color)
    };
    (0..sides)
        .map(|i| [TriVert::solid(center, color), point(i), point(i + 1)])
        .collect()
}
