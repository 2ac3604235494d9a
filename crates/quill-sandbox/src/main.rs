//! Headless sandbox.
//!
//! Drives the engine end to end without a window: builds procedural
//! assets, packs the atlas, runs a scene with an animated sprite, text, a
//! particle burst and widgets for a couple of seconds, then writes
//! `atlas.png` and `frame.png` next to the working directory.

use std::path::Path;

use anyhow::{Context, Result};

use quill_engine::assets::{parse_descriptor, Assets, Font, FontId, Sprite, SpriteId};
use quill_engine::atlas::{AtlasImage, AtlasPacker, PackerConfig};
use quill_engine::coords::{ColorRgba, Vec2, Viewport};
use quill_engine::logging::{init_logging, LoggingConfig};
use quill_engine::render::{FrameBatcher, WgpuDevice, WgpuInit};
use quill_engine::scene::components::{
    Animator, Dropdown, Image, ParticleEmitter, Slider, Text,
};
use quill_engine::scene::{DrawCtx, SceneGraph, SceneManager, SceneScript, UpdateCtx};
use quill_engine::time::FrameClock;

const FRAMES: u32 = 120;
const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

// ── procedural assets ─────────────────────────────────────────────────────

fn solid_sprite(size: u32, color: [u8; 4]) -> Result<Sprite> {
    let pixels = color.repeat((size * size) as usize);
    Ok(Sprite::from_pixels(size, size, pixels)?)
}

fn checker_sprite(size: u32, a: [u8; 4], b: [u8; 4]) -> Result<Sprite> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let cell = if (x / 8 + y / 8) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&cell);
        }
    }
    Ok(Sprite::from_pixels(size, size, pixels)?)
}

/// A 4x2 cell sheet of filled 8x8 blocks; enough to draw "Hello!".
const FONT_DESCRIPTOR: &str = "\
8x8,8
H0x0,6
e1x0,6
l2x0,3
o3x0,6
!0x1,3
q1x1,6
u2x1,6
i3x1,3
";

fn build_font(assets: &mut Assets, packer: &mut AtlasPacker) -> Result<FontId> {
    let (w, h) = (32, 16);
    let mut pixels = vec![0u8; (w * h * 4) as usize];
    for y in 0..h {
        for x in 0..w {
            // A filled block per cell with a 1px gap, so glyphs read as tiles.
            if x % 8 != 0 && y % 8 != 0 {
                let i = ((y * w + x) * 4) as usize;
                pixels[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
    }

    let sheet = Sprite::from_pixels(w, h, pixels)?;
    let texture = assets.add_sprite("sandbox-font-sheet", sheet);
    packer.add_font(texture, w, h);

    let descriptor = parse_descriptor(FONT_DESCRIPTOR).context("bad font descriptor")?;
    Ok(assets.add_font(
        "sandbox",
        Font {
            texture,
            glyphs: descriptor.glyphs,
            cell_size: descriptor.cell_size,
            default_size: descriptor.default_size,
        },
    ))
}

// ── demo scene ────────────────────────────────────────────────────────────

struct DemoScene {
    frames: Vec<SpriteId>,
    font: FontId,
    elapsed: f32,
}

impl SceneScript for DemoScene {
    fn init(&mut self, scene: &mut SceneGraph) {
        let hero = scene.add_entity("hero");
        if let Some(e) = scene.entity_mut(hero) {
            e.transform.position = Vec2::new(-300.0, 0.0);
        }
        if let Some(image) = scene.add_component::<Image>(hero) {
            image.sprite = self.frames.first().copied();
            image.size = Vec2::splat(96.0);
        }
        if let Some(animator) = scene.add_component::<Animator>(hero) {
            let idle = animator.add_animation("idle");
            idle.add_frames(self.frames.iter().copied());
            idle.set_fps(4.0);
            animator.play("idle");
        }

        let title = scene.add_entity("title");
        if let Some(e) = scene.entity_mut(title) {
            e.transform.position = Vec2::new(-200.0, 250.0);
        }
        if let Some(text) = scene.add_component::<Text>(title) {
            text.font = Some(self.font);
            text.text = String::from("Hello!");
            text.font_size = 32.0;
            text.spacing = 4.0;
            text.color = ColorRgba::from_u8(240, 220, 120, 255);
        }

        let burst = scene.add_entity("burst");
        if let Some(e) = scene.entity_mut(burst) {
            e.transform.position = Vec2::new(200.0, -100.0);
        }
        if let Some(emitter) = scene.add_component::<ParticleEmitter>(burst) {
            emitter.particles_per_second = 40.0;
            emitter.start_lifetime = 1.5;
            emitter.start_speed = 3.0;
            emitter.start_size = 8.0;
            emitter.min_angle = 45.0;
            emitter.max_angle = 135.0;
            emitter.start_color = ColorRgba::from_u8(255, 160, 40, 255);
            emitter.color_over_life = vec![ColorRgba::from_u8(255, 40, 40, 0)];
            emitter.size_over_life = vec![0.0];
            emitter.play();
        }

        let ui = scene.add_entity("ui");
        if let Some(e) = scene.entity_mut(ui) {
            e.transform.position = Vec2::new(0.0, -300.0);
        }
        if let Some(slider) = scene.add_component::<Slider>(ui) {
            slider.set_range(0.0, 10.0);
            slider.set_value(2.5);
        }

        let menu = scene.add_entity("menu");
        if let Some(e) = scene.entity_mut(menu) {
            e.transform.position = Vec2::new(400.0, 250.0);
        }
        if let Some(dropdown) = scene.add_component::<Dropdown>(menu) {
            dropdown.font = Some(self.font);
            dropdown.options = vec![String::from("Hello"), String::from("quill")];
            dropdown.opened = true;
        }
    }

    fn update(&mut self, scene: &mut SceneGraph, ctx: &UpdateCtx) {
        self.elapsed += ctx.dt;
        if let Some(id) = scene.entity_named("ui") {
            if let Some(slider) = scene.component_mut::<Slider>(id) {
                slider.set_value(5.0 + 5.0 * self.elapsed.sin());
            }
        }
    }
}

// ── entry point ───────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    // Assets: fonts register with the packer first, then sprites.
    let mut assets = Assets::new();
    let mut packer = AtlasPacker::new(PackerConfig::default());

    let font = build_font(&mut assets, &mut packer)?;

    let mut frames = Vec::new();
    for (name, colors) in [
        ("hero-a", ([90, 200, 250, 255], [30, 60, 90, 255])),
        ("hero-b", ([30, 60, 90, 255], [90, 200, 250, 255])),
    ] {
        let id = assets.add_sprite(name, checker_sprite(32, colors.0, colors.1)?);
        packer.add_sprite(id, 32, 32);
        frames.push(id);
    }
    let dot = assets.add_sprite("dot", solid_sprite(16, [255, 255, 255, 255])?);
    packer.add_sprite(dot, 16, 16);

    let atlas = packer.pack(&mut assets);
    assets.compute_glyph_uvs(atlas.width, atlas.height);
    assets.summary();
    atlas
        .save_png(Path::new("atlas.png"))
        .context("failed to write atlas.png")?;

    // Renderer.
    let device = WgpuDevice::new_blocking(WgpuInit {
        width: WIDTH,
        height: HEIGHT,
        ..Default::default()
    })?;
    let mut batcher = FrameBatcher::new(device, Viewport::new(WIDTH as f32, HEIGHT as f32))?;
    batcher.upload_atlas(&atlas)?;
    batcher.set_clear_color(ColorRgba::from_u8(18, 18, 28, 255));

    // Scene.
    let mut manager = SceneManager::new();
    manager.register(
        "demo",
        Box::new(DemoScene {
            frames,
            font,
            elapsed: 0.0,
        }),
    );
    manager.go_to("demo");

    // Headless loop.
    let mut clock = FrameClock::new();
    for _ in 0..FRAMES {
        let frame = clock.tick();
        manager.update(&UpdateCtx { dt: frame.dt });

        batcher.begin();
        let mut ctx = DrawCtx {
            batcher: &mut batcher,
            assets: &assets,
        };
        manager.graph().draw(&mut ctx);
        batcher.end()?;
    }

    // Capture the final frame for inspection.
    let pixels = batcher.device().read_target()?;
    AtlasImage {
        width: WIDTH,
        height: HEIGHT,
        pixels,
    }
    .save_png(Path::new("frame.png"))
    .context("failed to write frame.png")?;

    log::info!("rendered {FRAMES} frames at {WIDTH}x{HEIGHT}");
    Ok(())
}
