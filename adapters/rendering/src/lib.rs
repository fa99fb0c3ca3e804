#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless rendering adapter that records tower draw requests into frames.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use glam::Vec2;
use turret_defence_core::{Footprint, Renderer, SpriteKey, WorldPoint};

/// Single textured quad requested by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    /// Asset used to texture the quad.
    pub sprite: SpriteKey,
    /// Top-left corner of the quad in world units.
    pub position: Vec2,
    /// Extent of the quad in world units.
    pub size: Vec2,
    /// Rotation around the quad centre, in radians.
    pub rotation_radians: f32,
}

/// Everything requested for presentation during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    index: u64,
    commands: Vec<DrawCommand>,
    projectiles: Vec<Vec2>,
}

impl Frame {
    /// Zero-based index of the frame.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Quads in the order they were requested.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Projectile markers in the order they were recorded.
    #[must_use]
    pub fn projectiles(&self) -> &[Vec2] {
        &self.projectiles
    }
}

/// Renderer that accumulates draw requests until the frame is taken.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    current: Frame,
}

impl FrameRecorder {
    /// Creates a recorder positioned at frame zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame currently being recorded.
    #[must_use]
    pub fn current(&self) -> &Frame {
        &self.current
    }

    /// Completes the current frame and starts the next one.
    pub fn finish_frame(&mut self) -> Frame {
        let next = Frame {
            index: self.current.index + 1,
            ..Frame::default()
        };
        std::mem::replace(&mut self.current, next)
    }
}

impl Renderer for FrameRecorder {
    fn draw_quad(&mut self, sprite: &SpriteKey, origin: WorldPoint, footprint: Footprint) {
        self.draw_quad_rotated(sprite, origin, footprint, 0.0);
    }

    fn draw_quad_rotated(
        &mut self,
        sprite: &SpriteKey,
        origin: WorldPoint,
        footprint: Footprint,
        angle_degrees: f32,
    ) {
        self.current.commands.push(DrawCommand {
            sprite: sprite.clone(),
            position: to_vec2(origin),
            size: Vec2::new(footprint.width() as f32, footprint.height() as f32),
            rotation_radians: angle_degrees.to_radians(),
        });
    }

    fn draw_projectile(&mut self, position: WorldPoint) {
        self.current.projectiles.push(to_vec2(position));
    }
}

/// Writes a plain-text description of `frame` to `out`.
pub fn present_text<W: Write>(frame: &Frame, out: &mut W) -> AnyResult<()> {
    writeln!(
        out,
        "frame {}: {} quads, {} projectiles",
        frame.index,
        frame.commands.len(),
        frame.projectiles.len()
    )
    .context("failed to write frame header")?;

    for command in &frame.commands {
        writeln!(
            out,
            "  {} at ({:.1}, {:.1}) size {}x{} rotated {:.1} deg",
            command.sprite,
            command.position.x,
            command.position.y,
            command.size.x,
            command.size.y,
            command.rotation_radians.to_degrees()
        )
        .context("failed to write draw command")?;
    }

    for marker in &frame.projectiles {
        writeln!(out, "  * ({:.1}, {:.1})", marker.x, marker.y)
            .context("failed to write projectile marker")?;
    }

    Ok(())
}

fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}
