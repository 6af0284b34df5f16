//! Canvas2D renderer
//!
//! Reads `&RunState` once per display frame. Draws in playfield units; the
//! canvas backing store is scaled by the device pixel ratio.

use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::sim::{GamePhase, RunState, world_name};

/// Sky, obstacle and accent colors per world tier
const PALETTES: [(&str, &str, &str); 6] = [
    ("#70c5ce", "#5cb85c", "#3e8e41"),
    ("#f0a868", "#a0522d", "#6b3a1e"),
    ("#2c3e50", "#8e44ad", "#5e2d73"),
    ("#34495e", "#7f8c8d", "#4d5656"),
    ("#0b0b1a", "#4a4a8a", "#2a2a5a"),
    ("#3b0d0d", "#c0392b", "#7b241c"),
];

fn css(color: u32) -> String {
    format!("#{:06x}", color & 0xffffff)
}

pub struct Renderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Backing pixels per playfield unit
    scale: f64,
    /// Draw particle bursts
    pub particles: bool,
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            canvas,
            ctx,
            scale: 1.0,
            particles: true,
        })
    }

    /// Size the backing store for a playfield at the given pixel ratio
    pub fn resize(&mut self, width: f32, height: f32, dpr: f64) {
        self.scale = dpr.max(1.0);
        self.canvas.set_width((width as f64 * self.scale) as u32);
        self.canvas.set_height((height as f64 * self.scale) as u32);
    }

    pub fn render(&self, state: &RunState) {
        let ctx = &self.ctx;
        let tuning = &state.tuning;
        let (w, h) = (tuning.width as f64, tuning.height as f64);
        let (sky, pipe, pipe_edge) = PALETTES[state.world_tier.min(PALETTES.len() - 1)];

        ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0).ok();
        ctx.set_global_alpha(1.0);

        // --- BACKGROUND ---
        ctx.set_fill_style_str(sky);
        ctx.fill_rect(0.0, 0.0, w, h);

        // --- OBSTACLES ---
        for obstacle in &state.obstacles {
            let x = obstacle.x as f64;
            let ow = obstacle.width as f64;
            let top = obstacle.gap_y as f64;
            let bottom = obstacle.gap_bottom() as f64;

            ctx.set_fill_style_str(pipe);
            ctx.fill_rect(x, 0.0, ow, top);
            ctx.fill_rect(x, bottom, ow, h - bottom);

            // Lips
            ctx.set_fill_style_str(pipe_edge);
            ctx.fill_rect(x - 4.0, top - 20.0, ow + 8.0, 20.0);
            ctx.fill_rect(x - 4.0, bottom, ow + 8.0, 20.0);
        }

        // --- PICKUPS ---
        for pickup in &state.pickups {
            let (px, py) = (pickup.pos.x as f64, pickup.pos.y as f64);
            let r = pickup.radius as f64;
            let wobble = (pickup.rotation as f64).sin() * 2.0;

            if pickup.magnetized {
                ctx.set_stroke_style_str("rgba(255,255,255,0.5)");
                ctx.set_line_width(2.0);
                ctx.begin_path();
                ctx.arc(px, py + wobble, r + 4.0, 0.0, PI * 2.0).ok();
                ctx.stroke();
            }

            ctx.set_fill_style_str(&css(pickup.kind.color()));
            ctx.begin_path();
            ctx.arc(px, py + wobble, r, 0.0, PI * 2.0).ok();
            ctx.fill();
        }

        self.draw_agent(state);

        // --- PARTICLES ---
        if self.particles {
            for particle in &state.particles {
                ctx.set_global_alpha(particle.alpha() as f64);
                ctx.set_fill_style_str(&css(particle.color));
                let s = particle.size as f64;
                ctx.fill_rect(
                    particle.pos.x as f64 - s / 2.0,
                    particle.pos.y as f64 - s / 2.0,
                    s,
                    s,
                );
            }
            ctx.set_global_alpha(1.0);
        }

        // Slow time tint
        if state.effects.slow_ticks > 0 {
            ctx.set_fill_style_str("rgba(52,152,219,0.15)");
            ctx.fill_rect(0.0, 0.0, w, h);
        }

        self.draw_banners(state, w, h);
    }

    fn draw_agent(&self, state: &RunState) {
        let ctx = &self.ctx;
        let agent = &state.agent;

        // Blink while invulnerable
        if state.is_invulnerable() && (state.time_ticks / 4) % 2 == 0 {
            return;
        }

        let c = agent.center();
        let (aw, ah) = (agent.width as f64, agent.height as f64);

        ctx.save();
        ctx.translate(c.x as f64, c.y as f64).ok();
        ctx.rotate((agent.rotation() as f64).to_radians()).ok();

        ctx.set_fill_style_str("#f7dc6f");
        ctx.fill_rect(-aw / 2.0, -ah / 2.0, aw, ah);
        // Eye
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_rect(aw / 2.0 - 12.0, -ah / 2.0 + 4.0, 8.0, 8.0);
        ctx.set_fill_style_str("#000000");
        ctx.fill_rect(aw / 2.0 - 8.0, -ah / 2.0 + 6.0, 4.0, 4.0);
        // Beak
        ctx.set_fill_style_str("#e67e22");
        ctx.fill_rect(aw / 2.0, -2.0, 8.0, 6.0);

        ctx.restore();

        if state.effects.shield_charge {
            ctx.set_stroke_style_str("#3498db");
            ctx.set_line_width(3.0);
            ctx.begin_path();
            ctx.arc(c.x as f64, c.y as f64, aw.max(ah) * 0.8, 0.0, PI * 2.0)
                .ok();
            ctx.stroke();
        }
    }

    fn draw_banners(&self, state: &RunState, w: f64, h: f64) {
        let ctx = &self.ctx;
        ctx.set_text_align("center");

        if state.world_banner_ticks > 0 {
            let fade = state.world_banner_ticks as f64 / state.tuning.world_banner_ticks.max(1) as f64;
            ctx.set_global_alpha(fade.min(1.0));
            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("bold 28px sans-serif");
            let title = format!("World {}: {}", state.world_tier + 1, world_name(state.world_tier));
            ctx.fill_text(&title, w / 2.0, h / 3.0).ok();
            ctx.set_global_alpha(1.0);
        }

        if state.celebration_ticks > 0 {
            ctx.set_fill_style_str("#ffd700");
            ctx.set_font("bold 22px sans-serif");
            ctx.fill_text("+1 MAX HEALTH", w / 2.0, h / 3.0 + 40.0).ok();
        }

        if state.phase == GamePhase::ChoicePending {
            ctx.set_fill_style_str("rgba(0,0,0,0.4)");
            ctx.fill_rect(0.0, 0.0, w, h);
        }
    }
}
