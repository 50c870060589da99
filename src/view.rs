//! Canvas2D drawing and DOM overlays
//!
//! Purely presentational: reads the orchestrator, never mutates it.

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::sim::{ActiveGame, Karaoke, Orchestrator, Scene, Skating, Swimming, Viewport};

/// Seconds a toast stays visible
const TOAST_TIME: f32 = 0.9;

const BACKGROUND: &str = "#1b1030";
const ACCENT: &str = "#ff6fa8";
const SOFT: &str = "#ffd6e7";
const HAZARD: &str = "#7fd1ff";
const WATER: &str = "#1f5f8b";

pub struct View {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
    toast_timer: f32,
}

impl View {
    /// Attach to the `#canvas` element; `None` if the page lacks one
    pub fn new(document: Document) -> Option<Self> {
        let canvas: HtmlCanvasElement = document.get_element_by_id("canvas")?.dyn_into().ok()?;
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
        Some(Self {
            document,
            canvas,
            ctx,
            dpr: 1.0,
            toast_timer: 0.0,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Current play-area size in CSS pixels
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.canvas.client_width() as f32,
            self.canvas.client_height() as f32,
        )
    }

    /// Match the backing store to the element size and device pixel ratio
    pub fn fit(&mut self, dpr: f64) -> Viewport {
        let viewport = self.viewport();
        let width = (viewport.width as f64 * dpr) as u32;
        let height = (viewport.height as f64 * dpr) as u32;
        if self.canvas.width() != width || self.canvas.height() != height || self.dpr != dpr {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.dpr = dpr;
        }
        viewport
    }

    /// Convert client coordinates to play-area coordinates
    pub fn to_local(&self, client_x: f64, client_y: f64) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        Vec2::new((client_x - rect.left()) as f32, (client_y - rect.top()) as f32)
    }

    // === DOM ===

    fn set_class(&self, id: &str, class: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    pub fn show_overlay(&self, id: &str, visible: bool) {
        self.set_class(id, if visible { "overlay" } else { "overlay hidden" });
    }

    /// Overlay announcing the scene that `advance` will start
    pub fn show_scene_clear(&self, next: Scene) {
        self.set_text("clear-next", next.title());
        self.show_overlay("clear", true);
    }

    pub fn show_toast(&mut self, text: &str) {
        self.set_text("toast", text);
        self.set_class("toast", "toast");
        self.toast_timer = TOAST_TIME;
    }

    pub fn tick_toast(&mut self, dt: f32) {
        if self.toast_timer > 0.0 {
            self.toast_timer -= dt;
            if self.toast_timer <= 0.0 {
                self.set_class("toast", "toast hidden");
            }
        }
    }

    pub fn update_hud(&self, orch: &Orchestrator) {
        self.set_text("hud-score", &orch.score().to_string());
        self.set_text("hud-scene", orch.scene().title());
        let progress = match orch.game() {
            ActiveGame::Karaoke(k) => format!("{} / {}", k.hits, k.hits_to_win()),
            ActiveGame::Skating(s) => format!("{} / {}", s.collected, s.token_goal()),
            ActiveGame::Swimming(w) if w.caught => "Caught!".to_string(),
            ActiveGame::Swimming(_) => "Tag!".to_string(),
            ActiveGame::Proposal => String::new(),
        };
        self.set_text("hud-progress", &progress);
    }

    // === Canvas ===

    fn circle(&self, pos: Vec2, radius: f32, color: &str) {
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(pos.x as f64, pos.y as f64, radius.max(0.0) as f64, 0.0, TAU);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn ring(&self, pos: Vec2, radius: f32, color: &str, width: f64) {
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(pos.x as f64, pos.y as f64, radius.max(0.0) as f64, 0.0, TAU);
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    fn line(&self, from: Vec2, to: Vec2, color: &str, width: f64) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    pub fn draw(&self, orch: &Orchestrator) {
        let viewport = orch.viewport();
        let _ = self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx
            .fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);

        match orch.game() {
            ActiveGame::Karaoke(k) => self.draw_karaoke(k, viewport),
            ActiveGame::Skating(s) => self.draw_skating(s),
            ActiveGame::Swimming(w) => self.draw_swimming(w),
            ActiveGame::Proposal => {
                self.ctx.set_fill_style_str(ACCENT);
                self.ctx.set_font("bold 32px sans-serif");
                self.ctx.set_text_align("center");
                let _ = self.ctx.fill_text(
                    "\u{2665}",
                    viewport.width as f64 * 0.5,
                    viewport.height as f64 * 0.3,
                );
            }
        }
    }

    fn draw_karaoke(&self, k: &Karaoke, viewport: Viewport) {
        let top = Vec2::new(k.lane_x, 0.0);
        let bottom = Vec2::new(k.lane_x, viewport.height);
        self.line(top, bottom, "rgba(255,255,255,0.15)", 40.0);
        self.line(
            Vec2::new(k.lane_x - 60.0, k.line_y),
            Vec2::new(k.lane_x + 60.0, k.line_y),
            SOFT,
            3.0,
        );
        for note in k.notes.iter().filter(|n| n.alive) {
            self.circle(Vec2::new(k.lane_x, note.y), note.radius, ACCENT);
        }
    }

    fn draw_skating(&self, s: &Skating) {
        self.ring(s.spawn, s.safe_radius(), "rgba(255,255,255,0.08)", 2.0);
        self.ctx.set_fill_style_str(HAZARD);
        for hazard in &s.hazards {
            let r = hazard.rect;
            self.ctx
                .fill_rect(r.min.x as f64, r.min.y as f64, r.size.x as f64, r.size.y as f64);
        }
        for token in s.tokens.iter().filter(|t| t.alive) {
            self.circle(token.pos, 10.0, SOFT);
        }
        let color = if s.is_frozen() {
            "#888888"
        } else if s.shield > 0.0 {
            "rgba(255,111,168,0.55)"
        } else {
            ACCENT
        };
        self.circle(s.player.pos, s.player.radius, color);
    }

    fn draw_swimming(&self, w: &Swimming) {
        let pool = w.pool;
        self.ctx.set_fill_style_str(WATER);
        self.ctx.fill_rect(
            pool.min.x as f64,
            pool.min.y as f64,
            pool.size.x as f64,
            pool.size.y as f64,
        );
        for buoy in &w.buoys {
            self.circle(buoy.pos, buoy.radius, "#ffb347");
        }
        if w.tag_hold > 0.0 && !w.caught {
            self.ring(w.chaser.pos, w.catch_radius(), "rgba(255,255,255,0.35)", 2.0);
        }
        self.circle(w.evader.pos, w.evader.radius, SOFT);
        self.circle(w.chaser.pos, w.chaser.radius, ACCENT);
        if w.caught {
            let mid = (w.chaser.pos + w.evader.pos) * 0.5 - Vec2::new(0.0, 40.0);
            self.ctx.set_fill_style_str(ACCENT);
            self.ctx.set_font("bold 28px sans-serif");
            self.ctx.set_text_align("center");
            let _ = self.ctx.fill_text("\u{2665}", mid.x as f64, mid.y as f64);
        }
    }
}
