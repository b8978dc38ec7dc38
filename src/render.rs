use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::{
    canvas::SceneSnapshot,
    types::{CanvasElement, CanvasSize, Color, ElementKind, GestureLabel, Point, ViewTransform},
};

const POINTER_CURSOR_RADIUS: f32 = 8.0;
const POINTER_CURSOR_COLOR: Color = Color::rgb(0x8e, 0x8e, 0x93);
const DRAW_CURSOR_COLOR: Color = Color::rgb(0x00, 0x7a, 0xff);
const ERASE_CURSOR_COLOR: Color = Color::rgb(0xff, 0x3b, 0x30);
const BACKGROUND: [u8; 4] = [0, 0, 0, 0];

/// Consumer of scene snapshots. The core never draws directly.
pub trait RenderSink {
    fn render(&mut self, scene: &SceneSnapshot);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Blend {
    SourceOver,
    DestinationOut,
}

/// Software rasterizer over an RGBA buffer. Elements are drawn through the
/// view transform with round caps and joins; erase strokes punch alpha out.
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Reallocates the buffer when the canvas size changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn clear(&mut self) {
        self.image
            .par_chunks_mut(4)
            .for_each(|px| px.copy_from_slice(&BACKGROUND));
    }

    fn draw_element(&mut self, element: &CanvasElement, view: &ViewTransform) {
        if element.points.len() < 2 {
            return;
        }

        let radius = element.stroke_width * view.zoom / 2.0;
        let screen: Vec<Point> = element
            .points
            .iter()
            .map(|p| view.world_to_screen(*p))
            .collect();

        match element.kind {
            ElementKind::Freedraw => self.polyline(&screen, radius, element.color, Blend::SourceOver),
            ElementKind::Erase => self.polyline(&screen, radius, element.color, Blend::DestinationOut),
            ElementKind::Circle => {
                let center = screen[0];
                let rim = screen[screen.len() - 1];
                self.ring(center, center.distance_to(&rim), radius, element.color);
            }
        }
    }

    fn draw_cursor(&mut self, scene: &SceneSnapshot) {
        let Some(cursor) = scene.cursor else {
            return;
        };
        if !scene.tool.shows_cursor() {
            return;
        }

        let (radius, color) = match scene.tool {
            GestureLabel::Draw => (
                scene.settings.brush_size * scene.view.zoom * 1.5,
                DRAW_CURSOR_COLOR,
            ),
            GestureLabel::Erase => (
                scene.settings.eraser_size * scene.view.zoom,
                ERASE_CURSOR_COLOR,
            ),
            _ => (POINTER_CURSOR_RADIUS, POINTER_CURSOR_COLOR),
        };
        self.disc(cursor, radius, color, Blend::SourceOver);
    }

    fn polyline(&mut self, points: &[Point], radius: f32, color: Color, blend: Blend) {
        let step = (radius * 0.5).max(0.5);
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let steps = (a.distance_to(&b) / step).ceil().max(1.0) as usize;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
                self.disc(p, radius, color, blend);
            }
        }
    }

    fn ring(&mut self, center: Point, ring_radius: f32, half_width: f32, color: Color) {
        let circumference = std::f32::consts::TAU * ring_radius;
        let steps = (circumference / half_width.max(0.5)).ceil().max(8.0) as usize;
        let outline: Vec<Point> = (0..=steps)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / steps as f32;
                Point::new(
                    center.x + ring_radius * angle.cos(),
                    center.y + ring_radius * angle.sin(),
                )
            })
            .collect();
        self.polyline(&outline, half_width, color, Blend::SourceOver);
    }

    fn disc(&mut self, center: Point, radius: f32, color: Color, blend: Blend) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let radius = radius.max(0.5);
        let min_x = (center.x - radius).floor().max(0.0) as u32;
        let min_y = (center.y - radius).floor().max(0.0) as u32;
        let max_x = (center.x + radius).ceil().min(width as f32 - 1.0);
        let max_y = (center.y + radius).ceil().min(height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        let r2 = radius * radius;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= r2 {
                    blend_pixel(self.image.get_pixel_mut(x, y), color, blend);
                }
            }
        }
    }
}

impl RenderSink for RasterCanvas {
    fn render(&mut self, scene: &SceneSnapshot) {
        self.clear();
        for element in scene.elements.iter().chain(scene.in_progress.as_ref()) {
            self.draw_element(element, &scene.view);
        }
        self.draw_cursor(scene);
    }
}

fn blend_pixel(dst: &mut Rgba<u8>, color: Color, blend: Blend) {
    let src_a = color.a as f32 / 255.0;
    let dst_a = dst.0[3] as f32 / 255.0;

    match blend {
        Blend::SourceOver => {
            let out_a = src_a + dst_a * (1.0 - src_a);
            if out_a <= 0.0 {
                *dst = Rgba(BACKGROUND);
                return;
            }
            let src = [color.r, color.g, color.b];
            for c in 0..3 {
                let s = src[c] as f32 * src_a;
                let d = dst.0[c] as f32 * dst_a * (1.0 - src_a);
                dst.0[c] = ((s + d) / out_a).round().clamp(0.0, 255.0) as u8;
            }
            dst.0[3] = (out_a * 255.0).round() as u8;
        }
        Blend::DestinationOut => {
            dst.0[3] = (dst_a * (1.0 - src_a) * 255.0).round() as u8;
        }
    }
}
