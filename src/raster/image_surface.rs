use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::rect::Rect;

use crate::core::geometry::{rotated_extent, BBox, Point};
use crate::raster::{Font, Paint, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub ink: Rgb<u8>,
    pub background: Rgb<u8>,
    pub overlay: Rgb<u8>,
    pub text_overlay: Rgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ink: Rgb([0, 0, 0]),
            background: Rgb([255, 255, 255]),
            overlay: Rgb([220, 30, 30]),
            text_overlay: Rgb([30, 90, 220]),
        }
    }
}

impl Palette {
    pub fn color(&self, paint: Paint) -> Rgb<u8> {
        match paint {
            Paint::Ink => self.ink,
            Paint::Background => self.background,
            Paint::Overlay => self.overlay,
            Paint::TextOverlay => self.text_overlay,
        }
    }
}

/// RGB page raster backed by `image`, drawn with `imageproc`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    image: RgbImage,
    palette: Palette,
}

impl PageImage {
    pub fn new(width: u32, height: u32, palette: Palette) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, palette.background),
            palette,
        }
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(width, height, Palette::default())
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }

    pub fn save(&self, path: &Path, grayscale: bool) -> Result<()> {
        let result = if grayscale {
            DynamicImage::ImageRgb8(self.image.clone())
                .to_luma8()
                .save(path)
        } else {
            self.image.save(path)
        };
        result.with_context(|| format!("failed to write page image {}", path.display()))
    }
}

fn blend(base: Rgb<u8>, top: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    Rgb(std::array::from_fn(|i| {
        (base.0[i] as f32 * (1.0 - alpha) + top.0[i] as f32 * alpha).round() as u8
    }))
}

impl Surface for PageImage {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn offscreen(&self, width: u32, height: u32) -> Self {
        Self::new(width, height, self.palette)
    }

    fn draw_text(&mut self, origin: Point, text: &str, font: &Font, paint: Paint) -> Option<BBox> {
        let color = self.palette.color(paint);
        let (width, height) = (self.image.width() as i32, self.image.height() as i32);
        let (ox, oy) = (origin.x.floor() as i32, origin.y.floor() as i32);
        let image = &mut self.image;
        let mut inked: Option<(i32, i32, i32, i32)> = None;

        font.face().rasterize(text, font.size(), &mut |x, y, coverage| {
            let (px, py) = (ox + x, oy + y);
            if coverage <= 0.0 || px < 0 || py < 0 || px >= width || py >= height {
                return;
            }
            let pixel = image.get_pixel_mut(px as u32, py as u32);
            *pixel = blend(*pixel, color, coverage);
            inked = Some(match inked {
                None => (px, py, px, py),
                Some((x0, y0, x1, y1)) => (x0.min(px), y0.min(py), x1.max(px), y1.max(py)),
            });
        });

        inked.map(|(x0, y0, x1, y1)| {
            BBox::new(x0 as f32, y0 as f32, (x1 + 1) as f32, (y1 + 1) as f32)
        })
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: Paint) {
        let color = self.palette.color(paint);
        draw_line_segment_mut(&mut self.image, (from.x, from.y), (to.x, to.y), color);
    }

    fn draw_rect(&mut self, rect: &BBox, paint: Paint) {
        let w = rect.width() as u32;
        let h = rect.height() as u32;
        if w == 0 || h == 0 {
            return;
        }
        let color = self.palette.color(paint);
        let outline = Rect::at(rect.x0 as i32, rect.y0 as i32).of_size(w, h);
        draw_hollow_rect_mut(&mut self.image, outline, color);
    }

    fn draw_polygon(&mut self, points: &[Point], paint: Paint) {
        for (idx, from) in points.iter().enumerate() {
            let to = points[(idx + 1) % points.len()];
            self.draw_line(*from, to, paint);
        }
    }

    fn composite(&mut self, src: &Self, x: i32, y: i32) {
        imageops::replace(&mut self.image, &src.image, x as i64, y as i64);
    }

    fn rotated(&self, degrees: f32) -> Self {
        let (w, h) = self.image.dimensions();
        let (fit_w, fit_h) = rotated_extent(w as f32, h as f32, degrees);
        let (fit_w, fit_h) = (fit_w as u32, fit_h as u32);

        // work on a canvas holding both the source and the rotated extent
        let canvas_w = w.max(fit_w);
        let canvas_h = h.max(fit_h);
        let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, self.palette.background);
        imageops::replace(
            &mut canvas,
            &self.image,
            ((canvas_w - w) / 2) as i64,
            ((canvas_h - h) / 2) as i64,
        );

        // imageproc rotates clockwise for positive angles
        let turned = rotate_about_center(
            &canvas,
            -degrees.to_radians(),
            Interpolation::Bilinear,
            self.palette.background,
        );
        let fitted = imageops::crop_imm(
            &turned,
            (canvas_w - fit_w) / 2,
            (canvas_h - fit_h) / 2,
            fit_w,
            fit_h,
        )
        .to_image();

        Self {
            image: imageops::resize(&fitted, w, h, FilterType::Triangle),
            palette: self.palette,
        }
    }
}
