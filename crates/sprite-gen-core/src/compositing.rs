use image::buffer::ConvertBuffer;
use image::imageops::{self, FilterType};
use image::{ImageReader, Pixel, Rgba, RgbImage, RgbaImage};
use std::path::Path;
use tracing::debug;

use crate::config::Matte;
use crate::error::{Result, SpriteError};
use crate::model::RepeatGroup;

/// Allocates a `w`x`h` canvas filled with the matte color.
///
/// Fails instead of allocating when the area exceeds `max_pixels`.
pub fn new_canvas(w: u32, h: u32, matte: Matte, max_pixels: u64) -> Result<RgbaImage> {
    let area = w as u64 * h as u64;
    if area > max_pixels {
        return Err(SpriteError::CanvasTooLarge {
            width: w,
            height: h,
            limit: max_pixels,
        });
    }
    Ok(RgbaImage::from_pixel(w, h, Rgba(matte.fill())))
}

/// Composite `src` over `canvas` with its top-left corner at (dx, dy).
///
/// Source pixels are alpha-blended onto what is already there; pixels falling
/// outside the canvas are dropped.
pub fn blit_over(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    for yy in 0..sh {
        let ty = dy as u64 + yy as u64;
        if ty >= ch as u64 {
            break;
        }
        for xx in 0..sw {
            let tx = dx as u64 + xx as u64;
            if tx >= cw as u64 {
                break;
            }
            let px = *src.get_pixel(xx, yy);
            canvas.get_pixel_mut(tx as u32, ty as u32).blend(&px);
        }
    }
}

/// Decodes a whole image from disk, guessing its format from content.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

/// Renders one non-empty group into a new canvas.
///
/// Every fragment is decoded from `dir` again. A fragment whose target
/// rectangle differs from its decoded size (the stretched axis of repeat-x and
/// repeat-y groups) is resampled first. Any decode failure fails the group.
pub fn render_group(
    group: &RepeatGroup,
    dir: &Path,
    matte: Matte,
    max_pixels: u64,
) -> Result<RgbaImage> {
    let mut canvas = new_canvas(group.width, group.height, matte, max_pixels)?;
    for item in &group.items {
        let src = load_rgba(&dir.join(&item.fragment.file_name))?;
        let target = group.target_rect(item);
        if src.dimensions() == (target.w, target.h) {
            blit_over(&src, &mut canvas, target.x, target.y);
        } else {
            debug!(
                file = %item.fragment.file_name,
                from = ?src.dimensions(),
                to = ?(target.w, target.h),
                "resample fragment"
            );
            let scaled = imageops::resize(&src, target.w, target.h, FilterType::Triangle);
            blit_over(&scaled, &mut canvas, target.x, target.y);
        }
    }
    Ok(canvas)
}

/// Writes a composite as PNG. A solid matte leaves every pixel opaque, so
/// those composites drop the alpha channel.
pub fn save_png(canvas: &RgbaImage, matte: Matte, path: &Path) -> Result<()> {
    if matte.has_alpha() {
        canvas.save_with_format(path, image::ImageFormat::Png)?;
    } else {
        let rgb: RgbImage = canvas.convert();
        rgb.save_with_format(path, image::ImageFormat::Png)?;
    }
    Ok(())
}
