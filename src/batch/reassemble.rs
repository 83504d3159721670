use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, Pixel, Rgb32FImage, RgbaImage, imageops};

use crate::batch::config::GRID;
use crate::batch::unit::{TileCoord, TileGeometry};
use crate::foundation::core::Canvas;
use crate::foundation::error::{FlameError, FlameResult};

/// Composite all 64 tile images of `job` into one logical-size canvas.
///
/// Tiles are read through `tile_path`, in split order. The first missing,
/// unreadable or mis-sized tile aborts the whole composite.
pub fn compose_tiles<F>(job: &str, logical: Canvas, tile_path: F) -> FlameResult<RgbaImage>
where
    F: FnMut(TileCoord) -> PathBuf,
{
    compose(job, logical, tile_path, DynamicImage::into_rgba8)
}

/// [`compose_tiles`] for Radiance HDR tiles (colour or intensity buffers).
pub fn compose_hdr_tiles<F>(job: &str, logical: Canvas, tile_path: F) -> FlameResult<Rgb32FImage>
where
    F: FnMut(TileCoord) -> PathBuf,
{
    compose(job, logical, tile_path, DynamicImage::into_rgb32f)
}

fn compose<P, F, D>(
    job: &str,
    logical: Canvas,
    mut tile_path: F,
    convert: D,
) -> FlameResult<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel,
    F: FnMut(TileCoord) -> PathBuf,
    D: Fn(DynamicImage) -> ImageBuffer<P, Vec<P::Subpixel>>,
{
    let grid = u32::from(GRID);
    let (tw, th) = (logical.width / grid, logical.height / grid);
    let mut canvas = ImageBuffer::<P, Vec<P::Subpixel>>::new(logical.width, logical.height);

    for tile in TileCoord::all() {
        let path = tile_path(tile);
        let image = convert(load_tile(job, tile, &path)?);
        if image.dimensions() != (tw, th) {
            return Err(FlameError::reassembly(
                job,
                Some((tile.ix(), tile.iy())),
                format!(
                    "tile '{}' is {}x{}, expected {tw}x{th}",
                    path.display(),
                    image.width(),
                    image.height()
                ),
            ));
        }
        let (ox, oy) = TileGeometry::pixel_origin(tile, logical);
        imageops::replace(&mut canvas, &image, i64::from(ox), i64::from(oy));
    }
    Ok(canvas)
}

fn load_tile(job: &str, tile: TileCoord, path: &Path) -> FlameResult<DynamicImage> {
    let at = Some((tile.ix(), tile.iy()));
    if !path.is_file() {
        return Err(FlameError::reassembly(
            job,
            at,
            format!("missing tile image '{}'", path.display()),
        ));
    }
    image::open(path).map_err(|e| {
        FlameError::reassembly(
            job,
            at,
            format!("unreadable tile image '{}': {e}", path.display()),
        )
    })
}

#[cfg(test)]
#[path = "../../tests/unit/batch/reassemble.rs"]
mod tests;
