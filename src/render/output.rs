use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::{ImageFormat, Rgb32FImage, RgbaImage};

use crate::foundation::error::FlameResult;
use crate::render::executor::RenderedFlame;

pub fn ensure_parent_dir(path: &Path) -> FlameResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

pub fn save_png(image: &RgbaImage, path: &Path) -> FlameResult<()> {
    ensure_parent_dir(path)?;
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Write a Radiance HDR file.
pub fn save_hdr(image: &Rgb32FImage, path: &Path) -> FlameResult<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let pixels: Vec<_> = image.pixels().copied().collect();
    image::codecs::hdr::HdrEncoder::new(BufWriter::new(file))
        .encode(&pixels, image.width() as usize, image.height() as usize)
        .with_context(|| format!("write hdr '{}'", path.display()))?;
    Ok(())
}

/// Suffix of the linear colour buffer written next to a PNG.
pub const HDR_SUFFIX: &str = ".hdr";
/// Suffix of the intensity buffer written next to a PNG.
pub const INTENSITY_SUFFIX: &str = ".intensity.hdr";

/// Path of an auxiliary output next to `primary`, e.g. `out.png` -> `out.png.hdr`.
pub fn sibling_path(primary: &Path, suffix: &str) -> PathBuf {
    let mut s = primary.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Write the image plus any auxiliary buffers; returns every path written.
pub fn write_rendered(rendered: &RenderedFlame, primary: &Path) -> FlameResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(3);
    save_png(&rendered.image, primary)?;
    written.push(primary.to_path_buf());
    if let Some(hdr) = &rendered.hdr {
        let path = sibling_path(primary, HDR_SUFFIX);
        save_hdr(hdr, &path)?;
        written.push(path);
    }
    if let Some(map) = &rendered.intensity_map {
        let path = sibling_path(primary, INTENSITY_SUFFIX);
        save_hdr(map, &path)?;
        written.push(path);
    }
    Ok(written)
}
