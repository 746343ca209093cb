//! Default background image

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};

use crate::assets::persist::save_png_atomically;
use crate::error::{TimelineError, TimelineResult};

const BASE: Rgb<u8> = Rgb([230, 245, 255]);
const STRIPE: Rgb<u8> = Rgb([220, 240, 255]);

/// Stripe period in pixels; the first half of each period is drawn darker
const STRIPE_PERIOD: u32 = 80;

/// Create a soft striped background at `path` unless a file already exists there
///
/// # Returns
///
/// Absolute path of the background
///
/// # Errors
///
/// Returns `TimelineError::AssetError` if the image cannot be written, or
/// `TimelineError::InvalidInput` for a zero-sized resolution
pub fn ensure_default_background(
    path: impl AsRef<Path>,
    resolution: (u32, u32),
) -> TimelineResult<PathBuf> {
    let path = path.as_ref();
    let (w, h) = resolution;
    if w == 0 || h == 0 {
        return Err(TimelineError::invalid_input(format!(
            "background resolution must be non-zero, got {w}x{h}"
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            TimelineError::asset(format!(
                "failed to create background directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    if !path.is_file() {
        log::debug!("Generating {}x{} background at {}", w, h, path.display());
        let img = RgbImage::from_fn(w, h, |x, _| {
            if x % STRIPE_PERIOD < STRIPE_PERIOD / 2 {
                STRIPE
            } else {
                BASE
            }
        });
        save_png_atomically(&DynamicImage::ImageRgb8(img), path)?;
    }

    path.canonicalize()
        .map_err(|e| TimelineError::asset(format!("failed to resolve '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_once() {
        let dir = std::env::temp_dir().join(format!("cueframe-bg-{}", std::process::id()));
        let path = dir.join("backgrounds").join("bg_default.png");
        let _ = std::fs::remove_dir_all(&dir);

        let created = ensure_default_background(&path, (160, 90)).unwrap();
        assert!(created.is_absolute());
        let img = image::open(&created).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (160, 90));
        assert_eq!(*img.get_pixel(10, 10), STRIPE);
        assert_eq!(*img.get_pixel(50, 10), BASE);

        // An existing file is left alone
        let again = ensure_default_background(&path, (320, 180)).unwrap();
        assert_eq!(again, created);
        assert_eq!(image::image_dimensions(&again).unwrap(), (160, 90));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_concurrent_creation_yields_one_complete_file() {
        let dir = std::env::temp_dir().join(format!("cueframe-bg-race-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("bg.png");

        let paths: Vec<PathBuf> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| ensure_default_background(&path, (320, 180)).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(paths.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(image::image_dimensions(&paths[0]).unwrap(), (320, 180));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let result = ensure_default_background(std::env::temp_dir().join("never.png"), (0, 720));
        assert!(matches!(result, Err(TimelineError::InvalidInput(_))));
    }
}
