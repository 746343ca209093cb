//! Lazily generated placeholder assets
//!
//! Every label gets a deterministic PNG card in an assets directory. Cards are created on
//! first request only and written atomically, so concurrent requests for the same label
//! all end up with the same, complete file. Label and caption text is drawn when a font
//! is available.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use xxhash_rust::xxh3::xxh3_64;

use crate::assets::card::{render_card, system_font, MAX_CARD_SIZE};
use crate::assets::catalog::{AssetCatalog, AssetLookup};
use crate::assets::persist::save_png_atomically;
use crate::error::{TimelineError, TimelineResult};
use crate::timeline::result::AssetRef;

/// Placeholder card generator backed by a directory
#[derive(Clone)]
pub struct PlaceholderAssets {
    dir: PathBuf,
    size: u32,
    font: Option<Arc<Vec<u8>>>,
}

impl std::fmt::Debug for PlaceholderAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderAssets")
            .field("dir", &self.dir)
            .field("size", &self.size)
            .field("font_bytes", &self.font.as_ref().map(|f| f.len()))
            .finish()
    }
}

impl PlaceholderAssets {
    /// Generator writing 1024×1024 cards into `dir`
    ///
    /// Uses an installed bold sans-serif font (DejaVu Sans Bold where present) for the
    /// card text; without one, cards are drawn without text.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            size: 1024,
            font: system_font().map(Arc::new),
        }
    }

    /// Override the card edge length in pixels (clamped to 64..=4096)
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size.clamp(64, MAX_CARD_SIZE);
        self
    }

    /// Draw card text with the given TrueType/OpenType font
    pub fn with_font(mut self, font_bytes: Vec<u8>) -> Self {
        self.font = Some(Arc::new(font_bytes));
        self
    }

    /// Draw card text with the font stored at `path`
    ///
    /// # Errors
    ///
    /// Returns `TimelineError::AssetError` if the font file cannot be read
    pub fn with_font_file(self, path: impl AsRef<Path>) -> TimelineResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            TimelineError::asset(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Ok(self.with_font(bytes))
    }

    /// Draw cards without any text
    pub fn without_text(mut self) -> Self {
        self.font = None;
        self
    }

    /// Directory the cards live in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a label's card is stored in (whether or not it exists yet)
    pub fn asset_path(&self, label: &str) -> PathBuf {
        self.dir.join(file_name(label))
    }

    /// Make sure every label has a card and return the resulting catalog
    ///
    /// # Errors
    ///
    /// Returns `TimelineError::AssetError` if the directory or a card cannot be written
    pub fn ensure<S: AsRef<str>>(&self, labels: &[S]) -> TimelineResult<AssetCatalog> {
        let mut catalog = AssetCatalog::new();
        for label in labels {
            let label = label.as_ref();
            if catalog.get(label).is_none() {
                catalog.insert(label, self.ensure_label(label)?);
            }
        }
        log::debug!(
            "Ensured {} placeholder assets in {}",
            catalog.len(),
            self.dir.display()
        );
        Ok(catalog)
    }

    /// Make sure `label` has a card and return a reference to it
    ///
    /// Idempotent: the same label always maps to the same absolute path.
    ///
    /// # Errors
    ///
    /// Returns `TimelineError::AssetError` if the card cannot be drawn or written
    pub fn ensure_label(&self, label: &str) -> TimelineResult<AssetRef> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            TimelineError::asset(format!(
                "failed to create assets directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        let dir = self.dir.canonicalize().map_err(|e| {
            TimelineError::asset(format!("failed to resolve '{}': {e}", self.dir.display()))
        })?;
        let path = dir.join(file_name(label));

        if !path.is_file() {
            log::debug!("Generating placeholder for {:?} at {}", label, path.display());
            let card = render_card(label, self.size, self.font.as_deref().map(Vec::as_slice))?;
            save_png_atomically(&DynamicImage::ImageRgba8(card), &path)?;
        }

        if !path.is_file() {
            return Err(TimelineError::asset(format!(
                "placeholder '{}' missing after generation",
                path.display()
            )));
        }

        Ok(AssetRef::new(path))
    }
}

impl AssetLookup for PlaceholderAssets {
    fn resolve(&self, label: &str) -> Option<AssetRef> {
        match self.ensure_label(label) {
            Ok(asset) => Some(asset),
            Err(e) => {
                log::warn!("No placeholder for {:?}: {}", label, e);
                None
            }
        }
    }
}

/// `<slug>_<hash>.png`; the hash keeps labels that slug alike apart ("A" vs "a")
fn file_name(label: &str) -> String {
    let slug: String = label
        .chars()
        .take(32)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let hash = xxh3_64(label.as_bytes());
    format!("{slug}_{:08x}.png", hash as u32)
}
