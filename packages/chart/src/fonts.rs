//! Font discovery for chart text.
//!
//! Text is rasterized from a font file registered once per process. When
//! no candidate can be read the chart is drawn without any text.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::{FontStyle, register_font};

/// Family name the registered font is drawn under.
pub const FONT_FAMILY: &str = "sans-serif";

/// Font files tried in order. Japanese-capable faces come first.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/noto/NotoSansJP-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansJP-Regular.otf",
    "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Default candidate list as owned paths.
#[must_use]
pub fn default_candidates() -> Vec<PathBuf> {
    DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect()
}

/// Registers the first usable font among `candidates` and reports whether
/// text can be drawn.
///
/// Only the first call searches; later calls reuse its outcome whatever
/// candidates they pass.
pub fn ensure_font(candidates: &[PathBuf]) -> bool {
    REGISTERED
        .get_or_init(|| register_first(candidates))
        .is_some()
}

fn register_first(candidates: &[PathBuf]) -> Option<PathBuf> {
    for path in candidates {
        if register(path) {
            log::info!("Chart font: {}", path.display());
            return Some(path.clone());
        }
    }

    log::warn!("No usable chart font found, charts will be drawn without text");
    None
}

fn register(path: &Path) -> bool {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::debug!("Skipping font {}: {e}", path.display());
            return false;
        }
    };

    // Registered fonts must outlive every chart.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

    match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => true,
        Err(_) => {
            log::warn!("Font {} is not a usable font file", path.display());
            false
        }
    }
}
