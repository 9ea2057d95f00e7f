//! Pixel format mapping tables
//!
//! Pure lookup data translating between the generic pixel layout
//! enumeration used at the API boundary, the engine's native video
//! format tags, and their wire-name strings. Kept as static tables of
//! pairs rather than branching logic.

use crate::error::PlayerError;

/// Generic pixel memory layout exposed to frame consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Unknown,
    R8,
    R8G8B8,
    R8G8B8X8,
    R8G8B8A8,
    B8G8R8X8,
    B8G8R8A8,
}

/// Engine-native video format tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoFormat {
    Unknown,
    Encoded,
    I420,
    Yv12,
    Yuy2,
    Uyvy,
    Ayuv,
    Rgbx,
    Bgrx,
    Xrgb,
    Xbgr,
    Rgba,
    Bgra,
    Argb,
    Abgr,
    Rgb,
    Bgr,
    Y41b,
    Y42b,
    Yvyu,
    Y444,
    V210,
    V216,
    Nv12,
    Nv21,
    Gray8,
    Gray16Be,
    Gray16Le,
    V308,
    R210,
    I42010be,
    I42010le,
    I42210be,
    I42210le,
    Y44410be,
    Y44410le,
    Gbr,
    Gbr10be,
    Gbr10le,
    Nv16,
    Nv24,
    A420,
    P01010be,
    P01010le,
    Gbra,
    Gbra10be,
    Gbra10le,
    I42012be,
    I42012le,
}

/// Wire names for every engine format tag, used in both directions.
const VIDEO_FORMAT_NAMES: &[(VideoFormat, &str)] = &[
    (VideoFormat::Unknown, "UNKNOWN"),
    (VideoFormat::Encoded, "ENCODED"),
    (VideoFormat::I420, "I420"),
    (VideoFormat::Yv12, "YV12"),
    (VideoFormat::Yuy2, "YUY2"),
    (VideoFormat::Uyvy, "UYVY"),
    (VideoFormat::Ayuv, "AYUV"),
    (VideoFormat::Rgbx, "RGBx"),
    (VideoFormat::Bgrx, "BGRx"),
    (VideoFormat::Xrgb, "xRGB"),
    (VideoFormat::Xbgr, "xBGR"),
    (VideoFormat::Rgba, "RGBA"),
    (VideoFormat::Bgra, "BGRA"),
    (VideoFormat::Argb, "ARGB"),
    (VideoFormat::Abgr, "ABGR"),
    (VideoFormat::Rgb, "RGB"),
    (VideoFormat::Bgr, "BGR"),
    (VideoFormat::Y41b, "Y41B"),
    (VideoFormat::Y42b, "Y42B"),
    (VideoFormat::Yvyu, "YVYU"),
    (VideoFormat::Y444, "Y444"),
    (VideoFormat::V210, "V210"),
    (VideoFormat::V216, "V216"),
    (VideoFormat::Nv12, "NV12"),
    (VideoFormat::Nv21, "NV21"),
    (VideoFormat::Gray8, "GRAY8"),
    (VideoFormat::Gray16Be, "GRAY16_BE"),
    (VideoFormat::Gray16Le, "GRAY16_LE"),
    (VideoFormat::V308, "v308"),
    (VideoFormat::R210, "r210"),
    (VideoFormat::I42010be, "I420_10BE"),
    (VideoFormat::I42010le, "I420_10LE"),
    (VideoFormat::I42210be, "I422_10BE"),
    (VideoFormat::I42210le, "I422_10LE"),
    (VideoFormat::Y44410be, "I444_10BE"),
    (VideoFormat::Y44410le, "I444_10LE"),
    (VideoFormat::Gbr, "GBR"),
    (VideoFormat::Gbr10be, "GBR_10BE"),
    (VideoFormat::Gbr10le, "GBR_10LE"),
    (VideoFormat::Nv16, "NV16"),
    (VideoFormat::Nv24, "NV24"),
    (VideoFormat::A420, "A420"),
    (VideoFormat::P01010be, "P010_10BE"),
    (VideoFormat::P01010le, "P010_10LE"),
    (VideoFormat::Gbra, "GBRA"),
    (VideoFormat::Gbra10be, "GBRA_10BE"),
    (VideoFormat::Gbra10le, "GBRA_10LE"),
    (VideoFormat::I42012be, "I420_12BE"),
    (VideoFormat::I42012le, "I420_12LE"),
];

/// Pixel layouts the engine can deliver directly, paired with their
/// engine tags.
const PIXEL_VIDEO_PAIRS: &[(PixelFormat, VideoFormat)] = &[
    (PixelFormat::R8, VideoFormat::Gray8),
    (PixelFormat::R8G8B8, VideoFormat::Rgb),
    (PixelFormat::R8G8B8X8, VideoFormat::Rgbx),
    (PixelFormat::R8G8B8A8, VideoFormat::Rgba),
    (PixelFormat::B8G8R8X8, VideoFormat::Bgrx),
    (PixelFormat::B8G8R8A8, VideoFormat::Bgra),
];

/// Engine tag for a requested pixel layout.
///
/// Fails for layouts the engine has no direct mapping for, before any
/// negotiation is attempted.
pub fn pixel_to_video(format: PixelFormat) -> Result<VideoFormat, PlayerError> {
    PIXEL_VIDEO_PAIRS
        .iter()
        .find(|(pixel, _)| *pixel == format)
        .map(|(_, video)| *video)
        .ok_or(PlayerError::UnsupportedFormat(format))
}

/// Pixel layout for an engine tag; formats without a layout mapping
/// (planar YUV and friends) report `Unknown`.
pub fn video_to_pixel(format: VideoFormat) -> PixelFormat {
    PIXEL_VIDEO_PAIRS
        .iter()
        .find(|(_, video)| *video == format)
        .map(|(pixel, _)| *pixel)
        .unwrap_or(PixelFormat::Unknown)
}

/// Wire name of an engine tag.
pub fn format_name(format: VideoFormat) -> &'static str {
    VIDEO_FORMAT_NAMES
        .iter()
        .find(|(video, _)| *video == format)
        .map(|(_, name)| *name)
        .unwrap_or("UNKNOWN")
}

/// Parse a wire name, case-insensitively on fallback. Unknown names
/// parse to [`VideoFormat::Unknown`] rather than erroring.
pub fn parse_format(name: &str) -> VideoFormat {
    VIDEO_FORMAT_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .or_else(|| {
            VIDEO_FORMAT_NAMES
                .iter()
                .find(|(_, n)| n.eq_ignore_ascii_case(name))
        })
        .map(|(video, _)| *video)
        .unwrap_or(VideoFormat::Unknown)
}

/// Bytes per pixel of a packed layout, for scan-size computation.
pub fn bytes_per_pixel(format: PixelFormat) -> usize {
    match format {
        PixelFormat::Unknown => 0,
        PixelFormat::R8 => 1,
        PixelFormat::R8G8B8 => 3,
        PixelFormat::R8G8B8X8
        | PixelFormat::R8G8B8A8
        | PixelFormat::B8G8R8X8
        | PixelFormat::B8G8R8A8 => 4,
    }
}
