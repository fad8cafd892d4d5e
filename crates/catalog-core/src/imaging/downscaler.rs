//! ImageDownscaler - デコード → 縮小 → JPEG エンコード
//!
//! CPU バウンド。`spawn_blocking` から呼ぶこと（ImagePipeline はそうしている）。

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageReader, Limits};

use crate::domain::DownscaleError;
use crate::imaging::pipeline::DEFAULT_QUALITY;

/// デコーダが受け付ける幅・高さの上限
pub const DEFAULT_MAX_DECODE_DIMENSION: u32 = 16384;

/// 縮小に成功したときの出力
#[derive(Debug, Clone)]
pub struct Downscaled {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// `width` x `height` の元画像を `max_width` に収めたときの出力サイズ
///
/// `ratio = min(1, max_width / width)`、各辺は切り捨て。拡大はしない。
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    // integer math so floor(H * max / W) is exact
    let scaled_height = (height as u64 * max_width as u64 / width as u64) as u32;
    (max_width, scaled_height)
}

/// [0, 1] の品質を JPEG の 1..=100 に変換
///
/// NaN / 無限大は `DEFAULT_QUALITY` として扱う。
pub fn jpeg_quality(quality: f32) -> u8 {
    let quality = if quality.is_finite() {
        quality
    } else {
        DEFAULT_QUALITY
    };
    ((quality.clamp(0.0, 1.0) * 100.0).round() as u8).max(1)
}

#[derive(Debug, Clone)]
pub struct ImageDownscaler {
    max_decode_dimension: u32,
}

impl ImageDownscaler {
    pub fn new(max_decode_dimension: u32) -> Self {
        Self {
            max_decode_dimension,
        }
    }

    /// `bytes` をデコードし、`max_width` まで縮めて JPEG に再エンコード
    pub fn downscale(
        &self,
        bytes: &[u8],
        max_width: u32,
        quality: f32,
    ) -> Result<Downscaled, DownscaleError> {
        let source = self.decode(bytes)?;
        downscale_image(&source, max_width, quality)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, DownscaleError> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DownscaleError::Decode(e.to_string()))?;

        // 展開爆弾対策: 小さなファイルでも巨大なサイズを宣言できる
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_decode_dimension);
        limits.max_image_height = Some(self.max_decode_dimension);
        reader.limits(limits);

        reader
            .decode()
            .map_err(|e| DownscaleError::Decode(e.to_string()))
    }
}

impl Default for ImageDownscaler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DECODE_DIMENSION)
    }
}

/// デコード済みの画像を縮小して JPEG にエンコード
pub fn downscale_image(
    source: &DynamicImage,
    max_width: u32,
    quality: f32,
) -> Result<Downscaled, DownscaleError> {
    let (width, height) = source.dimensions();
    let (out_w, out_h) = target_dimensions(width, height, max_width);
    if out_w == 0 || out_h == 0 {
        return Err(DownscaleError::Encode(format!(
            "zero-area surface {out_w}x{out_h} (source {width}x{height}, max_width {max_width})"
        )));
    }

    let surface = if (out_w, out_h) == (width, height) {
        source.to_rgb8()
    } else {
        source.resize_exact(out_w, out_h, FilterType::Triangle).to_rgb8()
    };

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
    encoder
        .encode(
            surface.as_raw(),
            surface.width(),
            surface.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| DownscaleError::Encode(e.to_string()))?;

    if buf.is_empty() {
        return Err(DownscaleError::Encode("encoder produced no bytes".to_string()));
    }

    Ok(Downscaled {
        bytes: buf,
        width: out_w,
        height: out_h,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use rstest::rstest;

    fn create_test_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 120, 40, 255]),
        ));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[rstest]
    #[case::wider_than_max(200, 100, 50, (50, 25))]
    #[case::exact_max(50, 30, 50, (50, 30))]
    #[case::smaller_than_max(20, 10, 50, (20, 10))]
    #[case::floors_height(300, 101, 50, (50, 16))]
    #[case::thin_strip(1000, 1, 50, (50, 0))]
    #[case::zero_max(10, 10, 0, (0, 0))]
    fn target_dimensions_never_upscale(
        #[case] width: u32,
        #[case] height: u32,
        #[case] max_width: u32,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(target_dimensions(width, height, max_width), expected);
    }

    #[rstest]
    #[case(0.8, 80)]
    #[case(1.0, 100)]
    #[case(0.0, 1)]
    #[case(1.7, 100)]
    #[case(f32::NAN, 80)]
    #[case(f32::INFINITY, 80)]
    #[case(f32::NEG_INFINITY, 80)]
    fn quality_fraction_maps_to_jpeg_scale(#[case] quality: f32, #[case] expected: u8) {
        assert_eq!(jpeg_quality(quality), expected);
    }

    #[test]
    fn downscale_shrinks_to_max_width() {
        let out = ImageDownscaler::default()
            .downscale(&create_test_png(200, 100), 50, 0.8)
            .unwrap();
        assert_eq!((out.width, out.height), (50, 25));

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (50, 25));
        assert_eq!(image::guess_format(&out.bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn downscale_keeps_small_images_at_original_size() {
        let out = ImageDownscaler::default()
            .downscale(&create_test_png(30, 12), 50, 0.8)
            .unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (30, 12));
    }

    #[test]
    fn empty_bytes_fail_decode() {
        let err = ImageDownscaler::default().downscale(&[], 50, 0.8).unwrap_err();
        assert!(matches!(err, DownscaleError::Decode(_)));
    }

    #[test]
    fn garbage_bytes_fail_decode() {
        let err = ImageDownscaler::default()
            .downscale(b"definitely not an image", 50, 0.8)
            .unwrap_err();
        assert!(matches!(err, DownscaleError::Decode(_)));
    }

    #[test]
    fn oversized_source_fails_decode() {
        let err = ImageDownscaler::new(64)
            .downscale(&create_test_png(100, 10), 50, 0.8)
            .unwrap_err();
        assert!(matches!(err, DownscaleError::Decode(_)));
    }

    #[rstest]
    #[case::zero_max_width(create_test_png(10, 10), 0)]
    #[case::height_rounds_to_zero(create_test_png(1000, 1), 50)]
    fn zero_area_surface_fails_encode(#[case] png: Vec<u8>, #[case] max_width: u32) {
        let err = ImageDownscaler::default()
            .downscale(&png, max_width, 0.8)
            .unwrap_err();
        assert!(matches!(err, DownscaleError::Encode(_)));
    }
}
