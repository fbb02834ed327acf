#[cfg(feature = "heif")]
use crate::adapters::heif;
use crate::domain::model::{CompressionSettings, OutputFormat};
use crate::domain::ports::ImageCodec;
use crate::utils::error::{CompressError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;

/// 以 `image` crate 解碼，WebP 交給 libwebp，HEIF 交給 libheif (選用)
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRsCodec;

impl ImageRsCodec {
    pub fn new() -> Self {
        Self
    }

    fn decode(input: &[u8]) -> Result<DynamicImage> {
        #[cfg(feature = "heif")]
        if heif::is_heif(input) {
            return heif::decode(input);
        }

        let image = ImageReader::new(Cursor::new(input))
            .with_guessed_format()?
            .decode()?;
        Ok(image)
    }
}

fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(1, 100)
}

/// WebP、AVIF 與 HEIF 編碼器只接受 8-bit RGB/RGBA
fn to_rgb_or_rgba(image: DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.into_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.into_rgb8())
    }
}

impl ImageCodec for ImageRsCodec {
    fn supports(&self, format: OutputFormat) -> bool {
        match format {
            OutputFormat::Webp | OutputFormat::Jpeg => true,
            OutputFormat::Avif => cfg!(feature = "avif"),
            OutputFormat::Heif => cfg!(feature = "heif"),
        }
    }

    fn transcode(&self, input: &[u8], settings: &CompressionSettings) -> Result<Vec<u8>> {
        if !self.supports(settings.format) {
            return Err(CompressError::EncoderUnavailable {
                format: settings.format.name().to_string(),
            });
        }

        let image = Self::decode(input)?;
        let quality = clamp_quality(settings.quality.value());
        let mut out = Vec::new();

        match settings.format {
            OutputFormat::Jpeg => {
                // JPEG 沒有 alpha 通道
                let rgb = DynamicImage::ImageRgb8(image.into_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
            }
            OutputFormat::Webp => {
                let rgb = to_rgb_or_rgba(image);
                let encoder =
                    webp::Encoder::from_image(&rgb).map_err(|e| CompressError::CodecFailed {
                        format: OutputFormat::Webp.name().to_string(),
                        message: e.to_string(),
                    })?;
                out = encoder.encode(f32::from(settings.quality.value())).to_vec();
            }
            #[cfg(feature = "avif")]
            OutputFormat::Avif => {
                let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                    &mut out,
                    settings.avif_speed.clamp(1, 10),
                    quality,
                );
                to_rgb_or_rgba(image).write_with_encoder(encoder)?;
            }
            #[cfg(feature = "heif")]
            OutputFormat::Heif => {
                out = heif::encode(&to_rgb_or_rgba(image), quality)?;
            }
            other => {
                return Err(CompressError::EncoderUnavailable {
                    format: other.name().to_string(),
                })
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Quality;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    /// 隨機雜訊的 JPEG，模擬難以壓縮的照片
    fn noisy_jpeg(size: u32) -> Vec<u8> {
        let mut state: u32 = 0x2545_f491;
        let img = RgbImage::from_fn(size, size, |_, _| {
            let mut next = || {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            };
            Rgb([next(), next(), next()])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
            .unwrap();
        out
    }

    fn png_bytes(with_alpha: bool) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        if with_alpha {
            let img = RgbaImage::from_fn(16, 16, |x, y| Rgba([x as u8 * 16, y as u8 * 16, 128, 200]));
            img.write_to(&mut buf, ImageFormat::Png).unwrap();
        } else {
            let img = RgbImage::from_fn(16, 16, |x, y| Rgb([x as u8 * 16, y as u8 * 16, 64]));
            img.write_to(&mut buf, ImageFormat::Png).unwrap();
        }
        buf.into_inner()
    }

    fn settings(format: OutputFormat, quality: u8) -> CompressionSettings {
        CompressionSettings::new(format, Quality::new(quality).unwrap()).with_avif_speed(10)
    }

    #[test]
    fn test_jpeg_output_decodes_as_jpeg() {
        let codec = ImageRsCodec::new();
        let out = codec
            .transcode(&png_bytes(true), &settings(OutputFormat::Jpeg, 50))
            .unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn test_jpeg_quality_zero_is_clamped() {
        let codec = ImageRsCodec::new();
        assert!(codec
            .transcode(&png_bytes(false), &settings(OutputFormat::Jpeg, 0))
            .is_ok());
    }

    #[test]
    fn test_webp_keeps_alpha() {
        let codec = ImageRsCodec::new();
        let out = codec
            .transcode(&png_bytes(true), &settings(OutputFormat::Webp, 80))
            .unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::WebP);

        let decoded = image::load_from_memory(&out).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn test_webp_honours_quality() {
        let codec = ImageRsCodec::new();
        let input = noisy_jpeg(256);

        let low = codec
            .transcode(&input, &settings(OutputFormat::Webp, 10))
            .unwrap();
        let high = codec
            .transcode(&input, &settings(OutputFormat::Webp, 90))
            .unwrap();

        assert_eq!(image::guess_format(&low).unwrap(), ImageFormat::WebP);
        assert!(low.len() < high.len(), "q10={} q90={}", low.len(), high.len());
        assert!(low.len() < input.len(), "q10={} input={}", low.len(), input.len());
    }

    #[test]
    fn test_default_webp_shrinks_jpeg_photo() {
        let codec = ImageRsCodec::new();
        let input = noisy_jpeg(256);
        let out = codec
            .transcode(
                &input,
                &CompressionSettings::new(OutputFormat::Webp, Quality::default()),
            )
            .unwrap();
        assert!(out.len() < input.len(), "webp={} input={}", out.len(), input.len());
    }

    #[cfg(feature = "avif")]
    #[test]
    fn test_avif_output() {
        let codec = ImageRsCodec::new();
        assert!(codec.supports(OutputFormat::Avif));
        let out = codec
            .transcode(&png_bytes(false), &settings(OutputFormat::Avif, 60))
            .unwrap();
        assert!(!out.is_empty());
        assert_eq!(&out[4..8], b"ftyp");
    }

    #[cfg(not(feature = "heif"))]
    #[test]
    fn test_heif_is_unavailable() {
        let codec = ImageRsCodec::new();
        assert!(!codec.supports(OutputFormat::Heif));
        let err = codec
            .transcode(&png_bytes(false), &settings(OutputFormat::Heif, 50))
            .unwrap_err();
        assert!(matches!(err, CompressError::EncoderUnavailable { .. }));
    }

    #[cfg(feature = "heif")]
    #[test]
    fn test_heif_output_decodes_back() {
        let codec = ImageRsCodec::new();
        assert!(codec.supports(OutputFormat::Heif));
        let heic = codec
            .transcode(&noisy_jpeg(64), &settings(OutputFormat::Heif, 50))
            .unwrap();
        assert!(heif::is_heif(&heic));

        // HEIC 輸入可以再轉成 JPEG
        let jpeg = codec
            .transcode(&heic, &settings(OutputFormat::Jpeg, 50))
            .unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn test_garbage_input_is_codec_error() {
        let codec = ImageRsCodec::new();
        let err = codec
            .transcode(b"definitely not an image", &settings(OutputFormat::Jpeg, 50))
            .unwrap_err();
        assert!(matches!(err, CompressError::ImageError(_)));
    }
}
