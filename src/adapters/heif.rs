use crate::utils::error::{CompressError, Result};
use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{
    Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, HeifError, Image,
    LibHeif, RgbChroma,
};

/// ISO-BMFF `ftyp` 中代表 HEIF/HEIC 的品牌
const HEIF_BRANDS: [&[u8; 4]; 8] = [
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

fn codec_failed(message: impl Into<String>) -> CompressError {
    CompressError::CodecFailed {
        format: "HEIF".to_string(),
        message: message.into(),
    }
}

fn heif_error(e: HeifError) -> CompressError {
    codec_failed(e.to_string())
}

pub fn is_heif(data: &[u8]) -> bool {
    data.len() >= 12
        && &data[4..8] == b"ftyp"
        && HEIF_BRANDS.iter().any(|brand| &data[8..12] == brand.as_slice())
}

/// 解碼主影像為 8-bit RGB 或 RGBA
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    let lib = LibHeif::new();
    let context = HeifContext::read_from_bytes(data).map_err(heif_error)?;
    let handle = context.primary_image_handle().map_err(heif_error)?;

    let has_alpha = handle.has_alpha_channel();
    let (chroma, channels) = if has_alpha {
        (RgbChroma::Rgba, 4)
    } else {
        (RgbChroma::Rgb, 3)
    };
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(chroma), None)
        .map_err(heif_error)?;

    let (width, height) = (decoded.width(), decoded.height());
    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| codec_failed("decoded image has no interleaved plane"))?;

    // 每列可能有 padding，逐列複製
    let row = width as usize * channels;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        let start = y * plane.stride;
        let line = plane
            .data
            .get(start..start + row)
            .ok_or_else(|| codec_failed("decoded plane is shorter than expected"))?;
        pixels.extend_from_slice(line);
    }

    let image = if has_alpha {
        RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };
    image.ok_or_else(|| codec_failed("decoded pixel buffer does not match image size"))
}

/// 以 HEVC 編碼為 HEIC
pub fn encode(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = (image.width(), image.height());
    let (chroma, channels, pixels) = if image.color().has_alpha() {
        (RgbChroma::Rgba, 4, image.to_rgba8().into_raw())
    } else {
        (RgbChroma::Rgb, 3, image.to_rgb8().into_raw())
    };
    let row = width as usize * channels;
    if row == 0 {
        return Err(codec_failed("image has no pixels"));
    }

    let mut heif_image = Image::new(width, height, ColorSpace::Rgb(chroma)).map_err(heif_error)?;
    heif_image
        .create_plane(Channel::Interleaved, width, height, 8)
        .map_err(heif_error)?;
    {
        let planes = heif_image.planes_mut();
        let plane = planes
            .interleaved
            .ok_or_else(|| codec_failed("image has no interleaved plane"))?;
        let stride = plane.stride;
        for (y, line) in pixels.chunks_exact(row).enumerate() {
            let start = y * stride;
            plane
                .data
                .get_mut(start..start + row)
                .ok_or_else(|| codec_failed("plane is shorter than the image"))?
                .copy_from_slice(line);
        }
    }

    let lib = LibHeif::new();
    let mut context = HeifContext::new().map_err(heif_error)?;
    let mut encoder = lib
        .encoder_for_format(CompressionFormat::Hevc)
        .map_err(heif_error)?;
    encoder
        .set_quality(EncoderQuality::Lossy(quality))
        .map_err(heif_error)?;
    context
        .encode_image(&heif_image, &mut encoder, None)
        .map_err(heif_error)?;
    context.write_to_bytes().map_err(heif_error)
}
