use super::ThumbnailError;
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat,
    codecs::{
        gif::GifEncoder,
        jpeg::JpegEncoder,
        png::PngEncoder,
    },
    imageops::FilterType,
};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encoder family used for a thumbnail. Thumbnails keep the family of the
/// source they were made from; anything we cannot re-encode becomes JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    pub fn from_detected(detected: Option<ImageFormat>) -> Self {
        match detected {
            Some(ImageFormat::Png) => OutputFormat::Png,
            Some(ImageFormat::Jpeg) => OutputFormat::Jpeg,
            Some(ImageFormat::Gif) => OutputFormat::Gif,
            _ => OutputFormat::Jpeg,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
        }
    }
}

/// Open and decode the source, reporting which decoder recognised it.
pub(crate) fn decode_source(
    path: &Path,
) -> Result<(DynamicImage, Option<ImageFormat>), ThumbnailError> {
    let file = std::fs::File::open(path).map_err(|source| ThumbnailError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = image::ImageReader::new(std::io::BufReader::new(file))
        .with_guessed_format()
        .map_err(|source| ThumbnailError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let detected = reader.format();

    let img = reader.decode().map_err(|source| ThumbnailError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((img, detected))
}

/// Sniff the encoding of an artifact already on disk.
pub(crate) fn detect_artifact(path: &Path) -> Result<OutputFormat, ThumbnailError> {
    let reader = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| ThumbnailError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(OutputFormat::from_detected(reader.format()))
}

/// Fit the image inside the bounding box, keeping its aspect ratio.
/// Images already inside the box are left alone.
pub(crate) fn fit_within(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() <= width && img.height() <= height {
        return img.clone();
    }
    img.resize(width, height, FilterType::Triangle)
}

pub(crate) fn encode<W: Write>(
    image: &DynamicImage,
    writer: W,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<(), image::ImageError> {
    let mut writer = BufWriter::new(writer);
    match format {
        OutputFormat::Jpeg => {
            // JPEG doesn't support alpha channel, so convert to RGB
            let rgb_image = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, jpeg_quality).write_image(
                &rgb_image,
                rgb_image.width(),
                rgb_image.height(),
                ExtendedColorType::Rgb8,
            )?;
        }
        OutputFormat::Png => {
            let rgba_image = image.to_rgba8();
            PngEncoder::new(&mut writer).write_image(
                &rgba_image,
                rgba_image.width(),
                rgba_image.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
        OutputFormat::Gif => {
            let rgba_image = image.to_rgba8();
            GifEncoder::new(&mut writer).encode(
                &rgba_image,
                rgba_image.width(),
                rgba_image.height(),
                ExtendedColorType::Rgba8,
            )?;
        }
    }
    writer.flush().map_err(image::ImageError::IoError)?;
    Ok(())
}
