use std::path::Path;

use skyline_image::{Image, ImageSize};

use crate::error::IoError;

// decode any format supported by the image crate, guessing it from the content
fn decode_any(file_path: &Path) -> Result<image::DynamicImage, IoError> {
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;
    let img = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    if img.width() == 0 || img.height() == 0 {
        return Err(IoError::EmptyImage(file_path.to_path_buf()));
    }

    log::debug!(
        "decoded {} ({}x{}, {:?})",
        file_path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    Ok(img)
}

/// Reads an image from the given file path as RGB.
///
/// The method tries to read from any image format supported by the image crate and
/// converts the pixels to 8-bit RGB. Alpha is dropped and gray is replicated.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB image with three channels (rgb8).
///
/// # Errors
///
/// [`IoError::FileDoesNotExist`] for a missing file, [`IoError::ImageDecodeError`] when the
/// content cannot be decoded and [`IoError::EmptyImage`] when it has no pixels.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let img = decode_any(file_path.as_ref())?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Reads an image from the given file path as grayscale.
///
/// Color images are converted with the luma weights of the image crate.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A grayscale image with a single channel (mono8).
pub fn read_image_any_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let img = decode_any(file_path.as_ref())?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    Ok(Image::new(size, img.into_luma8().into_raw())?)
}
