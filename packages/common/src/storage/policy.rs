use thiserror::Error;

use super::naming::{extension_of, is_safe_extension};

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Match a file extension (case-insensitive, without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Match a declared MIME type. Parameters such as `; charset=...` are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Format named by a stored or client filename's extension.
    pub fn of_filename(filename: &str) -> Option<Self> {
        extension_of(filename).and_then(Self::from_extension)
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Why an upload was refused by the allow-list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageRejection {
    #[error("File type not allowed: the file name has no extension")]
    MissingExtension,
    #[error("File type not allowed: .{0} files are not accepted")]
    Extension(String),
    #[error("File type not allowed: no content type was declared")]
    MissingContentType,
    #[error("File type not allowed: {0} is not accepted")]
    ContentType(String),
}

/// An upload that passed the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedImage {
    /// Format named by the declared content type.
    pub format: ImageFormat,
    /// Original extension as the client sent it, without the dot.
    pub extension: String,
}

/// Check a client filename and declared content type against the image allow-list.
///
/// Both must name an allowed format. They are checked independently, so
/// `photo.jpg` declared as `image/png` is accepted.
pub fn check_image(
    filename: &str,
    content_type: Option<&str>,
) -> Result<AcceptedImage, ImageRejection> {
    let extension = extension_of(filename).ok_or(ImageRejection::MissingExtension)?;
    if ImageFormat::from_extension(extension).is_none() || !is_safe_extension(extension) {
        return Err(ImageRejection::Extension(extension.to_string()));
    }

    let content_type = content_type.ok_or(ImageRejection::MissingContentType)?;
    let format = ImageFormat::from_content_type(content_type)
        .ok_or_else(|| ImageRejection::ContentType(content_type.to_string()))?;

    Ok(AcceptedImage {
        format,
        extension: extension.to_string(),
    })
}
