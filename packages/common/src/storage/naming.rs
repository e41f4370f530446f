use chrono::Utc;
use rand::Rng;

/// Upper bound (exclusive) of the random component of generated names.
const RANDOM_SPAN: u32 = 1_000_000_000;

/// Generate a stored image name: `<unix millis>-<random>[.<extension>]`.
///
/// The millisecond timestamp orders names by upload time; the random part keeps
/// names unique when several uploads land in the same millisecond.
pub fn unique_filename(extension: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = rand::rng().random_range(0..RANDOM_SPAN);
    if extension.is_empty() {
        format!("{millis}-{suffix}")
    } else {
        format!("{millis}-{suffix}.{extension}")
    }
}

/// Extension of a client-supplied filename, without the dot.
///
/// Returns `None` for names without an extension and for dotfiles such as `.png`.
pub fn extension_of(filename: &str) -> Option<&str> {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Whether `extension` can be appended to a generated name.
pub fn is_safe_extension(extension: &str) -> bool {
    extension.len() <= 16 && extension.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Result of validating a flat filename.
#[derive(Debug)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename contains path traversal patterns (`..`).
    PathTraversal,
    /// Filename contains null bytes.
    NullByte,
    /// Filename starts with a dot (hidden file).
    Hidden,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    // Also covers the staging directory `.tmp`.
    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}
