// Media Storage - validated image uploads written under the media root
//
// Layout: <root>/uploads/<entity>s/<slug>-<uuid><ext>, referenced publicly as
// <media url>uploads/<entity>s/<slug>-<uuid><ext>.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::{AppError, AppResult, FieldErrors};

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Lowercase ASCII slug: non-ASCII and punctuation dropped, whitespace and
/// dash runs collapsed to a single dash.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.chars().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let dashed = SLUG_SEPARATORS.replace_all(stripped.trim(), "-");
    dashed.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Entity an image belongs to; decides the storage directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOwner {
    Profile,
    Post,
}

impl ImageOwner {
    fn directory(self) -> &'static str {
        match self {
            ImageOwner::Profile => "profiles",
            ImageOwner::Post => "posts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Sniff the format from magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else if bytes.starts_with(b"BM") && bytes.len() > 26 {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Jpeg => ".jpg",
            ImageFormat::Gif => ".gif",
            ImageFormat::Webp => ".webp",
            ImageFormat::Bmp => ".bmp",
        }
    }

    /// File extensions, lowercase and without the dot, this format is stored under.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Png => &["png"],
            ImageFormat::Jpeg => &["jpg", "jpeg", "jpe"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::Webp => &["webp"],
            ImageFormat::Bmp => &["bmp", "dib"],
        }
    }

    fn matches_extension(self, extension: &str) -> bool {
        self.aliases().iter().any(|alias| *alias == extension)
    }
}

const ALL_FORMATS: [ImageFormat; 5] =
    [ImageFormat::Bmp, ImageFormat::Gif, ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Webp];

fn is_image_extension(extension: &str) -> bool {
    ALL_FORMATS.iter().any(|format| format.matches_extension(extension))
}

/// A file received from a multipart form, before validation.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased extension of the client-supplied file name.
    fn extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(|file_name| Path::new(file_name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

fn allowed_extensions() -> String {
    let mut extensions: Vec<&str> = ALL_FORMATS
        .iter()
        .flat_map(|format| format.aliases().iter().copied())
        .collect();
    extensions.sort_unstable();
    extensions.join(", ")
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
    max_upload_bytes: usize,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            url_prefix: config.url.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public reference for a stored relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.url_prefix, path)
    }

    pub fn validate(&self, upload: Option<&ImageUpload>) -> AppResult<ImageFormat> {
        let field_error = |msg: &str| AppError::Validation(FieldErrors::single("image", msg));

        let upload = upload.ok_or_else(|| field_error("No file was submitted."))?;
        if upload.bytes.is_empty() {
            return Err(field_error("The submitted file is empty."));
        }
        if upload.bytes.len() > self.max_upload_bytes {
            return Err(field_error("The submitted file is too large."));
        }
        let format = ImageFormat::detect(&upload.bytes).ok_or_else(|| {
            field_error(
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
            )
        })?;

        if let Some(extension) = upload.extension() {
            if !is_image_extension(&extension) {
                let message = format!(
                    "File extension \u{201c}{}\u{201d} is not allowed. Allowed extensions are: {}.",
                    extension,
                    allowed_extensions()
                );
                return Err(field_error(message.as_str()));
            }
        }
        Ok(format)
    }

    /// Relative path a new upload for `name` will be written to. The client's
    /// extension is kept only when it names the detected format.
    pub fn derive_path(
        &self,
        owner: ImageOwner,
        name: &str,
        upload: &ImageUpload,
        format: ImageFormat,
    ) -> String {
        let extension = upload
            .extension()
            .filter(|ext| format.matches_extension(ext))
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| format.extension().to_string());

        let mut slug = slugify(name);
        if slug.is_empty() {
            slug = "image".to_string();
        }

        format!("uploads/{}/{}-{}{}", owner.directory(), slug, Uuid::new_v4(), extension)
    }

    /// Validate and write the upload; returns the relative path.
    pub async fn store(
        &self,
        owner: ImageOwner,
        name: &str,
        upload: Option<&ImageUpload>,
    ) -> AppResult<String> {
        let format = self.validate(upload)?;
        let upload = upload.ok_or_else(|| AppError::Internal("validated upload vanished".into()))?;
        let relative = self.derive_path(owner, name, upload, format);
        let absolute = self.root.join(&relative);

        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute, &upload.bytes).await?;

        tracing::info!("stored {:?} image {} ({} bytes)", format, relative, upload.bytes.len());
        Ok(relative)
    }

    /// Settle a replacement once the owner row was updated to `stored`: the
    /// previous file goes on success, the new one on failure.
    pub async fn finish_replace(
        &self,
        stored: &str,
        committed: AppResult<Option<String>>,
    ) -> AppResult<()> {
        match committed {
            Ok(Some(previous)) => {
                self.remove(&previous).await;
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.remove(stored).await;
                Err(e)
            }
        }
    }

    /// Delete a previously stored file; failures are only logged.
    pub async fn remove(&self, relative: &str) {
        if relative.contains("..") {
            tracing::warn!("refusing to remove suspicious media path {}", relative);
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            tracing::warn!("failed to remove old media file {}: {}", relative, e);
        }
    }
}
