use std::path::Path;

/// Sniff an image MIME type from its leading magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        _ => None,
    }
}

/// Map a file extension to the MIME type a file picker would report.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Resolve the MIME type for a local file: extension first, then content.
pub fn detect_file_mime(path: &Path, bytes: &[u8]) -> &'static str {
    if let Some(mime) = mime_from_extension(path).or_else(|| sniff_image_mime(bytes)) {
        return mime;
    }
    tracing::warn!(
        "Unrecognized image format for {} (first 4 bytes: {:02X?}), falling back to image/png",
        path.display(),
        &bytes[..bytes.len().min(4)]
    );
    "image/png"
}
