//! Magic-byte content sniffing for stored covers.
//!
//! The object store keeps raw bytes only, so the serving route sniffs
//! the type at response time.

/// Detect an image content type from leading magic bytes.
pub fn detect_content_type(data: &[u8]) -> Option<&'static str> {
    // JPEG: FF D8 FF
    if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.len() >= 8 && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Some("image/png");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    // GIF: GIF87a or GIF89a
    if data.len() >= 6 && &data[0..3] == b"GIF" {
        return Some("image/gif");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jpeg() {
        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(detect_content_type(&jpeg_header), Some("image/jpeg"));
    }

    #[test]
    fn detects_png() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_content_type(&png_header), Some("image/png"));
    }

    #[test]
    fn detects_webp() {
        let mut webp = [0u8; 12];
        webp[0..4].copy_from_slice(b"RIFF");
        webp[8..12].copy_from_slice(b"WEBP");
        assert_eq!(detect_content_type(&webp), Some("image/webp"));
    }

    #[test]
    fn detects_gif() {
        assert_eq!(detect_content_type(b"GIF89a"), Some("image/gif"));
    }

    #[test]
    fn unknown_bytes_yield_none() {
        assert_eq!(detect_content_type(&[0x00, 0x01, 0x02, 0x03]), None);
        assert_eq!(detect_content_type(&[]), None);
    }
}
