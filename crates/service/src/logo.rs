//! Content-type sniffing for uploaded project logos. Raster formats are
//! detected from magic bytes via the `image` crate; SVG needs its own check
//! since it is plain text.

use image::ImageFormat;

pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    if data.is_empty() {
        return None;
    }
    if looks_like_svg(data) {
        return Some("image/svg+xml");
    }

    match image::guess_format(data).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Ico => Some("image/x-icon"),
        _ => None,
    }
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let trimmed = text.trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && text.contains("<svg"))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_png_magic_bytes() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0];
        assert_eq!(sniff_content_type(&png), Some("image/png"));
    }

    #[test]
    fn detects_svg_with_and_without_xml_prolog() {
        assert_eq!(
            sniff_content_type(b"<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>"),
            Some("image/svg+xml")
        );
        assert_eq!(
            sniff_content_type(b"<?xml version=\"1.0\"?>\n<svg></svg>"),
            Some("image/svg+xml")
        );
    }

    #[test]
    fn rejects_non_image_payloads() {
        assert_eq!(sniff_content_type(b""), None);
        assert_eq!(sniff_content_type(b"hello world"), None);
        assert_eq!(sniff_content_type(b"<html><body></body></html>"), None);
    }
}
