/// 验证文件内容的魔术字节是否与扩展名匹配
///
/// # Arguments
/// * `data` - 文件内容的前几个字节
/// * `extension` - 文件扩展名（包含点号，如 ".png"）
///
/// # Returns
/// * `true` - 魔术字节匹配
/// * `false` - 魔术字节不匹配，或扩展名不在可识别范围内
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        // 图片
        ".png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        ".jpg" | ".jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        ".gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),

        // 文档
        ".pdf" => data.starts_with(b"%PDF"),
        ".doc" | ".ppt" => {
            // OLE Compound Document
            data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        }
        ".docx" | ".pptx" => {
            // OOXML (ZIP)
            data.starts_with(&[0x50, 0x4B, 0x03, 0x04])
        }

        // 视频
        ".mp4" => data.len() >= 8 && &data[4..8] == b"ftyp",
        ".mov" => {
            // QuickTime 的第一个 atom 不一定是 ftyp
            data.len() >= 8
                && matches!(&data[4..8], b"ftyp" | b"moov" | b"mdat" | b"wide" | b"free")
        }
        ".avi" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"AVI ",

        _ => false,
    }
}

/// 根据扩展名推断 MIME 类型（客户端未提供 Content-Type 时使用）
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".mp4" => "video/mp4",
        ".mov" => "video/quicktime",
        ".avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_magic() {
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(validate_magic_bytes(&png_header, ".png"));
        assert!(validate_magic_bytes(&png_header, ".PNG"));
        assert!(!validate_magic_bytes(&png_header, ".jpg"));
    }

    #[test]
    fn test_pdf_magic() {
        let pdf_header = b"%PDF-1.4";
        assert!(validate_magic_bytes(pdf_header, ".pdf"));
        assert!(!validate_magic_bytes(pdf_header, ".doc"));
    }

    #[test]
    fn test_office_magic() {
        let ooxml = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(&ooxml, ".pptx"));
        assert!(validate_magic_bytes(&ooxml, ".docx"));
        assert!(!validate_magic_bytes(&ooxml, ".ppt"));
    }

    #[test]
    fn test_video_magic() {
        let mp4 = b"\x00\x00\x00\x20ftypisom";
        assert!(validate_magic_bytes(mp4, ".mp4"));
        assert!(validate_magic_bytes(mp4, ".mov"));

        let mov = b"\x00\x00\x00\x08wide\x00\x00";
        assert!(validate_magic_bytes(mov, ".mov"));
        assert!(!validate_magic_bytes(mov, ".mp4"));

        let avi = b"RIFF\x24\x00\x00\x00AVI LIST";
        assert!(validate_magic_bytes(avi, ".avi"));
        assert!(!validate_magic_bytes(b"RIFF\x24\x00\x00\x00WEBPVP8 ", ".avi"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".png"));
        assert!(!validate_magic_bytes(b"MZ\x90\x00", ".exe"));
        assert!(!validate_magic_bytes(b"hello", ".txt"));
    }

    #[test]
    fn test_mime_lookup() {
        assert_eq!(mime_for_extension(".MOV"), "video/quicktime");
        assert_eq!(mime_for_extension(".bin"), "application/octet-stream");
    }
}
