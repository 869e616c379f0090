//! 上传文件内容校验

/// 魔术字节检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicCheck {
    /// 文件头与扩展名一致
    Matched,
    /// 文件头与扩展名不符
    Mismatched,
    /// 纯文本等没有固定文件头的格式
    Unchecked,
}

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];

/// 是否为图片扩展名（课程封面与头像只允许图片）
pub fn is_image_extension(extension: &str) -> bool {
    let ext = extension.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// 按扩展名检查文件头
///
/// `extension` 包含点号，如 `.png`。未知扩展名视为不符。
pub fn check_magic_bytes(data: &[u8], extension: &str) -> MagicCheck {
    if data.is_empty() {
        return MagicCheck::Mismatched;
    }

    let matched = match extension.to_ascii_lowercase().as_str() {
        ".png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        ".jpg" | ".jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        ".gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        ".webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        ".pdf" => data.starts_with(b"%PDF"),
        // OLE 复合文档
        ".doc" | ".xls" | ".ppt" => {
            data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        }
        // OOXML 与 zip 共用文件头
        ".docx" | ".xlsx" | ".pptx" | ".zip" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        ".rar" => data.starts_with(b"Rar!"),
        ".7z" => data.starts_with(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]),
        ".txt" | ".md" | ".csv" | ".json" => return MagicCheck::Unchecked,
        _ => false,
    };

    if matched {
        MagicCheck::Matched
    } else {
        MagicCheck::Mismatched
    }
}

/// 校验上传内容
///
/// 图片必须命中文件头；其他文件只拒绝文件头明确不符的情况。
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    match check_magic_bytes(data, extension) {
        MagicCheck::Matched => true,
        MagicCheck::Unchecked => !is_image_extension(extension) && !data.is_empty(),
        MagicCheck::Mismatched => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_image_headers() {
        assert_eq!(check_magic_bytes(&PNG_HEADER, ".PNG"), MagicCheck::Matched);
        assert_eq!(check_magic_bytes(&PNG_HEADER, ".jpg"), MagicCheck::Mismatched);
        assert!(validate_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0], ".jpeg"));
        assert!(!validate_magic_bytes(b"not really a gif", ".gif"));
    }

    #[test]
    fn test_documents() {
        assert!(validate_magic_bytes(b"%PDF-1.7", ".pdf"));
        assert!(!validate_magic_bytes(b"%PDF-1.7", ".docx"));
        assert!(validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14], ".pptx"));
    }

    #[test]
    fn test_text_is_unchecked() {
        assert_eq!(check_magic_bytes(b"# notes", ".md"), MagicCheck::Unchecked);
        assert!(validate_magic_bytes(b"a,b,c", ".csv"));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(!validate_magic_bytes(&[], ".png"));
        assert!(!validate_magic_bytes(&[], ".txt"));
        assert!(!validate_magic_bytes(&[0x4D, 0x5A], ".exe"));
    }

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension(".WEBP"));
        assert!(!is_image_extension(".pdf"));
    }
}
