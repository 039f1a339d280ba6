/// 验证文件内容的魔术字节是否与声明的 MIME 类型一致
///
/// # Arguments
/// * `data` - 文件内容的前几个字节
/// * `content_type` - 客户端声明的 MIME 类型
///
/// # Returns
/// * `true` - 魔术字节匹配或该类型不需要验证
/// * `false` - 魔术字节不匹配或类型未知
pub fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match content_type.to_ascii_lowercase().as_str() {
        "application/pdf" => data.starts_with(b"%PDF"),
        // MS Word 旧格式 (OLE Compound Document)
        "application/msword" => {
            data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        }
        // docx 与 zip 都是 ZIP 容器
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        | "application/zip" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),

        // 文本格式 - 不检查魔术字节
        "text/plain" | "text/javascript" | "text/html" | "text/css" => true,

        // 未知格式 - 默认拒绝
        _ => false,
    }
}

/// MIME 类型对应的扩展名，用于生成存储文件名
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type.to_ascii_lowercase().as_str() {
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "application/zip" => "zip",
        "text/plain" => "txt",
        "text/javascript" => "js",
        "text/html" => "html",
        "text/css" => "css",
        _ => "bin",
    }
}
