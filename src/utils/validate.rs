use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

// 服务端生成的文件名只包含这些字符
static STORED_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("Invalid file name regex"));

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_NAME_LENGTH: usize = 100;

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err("Email must be at most 255 characters");
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

/// 下载时的文件名校验，拒绝路径穿越
pub fn validate_stored_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() || name.len() > 255 {
        return Err("File name length is invalid");
    }
    if name.contains("..") || !STORED_NAME_RE.is_match(name) {
        return Err("File name contains illegal characters");
    }
    Ok(())
}
