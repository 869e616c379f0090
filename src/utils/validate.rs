//! 账号输入校验

use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

const WEAK_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "admin123",
    "abcd1234",
    "letmein1",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if !(3..=32).contains(&username.len()) {
        return Err("Username length must be between 3 and 32 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username may only contain letters, digits, '.', '_' or '-'");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 姓名允许为空，但不能超过 64 个字符
pub fn validate_person_name(name: &str) -> Result<(), &'static str> {
    if name.chars().count() > 64 {
        return Err("Name must be at most 64 characters");
    }
    if name.chars().any(char::is_control) {
        return Err("Name must not contain control characters");
    }
    Ok(())
}

/// 课程名、作业标题、资料标题等必填标题
pub fn validate_title(title: &str) -> Result<(), &'static str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err("Title must not be empty");
    }
    if trimmed.chars().count() > 200 {
        return Err("Title must be at most 200 characters");
    }
    Ok(())
}

/// 密码策略：至少 8 位，同时包含大小写字母和数字，且不是常见弱密码
///
/// 返回所有未满足的规则，便于一次性提示。
pub fn password_violations(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();

    if password.len() < 8 {
        violations.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        violations.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        violations.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain at least one digit");
    }
    if WEAK_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        violations.push("Password is too common, please choose a stronger password");
    }

    violations
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let violations = password_violations(password);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("j.doe-2").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("teacher@school.edu").is_ok());
        assert!(validate_email("no-at-sign.example.com").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_person_name_and_title() {
        assert!(validate_person_name("").is_ok());
        assert!(validate_person_name("李雷").is_ok());
        assert!(validate_person_name("bad\u{0007}name").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Rust 101").is_ok());
    }

    #[test]
    fn test_strong_password() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("MyP@ssw0rd").is_ok());
    }

    #[test]
    fn test_password_collects_every_violation() {
        let violations = password_violations("abc");
        assert!(violations.contains(&"Password must be at least 8 characters long"));
        assert!(violations.contains(&"Password must contain at least one uppercase letter"));
        assert!(violations.contains(&"Password must contain at least one digit"));
        assert!(!violations.contains(&"Password must contain at least one lowercase letter"));
    }

    #[test]
    fn test_common_password_rejected() {
        let err = validate_password("Password1").expect_err("common password");
        assert!(err.contains("too common"));
    }
}
