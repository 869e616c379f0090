//! 会话令牌与 Cookie
//!
//! `session` Cookie 保存 HS256 签名的令牌，解码后即可得到账号角色；
//! `selectedCourseId` / `selectedAssignmentId` 为短期的选择 Cookie。

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::AppConfig;
use crate::errors::{LmsError, Result};
use crate::models::accounts::AccountRole;
use crate::models::auth::Session;

pub const SESSION_COOKIE: &str = "session";
pub const SELECTED_COURSE_COOKIE: &str = "selectedCourseId";
pub const SELECTED_ASSIGNMENT_COOKIE: &str = "selectedAssignmentId";

static SESSION_CODEC: OnceLock<SessionCodec> = OnceLock::new();

/// 令牌载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub account_id: i64,
    pub role: AccountRole,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_course_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Session {
            account_id: claims.account_id,
            username: claims.username,
            role: claims.role,
            selected_course_id: claims.selected_course_id,
        }
    }
}

pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_age_days: i64,
    selection_minutes: i64,
    secure: bool,
}

impl SessionCodec {
    pub fn new(secret: &str, max_age_days: i64, selection_minutes: i64, secure: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            max_age_days,
            selection_minutes,
            secure,
        }
    }

    /// 全局实例，密钥等参数来自配置
    pub fn global() -> &'static SessionCodec {
        SESSION_CODEC.get_or_init(|| {
            let config = AppConfig::get();
            Self::new(
                &config.session.secret,
                config.session.max_age_days,
                config.session.selection_minutes,
                config.session.secure,
            )
        })
    }

    pub fn encode(&self, session: &Session) -> Result<String> {
        let now = chrono::Utc::now();
        let claims = SessionClaims {
            account_id: session.account_id,
            role: session.role,
            username: session.username.clone(),
            selected_course_id: session.selected_course_id,
            exp: (now + chrono::Duration::days(self.max_age_days)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| LmsError::serialization(format!("Failed to sign session: {e}")))
    }

    pub fn decode(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| LmsError::authentication(format!("Invalid session token: {e}")))
    }

    /// 签发令牌并生成 `session` Cookie
    pub fn session_cookie(&self, session: &Session) -> Result<Cookie<'static>> {
        let token = self.encode(session)?;
        Ok(Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .max_age(CookieDuration::days(self.max_age_days))
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure)
            .finish())
    }

    pub fn selection_cookie(&self, name: &'static str, id: i64) -> Cookie<'static> {
        Cookie::build(name, id.to_string())
            .path("/")
            .max_age(CookieDuration::minutes(self.selection_minutes))
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure)
            .finish()
    }

    /// 立即过期的同名 Cookie，用于注销或清除选择
    pub fn expired_cookie(&self, name: &'static str) -> Cookie<'static> {
        Cookie::build(name, "")
            .path("/")
            .max_age(CookieDuration::ZERO)
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SessionCodec {
        SessionCodec::new("test-secret-for-session-codec", 7, 60, false)
    }

    fn teacher_session() -> Session {
        Session {
            account_id: 7,
            username: "mrs.smith".into(),
            role: AccountRole::Teacher,
            selected_course_id: Some(3),
        }
    }

    #[test]
    fn test_decoded_token_carries_role() {
        let codec = codec();
        let token = codec.encode(&teacher_session()).expect("encode");
        let claims = codec.decode(&token).expect("decode");
        assert_eq!(claims.role, AccountRole::Teacher);
        assert_eq!(Session::from(claims), teacher_session());
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = SessionCodec::new("another-secret", 7, 60, false)
            .encode(&teacher_session())
            .expect("encode");
        let err = codec().decode(&token).expect_err("must reject");
        assert!(matches!(err, LmsError::Authentication(_)));
    }

    #[test]
    fn test_rejects_expired_token() {
        let expired = SessionCodec::new("test-secret-for-session-codec", -1, 60, false);
        let token = expired.encode(&teacher_session()).expect("encode");
        assert!(codec().decode(&token).is_err());
    }

    #[test]
    fn test_cookie_attributes() {
        let codec = codec();
        let cookie = codec.session_cookie(&teacher_session()).expect("cookie");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));

        let selection = codec.selection_cookie(SELECTED_COURSE_COOKIE, 12);
        assert_eq!(selection.value(), "12");
        assert_eq!(selection.max_age(), Some(CookieDuration::minutes(60)));

        let cleared = codec.expired_cookie(SESSION_COOKIE);
        assert_eq!(cleared.max_age(), Some(CookieDuration::ZERO));
    }
}
