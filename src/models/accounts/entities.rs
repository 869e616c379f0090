use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 账号角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "account.ts")]
pub enum AccountRole {
    Student,
    Teacher,
    Assistant,
    Administrator,
}

impl AccountRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";
    pub const ASSISTANT: &'static str = "assistant";
    pub const ADMINISTRATOR: &'static str = "administrator";

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Student => Self::STUDENT,
            AccountRole::Teacher => Self::TEACHER,
            AccountRole::Assistant => Self::ASSISTANT,
            AccountRole::Administrator => Self::ADMINISTRATOR,
        }
    }

    /// 教师与助教，可以以教职人员身份参与课程
    pub fn is_staff(&self) -> bool {
        matches!(self, AccountRole::Teacher | AccountRole::Assistant)
    }

    pub fn teacher_roles() -> &'static [&'static AccountRole] {
        &[&Self::Teacher, &Self::Administrator]
    }
}

impl<'de> Deserialize<'de> for AccountRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<AccountRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "Invalid role: '{s}'. Expected one of: student, teacher, assistant, administrator"
            ))
        })
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AccountRole::STUDENT => Ok(AccountRole::Student),
            AccountRole::TEACHER => Ok(AccountRole::Teacher),
            AccountRole::ASSISTANT => Ok(AccountRole::Assistant),
            AccountRole::ADMINISTRATOR => Ok(AccountRole::Administrator),
            _ => Err(format!("Invalid account role: {s}")),
        }
    }
}

// 登录账号
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub role: AccountRole,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 角色资料（students / teachers / assistants 中的一行）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct Person {
    pub id: i64,
    pub account_id: i64,
    pub role: AccountRole,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

// 账号及其角色资料
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "account.ts")]
pub struct AccountWithProfile {
    pub account: Account,
    pub profile: Option<Person>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        for role in [
            AccountRole::Student,
            AccountRole::Teacher,
            AccountRole::Assistant,
            AccountRole::Administrator,
        ] {
            assert_eq!(role.to_string().parse::<AccountRole>(), Ok(role));
        }
        assert!("admin".parse::<AccountRole>().is_err());
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        assert_eq!(
            serde_json::from_str::<AccountRole>("\"assistant\"").ok(),
            Some(AccountRole::Assistant)
        );
        assert!(serde_json::from_str::<AccountRole>("\"root\"").is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let account = Account {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: AccountRole::Student,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&account).expect("serialize");
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"student\""));
    }
}
