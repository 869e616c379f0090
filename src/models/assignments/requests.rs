use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

// 选择当前作业
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct SelectAssignmentRequest {
    pub assignment_id: i64,
}

// 更新作业（JSON）
//
// due_date 传空字符串表示清除截止时间。
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// 解析截止时间，支持 RFC 3339、`YYYY-MM-DDTHH:MM`、`YYYY-MM-DD HH:MM:SS` 与 `YYYY-MM-DD`
pub fn parse_due_date(value: &str) -> Result<i64, chrono::ParseError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc).timestamp());
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }
    // 只有日期时截止到当天结束
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
    Ok(date
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_date_formats() {
        assert_eq!(parse_due_date("2025-03-01T10:00:00Z"), Ok(1740823200));
        assert_eq!(parse_due_date("2025-03-01T10:00"), Ok(1740823200));
        assert_eq!(parse_due_date("2025-03-01 10:00:00"), Ok(1740823200));
        assert_eq!(parse_due_date("2025-03-01"), Ok(1740873599));
    }

    #[test]
    fn test_parse_due_date_rejects_garbage() {
        assert!(parse_due_date("next friday").is_err());
    }
}
