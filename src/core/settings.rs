//! Workspace settings: persisted key/value overrides overlaid onto
//! compiled-in defaults, resolved into a typed snapshot on every read.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkingHours {
    #[schema(example = "09:00")]
    pub start: String,
    #[schema(example = "18:00")]
    pub end: String,
}

/// The resolved snapshot. Unknown persisted keys survive in `extra` so that
/// clients storing their own settings keep seeing them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    #[schema(example = "UTC")]
    pub default_timezone: String,

    /// Check-in grace window in minutes past the working-hours start.
    #[schema(example = 30)]
    pub check_in_window: i64,

    pub working_hours: WorkingHours,

    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        WorkspaceSettings {
            default_timezone: "UTC".to_string(),
            check_in_window: 30,
            working_hours: WorkingHours {
                start: "09:00".to_string(),
                end: "18:00".to_string(),
            },
            extra: BTreeMap::new(),
        }
    }
}

impl WorkspaceSettings {
    /// Overlay persisted rows onto the defaults. Each stored value is
    /// JSON-decoded, falling back to the raw string for values written
    /// before encoding was introduced.
    pub fn overlay(rows: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut settings = WorkspaceSettings::default();
        for (key, raw) in rows {
            let value =
                serde_json::from_str::<Value>(&raw).unwrap_or_else(|_| Value::String(raw));
            match key.as_str() {
                "defaultTimezone" => {
                    if let Value::String(tz) = value {
                        settings.default_timezone = tz;
                    }
                }
                "checkInWindow" => {
                    if let Some(minutes) = value.as_i64() {
                        settings.check_in_window = minutes;
                    }
                }
                "workingHours" => {
                    if let Ok(hours) = serde_json::from_value::<WorkingHours>(value) {
                        settings.working_hours = hours;
                    }
                }
                _ => {
                    settings.extra.insert(key, value);
                }
            }
        }
        settings
    }

    /// Working-hours start as a time of day; malformed overrides fall back
    /// to the default 09:00 rather than failing check-in.
    pub fn working_start(&self) -> NaiveTime {
        NaiveTime::parse_from_str(&self.working_hours.start, "%H:%M")
            .unwrap_or_else(|_| NaiveTime::from_hms_opt(9, 0, 0).unwrap())
    }
}

/// Partial update; only provided keys are touched. Unknown keys are carried
/// through `extra` and upserted verbatim.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[schema(example = "Asia/Dhaka", nullable = true)]
    pub default_timezone: Option<String>,

    #[schema(example = 45, nullable = true)]
    pub check_in_window: Option<i64>,

    pub working_hours: Option<WorkingHours>,

    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: BTreeMap<String, Value>,
}

impl SettingsUpdate {
    /// Key/value pairs to persist: strings stored raw, everything else
    /// JSON-encoded (mirrored by the decode in `overlay`).
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        if let Some(tz) = &self.default_timezone {
            entries.push(("defaultTimezone".to_string(), tz.clone()));
        }
        if let Some(minutes) = self.check_in_window {
            entries.push(("checkInWindow".to_string(), minutes.to_string()));
        }
        if let Some(hours) = &self.working_hours {
            if let Ok(encoded) = serde_json::to_string(hours) {
                entries.push(("workingHours".to_string(), encoded));
            }
        }
        for (key, value) in &self.extra {
            let stored = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            entries.push((key.clone(), stored));
        }
        entries
    }
}

#[derive(sqlx::FromRow)]
struct SettingRow {
    key: String,
    value: String,
}

/// Read all persisted overrides and resolve the snapshot. Deliberately
/// uncached: settings writes must be visible to the next check-in.
pub async fn resolve(pool: &MySqlPool) -> Result<WorkspaceSettings, AppError> {
    let rows = sqlx::query_as::<_, SettingRow>(
        "SELECT `key`, `value` FROM workspace_settings ORDER BY `key`",
    )
    .fetch_all(pool)
    .await?;

    Ok(WorkspaceSettings::overlay(
        rows.into_iter().map(|row| (row.key, row.value)),
    ))
}

/// Upsert each provided key independently, then return the fresh snapshot.
/// Per-key upserts are idempotent; there is no partial-failure rollback.
pub async fn update(
    pool: &MySqlPool,
    update: &SettingsUpdate,
    updated_by: u64,
) -> Result<WorkspaceSettings, AppError> {
    for (key, value) in update.entries() {
        sqlx::query(
            r#"
            INSERT INTO workspace_settings (`key`, `value`, updated_by)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE `value` = VALUES(`value`), updated_by = VALUES(updated_by)
            "#,
        )
        .bind(&key)
        .bind(&value)
        .bind(updated_by)
        .execute(pool)
        .await?;
    }

    resolve(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_persisted() {
        let settings = WorkspaceSettings::overlay(Vec::new());
        assert_eq!(settings.default_timezone, "UTC");
        assert_eq!(settings.check_in_window, 30);
        assert_eq!(settings.working_hours.start, "09:00");
        assert_eq!(settings.working_hours.end, "18:00");
        assert_eq!(
            settings.working_start(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
    }

    #[test]
    fn persisted_overrides_win_and_leave_other_defaults_alone() {
        let settings = WorkspaceSettings::overlay(vec![(
            "checkInWindow".to_string(),
            "45".to_string(),
        )]);
        assert_eq!(settings.check_in_window, 45);
        assert_eq!(settings.default_timezone, "UTC");
        assert_eq!(settings.working_hours.start, "09:00");
    }

    #[test]
    fn working_hours_round_trip_through_json() {
        let update = SettingsUpdate {
            default_timezone: None,
            check_in_window: None,
            working_hours: Some(WorkingHours {
                start: "08:30".to_string(),
                end: "17:30".to_string(),
            }),
            extra: BTreeMap::new(),
        };
        let entries = update.entries();
        assert_eq!(entries.len(), 1);

        let settings = WorkspaceSettings::overlay(entries);
        assert_eq!(settings.working_hours.start, "08:30");
        assert_eq!(
            settings.working_start(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
    }

    #[test]
    fn undecodable_values_fall_back_to_the_raw_string() {
        let settings = WorkspaceSettings::overlay(vec![(
            "announcement".to_string(),
            "not json {".to_string(),
        )]);
        assert_eq!(
            settings.extra.get("announcement"),
            Some(&Value::String("not json {".to_string()))
        );
    }

    #[test]
    fn unknown_update_keys_are_stored_verbatim() {
        let mut extra = BTreeMap::new();
        extra.insert("slackWebhook".to_string(), Value::String("https://hooks.example".into()));
        extra.insert("retentionDays".to_string(), Value::from(90));
        let update = SettingsUpdate {
            default_timezone: Some("Asia/Dhaka".to_string()),
            check_in_window: None,
            working_hours: None,
            extra,
        };

        let mut entries = update.entries();
        entries.sort();
        assert!(entries.contains(&("defaultTimezone".to_string(), "Asia/Dhaka".to_string())));
        assert!(entries.contains(&("retentionDays".to_string(), "90".to_string())));
        assert!(entries.contains(&(
            "slackWebhook".to_string(),
            "https://hooks.example".to_string()
        )));
    }
}
