//! Versioned save migration.
//!
//! Saves are migrated as raw JSON values, one version step at a time,
//! before the final typed decode. Unknown or corrupt payloads never
//! error; they decode to the default profile so a bad save can not
//! brick the game.
//!
//! # Version history
//!
//! - v2: flat camelCase fields (`highScore`, `totalKills`), skills as a
//!   name-to-level map, no shop state
//! - v3: snake_case, lifetime counters nested under `achievements`,
//!   shop state added
//! - v4 (current): `low_power_mode` nested under `toggles`; shards,
//!   equipment, gems, and loadouts added

use game_core::{SkillId, SkillLevels};
use serde_json::{Value, json};

use super::Profile;

/// Current save format version.
pub const CURRENT_VERSION: u32 = 4;

/// Migrate a raw save payload to the current version and decode it.
///
/// Fields a migration step does not produce keep their defaults at
/// decode time, so steps only rewrite what actually moved.
pub fn migrate(mut value: Value) -> Profile {
    let version = value
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or(2) as u32;

    if version < 3 {
        v2_to_v3(&mut value);
    }
    if version < 4 {
        v3_to_v4(&mut value);
    }
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), json!(CURRENT_VERSION));
    }

    match serde_json::from_value(value) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "save payload rejected, starting fresh profile");
            Profile::default()
        }
    }
}

/// Rename camelCase fields, nest kill counters under `achievements`,
/// and convert the skill name map to the packed level array.
fn v2_to_v3(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };

    for (from, to) in [
        ("highScore", "high_score"),
        ("maxWave", "max_wave"),
        ("tutorialCompleted", "tutorial_completed"),
        ("lowPowerMode", "low_power_mode"),
    ] {
        if let Some(v) = obj.remove(from) {
            obj.insert(to.to_string(), v);
        }
    }

    let total_kills = obj.remove("totalKills").and_then(|v| v.as_u64()).unwrap_or(0);
    let boss_kills = obj.remove("bossKills").and_then(|v| v.as_u64()).unwrap_or(0);
    let highest_wave = obj.get("max_wave").and_then(Value::as_u64).unwrap_or(0);
    obj.insert(
        "achievements".to_string(),
        json!({
            "counters": {
                "total_kills": total_kills,
                "boss_kills": boss_kills,
                "highest_wave": highest_wave,
            },
            "unlocked": [],
        }),
    );

    if let Some(skills) = obj.remove("skills").and_then(|v| v.as_object().cloned()) {
        let mut levels = SkillLevels::new();
        for (name, level) in skills {
            if let (Some(id), Some(level)) = (SkillId::parse(&name), level.as_u64()) {
                levels.set(id, level.min(u8::MAX as u64) as u8);
            }
        }
        if let Ok(v) = serde_json::to_value(levels) {
            obj.insert("skill_state".to_string(), v);
        }
    }
}

/// Move `low_power_mode` under the `toggles` group.
fn v3_to_v4(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };

    let low_power = obj
        .remove("low_power_mode")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    obj.insert("toggles".to_string(), json!({ "low_power_mode": low_power }));
}
