//! Fighter records as stored by the bookie tools. Field names follow the stored JSON
//! (`ID`, `Name`, `Team`, `IsCustom`, `Strength`, ...). Reading is lenient: every numeric
//! field is coerced to a finite number or 0, never rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four rated stats, in the order they are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Speed,
    Endurance,
    Technique,
}

impl Stat {
    pub const ALL: [Stat; 4] = [Stat::Strength, Stat::Speed, Stat::Endurance, Stat::Technique];

    pub const fn index(self) -> usize {
        match self {
            Self::Strength => 0,
            Self::Speed => 1,
            Self::Endurance => 2,
            Self::Technique => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Speed => "speed",
            Self::Endurance => "endurance",
            Self::Technique => "technique",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Fighter {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "IsCustom")]
    pub is_custom: bool,
    #[serde(rename = "Strength")]
    pub strength: f64,
    #[serde(rename = "Speed")]
    pub speed: f64,
    #[serde(rename = "Endurance")]
    pub endurance: f64,
    #[serde(rename = "Technique")]
    pub technique: f64,
    #[serde(rename = "Wins")]
    pub wins: f64,
    #[serde(rename = "Losses")]
    pub losses: f64,
    #[serde(rename = "Draws")]
    pub draws: f64,
}

impl Fighter {
    /// Builds a free-agent fighter with the given stats and an empty record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, stats: [f64; 4]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team: String::new(),
            is_custom: false,
            strength: stats[0],
            speed: stats[1],
            endurance: stats[2],
            technique: stats[3],
            wins: 0.0,
            losses: 0.0,
            draws: 0.0,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    pub fn with_record(mut self, wins: f64, losses: f64, draws: f64) -> Self {
        self.wins = wins;
        self.losses = losses;
        self.draws = draws;
        self
    }

    pub fn stat(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Speed => self.speed,
            Stat::Endurance => self.endurance,
            Stat::Technique => self.technique,
        }
    }

    pub fn stat_total(&self) -> f64 {
        Stat::ALL.iter().map(|stat| self.stat(*stat)).sum()
    }

    /// Name for display; falls back to `#<id>` when the record has no name.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("#{}", self.id)
        } else {
            self.name.clone()
        }
    }
}

impl TryFrom<Value> for Fighter {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        fighter_from_value(&value).ok_or_else(|| "fighter record must be a JSON object".to_string())
    }
}

/// Coerce a JSON value to a number the way a browser `Number(v)` would, with non-finite
/// results replaced by 0. Strings accept decimal, exponent and `0x`/`0o`/`0b` forms; a
/// one-element array coerces its element.
pub fn safe_num(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_numeric_text(s),
        Some(Value::Bool(true)) => 1.0,
        Some(Value::Array(items)) => match items.as_slice() {
            [] => 0.0,
            [Value::Bool(_)] => 0.0,
            [single] => safe_num(Some(single)),
            _ => 0.0,
        },
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

fn parse_numeric_text(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    match radix {
        Some(radix) => u64::from_str_radix(&trimmed[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(0.0),
        None => trimmed.parse::<f64>().unwrap_or(0.0),
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |v| v != 0.0 && !v.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Falsy affiliations (`false`, `0`, `null`, `""`) mean no team.
fn affiliation(value: Option<&Value>) -> String {
    if truthy(value) {
        text(value)
    } else {
        String::new()
    }
}

/// Reads one stored fighter record. Returns None only when the value is not an object.
pub fn fighter_from_value(value: &Value) -> Option<Fighter> {
    let record = value.as_object()?;
    Some(Fighter {
        id: text(record.get("ID")),
        name: text(record.get("Name")),
        team: affiliation(record.get("Team")),
        is_custom: truthy(record.get("IsCustom")),
        strength: safe_num(record.get("Strength")),
        speed: safe_num(record.get("Speed")),
        endurance: safe_num(record.get("Endurance")),
        technique: safe_num(record.get("Technique")),
        wins: safe_num(record.get("Wins")),
        losses: safe_num(record.get("Losses")),
        draws: safe_num(record.get("Draws")),
    })
}

/// Reads a stored fighter collection. Anything other than an array is an empty collection;
/// elements that are not objects are skipped.
pub fn fighters_from_value(value: &Value) -> Vec<Fighter> {
    match value.as_array() {
        Some(items) => items.iter().filter_map(fighter_from_value).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lenient_record_coerces_numbers_and_ids() {
        let value = json!({
            "ID": 7,
            "Name": "Crusher",
            "Team": " Free Agents ",
            "Strength": "81",
            "Speed": null,
            "Endurance": "n/a",
            "Technique": 40.5,
            "Wins": true,
        });
        let fighter = fighter_from_value(&value).expect("object should parse");
        assert_eq!(fighter.id, "7");
        assert_eq!(fighter.strength, 81.0);
        assert_eq!(fighter.speed, 0.0);
        assert_eq!(fighter.endurance, 0.0);
        assert_eq!(fighter.technique, 40.5);
        assert_eq!(fighter.wins, 1.0);
        assert_eq!(fighter.losses, 0.0);
        assert!(!fighter.is_custom);
        assert_eq!(fighter.team, " Free Agents ");
    }

    #[test]
    fn is_custom_follows_truthiness() {
        assert!(truthy(Some(&json!("yes"))));
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(None));
    }

    #[test]
    fn numeric_text_and_single_element_arrays_coerce_like_number() {
        assert_eq!(safe_num(Some(&json!("0x1A"))), 26.0);
        assert_eq!(safe_num(Some(&json!("0b101"))), 5.0);
        assert_eq!(safe_num(Some(&json!(" 1e2 "))), 100.0);
        assert_eq!(safe_num(Some(&json!([7]))), 7.0);
        assert_eq!(safe_num(Some(&json!(["12"]))), 12.0);
        assert_eq!(safe_num(Some(&json!([1, 2]))), 0.0);
        assert_eq!(safe_num(Some(&json!([true]))), 0.0);
        assert_eq!(safe_num(Some(&json!("0x"))), 0.0);
        assert_eq!(safe_num(Some(&json!("Infinity"))), 0.0);
    }

    #[test]
    fn falsy_team_values_mean_no_team() {
        for team in [json!(false), json!(0), json!(null), json!("")] {
            let fighter = fighter_from_value(&json!({"ID": 1, "Team": team})).expect("object");
            assert_eq!(fighter.team, "", "team {team} should read as empty");
        }
        let numbered = fighter_from_value(&json!({"ID": 2, "Team": 12})).expect("object");
        assert_eq!(numbered.team, "12");
    }

    #[test]
    fn non_array_collection_is_empty() {
        assert!(fighters_from_value(&json!({"ID": 1})).is_empty());
        assert!(fighters_from_value(&Value::Null).is_empty());
        let mixed = json!([{"ID": 1, "Name": "A"}, 5, "x", {"ID": 2}]);
        assert_eq!(fighters_from_value(&mixed).len(), 2);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let fighter = Fighter::new("42", "", [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(fighter.display_name(), "#42");
    }

    #[test]
    fn serde_round_trip_uses_stored_field_names() {
        let fighter = Fighter::new("1", "A", [80.0, 50.0, 50.0, 50.0]).with_team("Hawks");
        let raw = serde_json::to_value(&fighter).expect("fighter should serialize");
        assert_eq!(raw["ID"], "1");
        assert_eq!(raw["Strength"], 80.0);
        let back: Fighter = serde_json::from_value(raw).expect("fighter should deserialize");
        assert_eq!(back, fighter);
    }
}
