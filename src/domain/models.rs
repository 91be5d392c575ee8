use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One of the two tracked human players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    P1,
    P2,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::P1, PlayerSlot::P2];

    pub fn opponent(self) -> Self {
        match self {
            PlayerSlot::P1 => PlayerSlot::P2,
            PlayerSlot::P2 => PlayerSlot::P1,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlayerSlot::P1 => "P1",
            PlayerSlot::P2 => "P2",
        }
    }
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndType {
    Normal,
    Timeout,
    Quit,
}

impl EndType {
    /// Map a replay end-method code (1 = time, 7 = no contest) to an end type.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => EndType::Timeout,
            7 => EndType::Quit,
            _ => EndType::Normal,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            EndType::Normal => 2,
            EndType::Timeout => 1,
            EndType::Quit => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Netplay,
    Local,
}

impl MatchKind {
    pub fn as_str(&self) -> &str {
        match self {
            MatchKind::Netplay => "netplay",
            MatchKind::Local => "local",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "netplay" => Some(MatchKind::Netplay),
            "local" => Some(MatchKind::Local),
            _ => None,
        }
    }
}

/// One side of a match as reported by the replay parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideRecord {
    /// Netplay code, empty for local play
    #[serde(default)]
    pub code: String,
    pub port: i32,
    /// Character-select id, `-1` when unknown
    pub character: i32,
    pub stocks: i32,
    pub won: bool,
}

impl SideRecord {
    fn empty() -> Self {
        Self {
            code: String::new(),
            port: -1,
            character: -1,
            stocks: -1,
            won: false,
        }
    }
}

/// A normalized, completed match. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(alias = "datetime")]
    pub timestamp: DateTime<Utc>,
    pub stage: i32,
    pub p1: SideRecord,
    pub p2: SideRecord,
    pub end_type: EndType,
    /// Port of the side that quit out of the match, if any
    #[serde(default)]
    pub lras_initiator: Option<i32>,
    pub frames: i32,
    #[serde(default)]
    pub ignore: bool,
    #[serde(rename = "type")]
    pub kind: MatchKind,
}

impl MatchRecord {
    /// Sentinel for replays that could not be established as a human-vs-human match.
    pub fn ignored(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            stage: -1,
            p1: SideRecord::empty(),
            p2: SideRecord::empty(),
            end_type: EndType::Normal,
            lras_initiator: None,
            frames: -1,
            ignore: true,
            kind: MatchKind::Local,
        }
    }

    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn duration_seconds(&self, frames_per_second: f64) -> f64 {
        f64::from(self.frames) / frames_per_second
    }

    pub fn is_quit(&self) -> bool {
        self.end_type == EndType::Quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn end_type_codes_follow_replay_end_methods() {
        assert_eq!(EndType::from_code(7), EndType::Quit);
        assert_eq!(EndType::from_code(1), EndType::Timeout);
        assert_eq!(EndType::from_code(2), EndType::Normal);
        assert_eq!(EndType::from_code(EndType::Quit.code()), EndType::Quit);
    }

    #[test]
    fn deserializes_parser_output() {
        let json = r#"{
            "datetime": "2024-12-08T18:01:13Z",
            "stage": 31,
            "p1": {"code": "LY#863", "port": 3, "character": 2, "stocks": 1, "won": true},
            "p2": {"code": "KEKW#849", "port": 2, "character": 20, "stocks": 0, "won": false},
            "end_type": "normal",
            "lras_initiator": null,
            "frames": 7200,
            "type": "netplay"
        }"#;

        let record: MatchRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.timestamp, Utc.with_ymd_and_hms(2024, 12, 8, 18, 1, 13).unwrap());
        assert_eq!(record.kind, MatchKind::Netplay);
        assert!(!record.ignore);
        assert_eq!(record.duration_seconds(60.0), 120.0);
    }

    #[test]
    fn ignored_sentinel_is_flagged() {
        let record = MatchRecord::ignored(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(record.ignore);
        assert_eq!(record.p1.character, -1);
    }
}
