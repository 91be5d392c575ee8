use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub default_rating: f64,
    pub default_rd: f64,
    pub default_volatility: f64,
    /// Glicko-2 system constant constraining volatility change
    pub tau: f64,
    pub convergence_tolerance: f64,
    pub max_iterations: usize,
    pub min_rd: f64,
    pub max_rd: Option<f64>,
    pub min_volatility: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            default_rating: 1500.0,
            default_rd: 350.0,
            default_volatility: 0.06,
            tau: 0.5,
            convergence_tolerance: 1e-6,
            max_iterations: 100,
            min_rd: 1.0,
            max_rd: Some(350.0),
            min_volatility: 1e-6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterSettings {
    pub min_game_duration_seconds: f64,
    /// Whether quit-ended matches count towards ratings
    pub allow_exit: bool,
    pub frames_per_second: f64,
    /// Inclusive window of match timestamps considered at all
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_game_duration_seconds: 30.0,
            allow_exit: false,
            frames_per_second: 60.0,
            date_range: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerIdentity {
    pub code: String,
    pub port: i32,
}

impl PlayerIdentity {
    pub fn new(code: &str, port: i32) -> Self {
        Self {
            code: code.to_string(),
            port,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub p1: PlayerIdentity,
    pub p2: PlayerIdentity,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            p1: PlayerIdentity::new("LY＃863", 3),
            p2: PlayerIdentity::new("KEKW＃849", 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupMode {
    Unweighted,
    Weighted,
}

#[derive(Debug, Clone)]
pub struct MatchupSettings {
    pub mode: MatchupMode,
    pub window: usize,
    pub decay: f64,
}

impl Default for MatchupSettings {
    fn default() -> Self {
        Self {
            mode: MatchupMode::Weighted,
            window: 100,
            decay: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistorySettings {
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { capacity: 10 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub filter: FilterSettings,
    pub players: PlayerSettings,
    pub matchups: MatchupSettings,
    pub history: HistorySettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
