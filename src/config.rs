//! Engine tunables.
//!
//! Every knob the decision engine reads lives in `EngineConfig`. Values can
//! come from a JSON file (`from_json_str`) or from `setoption` protocol
//! commands (`set_option`), which use CamelCase option names.

use serde::{Deserialize, Serialize};

/// Errors raised while applying configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{name}' requires a value")]
    MissingValue { name: String },

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Decision engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Last game tick on which armies may be pulled off our general.
    pub pull_from_general_max: u32,
    /// First game tick on which cities count as expansion targets.
    pub attack_cities_min: u32,
    /// Last game tick on which cities are targeted.
    pub attack_cities_max: u32,
    pub use_objectives: bool,
    pub attack_generals: bool,
    pub attack_cities: bool,
    pub attack_enemies: bool,
    pub expand_frontline: bool,
    pub expand_perimeter: bool,
    pub reinforce_general: bool,
    /// Hold back general reinforcement until the first frontline contact.
    /// Off unless asked for.
    pub reinforce_after_contact: bool,
    /// General army count past which reinforcement no longer blocks attacks.
    pub general_min: i32,
    /// Maximum path length Path Search will consider.
    pub path_length_limit: usize,
    /// Hard cap on search expansions per path query.
    pub search_node_budget: usize,
    /// Distance from our general inside which a stronger enemy is a threat.
    pub closeness_limit: f64,
    /// Consecutive unchanged ticks before the queue is flushed.
    pub stuck_threshold: u32,
    /// Updates a failed move may persist while still being retried.
    pub retry_window: u32,
    /// Seed for random fallbacks; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            pull_from_general_max: 50,
            attack_cities_min: 50,
            attack_cities_max: 2000,
            use_objectives: true,
            attack_generals: true,
            attack_cities: true,
            attack_enemies: true,
            expand_frontline: true,
            expand_perimeter: true,
            reinforce_general: true,
            reinforce_after_contact: false,
            general_min: 700,
            path_length_limit: 20,
            search_node_budget: 250_000,
            closeness_limit: 5.0,
            stuck_threshold: 5,
            retry_window: 3,
            seed: None,
        }
    }
}

/// Option names accepted by `set_option`, in handshake order.
pub const OPTION_NAMES: [&str; 18] = [
    "PullFromGeneralMax",
    "AttackCitiesMin",
    "AttackCitiesMax",
    "UseObjectives",
    "AttackGenerals",
    "AttackCities",
    "AttackEnemies",
    "ExpandFrontline",
    "ExpandPerimeter",
    "ReinforceGeneral",
    "ReinforceAfterContact",
    "GeneralMin",
    "PathLengthLimit",
    "SearchNodeBudget",
    "ClosenessLimit",
    "StuckThreshold",
    "RetryWindow",
    "Seed",
];

impl EngineConfig {
    /// Parses a JSON config document; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads a JSON config file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Applies a single `setoption` command.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        match name {
            "PullFromGeneralMax" => self.pull_from_general_max = parse(name, value)?,
            "AttackCitiesMin" => self.attack_cities_min = parse(name, value)?,
            "AttackCitiesMax" => self.attack_cities_max = parse(name, value)?,
            "UseObjectives" => self.use_objectives = parse_bool(name, value)?,
            "AttackGenerals" => self.attack_generals = parse_bool(name, value)?,
            "AttackCities" => self.attack_cities = parse_bool(name, value)?,
            "AttackEnemies" => self.attack_enemies = parse_bool(name, value)?,
            "ExpandFrontline" => self.expand_frontline = parse_bool(name, value)?,
            "ExpandPerimeter" => self.expand_perimeter = parse_bool(name, value)?,
            "ReinforceGeneral" => self.reinforce_general = parse_bool(name, value)?,
            "ReinforceAfterContact" => self.reinforce_after_contact = parse_bool(name, value)?,
            "GeneralMin" => self.general_min = parse(name, value)?,
            "PathLengthLimit" => self.path_length_limit = parse(name, value)?,
            "SearchNodeBudget" => self.search_node_budget = parse(name, value)?,
            "ClosenessLimit" => self.closeness_limit = parse(name, value)?,
            "StuckThreshold" => self.stuck_threshold = parse(name, value)?,
            "RetryWindow" => self.retry_window = parse(name, value)?,
            "Seed" => {
                self.seed = match value {
                    None | Some("") | Some("none") => None,
                    Some(_) => Some(parse(name, value)?),
                }
            }
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    /// Option type and default, formatted for an `option` handshake line.
    pub fn describe_option(&self, name: &str) -> Option<String> {
        let spin = |v: String| Some(format!("type spin default {}", v));
        let check = |v: bool| Some(format!("type check default {}", v));
        match name {
            "PullFromGeneralMax" => spin(self.pull_from_general_max.to_string()),
            "AttackCitiesMin" => spin(self.attack_cities_min.to_string()),
            "AttackCitiesMax" => spin(self.attack_cities_max.to_string()),
            "UseObjectives" => check(self.use_objectives),
            "AttackGenerals" => check(self.attack_generals),
            "AttackCities" => check(self.attack_cities),
            "AttackEnemies" => check(self.attack_enemies),
            "ExpandFrontline" => check(self.expand_frontline),
            "ExpandPerimeter" => check(self.expand_perimeter),
            "ReinforceGeneral" => check(self.reinforce_general),
            "ReinforceAfterContact" => check(self.reinforce_after_contact),
            "GeneralMin" => spin(self.general_min.to_string()),
            "PathLengthLimit" => spin(self.path_length_limit.to_string()),
            "SearchNodeBudget" => spin(self.search_node_budget.to_string()),
            "ClosenessLimit" => Some(format!("type string default {}", self.closeness_limit)),
            "StuckThreshold" => spin(self.stuck_threshold.to_string()),
            "RetryWindow" => spin(self.retry_window.to_string()),
            "Seed" => Some(format!(
                "type string default {}",
                self.seed.map_or_else(|| "none".to_string(), |s| s.to_string())
            )),
            _ => None,
        }
    }
}

fn parse<T: std::str::FromStr>(name: &str, value: Option<&str>) -> Result<T, ConfigError> {
    let v = value.ok_or_else(|| ConfigError::MissingValue {
        name: name.to_string(),
    })?;
    v.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: v.to_string(),
    })
}

fn parse_bool(name: &str, value: Option<&str>) -> Result<bool, ConfigError> {
    match value.map(str::trim) {
        // A bare `setoption name X` toggles the flag on.
        None => Ok(true),
        Some("true") | Some("1") | Some("on") => Ok(true),
        Some("false") | Some("0") | Some("off") => Ok(false),
        Some(v) => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: v.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = EngineConfig::default();
        assert_eq!(c.pull_from_general_max, 50);
        assert_eq!(c.path_length_limit, 20);
        assert_eq!(c.stuck_threshold, 5);
        assert_eq!(c.retry_window, 3);
        assert_eq!(c.general_min, 700);
        assert!(c.reinforce_general);
        assert!(!c.reinforce_after_contact);
        assert!(c.seed.is_none());
    }

    #[test]
    fn set_numeric_and_bool_options() {
        let mut c = EngineConfig::default();
        c.set_option("PathLengthLimit", Some("12")).unwrap();
        c.set_option("UseObjectives", Some("false")).unwrap();
        c.set_option("ClosenessLimit", Some("7.5")).unwrap();
        c.set_option("Seed", Some("42")).unwrap();
        assert_eq!(c.path_length_limit, 12);
        assert!(!c.use_objectives);
        assert_eq!(c.closeness_limit, 7.5);
        assert_eq!(c.seed, Some(42));

        c.set_option("Seed", Some("none")).unwrap();
        assert_eq!(c.seed, None);
    }

    #[test]
    fn bare_flag_turns_option_on() {
        let mut c = EngineConfig::default();
        c.attack_cities = false;
        c.set_option("AttackCities", None).unwrap();
        assert!(c.attack_cities);
    }

    #[test]
    fn rejects_unknown_and_invalid_options() {
        let mut c = EngineConfig::default();
        assert!(matches!(
            c.set_option("Nope", Some("1")),
            Err(ConfigError::UnknownOption(_))
        ));
        assert!(matches!(
            c.set_option("StuckThreshold", Some("many")),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            c.set_option("GeneralMin", None),
            Err(ConfigError::MissingValue { .. })
        ));
        assert_eq!(c, EngineConfig::default());
    }

    #[test]
    fn json_keeps_defaults_for_missing_fields() {
        let c = EngineConfig::from_json_str(r#"{"stuck_threshold": 9, "seed": 3}"#).unwrap();
        assert_eq!(c.stuck_threshold, 9);
        assert_eq!(c.seed, Some(3));
        assert_eq!(c.path_length_limit, 20);
        assert!(EngineConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn every_option_is_described() {
        let c = EngineConfig::default();
        for name in OPTION_NAMES {
            assert!(c.describe_option(name).is_some(), "{} undescribed", name);
        }
    }
}
