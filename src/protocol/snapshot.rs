//! Records the host sends: the one-time game start and per-turn snapshots.

use serde::{Deserialize, Serialize};

/// Errors raised while decoding a protocol payload.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("invalid payload json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sent once when a game begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStart {
    #[serde(rename = "playerIndex")]
    pub player_index: usize,
    #[serde(default)]
    pub usernames: Vec<String>,
}

impl GameStart {
    pub fn from_json(s: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// One turn's update: diffs against the previous map and city arrays plus
/// the visible generals (`-1` when unseen).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: u32,
    #[serde(default)]
    pub map_diff: Vec<i32>,
    #[serde(default)]
    pub cities_diff: Vec<i32>,
    #[serde(default)]
    pub generals: Vec<i64>,
}

impl Snapshot {
    pub fn from_json(s: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Visible generals by player; unseen ones are `None`.
    pub fn general_tiles(&self) -> Vec<Option<usize>> {
        self.generals
            .iter()
            .map(|&g| usize::try_from(g).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_start_ignores_extra_fields() {
        let s = GameStart::from_json(r#"{"playerIndex":1,"usernames":["x","y"],"replay_id":"abc"}"#)
            .unwrap();
        assert_eq!(s.player_index, 1);
        assert_eq!(s.usernames, vec!["x", "y"]);
    }

    #[test]
    fn decode_update() {
        let u = Snapshot::from_json(
            r#"{"turn":4,"map_diff":[0,2,7,8],"cities_diff":[0],"generals":[-1,12]}"#,
        )
        .unwrap();
        assert_eq!(u.turn, 4);
        assert_eq!(u.map_diff, vec![0, 2, 7, 8]);
        assert_eq!(u.general_tiles(), vec![None, Some(12)]);
    }

    #[test]
    fn missing_diffs_default_to_empty() {
        let u = Snapshot::from_json(r#"{"turn":1}"#).unwrap();
        assert!(u.map_diff.is_empty());
        assert!(u.generals.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Snapshot::from_json("{\"turn\":"),
            Err(SnapshotError::Json(_))
        ));
        assert!(GameStart::from_json("{}").is_err());
    }

    #[test]
    fn snapshot_survives_json() {
        let u = Snapshot {
            turn: 9,
            map_diff: vec![1, 1, 5],
            cities_diff: vec![0, 1, 3],
            generals: vec![3, -1],
        };
        let back = Snapshot::from_json(&u.to_json().unwrap()).unwrap();
        assert_eq!(back, u);
    }
}
