//! Gesture scripts: what a recognizer would have reported, over time.
//!
//! One line per change of held pose:
//!
//! ```text
//! # seconds  left         right
//! 4.0        Open_Palm    Open_Palm
//! 4.5        Closed_Fist  Closed_Fist
//! 5.0        None         None
//! ```
//!
//! Labels are raw recognizer category strings. A pose stays held until the
//! next line, and the player reports it on every frame like a live camera.

use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub at: Duration,
    pub left: String,
    pub right: String,
}

/// Parse a script. Lines are sorted by time; ties keep file order.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, String> {
    let mut lines = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [secs, left, right] = fields.as_slice() else {
            return Err(format!(
                "line {}: expected '<seconds> <left> <right>', got '{line}'",
                idx + 1
            ));
        };
        let secs: f32 = secs
            .parse()
            .map_err(|_| format!("line {}: invalid time '{secs}'", idx + 1))?;
        let Ok(at) = Duration::try_from_secs_f32(secs) else {
            return Err(format!("line {}: time must be a non-negative number of seconds", idx + 1));
        };

        lines.push(ScriptLine {
            at,
            left: left.to_string(),
            right: right.to_string(),
        });
    }

    lines.sort_by_key(|line| line.at);
    Ok(lines)
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptLine>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read script {}: {e}", path.display()))?;
    parse_script(&text)
}

/// Walks a script forward in time and reports the pose held at each moment.
#[derive(Debug, Clone)]
pub struct ScriptPlayer {
    lines: Vec<ScriptLine>,
    next: usize,
    held: Option<(String, String)>,
}

impl ScriptPlayer {
    pub fn new(lines: Vec<ScriptLine>) -> Self {
        Self {
            lines,
            next: 0,
            held: None,
        }
    }

    /// Pose held at `now`, or `None` before the first line.
    pub fn advance(&mut self, now: Duration) -> Option<(&str, &str)> {
        while let Some(line) = self.lines.get(self.next) {
            if line.at > now {
                break;
            }
            self.held = Some((line.left.clone(), line.right.clone()));
            self.next += 1;
        }
        self.held
            .as_ref()
            .map(|(left, right)| (left.as_str(), right.as_str()))
    }

    /// Time of the last line.
    pub fn end(&self) -> Duration {
        self.lines.last().map_or(Duration::ZERO, |line| line.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_sorts_lines() {
        let script = parse_script(
            "# warmup\n\
             5.0 Victory Victory\n\
             \n\
             4.0 Open_Palm Open_Palm   # first\n",
        )
        .unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[0].at, Duration::from_secs(4));
        assert_eq!(script[0].left, "Open_Palm");
        assert_eq!(script[1].right, "Victory");
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_script("4.0 Open_Palm").unwrap_err().contains("line 1"));
        assert!(parse_script("soon Victory Victory").is_err());
        assert!(parse_script("-1 Victory Victory").is_err());
        assert!(parse_script("1e30 Victory Victory").is_err());
        assert!(parse_script("inf Victory Victory").is_err());
    }

    #[test]
    fn player_holds_pose_until_next_line() {
        let mut player = ScriptPlayer::new(
            parse_script("1.0 Victory Victory\n2.0 None None").unwrap(),
        );
        assert_eq!(player.advance(Duration::from_millis(500)), None);
        assert_eq!(
            player.advance(Duration::from_millis(1500)),
            Some(("Victory", "Victory"))
        );
        assert_eq!(
            player.advance(Duration::from_millis(1900)),
            Some(("Victory", "Victory"))
        );
        assert_eq!(player.advance(Duration::from_secs(3)), Some(("None", "None")));
        assert_eq!(player.end(), Duration::from_secs(2));
    }

    #[test]
    fn bundled_duel_script_parses() {
        let script = parse_script(include_str!("../scripts/duel.txt")).unwrap();
        assert!(script.len() > 10);
        assert!(script.iter().all(|line| line.at >= Duration::from_secs(4)));
    }
}
