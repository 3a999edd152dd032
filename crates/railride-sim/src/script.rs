//! Scripted rider input.
//!
//! Each entry is `ACTION@SECONDS`, where `ACTION` is `left`, `right` or
//! `cancel`, e.g. `left@2.0` or `cancel@2.4`.

use std::{fmt, str::FromStr};

use railride::Direction;

/// What the scripted rider does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    Select(Direction),
    Cancel,
}

/// One timed input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedInput {
    pub at: f64,
    pub action: ScriptAction,
}

impl FromStr for ScriptedInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((action, at)) = s.split_once('@') else {
            return Err(format!("expected ACTION@SECONDS, got '{s}'"));
        };

        let at = at
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid time in '{s}': {e}"))?;
        if !at.is_finite() || at < 0.0 {
            return Err(format!("time must be non-negative in '{s}'"));
        }

        let action = if action.trim().eq_ignore_ascii_case("cancel") {
            ScriptAction::Cancel
        } else {
            ScriptAction::Select(action.parse()?)
        };

        Ok(Self { at, action })
    }
}

impl fmt::Display for ScriptedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            ScriptAction::Select(direction) => write!(f, "{direction}@{}", self.at),
            ScriptAction::Cancel => write!(f, "cancel@{}", self.at),
        }
    }
}

/// Inputs in time order, consumed as the simulation clock passes them.
#[derive(Debug, Default)]
pub struct Script {
    inputs: Vec<ScriptedInput>,
    next: usize,
}

impl Script {
    #[must_use]
    pub fn new(mut inputs: Vec<ScriptedInput>) -> Self {
        inputs.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { inputs, next: 0 }
    }

    /// Inputs due at or before `now` that have not been returned yet.
    pub fn due(&mut self, now: f64) -> &[ScriptedInput] {
        let start = self.next;
        while self.next < self.inputs.len() && self.inputs[self.next].at <= now {
            self.next += 1;
        }
        &self.inputs[start..self.next]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inputs() {
        assert_eq!(
            "left@2.5".parse::<ScriptedInput>(),
            Ok(ScriptedInput {
                at: 2.5,
                action: ScriptAction::Select(Direction::Left)
            })
        );
        assert_eq!(
            "Cancel@1".parse::<ScriptedInput>().unwrap().action,
            ScriptAction::Cancel
        );
        assert!("left".parse::<ScriptedInput>().is_err());
        assert!("left@-1".parse::<ScriptedInput>().is_err());
        assert!("up@1".parse::<ScriptedInput>().is_err());
    }

    #[test]
    fn test_due_in_order() {
        let mut script = Script::new(vec![
            "right@3".parse().unwrap(),
            "left@1".parse().unwrap(),
            "cancel@1.5".parse().unwrap(),
        ]);

        assert!(script.due(0.5).is_empty());
        let due: Vec<_> = script.due(2.0).iter().map(ToString::to_string).collect();
        assert_eq!(due, ["left@1", "cancel@1.5"]);
        assert_eq!(script.due(2.0).len(), 0);
        assert_eq!(script.due(10.0).len(), 1);
    }
}
