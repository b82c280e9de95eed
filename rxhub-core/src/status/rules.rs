//! Per-connector status derivation
//!
//! Rules are evaluated in order; the first one that yields a code wins.

use rxhub_protocol::codes::{STATUS_ALERT, STATUS_ALIVE, STATUS_IDLE, STATUS_TRIGGERED};

/// Masks the rules read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusInputs {
    pub alive: u32,
    pub triggered: u32,
    /// One-shot alert mask; `u32::MAX` selects every connector
    pub one_shot: u32,
    pub force_while_triggered: u32,
}

/// What a rule decided for one connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Final status code
    Code(u8),
    /// Rule does not apply
    Skip,
    /// Clear the connector's force bit, then keep evaluating
    ReleaseForce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRule {
    OneShot,
    ForceWhileTriggered,
    Derived,
}

/// Evaluation order
pub const RULES: [StatusRule; 3] = [
    StatusRule::OneShot,
    StatusRule::ForceWhileTriggered,
    StatusRule::Derived,
];

impl StatusRule {
    pub fn apply(self, bit: u32, inputs: &StatusInputs) -> Verdict {
        match self {
            StatusRule::OneShot => {
                if inputs.one_shot == u32::MAX || inputs.one_shot & bit != 0 {
                    Verdict::Code(STATUS_ALERT)
                } else {
                    Verdict::Skip
                }
            }
            StatusRule::ForceWhileTriggered => {
                if inputs.force_while_triggered & bit == 0 {
                    Verdict::Skip
                } else if inputs.triggered & bit != 0 {
                    Verdict::Code(STATUS_ALERT)
                } else {
                    Verdict::ReleaseForce
                }
            }
            StatusRule::Derived => {
                let code = match (inputs.alive & bit != 0, inputs.triggered & bit != 0) {
                    (false, _) => STATUS_IDLE,
                    (true, false) => STATUS_ALIVE,
                    (true, true) => STATUS_TRIGGERED,
                };
                Verdict::Code(code)
            }
        }
    }
}

/// Status code for the connector with mask `bit`
///
/// Force bits released along the way are OR-ed into `released`.
pub fn evaluate(bit: u32, inputs: &StatusInputs, released: &mut u32) -> u8 {
    for rule in RULES {
        match rule.apply(bit, inputs) {
            Verdict::Code(code) => return code,
            Verdict::Skip => {}
            Verdict::ReleaseForce => *released |= bit,
        }
    }
    STATUS_IDLE
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIT: u32 = 1 << 4;

    fn eval(inputs: StatusInputs) -> (u8, u32) {
        let mut released = 0;
        let code = evaluate(BIT, &inputs, &mut released);
        (code, released)
    }

    #[test]
    fn test_derived_codes() {
        assert_eq!(eval(StatusInputs::default()), (STATUS_IDLE, 0));
        assert_eq!(
            eval(StatusInputs { alive: BIT, ..Default::default() }),
            (STATUS_ALIVE, 0)
        );
        assert_eq!(
            eval(StatusInputs { alive: BIT, triggered: BIT, ..Default::default() }),
            (STATUS_TRIGGERED, 0)
        );
    }

    #[test]
    fn test_one_shot_wins() {
        let all = StatusInputs { one_shot: u32::MAX, alive: BIT, ..Default::default() };
        assert_eq!(eval(all), (STATUS_ALERT, 0));

        let other = StatusInputs { one_shot: 1, alive: BIT, ..Default::default() };
        assert_eq!(eval(other), (STATUS_ALIVE, 0));
    }

    #[test]
    fn test_force_held_while_triggered() {
        let inputs = StatusInputs {
            alive: BIT,
            triggered: BIT,
            force_while_triggered: BIT,
            ..Default::default()
        };
        assert_eq!(eval(inputs), (STATUS_ALERT, 0));
    }

    #[test]
    fn test_force_released_when_untriggered() {
        let inputs = StatusInputs {
            alive: BIT,
            force_while_triggered: BIT,
            ..Default::default()
        };
        assert_eq!(eval(inputs), (STATUS_ALIVE, BIT));
    }
}
