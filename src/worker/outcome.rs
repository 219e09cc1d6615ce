//! Pure state/alert decisions folded out of the outcome-processing path so
//! they can be tested without a store or dispatcher.

use crate::models::{CheckOutcome, CheckRecord, CheckState};

/// Computes the new state for a check and whether the transition warrants an
/// alert.
///
/// A check is up iff the probe produced a response whose status is in the
/// record's success set. An alert is warranted only when the check has been
/// evaluated before (`last_checked` set) and the state actually changed;
/// a first evaluation never alerts, whatever it finds.
pub fn evaluate(record: &CheckRecord, outcome: &CheckOutcome) -> (CheckState, bool) {
    let new_state = match outcome {
        CheckOutcome::Response(code) if record.success_codes.contains(code) => CheckState::Up,
        _ => CheckState::Down,
    };
    let alert_warranted = record.last_checked.is_some() && record.state != new_state;
    (new_state, alert_warranted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, ProbeFailure, Protocol};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    fn record(state: CheckState, checked_before: bool) -> CheckRecord {
        CheckRecord {
            id: "abcdefghij0123456789".to_string(),
            user_ref: "5551234567".to_string(),
            protocol: Protocol::Http,
            url: "example.com".to_string(),
            method: HttpMethod::Get,
            success_codes: BTreeSet::from([200, 201]),
            timeout_seconds: 3,
            state,
            last_checked: checked_before
                .then(|| Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()),
        }
    }

    #[test]
    fn up_iff_response_code_is_in_success_set() {
        let r = record(CheckState::Down, true);
        assert_eq!(evaluate(&r, &CheckOutcome::Response(200)).0, CheckState::Up);
        assert_eq!(evaluate(&r, &CheckOutcome::Response(201)).0, CheckState::Up);
        assert_eq!(evaluate(&r, &CheckOutcome::Response(500)).0, CheckState::Down);
        assert_eq!(evaluate(&r, &CheckOutcome::Response(301)).0, CheckState::Down);
    }

    #[test]
    fn failures_are_always_down() {
        let r = record(CheckState::Up, true);
        assert_eq!(
            evaluate(&r, &CheckOutcome::Failed(ProbeFailure::Timeout)).0,
            CheckState::Down
        );
        assert_eq!(
            evaluate(
                &r,
                &CheckOutcome::Failed(ProbeFailure::Transport("dns".into()))
            )
            .0,
            CheckState::Down
        );
    }

    #[test]
    fn alert_fires_only_on_a_real_transition() {
        let up = record(CheckState::Up, true);
        assert!(evaluate(&up, &CheckOutcome::Response(500)).1);
        assert!(!evaluate(&up, &CheckOutcome::Response(200)).1);

        let down = record(CheckState::Down, true);
        assert!(evaluate(&down, &CheckOutcome::Response(200)).1);
        assert!(!evaluate(&down, &CheckOutcome::Response(500)).1);
    }

    #[test]
    fn cold_start_never_alerts() {
        let never_checked = record(CheckState::Down, false);
        assert!(!evaluate(&never_checked, &CheckOutcome::Response(200)).1);
        assert!(!evaluate(&never_checked, &CheckOutcome::Response(500)).1);
        assert!(
            !evaluate(
                &never_checked,
                &CheckOutcome::Failed(ProbeFailure::Timeout)
            )
            .1
        );
    }
}
