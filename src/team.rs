use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use crate::classify::classify;
use crate::error::Result;
use crate::models::{Alert, BucketCounts, MemberReadiness, RollupMember, TeamRollup};

/// Buckets every member and orders them for display: most alerts first,
/// then lowest score, then subject id.
pub fn rollup(members: &[MemberReadiness]) -> Result<TeamRollup> {
    let mut counts = BucketCounts::default();
    let mut rolled = Vec::with_capacity(members.len());

    for member in members {
        let bucket = classify(member.readiness.score)?;
        counts.record(bucket);
        rolled.push(RollupMember {
            member: member.clone(),
            bucket,
        });
    }

    rolled.sort_by(|a, b| display_order(&a.member, &b.member));
    debug!(
        members = rolled.len(),
        optimal = counts.optimal,
        caution = counts.caution,
        critical = counts.critical,
        "team rollup computed"
    );

    Ok(TeamRollup {
        counts,
        members: rolled,
    })
}

/// Replaces roster alert counts with counts from a derived feed for every
/// subject the feed covers.
pub fn with_alert_counts(
    members: &[MemberReadiness],
    feed: &BTreeMap<String, Vec<Alert>>,
) -> Vec<MemberReadiness> {
    members
        .iter()
        .map(|member| {
            let mut member = member.clone();
            if let Some(alerts) = feed.get(member.subject_id()) {
                member.alert_count = alerts.len();
            }
            member
        })
        .collect()
}

fn display_order(a: &MemberReadiness, b: &MemberReadiness) -> Ordering {
    b.alert_count
        .cmp(&a.alert_count)
        .then_with(|| a.readiness.score.total_cmp(&b.readiness.score))
        .then_with(|| a.subject_id().cmp(b.subject_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadinessError;
    use crate::models::{ReadinessScore, StatusBucket};
    use chrono::NaiveDate;

    fn member(id: &str, score: f64, alert_count: usize) -> MemberReadiness {
        MemberReadiness {
            readiness: ReadinessScore {
                subject_id: id.to_string(),
                score,
                computed_at: NaiveDate::from_ymd_opt(2024, 6, 20)
                    .and_then(|d| d.and_hms_opt(9, 0, 0))
                    .unwrap(),
            },
            name: None,
            rank: None,
            alert_count,
        }
    }

    fn order(rollup: &TeamRollup) -> Vec<&str> {
        rollup.members.iter().map(|m| m.member.subject_id()).collect()
    }

    #[test]
    fn one_member_per_bucket() {
        let rollup = rollup(&[member("a", 85.0, 0), member("b", 72.0, 0), member("c", 45.0, 0)]).unwrap();
        assert_eq!(
            rollup.counts,
            BucketCounts {
                optimal: 1,
                caution: 1,
                critical: 1
            }
        );
        assert_eq!(rollup.total(), 3);
    }

    #[test]
    fn at_risk_members_surface_first() {
        let rollup = rollup(&[
            member("alpha", 90.0, 0),
            member("bravo", 65.0, 1),
            member("charlie", 55.0, 3),
            member("delta", 50.0, 1),
        ])
        .unwrap();
        assert_eq!(order(&rollup), vec!["charlie", "delta", "bravo", "alpha"]);
    }

    #[test]
    fn ties_break_on_subject_id() {
        let rollup = rollup(&[member("zulu", 70.0, 2), member("echo", 70.0, 2)]).unwrap();
        assert_eq!(order(&rollup), vec!["echo", "zulu"]);
        assert_eq!(rollup.counts.caution, 2);
    }

    #[test]
    fn bucket_filter_keeps_display_order() {
        let rollup = rollup(&[
            member("a", 45.0, 0),
            member("b", 30.0, 0),
            member("c", 95.0, 4),
        ])
        .unwrap();
        let critical: Vec<&str> = rollup
            .members_in(StatusBucket::Critical)
            .map(|m| m.member.subject_id())
            .collect();
        assert_eq!(critical, vec!["b", "a"]);
    }

    #[test]
    fn invalid_score_fails_the_rollup() {
        let result = rollup(&[member("a", 85.0, 0), member("b", 120.0, 0)]);
        assert!(matches!(result, Err(ReadinessError::InvalidInput { .. })));
    }

    #[test]
    fn derived_counts_override_roster_counts() {
        let members = [member("a", 85.0, 5), member("b", 70.0, 2)];
        let mut feed = BTreeMap::new();
        feed.insert("a".to_string(), Vec::new());
        let updated = with_alert_counts(&members, &feed);
        assert_eq!(updated[0].alert_count, 0);
        assert_eq!(updated[1].alert_count, 2);
    }

    #[test]
    fn empty_team_is_empty_rollup() {
        let rollup = rollup(&[]).unwrap();
        assert_eq!(rollup.total(), 0);
        assert!(rollup.members.is_empty());
    }
}
