//! Pure reductions over LGA summaries. Empty input yields the zero-valued shape.

use super::super::domain::{percent, round1, saturating_total, Party, PartyVotes};
use super::super::incidents::{Incident, IncidentType};
use super::views::{
    DashboardStats, FctTotals, LgaSummary, OverviewStats, PartyStanding, PollingUnitBreakdown,
    ProcessIntegrityStats, RedFlagSummary, ResultsSummary, SecurityStats, TurnoutStats,
    WardSummary,
};

const COMPLIANCE_WEIGHT: f64 = 0.4;
const TIMELINESS_WEIGHT: f64 = 0.3;
const ACCESS_WEIGHT: f64 = 0.3;

/// Councils that have not filed a checklist are left out of the mean.
fn mean_compliance(data: &[LgaSummary]) -> f64 {
    let scores: Vec<f64> = data.iter().filter_map(|lga| lga.compliance_score).collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

fn total_wards(data: &[LgaSummary]) -> u64 {
    data.iter().map(|lga| u64::from(lga.wards)).sum()
}

pub fn overview_stats(data: &[LgaSummary]) -> OverviewStats {
    OverviewStats {
        total_lgas: data.len() as u32,
        total_wards: data.iter().map(|lga| lga.wards).sum(),
        wards_reported: data.iter().map(|lga| lga.wards_reported).sum(),
        lgas_reported: data.iter().filter(|lga| lga.wards_reported > 0).count() as u32,
        compliance_percent: round1(mean_compliance(data)),
    }
}

pub fn overall_integrity_score(compliance: f64, timeliness: f64, access: f64) -> f64 {
    compliance * COMPLIANCE_WEIGHT + timeliness * TIMELINESS_WEIGHT + access * ACCESS_WEIGHT
}

pub fn process_integrity_stats(data: &[LgaSummary]) -> ProcessIntegrityStats {
    if data.is_empty() {
        return ProcessIntegrityStats::default();
    }

    let wards = total_wards(data);
    let late_starts: u64 = data.iter().map(|lga| u64::from(lga.late_start_count)).sum();
    let denied: u64 = data.iter().map(|lga| u64::from(lga.denied_access_count)).sum();

    let late_start_percent = percent(late_starts, wards);
    let denied_access_percent = percent(denied, wards);
    let timeliness_score = 100.0 - late_start_percent;
    let access_score = 100.0 - denied_access_percent;
    let compliance_score = mean_compliance(data);

    ProcessIntegrityStats {
        timeliness_score,
        access_score,
        compliance_score,
        overall_integrity_score: overall_integrity_score(
            compliance_score,
            timeliness_score,
            access_score,
        ),
        late_start_percent: round1(late_start_percent),
        denied_access_percent: round1(denied_access_percent),
    }
}

pub fn security_stats(data: &[LgaSummary]) -> SecurityStats {
    let mut stats = SecurityStats::default();
    let count = |lga: &LgaSummary, kind: IncidentType| {
        lga.incident_breakdown.get(&kind).copied().unwrap_or(0)
    };

    for lga in data {
        stats.incidents_by_lga.insert(lga.id.clone(), lga.incident_count);
        stats.total_incidents += lga.incident_count;
        stats.intimidation_count += count(lga, IncidentType::Intimidation);
        stats.disruption_attempts += count(lga, IncidentType::Disruption);
        stats.disagreements += count(lga, IncidentType::Disagreement);
    }
    stats
}

/// Every tracked party appears in `party_totals`, at zero when it has no votes.
pub fn results_summary(data: &[LgaSummary]) -> ResultsSummary {
    let mut party_totals: PartyVotes = Party::ordered().into_iter().map(|p| (p, 0)).collect();
    let mut total_rejected_votes: u64 = 0;
    for lga in data {
        for (party, votes) in &lga.party_results {
            let total = party_totals.entry(*party).or_insert(0);
            *total = total.saturating_add(*votes);
        }
        total_rejected_votes = total_rejected_votes.saturating_add(lga.rejected_votes);
    }

    let mut standings: Vec<PartyStanding> = party_totals
        .iter()
        .map(|(party, votes)| PartyStanding {
            party: *party,
            votes: *votes,
        })
        .collect();
    // Stable sort keeps declaration order among equal totals.
    standings.sort_by(|a, b| b.votes.cmp(&a.votes));

    let first = standings.first().map(|s| s.votes).unwrap_or(0);
    let second = standings.get(1).map(|s| s.votes).unwrap_or(0);
    let leading_party = standings
        .first()
        .filter(|standing| standing.votes > 0)
        .map(|standing| standing.party);

    ResultsSummary {
        total_valid_votes: saturating_total(party_totals.values().copied()),
        party_totals,
        standings,
        leading_party,
        margin_of_victory: if leading_party.is_some() {
            first - second
        } else {
            0
        },
        total_rejected_votes,
    }
}

pub fn turnout_stats(data: &[LgaSummary]) -> TurnoutStats {
    let registered = saturating_total(data.iter().map(|lga| lga.registered_voters));
    let cast = saturating_total(data.iter().map(|lga| lga.votes_cast));

    TurnoutStats {
        overall_turnout: round1(percent(cast, registered)),
        cancelled_pus: data
            .iter()
            .map(|lga| lga.cancelled_pus)
            .fold(0, u32::saturating_add),
        lost_voters: saturating_total(data.iter().map(|lga| lga.lost_voters)),
        turnout_by_lga: data
            .iter()
            .map(|lga| (lga.id.clone(), lga.turnout_percent))
            .collect(),
    }
}

pub fn red_flag_summary(data: &[LgaSummary]) -> RedFlagSummary {
    let mut summary = RedFlagSummary {
        no_observer_access: data.iter().map(|lga| lga.denied_access_count).sum(),
        late_starts: data.iter().map(|lga| lga.late_start_count).sum(),
        ..RedFlagSummary::default()
    };

    for lga in data.iter().filter(|lga| lga.wards_reported > 0) {
        if lga.risk_level.is_elevated() {
            summary.flagged_locations.push(lga.name.clone());
        }
        let Some(compliance) = lga.compliance_score else {
            continue;
        };
        if compliance < 70.0 {
            summary.estimated_integrity_violations +=
                ((100.0 - compliance) / 10.0).floor().max(0.0) as u32;
        }
        let shortfall = 1.0 - compliance / 100.0;
        summary.estimated_no_countersignatures +=
            (f64::from(lga.wards) * shortfall * 0.3).floor().max(0.0) as u32;
    }
    summary
}

pub fn fct_totals(data: &[LgaSummary], incidents: &[Incident]) -> FctTotals {
    let registered = saturating_total(data.iter().map(|lga| lga.registered_voters));
    let cast = saturating_total(data.iter().map(|lga| lga.votes_cast));
    let in_scope: Vec<&Incident> = incidents
        .iter()
        .filter(|incident| data.iter().any(|lga| lga.id == incident.location.lga_id))
        .collect();
    let active = in_scope
        .iter()
        .filter(|incident| incident.status.is_active())
        .count() as u32;

    FctTotals {
        total_polling_units: data.iter().map(|lga| lga.polling_units).sum(),
        total_registered_voters: registered,
        total_accredited_voters: saturating_total(data.iter().map(|lga| lga.accredited_voters)),
        total_votes_cast: cast,
        total_valid_votes: saturating_total(data.iter().map(|lga| lga.valid_votes)),
        total_rejected_votes: saturating_total(data.iter().map(|lga| lga.rejected_votes)),
        turnout_percent: round1(percent(cast, registered)),
        active_incidents: active,
        resolved_incidents: in_scope.len() as u32 - active,
    }
}

/// Banner counters computed from ward summaries.
///
/// A ward is compliant when both EC8B forms were submitted and EC8C was collated.
/// Reported wards count as open; their polling units split into operational and
/// minor-issue units depending on whether any incident was logged in the ward.
pub fn dashboard_stats(total_lgas: usize, wards: &[WardSummary]) -> DashboardStats {
    let reported: Vec<&WardSummary> = wards.iter().filter(|ward| ward.reported).collect();

    let mut lgas_reported: Vec<_> = reported.iter().map(|ward| &ward.lga_id).collect();
    lgas_reported.sort();
    lgas_reported.dedup();

    let compliant = reported
        .iter()
        .filter(|ward| {
            ward.integrity.map_or(false, |integrity| {
                integrity.ec8b_forms_submitted && integrity.ec8c_properly_collated
            })
        })
        .count() as u64;

    let total_polling_units: u32 = wards.iter().map(|ward| ward.polling_units).sum();
    let open_polling_units: u32 = reported.iter().map(|ward| ward.polling_units).sum();
    let minor_issues: u32 = reported
        .iter()
        .filter(|ward| ward.incident_count > 0)
        .map(|ward| ward.polling_units)
        .sum();
    let not_opened = reported
        .iter()
        .map(|ward| ward.cancelled_pus)
        .fold(0, u32::saturating_add);

    DashboardStats {
        total_lgas: total_lgas as u32,
        total_wards: wards.len() as u32,
        wards_reported: reported.len() as u32,
        lgas_reported: lgas_reported.len() as u32,
        compliance_percent: round1(percent(compliant, reported.len() as u64)),
        total_polling_units,
        open_polling_units,
        polling_unit_breakdown: PollingUnitBreakdown {
            operational: open_polling_units.saturating_sub(minor_issues),
            minor_issues,
            offline: total_polling_units.saturating_sub(open_polling_units),
            not_opened,
        },
    }
}
