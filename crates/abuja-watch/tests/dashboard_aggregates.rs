use abuja_watch::monitoring::dashboard::{
    overall_integrity_score, overview_stats, process_integrity_stats, red_flag_summary,
    results_summary, security_stats, turnout_stats,
};
use abuja_watch::monitoring::{LgaSummary, Party};
use serde_json::json;

/// Two councils as they appear on the dashboard wire format.
fn councils() -> Vec<LgaSummary> {
    let fixture = json!([
        {
            "id": "abaji",
            "name": "Abaji",
            "shortName": "ABJ",
            "state": "FCT",
            "wards": 10,
            "pollingUnits": 156,
            "registeredVoters": 89420,
            "accreditedVoters": 52180,
            "votesCast": 48650,
            "validVotes": 47200,
            "rejectedVotes": 1450,
            "turnoutPercent": 54.4,
            "wardsReported": 10,
            "complianceScore": 92.0,
            "incidentCount": 3,
            "incidentBreakdown": { "intimidation": 1, "violence": 0, "disruption": 1, "disagreement": 1 },
            "deniedAccessCount": 0,
            "lateStartCount": 1,
            "cancelledPUs": 2,
            "lostVoters": 1240,
            "securityPresent": 95.0,
            "observerCoverage": 78.0,
            "riskLevel": "low",
            "coordinates": { "lat": 8.4667, "lng": 6.95 },
            "partyResults": { "apc": 18500, "lp": 12300, "pdp": 9800, "nnpp": 3200, "apga": 1800, "others": 1600 }
        },
        {
            "id": "bwari",
            "name": "Bwari",
            "shortName": "BWR",
            "state": "FCT",
            "wards": 10,
            "pollingUnits": 298,
            "registeredVoters": 245780,
            "accreditedVoters": 156420,
            "votesCast": 142800,
            "validVotes": 138900,
            "rejectedVotes": 3900,
            "turnoutPercent": 58.1,
            "wardsReported": 9,
            "complianceScore": 78.0,
            "incidentCount": 8,
            "incidentBreakdown": { "intimidation": 2, "violence": 1, "disruption": 3, "disagreement": 2 },
            "deniedAccessCount": 2,
            "lateStartCount": 3,
            "cancelledPUs": 5,
            "lostVoters": 4200,
            "securityPresent": 85.0,
            "observerCoverage": 85.0,
            "riskLevel": "medium",
            "coordinates": { "lat": 9.2833, "lng": 7.3833 },
            "partyResults": { "apc": 52400, "lp": 45200, "pdp": 28600, "nnpp": 7200, "apga": 3100, "others": 2400 }
        }
    ]);
    serde_json::from_value(fixture).expect("fixture matches the summary shape")
}

#[test]
fn overview_counts_reporting_progress() {
    let overview = overview_stats(&councils());
    assert_eq!(overview.total_lgas, 2);
    assert_eq!(overview.total_wards, 20);
    assert_eq!(overview.wards_reported, 19);
    assert_eq!(overview.lgas_reported, 2);
    assert_eq!(overview.compliance_percent, 85.0);
}

#[test]
fn integrity_score_weighs_compliance_timeliness_and_access() {
    assert!((overall_integrity_score(80.0, 90.0, 70.0) - 80.0).abs() < 1e-9);

    let stats = process_integrity_stats(&councils());
    // 4 late starts and 2 denials across 20 wards
    assert_eq!(stats.late_start_percent, 20.0);
    assert_eq!(stats.denied_access_percent, 10.0);
    assert!((stats.timeliness_score - 80.0).abs() < 1e-9);
    assert!((stats.access_score - 90.0).abs() < 1e-9);
    assert!((stats.overall_integrity_score - 85.0).abs() < 1e-9);
}

#[test]
fn turnout_is_votes_cast_over_registered() {
    let turnout = turnout_stats(&councils());
    // 191,450 of 335,200
    assert_eq!(turnout.overall_turnout, 57.1);
    assert_eq!(turnout.cancelled_pus, 7);
    assert_eq!(turnout.lost_voters, 5_440);

    let mut single = councils();
    single.truncate(1);
    single[0].registered_voters = 100;
    single[0].votes_cast = 55;
    assert_eq!(turnout_stats(&single).overall_turnout, 55.0);
}

#[test]
fn results_rank_parties_and_measure_the_margin() {
    let results = results_summary(&councils());
    assert_eq!(results.leading_party, Some(Party::Apc));
    assert_eq!(results.margin_of_victory, 70_900 - 57_500);
    assert_eq!(results.total_valid_votes, 186_100);
    assert_eq!(results.total_rejected_votes, 5_350);
    assert_eq!(results.party_totals.len(), 12);
    assert_eq!(results.party_totals.get(&Party::Zlp), Some(&0));

    let mut small = councils();
    small.truncate(1);
    small[0].party_results = [(Party::Apc, 100), (Party::Lp, 90), (Party::Pdp, 50)]
        .into_iter()
        .collect();
    let results = results_summary(&small);
    assert_eq!(results.leading_party, Some(Party::Apc));
    assert_eq!(results.margin_of_victory, 10);
}

#[test]
fn security_breaks_incidents_down_by_kind_and_council() {
    let security = security_stats(&councils());
    assert_eq!(security.total_incidents, 11);
    assert_eq!(security.intimidation_count, 3);
    assert_eq!(security.disruption_attempts, 4);
    assert_eq!(security.disagreements, 3);
    assert_eq!(security.incidents_by_lga.len(), 2);
}

#[test]
fn healthy_councils_raise_no_estimated_violations() {
    let flags = red_flag_summary(&councils());
    assert_eq!(flags.no_observer_access, 2);
    assert_eq!(flags.late_starts, 4);
    assert_eq!(flags.estimated_integrity_violations, 0);
    assert_eq!(flags.estimated_no_countersignatures, 0);
    assert!(flags.flagged_locations.is_empty());
}

#[test]
fn councils_without_a_checklist_stay_out_of_compliance_figures() {
    let mut data = councils();
    data[1].compliance_score = None;

    assert_eq!(overview_stats(&data).compliance_percent, 92.0);
    assert_eq!(process_integrity_stats(&data).compliance_score, 92.0);

    let flags = red_flag_summary(&data);
    assert_eq!(flags.estimated_integrity_violations, 0);
    assert_eq!(flags.estimated_no_countersignatures, 0);

    let wire = serde_json::to_value(&data[1]).expect("summary serializes");
    assert!(wire["complianceScore"].is_null());
}

#[test]
fn saturated_council_totals_do_not_wrap() {
    let mut data = councils();
    data[0].party_results.insert(Party::Apc, u64::MAX);

    let results = results_summary(&data);
    assert_eq!(results.party_totals.get(&Party::Apc), Some(&u64::MAX));
    assert_eq!(results.leading_party, Some(Party::Apc));
    assert_eq!(results.total_valid_votes, u64::MAX);
}

#[test]
fn empty_input_yields_zeroed_shapes() {
    let overview = overview_stats(&[]);
    assert_eq!(overview.total_lgas, 0);
    assert_eq!(overview.compliance_percent, 0.0);

    let turnout = turnout_stats(&[]);
    assert_eq!(turnout.overall_turnout, 0.0);
    assert!(turnout.turnout_by_lga.is_empty());

    let results = results_summary(&[]);
    assert_eq!(results.leading_party, None);
    assert_eq!(results.margin_of_victory, 0);
    assert_eq!(results.party_totals.len(), 12);
    assert!(results.party_totals.values().all(|votes| *votes == 0));

    let integrity = process_integrity_stats(&[]);
    assert_eq!(integrity.overall_integrity_score, 0.0);
    assert_eq!(security_stats(&[]).total_incidents, 0);
}
