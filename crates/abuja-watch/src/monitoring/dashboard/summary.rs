use super::super::domain::{
    percent, round1, saturating_total, AreaCouncil, PartyVotes, RiskLevel, Ward,
};
use super::super::incidents::Incident;
use super::super::repository::WardRecord;
use super::super::risk::assess;
use super::views::{LgaSummary, WardSummary};
use std::collections::BTreeMap;

impl WardSummary {
    /// Summarises a ward from its filed record. `incidents` may span other wards.
    pub fn build(
        ward: &Ward,
        council: &AreaCouncil,
        record: Option<&WardRecord>,
        incidents: &[Incident],
    ) -> Self {
        let incident_count = incidents
            .iter()
            .filter(|incident| incident.location.ward_id.as_ref() == Some(&ward.id))
            .count() as u32;

        let Some(record) = record else {
            return Self::unreported(ward, incident_count);
        };

        let report = record.collation_report(ward, council);
        let assessment = assess(&report);
        let stats = report.voting_stats;
        let warnings = record
            .results
            .as_ref()
            .map(|results| results.consistency_warnings(ward.registered_voters))
            .unwrap_or_default();

        Self {
            id: ward.id.clone(),
            lga_id: ward.lga_id.clone(),
            name: ward.name.clone(),
            polling_units: ward.total_polling_units,
            registered_voters: ward.registered_voters,
            accredited_voters: stats.total_accredited_voters,
            votes_cast: stats.total_votes_cast,
            valid_votes: stats.total_valid_votes,
            rejected_votes: stats.total_rejected_votes,
            turnout_percent: round1(stats.turnout_percent),
            reported: record.is_reported(),
            compliance_score: record.compliance_percent().map(round1),
            incident_count,
            denied_access: record.denied_access(),
            late_start: record.late_start(),
            cancelled_pus: report.cancelled_pus.number_of_cancelled_pus,
            lost_voters: report.cancelled_pus.registered_voters_in_cancelled_pus,
            security_present: record.security_present(),
            observer_present: record
                .observation
                .as_ref()
                .map(|observation| observation.permitted_to_observe),
            risk_level: assessment.level,
            risk_score: assessment.score,
            arrival_category: record.logistics.as_ref().map(|l| l.arrival_time),
            start_category: record.logistics.as_ref().map(|l| l.collation_start_time),
            party_results: report.results,
            integrity: record.integrity.as_ref().map(|i| i.to_integrity()),
            warnings,
        }
    }

    fn unreported(ward: &Ward, incident_count: u32) -> Self {
        Self {
            id: ward.id.clone(),
            lga_id: ward.lga_id.clone(),
            name: ward.name.clone(),
            polling_units: ward.total_polling_units,
            registered_voters: ward.registered_voters,
            accredited_voters: 0,
            votes_cast: 0,
            valid_votes: 0,
            rejected_votes: 0,
            turnout_percent: 0.0,
            reported: false,
            compliance_score: None,
            incident_count,
            denied_access: false,
            late_start: false,
            cancelled_pus: 0,
            lost_voters: 0,
            security_present: None,
            observer_present: None,
            risk_level: RiskLevel::None,
            risk_score: 0,
            arrival_category: None,
            start_category: None,
            party_results: PartyVotes::new(),
            integrity: None,
            warnings: Vec::new(),
        }
    }
}

impl LgaSummary {
    /// Builds the council roll-up bottom-up from its ward summaries.
    ///
    /// Registered voters and polling units cover every ward; vote figures only come from
    /// wards that reported. Compliance averages the wards that filed a checklist, while
    /// security presence and observer coverage are shares of reported wards. `incidents`
    /// may span other councils.
    pub fn from_wards(council: &AreaCouncil, wards: &[WardSummary], incidents: &[Incident]) -> Self {
        let reported: Vec<&WardSummary> = wards.iter().filter(|ward| ward.reported).collect();
        let wards_reported = reported.len() as u32;

        let registered_voters = saturating_total(wards.iter().map(|ward| ward.registered_voters));
        let votes_cast = saturating_total(reported.iter().map(|ward| ward.votes_cast));

        let compliance: Vec<f64> = wards.iter().filter_map(|ward| ward.compliance_score).collect();
        let compliance_score = (!compliance.is_empty())
            .then(|| round1(compliance.iter().sum::<f64>() / compliance.len() as f64));

        let mut incident_breakdown = BTreeMap::new();
        let mut incident_count = 0;
        for incident in incidents
            .iter()
            .filter(|incident| incident.location.lga_id == council.id)
        {
            *incident_breakdown.entry(incident.kind).or_insert(0) += 1;
            incident_count += 1;
        }

        let mut party_results = PartyVotes::new();
        for ward in &reported {
            for (party, votes) in &ward.party_results {
                let total = party_results.entry(*party).or_insert(0);
                *total = total.saturating_add(*votes);
            }
        }

        let share = |predicate: fn(&WardSummary) -> bool| {
            let hits = reported.iter().filter(|ward| predicate(ward)).count() as u64;
            round1(percent(hits, u64::from(wards_reported)))
        };

        Self {
            id: council.id.clone(),
            name: council.name.clone(),
            short_name: council.short_name.clone(),
            state: council.state.clone(),
            wards: wards.len() as u32,
            polling_units: wards.iter().map(|ward| ward.polling_units).sum(),
            registered_voters,
            accredited_voters: saturating_total(reported.iter().map(|ward| ward.accredited_voters)),
            votes_cast,
            valid_votes: saturating_total(reported.iter().map(|ward| ward.valid_votes)),
            rejected_votes: saturating_total(reported.iter().map(|ward| ward.rejected_votes)),
            turnout_percent: round1(percent(votes_cast, registered_voters)),
            wards_reported,
            compliance_score,
            incident_count,
            incident_breakdown,
            denied_access_count: reported.iter().filter(|ward| ward.denied_access).count() as u32,
            late_start_count: reported.iter().filter(|ward| ward.late_start).count() as u32,
            cancelled_pus: reported
                .iter()
                .map(|ward| ward.cancelled_pus)
                .fold(0, u32::saturating_add),
            lost_voters: saturating_total(reported.iter().map(|ward| ward.lost_voters)),
            security_present: share(|ward| ward.security_present == Some(true)),
            observer_coverage: share(|ward| ward.observer_present == Some(true)),
            risk_level: wards
                .iter()
                .map(|ward| ward.risk_level)
                .max()
                .unwrap_or_default(),
            coordinates: council.coordinates,
            party_results,
        }
    }
}
