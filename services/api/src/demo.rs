use crate::infra::InMemoryElectionRepository;
use crate::watch::render_dashboard;
use abuja_watch::error::AppError;
use abuja_watch::monitoring::collation::PartyAgentParticipation;
use abuja_watch::monitoring::domain::{
    ArrivalTimeCategory, CollationStartCategory, CountersignStatus,
};
use abuja_watch::monitoring::incidents::IncidentLocation;
use abuja_watch::monitoring::{
    DashboardFilter, ElectionRepository, IncidentSeverity, IncidentStatus, IncidentType,
    IntegritySubmission, LgaId, LogisticsSubmission, MonitoringService, NewIncident,
    ObservationSubmission, Party, ResultsSubmission, StaffingSubmission, WardId,
};
use clap::Args;
use std::sync::Arc;

const DEMO_OBSERVER: &str = "demo-observer";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Restrict the printed report to one area council (e.g. `kuje`)
    #[arg(long)]
    pub(crate) lga: Option<String>,
    /// Print the full report as JSON after the summary
    #[arg(long)]
    pub(crate) json: bool,
}

/// A ward's worth of demo submissions.
struct DemoWard {
    ward: &'static str,
    late: bool,
    security_present: bool,
    permitted: bool,
    intimidation: bool,
    checklist_failures: usize,
    cancelled_pus: u32,
    lost_voters: u64,
    votes: &'static [(Party, u64)],
    rejected: u64,
}

const DEMO_WARDS: &[DemoWard] = &[
    DemoWard {
        ward: "abaji-ward-1",
        late: false,
        security_present: true,
        permitted: true,
        intimidation: false,
        checklist_failures: 0,
        cancelled_pus: 0,
        lost_voters: 0,
        votes: &[(Party::Apc, 1_850), (Party::Lp, 1_230), (Party::Pdp, 980)],
        rejected: 145,
    },
    DemoWard {
        ward: "bwari-ward-2",
        late: true,
        security_present: true,
        permitted: true,
        intimidation: false,
        checklist_failures: 1,
        cancelled_pus: 1,
        lost_voters: 420,
        votes: &[(Party::Apc, 5_240), (Party::Lp, 4_520), (Party::Pdp, 2_860)],
        rejected: 390,
    },
    DemoWard {
        ward: "kuje-ward-4",
        late: true,
        security_present: false,
        permitted: false,
        intimidation: true,
        checklist_failures: 4,
        cancelled_pus: 3,
        lost_voters: 2_340,
        votes: &[(Party::Lp, 2_780), (Party::Apc, 2_310), (Party::Nnpp, 540)],
        rejected: 410,
    },
    DemoWard {
        ward: "amac-ward-1",
        late: false,
        security_present: true,
        permitted: true,
        intimidation: false,
        checklist_failures: 0,
        cancelled_pus: 0,
        lost_voters: 0,
        votes: &[(Party::Lp, 18_900), (Party::Apc, 15_600), (Party::Pdp, 5_100)],
        rejected: 1_120,
    },
];

fn checklist(ward_id: &WardId, failures: usize) -> IntegritySubmission {
    let passed = |index: usize| index >= failures;
    IntegritySubmission {
        ward_id: ward_id.clone(),
        ec8b_submitted: passed(0),
        ec8c_collated: passed(1),
        csrvs_done: passed(2),
        votes_announced: passed(3),
        agents_countersigned: passed(4),
        ec60e_displayed: passed(5),
        ec40g_transfers_done: Some(true),
        ec40h_pwd_data_transferred: None,
        ec8c_copies_distributed: Some(failures == 0),
    }
}

fn seed<R>(service: &MonitoringService<R>, demo: &DemoWard) -> Result<(), AppError>
where
    R: ElectionRepository + 'static,
{
    let ward_id = WardId::new(demo.ward);
    service.submit_logistics(
        LogisticsSubmission {
            ward_id: ward_id.clone(),
            arrival_time: if demo.late {
                ArrivalTimeCategory::AfterSixPm
            } else {
                ArrivalTimeCategory::BeforeFourPm
            },
            collation_start_time: if demo.late {
                CollationStartCategory::NinePmToMidnight
            } else {
                CollationStartCategory::FourToSixPm
            },
        },
        DEMO_OBSERVER,
    )?;
    service.submit_staffing(
        StaffingSubmission {
            ward_id: ward_id.clone(),
            inec_staff: 7,
            female_inec_staff: Some(3),
            security_present: demo.security_present,
            party_agents: 11,
        },
        DEMO_OBSERVER,
    )?;
    service.submit_integrity(checklist(&ward_id, demo.checklist_failures), DEMO_OBSERVER)?;

    let valid: u64 = demo.votes.iter().map(|(_, votes)| votes).sum();
    let receipt = service.submit_results(
        ResultsSubmission {
            ward_id: ward_id.clone(),
            accredited_voters: valid + demo.rejected + 25,
            valid_votes: valid,
            rejected_votes: demo.rejected,
            votes_cast: valid + demo.rejected,
            party_votes: demo.votes.iter().copied().collect(),
        },
        DEMO_OBSERVER,
    )?;
    for warning in &receipt.warnings {
        println!("  ! {}: {}", demo.ward, warning);
    }

    let countersign = if demo.permitted {
        CountersignStatus::Yes
    } else {
        CountersignStatus::No
    };
    service.submit_observation(
        ObservationSubmission {
            ward_id,
            permitted_to_observe: demo.permitted,
            denial_reason: (!demo.permitted)
                .then(|| "observer tag not recognised by the collation officer".to_string()),
            disagreement_with_results: demo.intimidation,
            intimidation_or_harassment: demo.intimidation,
            attempted_disruption: false,
            incident_details: demo
                .intimidation
                .then(|| "party thugs surrounded the collation hall".to_string()),
            cancelled_pus: demo.cancelled_pus,
            registered_voters_in_cancelled_pus: demo.lost_voters,
            countersignatures: Some(PartyAgentParticipation {
                apc_countersigned: countersign,
                lp_countersigned: countersign,
                pdp_countersigned: CountersignStatus::Yes,
                apga_countersigned: CountersignStatus::NoAgent,
                nnpp_countersigned: CountersignStatus::NoAgent,
                other_parties_countersigned: CountersignStatus::NoAgent,
            }),
        },
        DEMO_OBSERVER,
    )?;
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { lga, json } = args;

    println!("Election monitoring demo");
    let service = MonitoringService::new(Arc::new(InMemoryElectionRepository::default()));
    for demo in DEMO_WARDS {
        seed(&service, demo)?;
    }

    let incident = service.report_incident(
        NewIncident {
            kind: IncidentType::Intimidation,
            severity: IncidentSeverity::High,
            title: "Observers harassed at Kabi collation centre".to_string(),
            description: "Two accredited observers were ordered out of the hall.".to_string(),
            location: IncidentLocation {
                lga_id: LgaId::new("kuje"),
                ward_id: Some(WardId::new("kuje-ward-4")),
                polling_unit_id: None,
            },
            reported_by: None,
            timestamp: None,
        },
        DEMO_OBSERVER,
    )?;
    service.advance_incident(&incident.id, IncidentStatus::Investigating)?;
    println!(
        "- Seeded {} wards and incident {} ({})",
        DEMO_WARDS.len(),
        incident.id,
        incident.kind.label()
    );

    let risk = service.ward_risk(&WardId::new("kuje-ward-4"))?;
    println!("Kuje ward 4 risk breakdown: {} ({})", risk.level.label(), risk.score);
    for component in &risk.components {
        println!("  - {:?}: {} ({})", component.factor, component.points, component.notes);
    }

    let filter = DashboardFilter {
        lga_id: lga.map(LgaId::new),
        ..DashboardFilter::default()
    };
    let report = service.dashboard_report(&filter)?;
    render_dashboard(&report);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("  Report payload unavailable: {}", err),
        }
    }

    Ok(())
}
