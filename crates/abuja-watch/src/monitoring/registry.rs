//! The fixed territory: six FCT area councils and their wards.

use super::domain::{AreaCouncil, Coordinates, LgaId, Ward, WardId};

struct CouncilSeed {
    id: &'static str,
    name: &'static str,
    short_name: &'static str,
    lat: f64,
    lng: f64,
    polling_units: u32,
    registered_voters: u64,
    wards: &'static [&'static str],
}

const COUNCILS: [CouncilSeed; 6] = [
    CouncilSeed {
        id: "abaji",
        name: "Abaji",
        short_name: "ABJ",
        lat: 8.4667,
        lng: 6.95,
        polling_units: 156,
        registered_voters: 89_420,
        wards: &[
            "Abaji Central",
            "Agyana",
            "Alu",
            "Ewu",
            "Gawu",
            "Gurdi",
            "Nuku",
            "Pandagi",
            "Rimba",
            "Yaba",
        ],
    },
    CouncilSeed {
        id: "bwari",
        name: "Bwari",
        short_name: "BWR",
        lat: 9.2833,
        lng: 7.3833,
        polling_units: 298,
        registered_voters: 245_780,
        wards: &[
            "Bwari Central",
            "Byazhin",
            "Igu",
            "Kawu",
            "Kuduru",
            "Shere",
            "Tokulo",
            "Ushafa",
            "Usuma",
            "Uzango",
        ],
    },
    CouncilSeed {
        id: "gwagwalada",
        name: "Gwagwalada",
        short_name: "GWG",
        lat: 8.95,
        lng: 7.0833,
        polling_units: 189,
        registered_voters: 168_540,
        wards: &[
            "Gwagwa I",
            "Gwagwa II",
            "Ibwa",
            "Ikwa",
            "Kutunku",
            "Paiko",
            "Passo",
            "Tungamaje",
            "Zuba I",
            "Zuba II",
        ],
    },
    CouncilSeed {
        id: "kuje",
        name: "Kuje",
        short_name: "KUJ",
        lat: 8.8833,
        lng: 7.2333,
        polling_units: 178,
        registered_voters: 142_890,
        wards: &[
            "Chibiri",
            "Gaube",
            "Gwargwada",
            "Kabi",
            "Kuje",
            "Kujekwa",
            "Kwaku",
            "Rubochi",
            "Sabo Wuse",
            "Yenche",
        ],
    },
    CouncilSeed {
        id: "kwali",
        name: "Kwali",
        short_name: "KWL",
        lat: 8.75,
        lng: 7.0167,
        polling_units: 145,
        registered_voters: 98_760,
        wards: &[
            "Dafa", "Gbaupe", "Gwagwa", "Kilankwa", "Kundu", "Kwali", "Pai", "Sheda", "Wako",
            "Yangoji",
        ],
    },
    CouncilSeed {
        id: "amac",
        name: "Abuja Municipal Area Council",
        short_name: "AMAC",
        lat: 9.0765,
        lng: 7.3986,
        polling_units: 687,
        registered_voters: 892_450,
        wards: &[
            "City Centre",
            "Garki I",
            "Garki II",
            "Gwarinpa",
            "Gwagwa",
            "Jiwa",
            "Kabusa",
            "Karu",
            "Nyanya",
            "Orozo",
            "Wuse I",
            "Wuse II",
        ],
    },
];

pub const STATE: &str = "FCT";

/// Area councils with their wards. Ward figures split the council register evenly and
/// hand any remainder to the first wards, so ward totals always reconcile with the council.
#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub councils: Vec<AreaCouncil>,
    pub wards: Vec<Ward>,
}

impl Territory {
    pub fn fct() -> Self {
        let mut councils = Vec::with_capacity(COUNCILS.len());
        let mut wards = Vec::new();

        for seed in &COUNCILS {
            let lga_id = LgaId::new(seed.id);
            councils.push(AreaCouncil {
                id: lga_id.clone(),
                name: seed.name.to_string(),
                short_name: seed.short_name.to_string(),
                state: STATE.to_string(),
                coordinates: Coordinates {
                    lat: seed.lat,
                    lng: seed.lng,
                },
            });

            let count = seed.wards.len();
            let units = split_evenly(u64::from(seed.polling_units), count);
            let voters = split_evenly(seed.registered_voters, count);
            for (index, name) in seed.wards.iter().enumerate() {
                wards.push(Ward {
                    id: WardId(format!("{}-ward-{}", seed.id, index + 1)),
                    lga_id: lga_id.clone(),
                    name: (*name).to_string(),
                    total_polling_units: u32::try_from(units[index]).unwrap_or(u32::MAX),
                    registered_voters: voters[index],
                });
            }
        }

        Self { councils, wards }
    }

    pub fn council(&self, id: &LgaId) -> Option<&AreaCouncil> {
        self.councils.iter().find(|council| &council.id == id)
    }

    pub fn wards_in<'a>(&'a self, id: &'a LgaId) -> impl Iterator<Item = &'a Ward> + 'a {
        self.wards.iter().filter(move |ward| &ward.lga_id == id)
    }
}

fn split_evenly(total: u64, parts: usize) -> Vec<u64> {
    if parts == 0 {
        return Vec::new();
    }
    let parts_u64 = parts as u64;
    let base = total / parts_u64;
    let remainder = (total % parts_u64) as usize;
    (0..parts)
        .map(|index| base + u64::from(index < remainder))
        .collect()
}
