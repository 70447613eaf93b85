use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LgaId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WardId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PollingUnitId(pub String);

impl LgaId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl WardId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl PollingUnitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for LgaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for WardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PollingUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordinal risk classification. Variant order is severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::None,
            Self::Low,
            Self::Medium,
            Self::High,
            Self::Critical,
        ]
    }

    /// Maps an accumulated risk score onto a level, checking the highest band first.
    pub const fn from_score(score: u32) -> Self {
        if score >= 8 {
            Self::Critical
        } else if score >= 6 {
            Self::High
        } else if score >= 3 {
            Self::Medium
        } else if score >= 1 {
            Self::Low
        } else {
            Self::None
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        Self::None
    }
}

/// Party codes tracked on result sheets. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Apc,
    Lp,
    Pdp,
    Nnpp,
    Apga,
    Sdp,
    Apm,
    Adc,
    App,
    Ypp,
    Zlp,
    Others,
}

impl Party {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::Apc,
            Self::Lp,
            Self::Pdp,
            Self::Nnpp,
            Self::Apga,
            Self::Sdp,
            Self::Apm,
            Self::Adc,
            Self::App,
            Self::Ypp,
            Self::Zlp,
            Self::Others,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Apc => "APC",
            Self::Lp => "LP",
            Self::Pdp => "PDP",
            Self::Nnpp => "NNPP",
            Self::Apga => "APGA",
            Self::Sdp => "SDP",
            Self::Apm => "APM",
            Self::Adc => "ADC",
            Self::App => "APP",
            Self::Ypp => "YPP",
            Self::Zlp => "ZLP",
            Self::Others => "OTHERS",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serde adapter writing an optional party as its ballot label (`APC`).
pub mod party_label {
    use super::Party;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(party: &Option<Party>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        party.map(Party::label).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Party>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(label) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        Party::ordered()
            .into_iter()
            .find(|party| party.label().eq_ignore_ascii_case(&label))
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unknown party {label}")))
    }
}

/// Votes per party, iterated in party declaration order.
pub type PartyVotes = BTreeMap<Party, u64>;

/// Saturates at `u64::MAX`; sheets that overflow are refused at intake.
pub fn party_votes_total(votes: &PartyVotes) -> u64 {
    saturating_total(votes.values().copied())
}

pub fn checked_party_total(votes: &PartyVotes) -> Option<u64> {
    votes
        .values()
        .try_fold(0u64, |total, count| total.checked_add(*count))
}

/// Vote tallies summed across wards and councils.
pub fn saturating_total(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountersignStatus {
    Yes,
    No,
    #[serde(rename = "No agent")]
    NoAgent,
}

impl Default for CountersignStatus {
    fn default() -> Self {
        Self::NoAgent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalTimeCategory {
    #[serde(rename = "Before 4pm", alias = "before_4pm")]
    BeforeFourPm,
    #[serde(rename = "4-5pm", alias = "4_5pm")]
    FourToFivePm,
    #[serde(rename = "5-6pm", alias = "5_6pm")]
    FiveToSixPm,
    #[serde(rename = "After 6pm", alias = "after_6pm")]
    AfterSixPm,
}

impl ArrivalTimeCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BeforeFourPm => "Before 4pm",
            Self::FourToFivePm => "4-5pm",
            Self::FiveToSixPm => "5-6pm",
            Self::AfterSixPm => "After 6pm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollationStartCategory {
    #[serde(rename = "Before 4pm", alias = "before_4pm")]
    BeforeFourPm,
    #[serde(rename = "4-6pm", alias = "4_6pm")]
    FourToSixPm,
    #[serde(rename = "6-9pm", alias = "6_9pm")]
    SixToNinePm,
    #[serde(rename = "9pm-12am", alias = "9_12am")]
    NinePmToMidnight,
    #[serde(rename = "Not started at midnight", alias = "not_started")]
    NotStartedAtMidnight,
}

impl CollationStartCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BeforeFourPm => "Before 4pm",
            Self::FourToSixPm => "4-6pm",
            Self::SixToNinePm => "6-9pm",
            Self::NinePmToMidnight => "9pm-12am",
            Self::NotStartedAtMidnight => "Not started at midnight",
        }
    }

    /// Collation that began after 9pm, or had not begun by midnight, counts as late.
    pub const fn is_late(self) -> bool {
        matches!(self, Self::NinePmToMidnight | Self::NotStartedAtMidnight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Top-level administrative and electoral unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCouncil {
    pub id: LgaId,
    pub name: String,
    pub short_name: String,
    pub state: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    pub id: WardId,
    pub lga_id: LgaId,
    pub name: String,
    pub total_polling_units: u32,
    pub registered_voters: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BvasStatus {
    Operational,
    Faulty,
    Offline,
}

impl BvasStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Operational => "Operational",
            Self::Faulty => "Faulty",
            Self::Offline => "Offline",
        }
    }
}

/// Leaf reporting unit inside a ward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingUnit {
    pub id: PollingUnitId,
    pub name: String,
    pub ward_id: WardId,
    pub lga_id: LgaId,
    pub registered_voters: u64,
    pub accredited_voters: u64,
    pub votes_cast: u64,
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
    pub staff_present: bool,
    pub bvas_status: BvasStatus,
    pub materials_delivered: bool,
    #[serde(default)]
    pub voters_in_queue: u32,
    pub has_power: bool,
    pub has_connectivity: bool,
    pub has_observer: bool,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl PollingUnit {
    pub fn turnout_percent(&self) -> f64 {
        percent(self.votes_cast, self.registered_voters)
    }

    /// An open unit with a working device, staff, and materials is operational.
    pub fn is_operational(&self) -> bool {
        self.is_open
            && self.staff_present
            && self.materials_delivered
            && self.bvas_status == BvasStatus::Operational
    }
}

pub(crate) fn percent(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
