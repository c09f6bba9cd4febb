use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// in partial update payloads.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Recorded sex of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(format!("Unknown sex: {}", other)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an animal in the rabbitry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    /// Kept as breeding stock
    Breeding,
    /// Raised for meat
    Fattening,
    ForSale,
    Sold,
    Deceased,
}

impl AnimalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Breeding => "breeding",
            AnimalStatus::Fattening => "fattening",
            AnimalStatus::ForSale => "for_sale",
            AnimalStatus::Sold => "sold",
            AnimalStatus::Deceased => "deceased",
        }
    }

    /// Sold and deceased animals have left the herd
    pub fn is_in_herd(&self) -> bool {
        !matches!(self, AnimalStatus::Sold | AnimalStatus::Deceased)
    }
}

impl FromStr for AnimalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breeding" => Ok(AnimalStatus::Breeding),
            "fattening" => Ok(AnimalStatus::Fattening),
            "for_sale" => Ok(AnimalStatus::ForSale),
            "sold" => Ok(AnimalStatus::Sold),
            "deceased" => Ok(AnimalStatus::Deceased),
            other => Err(format!("Unknown animal status: {}", other)),
        }
    }
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health status of an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Sick,
    Injured,
    Quarantined,
    Recovering,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Sick => "sick",
            HealthStatus::Injured => "injured",
            HealthStatus::Quarantined => "quarantined",
            HealthStatus::Recovering => "recovering",
        }
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(HealthStatus::Healthy),
            "sick" => Ok(HealthStatus::Sick),
            "injured" => Ok(HealthStatus::Injured),
            "quarantined" => Ok(HealthStatus::Quarantined),
            "recovering" => Ok(HealthStatus::Recovering),
            other => Err(format!("Unknown health status: {}", other)),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a mating event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatingOutcome {
    #[default]
    Unset,
    Success,
    Failure,
}

impl MatingOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatingOutcome::Unset => "unset",
            MatingOutcome::Success => "success",
            MatingOutcome::Failure => "failure",
        }
    }
}

impl FromStr for MatingOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(MatingOutcome::Unset),
            "success" => Ok(MatingOutcome::Success),
            "failure" => Ok(MatingOutcome::Failure),
            other => Err(format!("Unknown mating outcome: {}", other)),
        }
    }
}

impl fmt::Display for MatingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with offspring references when a parent animal is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Refuse to delete an animal still referenced as sire or dam
    #[default]
    Reject,
    /// Null the offspring's sire/dam references, then delete
    DetachOffspring,
}

// ---------------------------------------------------------------------------
// Animals
// ---------------------------------------------------------------------------

/// Animal record. Dates are ISO 8601 (`YYYY-MM-DD`), timestamps RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    /// Farmer-assigned identifier (ear tag), e.g. "M005"
    pub id: String,
    pub name: Option<String>,
    pub sex: Sex,
    pub breed: String,
    pub color: Option<String>,
    pub birth_date: Option<String>,
    pub weight_kg: Option<f64>,
    pub health_status: HealthStatus,
    pub status: AnimalStatus,
    pub enclosure_id: Option<String>,
    pub sire_id: Option<String>,
    pub dam_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAnimalRequest {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub sex: Sex,
    pub breed: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Defaults to `healthy`
    #[serde(default)]
    pub health_status: Option<HealthStatus>,
    /// Defaults to `breeding`
    #[serde(default)]
    pub status: Option<AnimalStatus>,
    #[serde(default)]
    pub enclosure_id: Option<String>,
    #[serde(default)]
    pub sire_id: Option<String>,
    #[serde(default)]
    pub dam_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update. For nullable fields an explicit `null` clears the value
/// while an absent field leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UpdateAnimalRequest {
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AnimalStatus>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub enclosure_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub sire_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub dam_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

/// Query parameters for listing animals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnimalListRequest {
    pub sex: Option<Sex>,
    pub status: Option<AnimalStatus>,
    pub breed: Option<String>,
    pub enclosure_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalResponse {
    pub animal: Animal,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalListResponse {
    pub animals: Vec<Animal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeleteAnimalRequest {
    pub policy: Option<DeletePolicy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteAnimalResponse {
    pub animal_id: String,
    /// Number of offspring whose sire/dam reference was cleared
    pub detached_offspring: u32,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Breeding event log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatingEvent {
    pub id: String,
    pub sire_id: String,
    pub dam_id: String,
    pub mating_date: String,
    pub expected_birth_date: String,
    pub outcome: MatingOutcome,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMatingRequest {
    pub sire_id: String,
    pub dam_id: String,
    pub mating_date: String,
    /// Defaults to the mating date plus the configured gestation length
    #[serde(default)]
    pub expected_birth_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMatingOutcomeRequest {
    pub outcome: MatingOutcome,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters for listing breeding events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BreedingEventListRequest {
    /// Only events where this animal is sire or dam
    pub animal_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatingResponse {
    pub mating: MatingEvent,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatingListResponse {
    pub matings: Vec<MatingEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthEvent {
    pub id: String,
    pub mating_id: String,
    pub birth_date: String,
    pub total_born: u32,
    pub stillborn: u32,
    pub survivors_24h: u32,
    pub survivors_48h: u32,
    /// Recorded once the litter is weaned
    pub weaned: Option<u32>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBirthRequest {
    pub mating_id: String,
    pub birth_date: String,
    pub total_born: u32,
    pub stillborn: u32,
    pub survivors_24h: u32,
    pub survivors_48h: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordWeaningRequest {
    pub weaned: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthResponse {
    pub birth: BirthEvent,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthListResponse {
    pub births: Vec<BirthEvent>,
}

/// Breeding performance aggregated over every event where the animal is sire or dam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingPerformance {
    pub animal_id: String,
    pub matings: u32,
    pub successful_matings: u32,
    pub failed_matings: u32,
    pub litters: u32,
    pub total_born: u32,
    pub stillborn: u32,
    pub born_alive: u32,
    pub survivors_24h: u32,
    pub survivors_48h: u32,
    pub weaned: u32,
    /// survivors_48h / born_alive, absent when nothing was born alive
    pub survival_rate: Option<f64>,
    /// successful / (successful + failed), absent when no outcome is known
    pub fertility_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Pedigree
// ---------------------------------------------------------------------------

/// Snapshot of a registered ancestor as shown in a pedigree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestorSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub sex: Sex,
    pub breed: String,
    pub birth_date: Option<String>,
    pub weight_kg: Option<f64>,
    pub performance: BreedingPerformance,
}

/// Node of a resolved ancestor tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AncestorNode {
    /// Registered animal. `sire`/`dam` are absent when the depth limit stopped expansion.
    Animal {
        animal: AncestorSnapshot,
        sire: Option<Box<AncestorNode>>,
        dam: Option<Box<AncestorNode>>,
    },
    /// No parent recorded
    Unknown,
    /// Parent identifier that is not in the registry
    Unregistered { id: String },
    /// Parent identifier already present further down the same line
    Cycle { id: String },
}

/// Query parameters for pedigree-based endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PedigreeRequest {
    pub depth: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedigreeResponse {
    pub animal_id: String,
    pub depth: u32,
    pub tree: AncestorNode,
}

// ---------------------------------------------------------------------------
// Sales and documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub animal_id: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub buyer_name: String,
    pub buyer_contact: Option<String>,
    pub sale_date: String,
    pub notes: Option<String>,
    pub lines: Vec<SaleLine>,
    pub total: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSaleRequest {
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_contact: Option<String>,
    pub sale_date: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub lines: Vec<SaleLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleResponse {
    pub sale: Sale,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleListResponse {
    pub sales: Vec<Sale>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub animal_id: String,
    pub name: Option<String>,
    pub breed: String,
    pub sex: Sex,
    pub price: f64,
    pub pedigree: AncestorNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub buyer_name: String,
    pub buyer_contact: Option<String>,
    pub sale_date: String,
    pub lines: Vec<ReceiptLine>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenealogyCertificate {
    pub animal: Animal,
    pub depth: u32,
    pub pedigree: AncestorNode,
    pub performance: BreedingPerformance,
    pub issued_on: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let request: UpdateAnimalRequest =
            serde_json::from_str(r#"{"sire_id": null, "breed": "Rex"}"#).unwrap();

        assert_eq!(request.sire_id, Some(None));
        assert_eq!(request.dam_id, None);
        assert_eq!(request.breed.as_deref(), Some("Rex"));
    }

    #[test]
    fn test_ancestor_node_is_tagged_by_kind() {
        let node = AncestorNode::Cycle { id: "M005".to_string() };
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["kind"], "cycle");
        assert_eq!(json["id"], "M005");

        let unknown: AncestorNode = serde_json::from_str(r#"{"kind": "unknown"}"#).unwrap();
        assert_eq!(unknown, AncestorNode::Unknown);
    }

    #[test]
    fn test_enum_strings_match_serde_names() {
        for status in [
            AnimalStatus::Breeding,
            AnimalStatus::Fattening,
            AnimalStatus::ForSale,
            AnimalStatus::Sold,
            AnimalStatus::Deceased,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<AnimalStatus>().unwrap(), status);
        }
        assert!("gone".parse::<AnimalStatus>().is_err());
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!(MatingOutcome::default(), MatingOutcome::Unset);
    }
}
