use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::MatingOutcome;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatingEvent {
    pub id: String,
    pub sire_id: String,
    pub dam_id: String,
    pub mating_date: NaiveDate,
    pub expected_birth_date: NaiveDate,
    pub outcome: MatingOutcome,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatingEvent {
    pub fn generate_id() -> String {
        format!("mating::{}", Uuid::new_v4())
    }

    pub fn involves(&self, animal_id: &str) -> bool {
        self.sire_id == animal_id || self.dam_id == animal_id
    }
}

/// Largest litter accepted at kindling. Recorded rabbit litters stay well below this.
pub const MAX_LITTER_SIZE: u32 = 30;

/// Litter counts as entered at kindling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LitterCounts {
    pub total_born: u32,
    pub stillborn: u32,
    pub survivors_24h: u32,
    pub survivors_48h: u32,
}

impl LitterCounts {
    pub fn born_alive(&self) -> u32 {
        self.total_born.saturating_sub(self.stillborn)
    }

    /// Check `total_born <= MAX_LITTER_SIZE`, `stillborn <= total_born`,
    /// `survivors_24h <= born alive` and `survivors_48h <= survivors_24h`
    pub fn validate(&self) -> Result<(), LitterValidationError> {
        if self.total_born > MAX_LITTER_SIZE {
            return Err(LitterValidationError::LitterTooLarge(self.total_born));
        }
        if self.stillborn > self.total_born {
            return Err(LitterValidationError::StillbornExceedsTotal);
        }
        if self.survivors_24h > self.born_alive() {
            return Err(LitterValidationError::Survivors24hExceedBornAlive);
        }
        if self.survivors_48h > self.survivors_24h {
            return Err(LitterValidationError::Survivors48hExceed24h);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LitterValidationError {
    #[error("Litter of {0} exceeds the maximum of {max} kits", max = MAX_LITTER_SIZE)]
    LitterTooLarge(u32),
    #[error("Stillborn count cannot exceed total born")]
    StillbornExceedsTotal,
    #[error("Survivors at 24h cannot exceed kits born alive")]
    Survivors24hExceedBornAlive,
    #[error("Survivors at 48h cannot exceed survivors at 24h")]
    Survivors48hExceed24h,
    #[error("Weaned count cannot exceed survivors at 48h")]
    WeanedExceedsSurvivors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthEvent {
    pub id: String,
    pub mating_id: String,
    pub birth_date: NaiveDate,
    pub counts: LitterCounts,
    pub weaned: Option<u32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BirthEvent {
    pub fn generate_id() -> String {
        format!("birth::{}", Uuid::new_v4())
    }

    pub fn validate_weaned(&self, weaned: u32) -> Result<(), LitterValidationError> {
        if weaned > self.counts.survivors_48h {
            return Err(LitterValidationError::WeanedExceedsSurvivors);
        }
        Ok(())
    }
}

/// Aggregated breeding results for one animal
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
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
    pub survival_rate: Option<f64>,
    pub fertility_rate: Option<f64>,
}

impl BreedingPerformance {
    /// Aggregate the events of one animal. Matings not involving the animal
    /// and births whose mating is not in `matings` are ignored.
    pub fn aggregate(animal_id: &str, matings: &[MatingEvent], births: &[BirthEvent]) -> Self {
        let mut perf = BreedingPerformance {
            animal_id: animal_id.to_string(),
            ..Default::default()
        };

        let own_matings: Vec<&MatingEvent> =
            matings.iter().filter(|m| m.involves(animal_id)).collect();

        for mating in &own_matings {
            perf.matings = perf.matings.saturating_add(1);
            match mating.outcome {
                shared::MatingOutcome::Success => {
                    perf.successful_matings = perf.successful_matings.saturating_add(1)
                }
                shared::MatingOutcome::Failure => {
                    perf.failed_matings = perf.failed_matings.saturating_add(1)
                }
                shared::MatingOutcome::Unset => {}
            }
        }

        // Rows written before the litter cap existed may still be oversized
        for birth in births
            .iter()
            .filter(|b| own_matings.iter().any(|m| m.id == b.mating_id))
        {
            let counts = &birth.counts;
            perf.litters = perf.litters.saturating_add(1);
            perf.total_born = perf.total_born.saturating_add(counts.total_born);
            perf.stillborn = perf.stillborn.saturating_add(counts.stillborn);
            perf.born_alive = perf.born_alive.saturating_add(counts.born_alive());
            perf.survivors_24h = perf.survivors_24h.saturating_add(counts.survivors_24h);
            perf.survivors_48h = perf.survivors_48h.saturating_add(counts.survivors_48h);
            perf.weaned = perf.weaned.saturating_add(birth.weaned.unwrap_or(0));
        }

        perf.survival_rate = ratio(perf.survivors_48h, perf.born_alive);
        perf.fertility_rate = ratio(
            perf.successful_matings,
            perf.successful_matings.saturating_add(perf.failed_matings),
        );
        perf
    }
}

fn ratio(numerator: u32, denominator: u32) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}
