//! Maps a diagnosis code to a triage level under a selected classifier
//! variant (spec.md §4.2, component C2). A fixed lookup table per variant;
//! no clinical reasoning lives here.

mod error;
mod tables;

pub use error::ClassifierError;
use shared_models::{TriageClassifierVariant, TriageLevel};

/// Classify `diagnosis_code` (1..=17) under `variant`. Total for valid codes,
/// `ClassifierError::UnknownDiagnosis` otherwise (spec.md §4.2, §7
/// "Classification" — fatal per-call, since an out-of-range code indicates a
/// bug in the caller rather than a data condition to recover from).
pub fn classify(variant: TriageClassifierVariant, diagnosis_code: u8) -> Result<TriageLevel, ClassifierError> {
    let table: &[TriageLevel; 17] = match variant {
        TriageClassifierVariant::Ctas => &tables::CTAS_TABLE,
        TriageClassifierVariant::Esi => &tables::ESI_TABLE,
        TriageClassifierVariant::Mts => &tables::MTS_TABLE,
    };

    let index = diagnosis_code
        .checked_sub(1)
        .filter(|i| (*i as usize) < table.len())
        .ok_or(ClassifierError::UnknownDiagnosis(diagnosis_code))?;

    Ok(table[index as usize])
}
