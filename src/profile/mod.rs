//! Prospect profile assembly.
//!
//! Pure aggregation: no scoring happens here. The only check is that the company
//! has a ticker, since the ticker keys every output file and CRM record.

use chrono::{DateTime, Local};

use crate::domain::{
    AlignmentAssessment, CapacityScore, CompanyIdentity, FinancialSnapshot, FoundationRecord, ProspectProfile,
};
use crate::error::AppError;

/// Everything computed for one company, ready to be combined.
#[derive(Debug, Clone)]
pub struct ProfileParts {
    pub identity: CompanyIdentity,
    pub snapshot: FinancialSnapshot,
    pub foundation: Option<FoundationRecord>,
    pub capacity: CapacityScore,
    pub alignment: AlignmentAssessment,
    pub issues: Vec<String>,
}

/// Combine the parts into one immutable profile stamped with its ticker.
///
/// Returns an `IdentityInvalid` error when the ticker is blank; the caller skips
/// that company and carries on with the rest.
pub fn assemble_profile(parts: ProfileParts, researched_at: DateTime<Local>) -> Result<ProspectProfile, AppError> {
    let ticker = parts.identity.ticker.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(AppError::identity(format!(
            "Company '{}' has no ticker; skipping.",
            parts.identity.name
        )));
    }

    let mut identity = parts.identity;
    identity.ticker = ticker.clone();

    Ok(ProspectProfile {
        ticker,
        identity,
        snapshot: parts.snapshot,
        foundation: parts.foundation,
        capacity: parts.capacity,
        alignment: parts.alignment,
        issues: parts.issues,
        researched_at,
    })
}
