//! Export the outreach priority list to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or CRM bulk imports.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ProspectProfile;
use crate::error::AppError;

/// Write ranked profiles to a CSV file, one row per company in priority order.
pub fn write_priority_csv(path: &Path, ranked: &[&ProspectProfile]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    // Header
    writeln!(
        file,
        "rank,ticker,name,city,score,rating,alignment,foundation,low_confidence"
    )
    .map_err(|e| AppError::output(format!("Failed to write export CSV header: {e}")))?;

    for (idx, p) in ranked.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{:.4},{},{},{},{}",
            idx + 1,
            csv_field(&p.ticker),
            csv_field(&p.identity.name),
            csv_field(p.identity.city.as_deref().unwrap_or("")),
            p.capacity.score,
            csv_field(p.capacity.rating.label()),
            p.alignment.level.label(),
            csv_field(p.foundation.as_ref().map(|f| f.name.as_str()).unwrap_or("")),
            p.capacity.low_confidence,
        )
        .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Quote a field when it contains a delimiter, quote or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(csv_field("TGT"), "TGT");
        assert_eq!(csv_field("Best Buy Co., Inc."), "\"Best Buy Co., Inc.\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
