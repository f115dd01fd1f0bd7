//! Formatted terminal output: per-company summaries and the priority table.
//!
//! We keep formatting code in one place so the scoring code stays clean and
//! output changes are localized.

use crate::config::ResearchConfig;
use crate::domain::{Metric, ProspectProfile, SkippedCompany};
use crate::io::profile::{FactRecord, ProfileRecord};

/// Format the full run summary (one block per researched company).
pub fn format_run_summary(profiles: &[ProspectProfile], skipped: &[SkippedCompany], config: &ResearchConfig) -> String {
    let mut out = String::new();

    out.push_str("=== prospect - Corporate Prospect Research ===\n");
    out.push_str(&format!("Cause: {}\n", config.alignment.cause));
    out.push_str(&format!(
        "Companies: {} researched, {} skipped\n",
        profiles.len(),
        skipped.len()
    ));

    for p in profiles {
        out.push('\n');
        out.push_str(&format!("{} ({})\n", p.identity.name, p.ticker));
        out.push_str(&format!("  Industry:   {}\n", or_na(p.identity.sector_label())));
        out.push_str(&format!("  Location:   {}\n", or_na(&p.identity.location())));
        out.push_str("  Financials:\n");
        for metric in Metric::ALL {
            out.push_str(&format!(
                "    {:<21} {}\n",
                metric.display_name(),
                fmt_billions(p.snapshot.get(metric).value())
            ));
        }
        out.push_str(&format!(
            "  Capacity:   {} (score {:.2}){}\n",
            p.capacity.rating.label(),
            p.capacity.score,
            if p.capacity.low_confidence { " [low confidence]" } else { "" }
        ));
        out.push_str(&format!("  Alignment:  {}\n", p.alignment.level.label()));
        for factor in &p.alignment.factors {
            out.push_str(&format!("    - {factor}\n"));
        }
        match &p.foundation {
            Some(f) => out.push_str(&format!(
                "  Foundation: {} (EIN {}) grants {}\n",
                f.name,
                f.ein,
                fmt_millions(f.grants_paid)
            )),
            None => out.push_str("  Foundation: none found\n"),
        }
        for issue in &p.issues {
            out.push_str(&format!("  ! {issue}\n"));
        }
    }

    if !skipped.is_empty() {
        out.push_str("\nSkipped:\n");
        for s in skipped {
            out.push_str(&format!("- {}: {}\n", s.company, s.reason));
        }
    }
    out.push('\n');

    out
}

/// Format the outreach priority table.
pub fn format_priority(ranked: &[&ProspectProfile]) -> String {
    let mut out = String::new();

    out.push_str("Recommended outreach priority:\n");
    out.push_str(
        format!(
            "{:>3} {:<6} {:<28} {:>8} {:<24} {:<9} {:<4}\n",
            "#", "ticker", "name", "score", "rating", "alignment", "flag"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:->3} {:-<6} {:-<28} {:->8} {:-<24} {:-<9} {:-<4}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (idx, p) in ranked.iter().enumerate() {
        out.push_str(
            format!(
                "{:>3} {:<6} {:<28} {:>8.2} {:<24} {:<9} {:<4}\n",
                idx + 1,
                truncate(&p.ticker, 6),
                truncate(&p.identity.name, 28),
                p.capacity.score,
                p.capacity.rating.label(),
                p.alignment.level.label(),
                if p.capacity.low_confidence { "LOW?" } else { "" },
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a saved profile file for `prospect show`.
pub fn format_profile_record(record: &ProfileRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!("{} ({})\n", record.company.name, record.ticker));
    out.push_str(&format!("  Industry: {}\n", or_na(&record.company.sic_description)));
    out.push_str(&format!("  State:    {}\n", or_na(&record.company.state)));

    out.push_str("  Financials:\n");
    for metric in Metric::ALL {
        out.push_str(&format!(
            "    {:<21} {}\n",
            metric.display_name(),
            fmt_fact(record.financials.get(metric))
        ));
    }

    out.push_str(&format!(
        "  Capacity:  {} (score {:.2})\n",
        record.capacity.rating, record.capacity.score
    ));
    out.push_str(&format!("  Alignment: {}\n", record.alignment.level));
    for factor in &record.alignment.factors {
        out.push_str(&format!("    - {factor}\n"));
    }

    out
}

fn fmt_fact(fact: Option<&FactRecord>) -> String {
    match fact {
        Some(f) => format!("{:>10} (period end {})", fmt_billions(Some(f.value)), f.period_end),
        None => format!("{:>10}", "N/A"),
    }
}

fn fmt_billions(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("${:.2}B", v / 1e9),
        None => "N/A".to_string(),
    }
}

fn fmt_millions(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("${:.1}M", v / 1e6),
        None => "N/A".to_string(),
    }
}

fn or_na(s: &str) -> &str {
    if s.trim().is_empty() { "N/A" } else { s }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
