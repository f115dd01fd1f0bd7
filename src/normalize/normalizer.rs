//! Raw payload → domain record normalization.
//!
//! Inputs are the untyped JSON bodies returned by SEC EDGAR (submissions and
//! XBRL company facts) and ProPublica Nonprofit Explorer (search and
//! organization detail). Outputs are `CompanyIdentity`, `FinancialSnapshot`
//! and `FoundationRecord`.
//!
//! Nothing in here fails: a field that cannot be resolved degrades to
//! "unavailable" and the remaining fields are still normalized.

use chrono::NaiveDate;
use serde_json::Value;

use crate::config::{CompanyConfig, TaxonomyConfig};
use crate::domain::{
    CompanyIdentity, Fact, FactValue, FinancialSnapshot, FoundationFiling, FoundationRecord, Metric,
};
use crate::normalize::resolver::{
    FieldPath, as_date, as_f64, as_text, paths, resolve, resolve_date, resolve_f64, resolve_str,
};

/// Search hits considered when looking for an affiliated foundation.
const FOUNDATION_SEARCH_DEPTH: usize = 10;
/// Recent 990 filings kept on the foundation record.
const RECENT_FILINGS: usize = 3;
/// Shortest duration (days) accepted as a full fiscal year for flow concepts.
const MIN_ANNUAL_DAYS: i64 = 300;

/// Build the company identity from configuration plus the registry payload.
///
/// Registry values win where present; the configured name, city and state fill
/// the gaps, so a missing payload still yields a usable identity.
pub fn normalize_identity(company: &CompanyConfig, metadata: Option<&Value>) -> CompanyIdentity {
    let empty = Value::Null;
    let meta = metadata.unwrap_or(&empty);

    let description = match (
        resolve_str(meta, &paths(&["description"])),
        company.description.as_deref().map(str::trim).filter(|d| !d.is_empty()),
    ) {
        (Some(registry), Some(extra)) => Some(format!("{registry} {extra}")),
        (Some(registry), None) => Some(registry),
        (None, Some(extra)) => Some(extra.to_string()),
        (None, None) => None,
    };

    CompanyIdentity {
        ticker: company.ticker.trim().to_ascii_uppercase(),
        name: resolve_str(meta, &paths(&["name", "entityName"])).unwrap_or_else(|| company.name.trim().to_string()),
        cik: resolve_str(meta, &paths(&["cik"])).map(|cik| pad_cik(&cik)),
        sic: resolve_str(meta, &paths(&["sic"])),
        sic_description: resolve_str(meta, &paths(&["sicDescription", "sic_description"])),
        city: company
            .city
            .clone()
            .or_else(|| resolve_str(meta, &paths(&["addresses.business.city"]))),
        state: resolve_str(meta, &paths(&["stateOfIncorporation", "addresses.business.stateOrCountry"]))
            .or_else(|| company.state.clone()),
        fiscal_year_end: resolve_str(meta, &paths(&["fiscalYearEnd"])),
        description,
    }
}

/// Zero-pad a CIK to the 10 digits EDGAR URLs expect.
pub fn pad_cik(raw: &str) -> String {
    format!("{:0>10}", raw.trim())
}

/// Build the financial snapshot from an XBRL company-facts payload.
///
/// `None` (source unavailable) yields an all-unavailable snapshot.
pub fn normalize_snapshot(facts: Option<&Value>, taxonomy: &TaxonomyConfig) -> FinancialSnapshot {
    let Some(facts) = facts else {
        return FinancialSnapshot::unavailable();
    };

    Metric::ALL.into_iter().fold(FinancialSnapshot::unavailable(), |snapshot, metric| {
        let value = resolve_metric(facts, taxonomy.tags.for_metric(metric), taxonomy);
        if !value.is_present() {
            tracing::debug!(metric = metric.key(), "no usable annual fact; marking unavailable");
        }
        snapshot.with(metric, value)
    })
}

/// Resolve one metric across its ordered tag list.
///
/// Each tag contributes its latest annual fact. The most recent period wins;
/// on equal periods the earlier tag in the list wins, so a tag that stopped
/// being reported years ago cannot shadow its current replacement.
pub fn resolve_metric(facts: &Value, tags: &[String], taxonomy: &TaxonomyConfig) -> FactValue {
    let mut best: Option<Fact> = None;
    for tag in tags {
        let Some(fact) = latest_for_tag(facts, tag, taxonomy) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| fact.period_end > b.period_end) {
            best = Some(fact);
        }
    }
    best.map_or(FactValue::Unavailable, FactValue::Present)
}

fn latest_for_tag(facts: &Value, tag: &str, taxonomy: &TaxonomyConfig) -> Option<Fact> {
    let concept = FieldPath::parse(tag).under("facts").lookup(facts)?;
    taxonomy.units.iter().find_map(|unit| {
        let entries = FieldPath::from_segments(["units", unit.name.as_str()])
            .lookup(concept)?
            .as_array()?;
        let entry = entries
            .iter()
            .filter_map(|entry| parse_entry(entry, &taxonomy.annual_forms))
            .max_by(|a, b| (a.end, a.filed).cmp(&(b.end, b.filed)))?;
        Some(Fact {
            value: entry.value * unit.scale,
            period_end: entry.end,
            tag: tag.to_string(),
            form: Some(entry.form),
            fiscal_year: entry.fiscal_year,
        })
    })
}

struct FactEntry {
    value: f64,
    end: NaiveDate,
    filed: Option<NaiveDate>,
    form: String,
    fiscal_year: Option<i32>,
}

fn parse_entry(entry: &Value, annual_forms: &[String]) -> Option<FactEntry> {
    let form = entry.get("form").and_then(as_text)?;
    if !annual_forms.iter().any(|f| f.eq_ignore_ascii_case(&form)) {
        return None;
    }
    let end = entry.get("end").and_then(as_date)?;
    // Flow concepts carry a start date; quarter-length durations inside an
    // annual filing are not the fiscal-year figure.
    if let Some(start) = entry.get("start").and_then(as_date)
        && (end - start).num_days() < MIN_ANNUAL_DAYS
    {
        return None;
    }
    Some(FactEntry {
        value: entry.get("val").and_then(as_f64)?,
        end,
        filed: entry.get("filed").and_then(as_date),
        form,
        fiscal_year: entry.get("fy").and_then(as_f64).map(|fy| fy as i32),
    })
}

/// A foundation picked out of a philanthropic search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundationMatch {
    pub name: String,
    pub ein: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Queries tried, in order, when searching for a company's foundation.
pub fn foundation_search_terms(company_name: &str) -> Vec<String> {
    let name = company_name.trim();
    let mut terms = vec![format!("{name} foundation")];
    if let Some(first) = name.split_whitespace().next() {
        let short = format!("{first} foundation");
        if !terms.contains(&short) {
            terms.push(short);
        }
    }
    terms
}

/// Pick the company's foundation from a search result, if one is listed.
///
/// A hit must contain the company's first word and `FOUNDATION`. Only the first
/// few hits are considered; the search ranks by relevance.
pub fn select_foundation(search: &Value, company_name: &str) -> Option<FoundationMatch> {
    let company_word = company_name.split_whitespace().next()?.to_uppercase();
    let orgs = resolve(search, &paths(&["organizations"]))?.as_array()?;

    orgs.iter().take(FOUNDATION_SEARCH_DEPTH).find_map(|org| {
        let name = resolve_str(org, &paths(&["name"]))?;
        let upper = name.to_uppercase();
        if !(upper.contains(&company_word) && upper.contains("FOUNDATION")) {
            return None;
        }
        Some(FoundationMatch {
            name,
            ein: resolve_str(org, &paths(&["ein", "strein"]))?,
            city: resolve_str(org, &paths(&["city"])),
            state: resolve_str(org, &paths(&["state"])),
        })
    })
}

/// Build the foundation record from the search match plus the 990 detail payload.
pub fn normalize_foundation(found: &FoundationMatch, detail: Option<&Value>) -> FoundationRecord {
    let empty = Value::Null;
    let detail = detail.unwrap_or(&empty);

    let recent_filings: Vec<FoundationFiling> = resolve(detail, &paths(&["filings_with_data"]))
        .and_then(Value::as_array)
        .map(|filings| filings.iter().take(RECENT_FILINGS).map(normalize_filing).collect())
        .unwrap_or_default();

    FoundationRecord {
        name: resolve_str(detail, &paths(&["organization.name"])).unwrap_or_else(|| found.name.clone()),
        ein: found.ein.clone(),
        city: resolve_str(detail, &paths(&["organization.city"])).or_else(|| found.city.clone()),
        state: resolve_str(detail, &paths(&["organization.state"])).or_else(|| found.state.clone()),
        assets: resolve_f64(
            detail,
            &paths(&["organization.asset_amount", "filings_with_data.0.totassetsend"]),
        ),
        revenue: resolve_f64(
            detail,
            &paths(&["organization.income_amount", "organization.revenue_amount", "filings_with_data.0.totrevenue"]),
        ),
        grants_paid: recent_filings.first().and_then(|f| f.grants_paid),
        ruling_date: resolve_date(detail, &paths(&["organization.ruling_date"])),
        recent_filings,
    }
}

fn normalize_filing(filing: &Value) -> FoundationFiling {
    FoundationFiling {
        year: resolve_f64(filing, &paths(&["tax_prd_yr"])).map(|y| y as i32),
        revenue: resolve_f64(filing, &paths(&["totrevenue"])),
        expenses: resolve_f64(filing, &paths(&["totfuncexpns"])),
        assets: resolve_f64(filing, &paths(&["totassetsend"])),
        grants_paid: resolve_f64(filing, &paths(&["contrpdpbks", "grntstogovt"])),
    }
}
