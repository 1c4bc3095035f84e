//! Company seeds from a CSV file.

use super::{dedupe_by_domain, CompanySource};
use crate::core::{CompanySeed, ContactHints};
use crate::errors::SourceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const COMPANY_COLUMN: &str = "Company name";
const DOMAIN_COLUMN: &str = "Domain";

/// Reads seeds from a CSV with `Company name` and `Domain` headers.
///
/// Optional hint columns (`Name`, `Email`, `Phone`, `LinkedIn`, `Job title`,
/// `Department`, `Seniority`) are matched case-insensitively. Domains are
/// trimmed and lowercased, and later rows repeating a domain are dropped.
#[derive(Debug, Clone)]
pub struct CsvCompanySource {
    path: PathBuf,
}

impl CsvCompanySource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses seeds out of CSV text.
    pub fn parse(text: &str) -> Result<Vec<CompanySeed>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let company_idx = column(COMPANY_COLUMN)
            .ok_or_else(|| SourceError(format!("missing '{COMPANY_COLUMN}' column")))?;
        let domain_idx = column(DOMAIN_COLUMN)
            .ok_or_else(|| SourceError(format!("missing '{DOMAIN_COLUMN}' column")))?;
        let hint_idx = [
            column("Name"),
            column("Email"),
            column("Phone"),
            column("LinkedIn"),
            column("Job title"),
            column("Department"),
            column("Seniority"),
        ];

        let mut seeds = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(ToString::to_string)
            };
            let company_name = field(Some(company_idx)).unwrap_or_default();
            let domain = field(Some(domain_idx)).unwrap_or_default().to_lowercase();
            if company_name.is_empty() && domain.is_empty() {
                continue;
            }
            let [name, email, phone, linkedin_url, job_title, department, seniority] = hint_idx.map(field);
            seeds.push(CompanySeed::new(company_name, domain).with_hints(ContactHints {
                name,
                email,
                phone,
                linkedin_url,
                job_title,
                department,
                seniority,
            }));
        }

        let total = seeds.len();
        let seeds = dedupe_by_domain(seeds);
        if seeds.len() < total {
            debug!(dropped = total - seeds.len(), "Dropped rows with repeated domains");
        }
        Ok(seeds)
    }
}

#[async_trait]
impl CompanySource for CsvCompanySource {
    async fn load(&self) -> Result<Vec<CompanySeed>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError(format!("{}: {e}", self.path.display())))?;
        let seeds = Self::parse(&text)?;
        info!(path = %self.path.display(), companies = seeds.len(), "Loaded companies");
        Ok(seeds)
    }
}
