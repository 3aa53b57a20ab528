use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::error::VisaDataError;
use crate::region::Region;

const EMBEDDED_DATASET: &str = include_str!("../data/visa_data.json");

/// One destination the agency processes visas for
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CountryVisaRecord {
    #[serde(rename = "country")]
    pub name: String,
    pub snippet: String,
    pub url: String,
}

/// Read-only knowledge base of country records.
///
/// Built once at startup; lookups compare names case-insensitively.
#[derive(Debug, Clone)]
pub struct VisaDb {
    countries: Vec<CountryVisaRecord>,
    // Lowercased, trimmed copies of `countries[i].name`
    lowercase_names: Vec<String>,
}

impl VisaDb {
    pub fn from_records(countries: Vec<CountryVisaRecord>) -> Result<Self, VisaDataError> {
        if countries.is_empty() {
            return Err(VisaDataError::Empty);
        }

        let mut seen = HashSet::new();
        let mut lowercase_names = Vec::with_capacity(countries.len());

        for (index, country) in countries.iter().enumerate() {
            let name = country.name.trim().to_lowercase();
            if name.is_empty() {
                return Err(VisaDataError::BlankName { index });
            }
            if !seen.insert(name.clone()) {
                return Err(VisaDataError::DuplicateCountry {
                    name: country.name.clone(),
                });
            }
            lowercase_names.push(name);
        }

        Ok(Self {
            countries,
            lowercase_names,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, VisaDataError> {
        let countries: Vec<CountryVisaRecord> = serde_json::from_str(content)?;
        Self::from_records(countries)
    }

    /// The dataset compiled into the binary
    pub fn embedded() -> Result<Self, VisaDataError> {
        Self::from_json(EMBEDDED_DATASET)
    }

    pub async fn load_from_json(path: impl AsRef<Path>) -> Result<Self, VisaDataError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| VisaDataError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let db = Self::from_json(&content)?;
        info!(path = %path.display(), countries = db.len(), "Loaded visa dataset");
        Ok(db)
    }

    pub fn countries(&self) -> &[CountryVisaRecord] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&CountryVisaRecord> {
        let wanted = name.trim().to_lowercase();
        self.lowercase_names
            .iter()
            .position(|n| *n == wanted)
            .map(|i| &self.countries[i])
    }

    /// Find the country a free-text query is about.
    ///
    /// A country matches when its name appears inside the query. When
    /// several names appear, the longest wins; ties keep dataset order.
    pub fn find_country(&self, query: &str) -> Option<&CountryVisaRecord> {
        let query = query.to_lowercase();
        let mut best: Option<usize> = None;

        for (i, name) in self.lowercase_names.iter().enumerate() {
            if !query.contains(name.as_str()) {
                continue;
            }
            match best {
                Some(b) if self.lowercase_names[b].len() >= name.len() => {}
                _ => best = Some(i),
            }
        }

        best.map(|i| &self.countries[i])
    }

    /// Countries of a region in the region table's order.
    ///
    /// Members missing from the dataset are skipped.
    pub fn countries_in_region(&self, region: Region) -> Vec<&CountryVisaRecord> {
        region
            .members()
            .iter()
            .filter_map(|member| {
                let found = self.get_by_name(member);
                if found.is_none() {
                    debug!(region = region.as_str(), member, "Region member not in dataset");
                }
                found
            })
            .collect()
    }
}
