//! Dataset descriptors
//!
//! A [`Dataset`] describes what gets registered under a DOI. It deserializes
//! from JSON using the DataCite-style camelCase keys:
//!
//! ```json
//! {
//!     "creators": [{"creatorName": "Andrew McMahon", "givenName": "Andrew", "familyName": "McMahon"}],
//!     "titles": ["Whole-mount 3D views of the human nephrogenic niche and kidneys"],
//!     "descriptions": ["A collection of human embryonic and fetal 3D views ..."],
//!     "publisher": "GUDMAP Consortium (www.gudmap.org)",
//!     "subjects": ["Dataset", "Biology", "Kidney"],
//!     "resourceType": "Dataset",
//!     "fundingReferences": [{"funderName": "National Institute of Health (NIH)", "awardNumber": "5U24DK110814"}],
//!     "rid": "R-1234",
//!     "url": "https://www.gudmap.org/chaise/record/#2/Common:Collection/RID=R-1234"
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataciteError, Result};
use crate::projects::Project;

/// Some(trimmed) unless the value is missing or blank
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl Creator {
    pub fn new(creator_name: impl Into<String>) -> Self {
        Self {
            creator_name: Some(creator_name.into()),
            ..Default::default()
        }
    }

    pub fn with_given_name(mut self, given: impl Into<String>) -> Self {
        self.given_name = Some(given.into());
        self
    }

    pub fn with_family_name(mut self, family: impl Into<String>) -> Self {
        self.family_name = Some(family.into());
        self
    }

    pub fn with_orcid(mut self, orcid: impl Into<String>) -> Self {
        self.orcid = Some(orcid.into());
        self
    }

    pub fn creator_name(&self) -> Option<&str> {
        present(&self.creator_name)
    }

    pub fn given_name(&self) -> Option<&str> {
        present(&self.given_name)
    }

    pub fn family_name(&self) -> Option<&str> {
        present(&self.family_name)
    }

    pub fn orcid(&self) -> Option<&str> {
        present(&self.orcid)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funder_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funder_identifier_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_number: Option<String>,
    #[serde(
        default,
        rename = "awardURI",
        skip_serializing_if = "Option::is_none"
    )]
    pub award_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub award_title: Option<String>,
}

impl FundingReference {
    pub fn funder_name(&self) -> Option<&str> {
        present(&self.funder_name)
    }

    pub fn funder_identifier(&self) -> Option<&str> {
        present(&self.funder_identifier)
    }

    pub fn funder_identifier_type(&self) -> Option<&str> {
        present(&self.funder_identifier_type)
    }

    pub fn award_number(&self) -> Option<&str> {
        present(&self.award_number)
    }

    pub fn award_uri(&self) -> Option<&str> {
        present(&self.award_uri)
    }

    pub fn award_title(&self) -> Option<&str> {
        present(&self.award_title)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub creators: Option<Vec<Creator>>,
    #[serde(default)]
    pub titles: Option<Vec<String>>,
    #[serde(default)]
    pub descriptions: Option<Vec<String>>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publication_year: Option<String>,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub funding_references: Option<Vec<FundingReference>>,
    /// Catalog record id, used as the DOI suffix
    #[serde(default)]
    pub rid: Option<String>,
    /// Landing page registered for the DOI
    #[serde(default)]
    pub url: Option<String>,
}

impl Dataset {
    pub fn new(creators: Vec<Creator>, titles: Vec<String>) -> Self {
        Self {
            creators: Some(creators),
            titles: Some(titles),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DataciteError::Validation(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DataciteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Creators and titles are mandatory and must be non-empty
    pub fn validate(&self) -> Result<()> {
        let has_creators = self.creators.as_ref().is_some_and(|c| !c.is_empty());
        let has_titles = self.titles.as_ref().is_some_and(|t| !t.is_empty());
        if has_creators && has_titles {
            Ok(())
        } else {
            Err(DataciteError::Validation(
                "creators, titles are mandatory".to_string(),
            ))
        }
    }

    pub fn rid(&self) -> Option<&str> {
        present(&self.rid)
    }

    pub fn url(&self) -> Option<&str> {
        present(&self.url)
    }

    /// Fill publisher and funding from a consortium project when absent
    pub fn apply_project(&mut self, project: &Project) {
        if present(&self.publisher).is_none() {
            self.publisher = Some(project.publisher.to_string());
        }
        if self
            .funding_references
            .as_ref()
            .map_or(true, |f| f.is_empty())
        {
            self.funding_references = Some(vec![project.funding_reference()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "creators": [{"creatorName": "Andrew McMahon", "givenName": "Andrew", "familyName": "McMahon"}],
            "titles": ["Whole-mount 3D views"],
            "publicationYear": "2019",
            "resourceType": "Video",
            "fundingReferences": [{"funderName": "NIH", "awardNumber": "5U24DK110814", "awardURI": "https://reporter.nih.gov/x"}],
            "rid": "R-1234"
        }"#;
        let dataset = Dataset::from_json(json).unwrap();

        let creators = dataset.creators.as_ref().unwrap();
        assert_eq!(creators[0].given_name(), Some("Andrew"));
        assert_eq!(creators[0].orcid(), None);
        assert_eq!(dataset.publication_year.as_deref(), Some("2019"));
        assert_eq!(dataset.resource_type.as_deref(), Some("Video"));
        let funder = &dataset.funding_references.as_ref().unwrap()[0];
        assert_eq!(funder.award_uri(), Some("https://reporter.nih.gov/x"));
        assert_eq!(dataset.rid(), Some("R-1234"));
        assert_eq!(dataset.url(), None);
    }

    #[test]
    fn test_validate_requires_creators_and_titles() {
        assert!(Dataset::new(vec![Creator::new("A")], vec!["T".into()])
            .validate()
            .is_ok());

        let no_titles = Dataset {
            creators: Some(vec![Creator::new("A")]),
            ..Default::default()
        };
        assert!(matches!(
            no_titles.validate(),
            Err(DataciteError::Validation(_))
        ));

        let no_creators = Dataset {
            titles: Some(vec!["T".into()]),
            ..Default::default()
        };
        assert!(no_creators.validate().is_err());

        let empty_creators = Dataset::new(vec![], vec!["T".into()]);
        assert!(empty_creators.validate().is_err());
    }

    #[test]
    fn test_blank_fields_are_absent() {
        let creator = Creator {
            creator_name: Some("A".into()),
            given_name: Some("   ".into()),
            family_name: Some(String::new()),
            orcid: None,
        };
        assert_eq!(creator.creator_name(), Some("A"));
        assert_eq!(creator.given_name(), None);
        assert_eq!(creator.family_name(), None);
    }

    #[test]
    fn test_apply_project_keeps_explicit_values() {
        let gudmap = crate::projects::project("GUDMAP").unwrap();

        let mut bare = Dataset::new(vec![Creator::new("A")], vec!["T".into()]);
        bare.apply_project(gudmap);
        assert_eq!(bare.publisher.as_deref(), Some(gudmap.publisher));
        assert_eq!(bare.funding_references.as_ref().unwrap().len(), 1);

        let mut explicit = Dataset::new(vec![Creator::new("A")], vec!["T".into()]);
        explicit.publisher = Some("Someone else".into());
        explicit.apply_project(gudmap);
        assert_eq!(explicit.publisher.as_deref(), Some("Someone else"));
    }
}
