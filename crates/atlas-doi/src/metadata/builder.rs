//! Resource tree builders
//!
//! Each `add_*` function appends one DataCite element (or group) to `parent`
//! and returns the new node so callers can keep composing.

use chrono::Datelike;

use super::{DataCiteXmlMetadata, Element};
use crate::dataset::{Creator, Dataset, FundingReference};
use crate::error::Result;

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_RESOURCE_TYPE: &str = "Dataset";
pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_SUBJECT: &str = "Dataset";

pub const ORCID_SCHEME_URI: &str = "http://orcid.org/";

/// `resourceTypeGeneral` for the resource types we publish
pub fn resource_type_general(resource_type: &str) -> Option<&'static str> {
    match resource_type {
        "Dataset" => Some("Dataset"),
        "Video" => Some("Audiovisual"),
        _ => None,
    }
}

pub fn current_year() -> String {
    chrono::Local::now().year().to_string()
}

pub fn add_identifier<'a>(parent: &'a mut Element, identifier: &str) -> &'a mut Element {
    let id = parent.append("identifier");
    id.set_attr("identifierType", "DOI").set_text(identifier);
    id
}

pub fn add_creator<'a>(parent: &'a mut Element, info: &Creator) -> &'a mut Element {
    let creator = parent.append("creator");
    if let Some(name) = info.creator_name() {
        creator.append("creatorName").set_text(name);
    }
    if let Some(given) = info.given_name() {
        creator.append("givenName").set_text(given);
    }
    if let Some(family) = info.family_name() {
        creator.append("familyName").set_text(family);
    }
    if let Some(orcid) = info.orcid() {
        creator
            .append("nameIdentifier")
            .set_attr("schemeURI", ORCID_SCHEME_URI)
            .set_attr("nameIdentifierScheme", "ORCID")
            .set_text(orcid);
    }
    creator
}

pub fn add_creators<'a>(parent: &'a mut Element, creators: &[Creator]) -> &'a mut Element {
    let cs = parent.append("creators");
    for creator in creators {
        add_creator(cs, creator);
    }
    cs
}

pub fn add_titles<'a>(parent: &'a mut Element, titles: &[String]) -> &'a mut Element {
    let ts = parent.append("titles");
    for title in titles {
        ts.append("title").set_attr("xml:lang", "en").set_text(title.as_str());
    }
    ts
}

pub fn add_publisher<'a>(parent: &'a mut Element, publisher: &str) -> &'a mut Element {
    let publ = parent.append("publisher");
    publ.set_text(publisher);
    publ
}

/// `None` means the current calendar year
pub fn add_publication_year<'a>(parent: &'a mut Element, year: Option<&str>) -> &'a mut Element {
    let year = year.map(str::to_string).unwrap_or_else(current_year);
    let pub_year = parent.append("publicationYear");
    pub_year.set_text(year);
    pub_year
}

pub fn add_alternative_identifier<'a>(parent: &'a mut Element, alt_id: &str) -> &'a mut Element {
    let id = parent.append("alternativeIdentifier");
    id.set_text(alt_id);
    id
}

/// `None` means `["Dataset"]`
pub fn add_subjects<'a>(parent: &'a mut Element, subjects: Option<&[String]>) -> &'a mut Element {
    let default = [DEFAULT_SUBJECT.to_string()];
    let subjects = subjects.unwrap_or(&default);
    let subs = parent.append("subjects");
    for s in subjects {
        subs.append("subject").set_attr("xml:lang", "en").set_text(s.as_str());
    }
    subs
}

pub fn add_language<'a>(parent: &'a mut Element, language: Option<&str>) -> &'a mut Element {
    let lang = parent.append("language");
    lang.set_text(language.unwrap_or(DEFAULT_LANGUAGE));
    lang
}

/// Types outside the general-type table are emitted without `resourceTypeGeneral`
pub fn add_resource_type<'a>(
    parent: &'a mut Element,
    resource_type: Option<&str>,
) -> &'a mut Element {
    let resource_type = resource_type.unwrap_or(DEFAULT_RESOURCE_TYPE);
    let rtype = parent.append("resourceType");
    if let Some(general) = resource_type_general(resource_type) {
        rtype.set_attr("resourceTypeGeneral", general);
    }
    rtype.set_text(resource_type);
    rtype
}

pub fn add_version<'a>(parent: &'a mut Element, version: Option<&str>) -> &'a mut Element {
    let v = parent.append("version");
    v.set_text(version.unwrap_or(DEFAULT_VERSION));
    v
}

pub fn add_descriptions<'a>(parent: &'a mut Element, descriptions: &[String]) -> &'a mut Element {
    let descs = parent.append("descriptions");
    for description in descriptions {
        descs
            .append("description")
            .set_attr("xml:lang", "en")
            .set_attr("descriptionType", "Abstract")
            .set_text(description.as_str());
    }
    descs
}

pub fn add_funding_reference<'a>(
    parent: &'a mut Element,
    info: &FundingReference,
) -> &'a mut Element {
    let funder = parent.append("fundingReference");
    if let Some(name) = info.funder_name() {
        funder.append("funderName").set_text(name);
    }
    if let Some(identifier) = info.funder_identifier() {
        let id = funder.append("funderIdentifier");
        id.set_text(identifier);
        if let Some(kind) = info.funder_identifier_type() {
            id.set_attr("funderIdentifierType", kind);
        }
    }
    if let Some(number) = info.award_number() {
        let award = funder.append("awardNumber");
        award.set_text(number);
        if let Some(uri) = info.award_uri() {
            award.set_attr("awardURI", uri);
        }
    }
    if let Some(title) = info.award_title() {
        funder.append("awardTitle").set_text(title);
    }
    funder
}

pub fn add_funding_references<'a>(
    parent: &'a mut Element,
    funders: &[FundingReference],
) -> &'a mut Element {
    let fs = parent.append("fundingReferences");
    for funder in funders {
        add_funding_reference(fs, funder);
    }
    fs
}

/// Assemble the full resource document for `doi`.
///
/// Fails before touching anything if creators or titles are missing.
/// Publication year, language, resource type and version fall back to their
/// defaults; the other optional sections are omitted when absent.
pub fn build_resource(doi: &str, dataset: &Dataset) -> Result<DataCiteXmlMetadata> {
    dataset.validate()?;

    let mut doc = DataCiteXmlMetadata::new();
    let root = doc.resource_mut();

    add_identifier(root, doi);

    if let Some(creators) = &dataset.creators {
        add_creators(root, creators);
    }
    if let Some(titles) = &dataset.titles {
        add_titles(root, titles);
    }
    if let Some(descriptions) = &dataset.descriptions {
        add_descriptions(root, descriptions);
    }
    if let Some(publisher) = &dataset.publisher {
        add_publisher(root, publisher);
    }
    add_publication_year(root, dataset.publication_year.as_deref());
    if let Some(subjects) = &dataset.subjects {
        add_subjects(root, Some(subjects.as_slice()));
    }
    add_language(root, dataset.language.as_deref());
    add_resource_type(root, dataset.resource_type.as_deref());
    add_version(root, dataset.version.as_deref());
    if let Some(funders) = &dataset.funding_references {
        add_funding_references(root, funders);
    }

    Ok(doc)
}

/// Build and write the resource document to `path`
pub fn create_datacite_metadata(
    doi: &str,
    path: impl AsRef<std::path::Path>,
    dataset: &Dataset,
) -> Result<DataCiteXmlMetadata> {
    let doc = build_resource(doi, dataset)?;
    doc.write_resource_file(path)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::create_resource_tree;

    #[test]
    fn test_resource_type_general_table() {
        assert_eq!(resource_type_general("Dataset"), Some("Dataset"));
        assert_eq!(resource_type_general("Video"), Some("Audiovisual"));
        assert_eq!(resource_type_general("Image"), None);
    }

    #[test]
    fn test_unknown_resource_type_has_no_general_attribute() {
        let mut root = create_resource_tree();
        let rtype = add_resource_type(&mut root, Some("Image"));
        assert_eq!(rtype.text(), Some("Image"));
        assert!(rtype.attr("resourceTypeGeneral").is_none());
    }

    #[test]
    fn test_creator_optional_fields() {
        let mut root = create_resource_tree();
        let creator = add_creator(
            &mut root,
            &Creator::new("Andrew McMahon")
                .with_given_name("Andrew")
                .with_orcid("0000-0002-1825-0097"),
        );

        let names: Vec<&str> = creator.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["creatorName", "givenName", "nameIdentifier"]);

        let orcid = creator.child("nameIdentifier").unwrap();
        assert_eq!(orcid.attr("schemeURI"), Some(ORCID_SCHEME_URI));
        assert_eq!(orcid.attr("nameIdentifierScheme"), Some("ORCID"));
        assert_eq!(orcid.text(), Some("0000-0002-1825-0097"));
    }

    #[test]
    fn test_funding_reference_attributes_follow_parents() {
        let mut root = create_resource_tree();
        let funder = add_funding_reference(
            &mut root,
            &FundingReference {
                funder_name: Some("NIH".into()),
                funder_identifier: Some("https://doi.org/10.13039/100000002".into()),
                funder_identifier_type: Some("Crossref Funder ID".into()),
                award_uri: Some("https://reporter.nih.gov/x".into()),
                award_title: Some("Center".into()),
                ..Default::default()
            },
        );

        let id = funder.child("funderIdentifier").unwrap();
        assert_eq!(id.attr("funderIdentifierType"), Some("Crossref Funder ID"));
        // awardURI needs an awardNumber to hang on
        assert!(funder.child("awardNumber").is_none());
        assert_eq!(
            funder.child("awardTitle").and_then(Element::text),
            Some("Center")
        );
    }

    #[test]
    fn test_defaults_when_called_without_values() {
        let mut root = create_resource_tree();
        assert_eq!(add_language(&mut root, None).text(), Some("en"));
        assert_eq!(add_version(&mut root, None).text(), Some("1.0"));
        assert_eq!(
            add_publication_year(&mut root, None).text(),
            Some(current_year().as_str())
        );
        let subjects = add_subjects(&mut root, None);
        assert_eq!(subjects.child_texts("subject"), vec!["Dataset"]);
        assert_eq!(subjects.children[0].attr("xml:lang"), Some("en"));
    }

    #[test]
    fn test_build_resource_order() {
        let mut dataset = Dataset::new(vec![Creator::new("A")], vec!["T".into()]);
        dataset.descriptions = Some(vec!["D".into()]);
        dataset.publisher = Some("P".into());
        dataset.subjects = Some(vec!["Kidney".into()]);
        dataset.funding_references = Some(vec![FundingReference {
            funder_name: Some("NIH".into()),
            ..Default::default()
        }]);

        let doc = build_resource("10.25548/R-1", &dataset).unwrap();
        let order: Vec<&str> = doc
            .resource()
            .children
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "identifier",
                "creators",
                "titles",
                "descriptions",
                "publisher",
                "publicationYear",
                "subjects",
                "language",
                "resourceType",
                "version",
                "fundingReferences",
            ]
        );
    }

    #[test]
    fn test_build_resource_rejects_missing_titles() {
        let dataset = Dataset {
            creators: Some(vec![Creator::new("A")]),
            ..Default::default()
        };
        assert!(build_resource("10.25548/R-1", &dataset).is_err());
    }
}
