//! Consortium projects registering DOIs through the ISRD account

use crate::dataset::FundingReference;

pub const NIH: &str = "National Institute of Health (NIH)";
pub const NSF: &str = "National Science Foundation (NSF)";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Project {
    pub key: &'static str,
    pub publisher: &'static str,
    pub funder_name: &'static str,
    pub award_number: &'static str,
    pub award_title: &'static str,
    /// Sub-namespace reserved under the ISI prefix, if any
    pub isi_prefix_subspace: Option<&'static str>,
}

impl Project {
    pub fn funding_reference(&self) -> FundingReference {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        FundingReference {
            funder_name: non_empty(self.funder_name),
            award_number: non_empty(self.award_number),
            award_title: non_empty(self.award_title),
            ..Default::default()
        }
    }
}

pub const PROJECTS: &[Project] = &[
    Project {
        key: "ATLAS-D2K",
        publisher: "ATLAS-D2K Center (www.atlas-d2k.org)",
        funder_name: NIH,
        award_number: "1U24DK135157",
        award_title: "Analsys, Technology, Leadership, Administration and Science - Data to Knowledge (ATLAS-D2K) Center",
        isi_prefix_subspace: None,
    },
    Project {
        key: "GUDMAP",
        publisher: "GUDMAP Consortium (www.gudmap.org)",
        funder_name: NIH,
        award_number: "5U24DK110814",
        award_title: "USC GUDMAP Coordinating Center",
        isi_prefix_subspace: None,
    },
    Project {
        key: "RBK",
        publisher: "(Re)building a Kidney Consortium (www.rebuildingakidney.org)",
        funder_name: NIH,
        award_number: "5U01DK107350",
        award_title: "The USC (Re)Building the Kidney Coordinating Center",
        isi_prefix_subspace: None,
    },
    Project {
        key: "FACEBASE2",
        publisher: "FACEBASE 2 (www.facebase.org)",
        funder_name: NIH,
        award_number: "5U01DE024449",
        award_title: "FaceBase 2 Coordinating Center",
        isi_prefix_subspace: None,
    },
    Project {
        key: "SYNAPSE",
        publisher: "SYNAPSE",
        funder_name: NIH,
        award_number: "5R01MH107238",
        award_title: "Dynamic mapping of the complete synaptome using recombinant probes",
        isi_prefix_subspace: None,
    },
    Project {
        key: "BDDS",
        publisher: "BDDS",
        funder_name: NIH,
        award_number: "5U54EB020406",
        award_title: "Big Data for Discovery Science",
        isi_prefix_subspace: None,
    },
    Project {
        key: "NIH-Commons",
        publisher: "NIH Data Commons KC7",
        funder_name: NIH,
        award_number: "",
        award_title: "NIH Data Commons KC7",
        isi_prefix_subspace: None,
    },
    Project {
        key: "NSF-Core",
        publisher: "Computational Operations Research Exchange (cORe)",
        funder_name: NSF,
        award_number: "1822327",
        award_title: "Computational Operations Research Exchange",
        isi_prefix_subspace: None,
    },
    Project {
        key: "Synapse",
        publisher: "USC ISI Synapse Repository",
        funder_name: NIH,
        award_number: "1R01MH107238-01",
        award_title: "Dynamic Mapping of the Complete Synaptome Using Recombinant Probes",
        isi_prefix_subspace: Some("1"),
    },
];

/// Exact, case-sensitive lookup; `SYNAPSE` and `Synapse` are different projects
pub fn project(key: &str) -> Option<&'static Project> {
    PROJECTS.iter().find(|p| p.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(project("SYNAPSE").unwrap().publisher, "SYNAPSE");
        assert_eq!(
            project("Synapse").unwrap().isi_prefix_subspace,
            Some("1")
        );
        assert!(project("gudmap").is_none());
    }

    #[test]
    fn test_empty_award_number_is_absent() {
        let funding = project("NIH-Commons").unwrap().funding_reference();
        assert_eq!(funding.award_number, None);
        assert_eq!(funding.funder_name.as_deref(), Some(NIH));
        assert_eq!(funding.award_title.as_deref(), Some("NIH Data Commons KC7"));
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = PROJECTS.iter().map(|p| p.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), PROJECTS.len());
    }
}
