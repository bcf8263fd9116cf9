#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;
use usdm_fhir::{Export, ExportOptions, ExportOutcome, Extra, Profile};
use usdm_model::{Study, Wrapper};

/// Fully populated study: sponsor with address, co-sponsor, medical expert,
/// regulatory identifier, one amended version and a small protocol narrative.
pub fn study_value() -> Value {
    json!({
        "study": {
            "id": "Study_1",
            "name": "PILOT",
            "label": "Pilot study",
            "versions": [{
                "id": "StudyVersion_1",
                "versionIdentifier": "2",
                "titles": [
                    {"id": "StudyTitle_1", "text": "Safety and Efficacy of Xanomeline in Alzheimer's Disease", "type": {"code": "C207616", "decode": "Official Study Title"}},
                    {"id": "StudyTitle_2", "text": "XAN", "type": {"code": "C207646", "decode": "Study Acronym"}},
                    {"id": "StudyTitle_3", "text": "Xanomeline Pilot", "type": {"code": "C207615", "decode": "Brief Study Title"}}
                ],
                "studyIdentifiers": [
                    {"id": "StudyIdentifier_1", "text": "ACME-001", "scopeId": "Organization_1"},
                    {"id": "StudyIdentifier_2", "text": "IND-123456", "scopeId": "Organization_2"}
                ],
                "organizations": [
                    {
                        "id": "Organization_1",
                        "name": "ACME",
                        "label": "ACME Pharma",
                        "type": {"code": "C70793", "decode": "Clinical Study Sponsor"},
                        "legalAddress": {
                            "id": "Address_1",
                            "lines": ["1 Main Street"],
                            "city": "Indianapolis",
                            "postalCode": "46285",
                            "country": {"code": "USA", "decode": "United States"}
                        },
                        "managedSites": [{"id": "StudySite_1", "name": "Site 01"}]
                    },
                    {"id": "Organization_2", "name": "FDA", "type": {"code": "C188863", "decode": "Regulatory Agency"}},
                    {"id": "Organization_3", "name": "Partner Labs", "type": {"code": "C54149", "decode": "Pharmaceutical Company"}}
                ],
                "roles": [
                    {"id": "StudyRole_1", "code": {"code": "C215671", "decode": "Co-Sponsor"}, "organizationIds": ["Organization_3"]},
                    {"id": "StudyRole_2", "code": {"code": "C215672", "decode": "Medical Expert"}, "assignedPersonIds": ["AssignedPerson_1"]}
                ],
                "assignedPersons": [
                    {"id": "AssignedPerson_1", "name": "jdoe", "label": "Dr. Jane Doe"}
                ],
                "amendments": [{
                    "id": "StudyAmendment_1",
                    "name": "AMEND 1",
                    "number": "1",
                    "summary": "Updated dosing schedule",
                    "primaryReason": {"code": {"code": "C207609", "decode": "New Safety Information Available"}},
                    "secondaryReasons": [
                        {"code": {"code": "C207602", "decode": "IRB/IEC Feedback"}},
                        {"code": {"code": "C207605", "decode": "Manufacturing Change"}}
                    ],
                    "impacts": [
                        {"type": {"code": "C215665", "decode": "Study Subject Safety"}, "text": "Additional monitoring visits", "isSubstantial": true}
                    ],
                    "geographicScopes": [
                        {"type": {"code": "C25464", "decode": "Country"}, "code": {"standardCode": {"code": "DNK", "decode": "Denmark"}}},
                        {"type": {"code": "C25464", "decode": "Country"}, "code": {"standardCode": {"code": "FRA", "decode": "France"}}}
                    ],
                    "enrollments": [{"id": "SubjectEnrollment_1", "forStudySiteId": "StudySite_1"}],
                    "changes": [{
                        "id": "StudyChange_1",
                        "summary": "Dose reduced",
                        "rationale": "Tolerability",
                        "changedSections": [{"sectionNumber": "5.1", "sectionTitle": "Dosing"}]
                    }]
                }],
                "dateValues": [
                    {"id": "GovernanceDate_1", "type": {"code": "C132352", "decode": "Sponsor Approval Date"}, "dateValue": "2024-01-15"}
                ],
                "extensionAttributes": [
                    {"url": "http://www.cdisc.org/USDM/sponsorConfidentialityStatement", "valueString": "Confidential, do not distribute"}
                ],
                "narrativeContentItems": [
                    {"id": "NarrativeContentItem_1", "text": "<p>Sponsor and title details</p>"},
                    {"id": "NarrativeContentItem_2", "text": "<p>Introduction text</p>"},
                    {"id": "NarrativeContentItem_3", "text": "<p>Background text</p>"},
                    {"id": "NarrativeContentItem_4", "text": "<p>&nbsp;</p>"},
                    {"id": "NarrativeContentItem_5", "text": "<p>Participants receive <usdm:ref klass=\"StudyTitle\" id=\"StudyTitle_2\" attribute=\"text\"/> daily</p>"}
                ],
                "eligibilityCriterionItems": [
                    {"id": "EligibilityCriterionItem_1", "text": "Age 50 years or older"},
                    {"id": "EligibilityCriterionItem_2", "text": "Pregnant or breastfeeding"}
                ],
                "studyDesigns": [{
                    "id": "StudyDesign_1",
                    "name": "Study Design 1",
                    "studyPhase": {"standardCode": {"code": "C15601", "decode": "PHASE II TRIAL"}},
                    "population": {
                        "id": "StudyDesignPopulation_1",
                        "name": "POP1",
                        "label": "Adults with mild AD",
                        "criterionIds": ["EligibilityCriterion_1", "EligibilityCriterion_2"]
                    },
                    "eligibilityCriteria": [
                        {"id": "EligibilityCriterion_1", "name": "INC1", "identifier": "01", "category": {"code": "C25532", "decode": "Inclusion Criteria"}, "criterionItemId": "EligibilityCriterionItem_1"},
                        {"id": "EligibilityCriterion_2", "name": "EXC1", "identifier": "02", "category": {"code": "C25370", "decode": "Exclusion Criteria"}, "criterionItemId": "EligibilityCriterionItem_2"}
                    ],
                    "activities": [
                        {"id": "Activity_1", "name": "Vital Signs", "nextId": "Activity_2"},
                        {"id": "Activity_2", "name": "Blood Draw", "label": "Laboratory sample", "previousId": "Activity_1"}
                    ],
                    "encounters": [
                        {"id": "Encounter_1", "name": "Screening", "label": "Screening visit"}
                    ],
                    "scheduleTimelines": [{
                        "id": "ScheduleTimeline_1",
                        "name": "Main Timeline",
                        "mainTimeline": true,
                        "instances": [
                            {"id": "ScheduledActivityInstance_1", "name": "Day 1", "activityIds": ["Activity_1", "Activity_2"], "encounterId": "Encounter_1"},
                            {"id": "ScheduledActivityInstance_2", "name": "Day 8", "activityIds": ["Activity_1", "Activity_9"]}
                        ]
                    }]
                }]
            }],
            "documentedBy": [{
                "id": "StudyDefinitionDocument_1",
                "name": "Protocol",
                "versions": [{
                    "id": "StudyDefinitionDocumentVersion_1",
                    "version": "1",
                    "contents": [
                        {"id": "NarrativeContent_0", "sectionNumber": "", "sectionTitle": "Title Page", "displaySectionNumber": false, "contentItemId": "NarrativeContentItem_1", "nextId": "NarrativeContent_1"},
                        {"id": "NarrativeContent_1", "sectionNumber": "1", "sectionTitle": "Introduction", "contentItemId": "NarrativeContentItem_2", "childIds": ["NarrativeContent_2"], "previousId": "NarrativeContent_0", "nextId": "NarrativeContent_2"},
                        {"id": "NarrativeContent_2", "sectionNumber": "1.1", "sectionTitle": "Background", "contentItemId": "NarrativeContentItem_3", "previousId": "NarrativeContent_1", "nextId": "NarrativeContent_3"},
                        {"id": "NarrativeContent_3", "sectionNumber": "2", "sectionTitle": "Objectives", "contentItemId": "NarrativeContentItem_4", "previousId": "NarrativeContent_2", "nextId": "NarrativeContent_4"},
                        {"id": "NarrativeContent_4", "sectionNumber": "5", "sectionTitle": "Study Intervention", "childIds": ["NarrativeContent_5"], "previousId": "NarrativeContent_3", "nextId": "NarrativeContent_5"},
                        {"id": "NarrativeContent_5", "sectionNumber": "5.1", "sectionTitle": "Dosing", "contentItemId": "NarrativeContentItem_5", "previousId": "NarrativeContent_4"}
                    ]
                }]
            }]
        },
        "usdmVersion": "4.0.0"
    })
}

pub fn study() -> Study {
    study_from(study_value())
}

/// Parse an edited copy of the fixture
pub fn study_from(value: Value) -> Study {
    serde_json::from_value::<Wrapper>(value)
        .expect("fixture study must parse")
        .study
}

/// The fixture study as its original protocol: no amendments
pub fn original_study() -> Study {
    let mut value = study_value();
    value["study"]["versions"][0]["amendments"] = json!([]);
    study_from(value)
}

pub fn options() -> ExportOptions {
    let timestamp = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    ExportOptions::deterministic(timestamp)
}

pub fn export(profile: Profile, study: &Study) -> ExportOutcome {
    Export::with_options(profile, options()).export(study, &Extra::default())
}

/// Exported bundle as JSON, panicking with the diagnostics on failure
pub fn export_value(profile: Profile, study: &Study) -> Value {
    let outcome = export(profile, study);
    let message = outcome
        .message
        .unwrap_or_else(|| panic!("export failed:\n{}", outcome.diagnostics.dump(usdm_fhir::Severity::Debug)));
    serde_json::from_str(&message).expect("export message must be JSON")
}

/// Resources of one type, in entry order
pub fn resources<'v>(bundle: &'v Value, resource_type: &str) -> Vec<&'v Value> {
    bundle["entry"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|e| &e["resource"])
        .filter(|r| r["resourceType"] == resource_type)
        .collect()
}

pub fn research_study(bundle: &Value) -> &Value {
    resources(bundle, "ResearchStudy")
        .into_iter()
        .next()
        .expect("bundle must carry a ResearchStudy")
}

/// Extensions of `resource` with `url`
pub fn extensions<'v>(resource: &'v Value, url: &str) -> Vec<&'v Value> {
    resource["extension"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|e| e["url"] == url)
        .collect()
}

fn uuid_pattern() -> &'static Regex {
    static UUID: OnceLock<Regex> = OnceLock::new();
    UUID.get_or_init(|| {
        Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("uuid regex must compile")
    })
}

fn datetime_pattern() -> &'static Regex {
    static DATETIME: OnceLock<Regex> = OnceLock::new();
    DATETIME.get_or_init(|| {
        Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})")
            .expect("datetime regex must compile")
    })
}

/// Replace every UUID with a fixed placeholder
pub fn fix_uuid(text: &str) -> String {
    uuid_pattern()
        .replace_all(text, "FAKE-UUID")
        .into_owned()
}

/// Replace every ISO date-time with a fixed placeholder
pub fn fix_iso_dates(text: &str) -> String {
    datetime_pattern()
        .replace_all(text, "2024-01-01T00:00:00Z")
        .into_owned()
}
