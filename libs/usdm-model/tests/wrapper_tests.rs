use usdm_model::{ct, Wrapper};

const STUDY: &str = r#"{
    "study": {
        "id": "Study_1",
        "name": "PILOT",
        "versions": [{
            "id": "StudyVersion_1",
            "versionIdentifier": "1",
            "titles": [
                {"id": "StudyTitle_1", "text": "Pilot Study", "type": {"code": "C207616", "decode": "Official Study Title"}}
            ],
            "organizations": [
                {"id": "Organization_1", "name": "ACME", "type": {"code": "C70793", "decode": "Clinical Study Sponsor"},
                 "managedSites": [{"id": "StudySite_1", "name": "Site 01"}]}
            ],
            "roles": [
                {"id": "StudyRole_1", "code": {"code": "C215672", "decode": "medical expert"}, "assignedPersonIds": ["AssignedPerson_1"]}
            ],
            "assignedPersons": [{"id": "AssignedPerson_1", "name": "Jane Doe"}],
            "dateValues": [
                {"id": "GovernanceDate_1", "type": {"code": "C132352", "decode": "Sponsor Approval Date"}, "dateValue": ""}
            ],
            "studyDesigns": [{"id": "StudyDesign_1", "name": "Design"}]
        }],
        "documentedBy": [{
            "id": "StudyDefinitionDocument_1",
            "versions": [{
                "id": "StudyDefinitionDocumentVersion_1",
                "contents": [
                    {"id": "NC_1", "sectionNumber": "1", "sectionTitle": "Introduction", "childIds": ["NC_2"], "nextId": "NC_2"},
                    {"id": "NC_2", "sectionNumber": "1.1", "sectionTitle": "Background", "previousId": "NC_1", "nextId": "NC_3"},
                    {"id": "NC_3", "sectionNumber": "2", "sectionTitle": "Design", "previousId": "NC_2"}
                ]
            }]
        }]
    },
    "usdmVersion": "4.0.0",
    "systemName": "d4k"
}"#;

#[test]
fn test_wrapper_parses_study_graph() {
    let wrapper = Wrapper::from_json(STUDY).unwrap();
    assert_eq!(wrapper.usdm_version, "4.0.0");
    assert_eq!(wrapper.system_name.as_deref(), Some("d4k"));

    let version = wrapper.study.require_first_version().unwrap();
    assert_eq!(version.official_title_text(), "Pilot Study");
    assert_eq!(version.sponsor().unwrap().name, "ACME");
    assert_eq!(version.site("StudySite_1").unwrap().name, "Site 01");
    assert_eq!(version.role_persons(ct::ROLE_MEDICAL_EXPERT)[0].name, "Jane Doe");
    assert!(version.approval_date().is_some());
    assert_eq!(version.approval_date_value(), None);
    assert!(version.original_version());
}

#[test]
fn test_document_structure() {
    let wrapper = Wrapper::from_json(STUDY).unwrap();
    let document = wrapper.study.document_version().unwrap();
    let top: Vec<&str> = document
        .top_level_contents()
        .iter()
        .map(|c| c.section_title.as_str())
        .collect();
    assert_eq!(top, vec!["Introduction", "Design"]);
    assert!(document.contents.iter().all(|c| c.display_section_number));
}

#[test]
fn test_study_without_versions() {
    let wrapper = Wrapper::from_json(r#"{"study": {"name": "EMPTY"}}"#).unwrap();
    assert!(wrapper.study.require_first_version().is_err());
    assert!(wrapper.study.document_version().is_none());
}

#[test]
fn test_invalid_json() {
    assert!(Wrapper::from_json("{\"study\": ").is_err());
    assert!(Wrapper::from_json(r#"{"usdmVersion": "4.0.0"}"#).is_err());
}
