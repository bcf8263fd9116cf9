use serde::de::DeserializeOwned;
use std::{fs::File, path::PathBuf};
use usdm_fhir_models::{Bundle, Composition, Organization, Resource, ResearchStudy};

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture<T: DeserializeOwned>(relative: &str) -> T {
    let path = fixtures_root().join(relative);
    assert!(path.exists(), "fixture missing at {:?}", path);

    let file = File::open(&path).expect("failed to open fixture");
    serde_json::from_reader(file).expect("failed to deserialize fixture")
}

#[test]
fn parse_protocol_bundle() {
    let bundle: Bundle = load_fixture("protocol-bundle.json");

    assert!(bundle.is_transaction());
    assert_eq!(bundle.entry_count(), 3);
    for entry in bundle.entries() {
        let request = entry.request.as_ref().expect("request should be present");
        assert_eq!(request.method, "PUT");
        assert_eq!(
            request.url,
            format!(
                "{}/{}",
                entry.resource_type().unwrap(),
                entry.resource_id().unwrap()
            )
        );
    }
}

#[test]
fn parse_typed_resources() {
    let bundle: Bundle = load_fixture("protocol-bundle.json");

    let studies: Vec<ResearchStudy> = bundle.resources_of();
    assert_eq!(studies.len(), 1);
    let study = &studies[0];
    assert_eq!(study.title.as_deref(), Some("A Study of Things"));

    let party = &study.associated_party[0];
    let (resource_type, id) = party.party.as_ref().unwrap().target().unwrap();
    assert_eq!(resource_type, Organization::RESOURCE_TYPE);

    let organizations: Vec<Organization> = bundle.resources_of();
    assert_eq!(organizations[0].id.as_deref(), Some(id));
    assert_eq!(
        organizations[0].address().and_then(|a| a.postal_code.as_deref()),
        Some("4051")
    );

    let compositions: Vec<Composition> = bundle.resources_of();
    assert_eq!(compositions[0].section[0].code_text(), "section1-introduction");
}

#[test]
fn reserialize_keeps_wire_shape() {
    let bundle: Bundle = load_fixture("protocol-bundle.json");
    let value = bundle.to_value().unwrap();
    let reparsed = Bundle::from_value(&value).unwrap();
    assert_eq!(bundle, reparsed);
    assert!(value.get("id").is_none());
}
