#![recursion_limit = "256"]

mod test_support;

use serde_json::Value;
use test_support::*;
use usdm_fhir::{Extra, SoaExport};

const BUNDLE_UUID: &str = "92c5e5a4-1b6f-4b3e-9c52-0f2b5a1d7e31";
const BASE_URL: &str = "http://d4k.dk/fhir/vulcan-soa/pilot";

fn soa_bundle() -> Value {
    let outcome = SoaExport::with_options(options()).export(
        &study(),
        "ScheduleTimeline_1",
        BUNDLE_UUID,
        &Extra::default(),
    );
    serde_json::from_str(outcome.message.as_deref().expect("soa export must succeed")).unwrap()
}

#[test]
fn test_soa_bundle_envelope() {
    let bundle = soa_bundle();
    assert_eq!(bundle["type"], "transaction");
    assert_eq!(bundle["id"], "pilot");
    assert_eq!(bundle["identifier"]["system"], "urn:ietf:rfc:3986");
    assert_eq!(bundle["identifier"]["value"], format!("urn:uuid:{}", BUNDLE_UUID));

    let types: Vec<&str> = bundle["entry"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["resource"]["resourceType"].as_str())
        .collect();
    assert_eq!(
        types,
        vec![
            "ResearchStudy",
            "PlanDefinition",
            "PlanDefinition",
            "PlanDefinition",
            "ActivityDefinition",
            "ActivityDefinition"
        ]
    );
    for entry in bundle["entry"].as_array().unwrap() {
        assert_eq!(entry["request"]["method"], "PUT");
        assert!(entry["fullUrl"].as_str().unwrap().starts_with("urn:uuid:"));
    }
}

#[test]
fn test_soa_timeline_plan_definition() {
    let bundle = soa_bundle();
    let rs = research_study(&bundle);
    assert_eq!(rs["name"], "PILOT");
    assert_eq!(rs["protocol"][0]["reference"], "PlanDefinition/scheduletimeline-1");

    let timeline = resources(&bundle, "PlanDefinition")[0];
    assert_eq!(timeline["id"], "scheduletimeline-1");
    assert_eq!(timeline["url"], format!("{}/PlanDefinition/main-timeline", BASE_URL));
    assert_eq!(timeline["title"], "Main Timeline");

    let actions = timeline["action"].as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["definitionCanonical"], format!("{}/PlanDefinition/day-1", BASE_URL));
    assert_eq!(actions[0]["relatedAction"][0]["targetId"], "scheduledactivityinstance-2");
    assert_eq!(actions[0]["relatedAction"][0]["relationship"], "before");
    let last_related = actions[1].get("relatedAction").and_then(Value::as_array);
    assert!(last_related.map_or(true, |r| r.is_empty()));
}

#[test]
fn test_soa_timepoints_and_activities() {
    let outcome = SoaExport::with_options(options()).export(
        &study(),
        "ScheduleTimeline_1",
        BUNDLE_UUID,
        &Extra::default(),
    );
    assert!(outcome
        .diagnostics
        .contains("Missing activity 'Activity_9' for instance 'ScheduledActivityInstance_2'"));

    let bundle: Value = serde_json::from_str(outcome.message.as_deref().unwrap()).unwrap();
    let plans = resources(&bundle, "PlanDefinition");
    let day1 = plans[1];
    assert_eq!(day1["id"], "scheduledactivityinstance-1");
    assert_eq!(day1["description"], "Screening visit");
    let canonicals: Vec<&str> = day1["action"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["definitionCanonical"].as_str())
        .collect();
    assert_eq!(
        canonicals,
        vec![
            format!("{}/ActivityDefinition/vital-signs", BASE_URL),
            format!("{}/ActivityDefinition/blood-draw", BASE_URL)
        ]
    );
    assert_eq!(plans[2]["action"].as_array().unwrap().len(), 1);

    let activities = resources(&bundle, "ActivityDefinition");
    assert_eq!(activities[0]["url"], format!("{}/ActivityDefinition/vital-signs", BASE_URL));
    assert_eq!(activities[1]["title"], "Laboratory sample");
}

#[test]
fn test_soa_unknown_timeline() {
    let outcome = SoaExport::new().export(&study(), "ScheduleTimeline_9", BUNDLE_UUID, &Extra::default());
    assert!(outcome.message.is_none());
    assert!(outcome.diagnostics.has_errors());
    assert!(outcome.diagnostics.contains("Exception raised generating FHIR content"));
}
