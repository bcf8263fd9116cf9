//! Schedule of Activities export
//!
//! One timeline of the study design becomes a transaction bundle: the
//! ResearchStudy, a PlanDefinition for the timeline, one PlanDefinition per
//! scheduled instance and one ActivityDefinition per activity. Canonical urls
//! hang off the study url.

use super::research_study::research_study;
use super::{failed, finish, ExportContext, ExportOptions, ExportOutcome};
use crate::diagnostics::{Diagnostics, Location};
use crate::error::{ExportError, Result};
use crate::extra::Extra;
use crate::factory::{
    self, ACTIVITY_DEFINITION, IDENTIFIER, PLAN_DEFINITION, PLAN_DEFINITION_ACTION,
};
use crate::ids::urn_uuid;
use crate::utils::{fix_id, study_url};
use crate::vocab::system;
use serde_json::{json, Value};
use usdm_fhir_models::{
    ActivityDefinition, Bundle, BundleEntry, BundleType, PlanDefinition, PlanDefinitionAction,
    Resource,
};
use usdm_model::{Activity, ScheduleTimeline, ScheduledInstance, Study};

const MODULE: &str = "export.soa";

/// Exporter for one schedule timeline
#[derive(Debug, Clone, Default)]
pub struct SoaExport {
    options: ExportOptions,
}

impl SoaExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Export the timeline `timeline_id` of the first study design. `uuid`
    /// becomes the bundle identifier.
    pub fn export(&self, study: &Study, timeline_id: &str, uuid: &str, extra: &Extra) -> ExportOutcome {
        tracing::info!(study = %study.name, timeline = timeline_id, "Exporting schedule of activities");
        let mut ctx = match ExportContext::new(study, extra, &self.options) {
            Ok(ctx) => ctx,
            Err(err) => return failed(err, Diagnostics::new()),
        };
        let bundle = to_bundle(&mut ctx, timeline_id, uuid);
        finish(bundle, ctx.diagnostics)
    }
}

fn to_bundle(ctx: &mut ExportContext<'_>, timeline_id: &str, uuid: &str) -> Result<Bundle> {
    let design = ctx.design;
    let timeline = design
        .find_timeline(timeline_id)
        .ok_or_else(|| ExportError::TimelineNotFound(timeline_id.to_string()))?;
    let base_url = study_url(ctx.study);

    let mut rs = research_study(ctx)?;
    rs.name = Some(ctx.study.name.clone()).filter(|n| !n.is_empty());

    let timeline_pd = timeline_plan_definition(ctx, &base_url, timeline)?;
    rs.protocol
        .push(factory::reference_to(&timeline_pd, &mut ctx.diagnostics)?);

    let mut timepoints = Vec::new();
    for instance in &timeline.instances {
        if let Ok(pd) = timepoint_plan_definition(ctx, &base_url, instance) {
            timepoints.push(pd);
        }
    }

    let mut activities = Vec::new();
    for activity in design.activity_list() {
        if let Ok(ad) = activity_definition(ctx, &base_url, activity) {
            activities.push(ad);
        }
    }

    let mut bundle = Bundle::new(BundleType::Transaction);
    bundle.id = Some(fix_id(&ctx.study.name));
    bundle.identifier = Some(IDENTIFIER.build(
        json!({ "system": system::URN, "value": urn_uuid(uuid) }),
        &mut ctx.diagnostics,
    )?);
    bundle.timestamp = Some(ctx.timestamp.clone());
    bundle.add_entry(entry(ctx, &rs)?);
    bundle.add_entry(entry(ctx, &timeline_pd)?);
    for pd in &timepoints {
        bundle.add_entry(entry(ctx, pd)?);
    }
    for ad in &activities {
        bundle.add_entry(entry(ctx, ad)?);
    }
    tracing::debug!(
        timepoints = timepoints.len(),
        activities = activities.len(),
        "SoA bundle assembled"
    );
    Ok(bundle)
}

/// `PUT {Type}/{id}` entry under a freshly generated `urn:uuid:` full url
fn entry<R: Resource>(ctx: &mut ExportContext<'_>, resource: &R) -> Result<BundleEntry> {
    Ok(BundleEntry::put(resource, urn_uuid(&ctx.ids.next_id()))?)
}

fn timeline_plan_definition(
    ctx: &mut ExportContext<'_>,
    base_url: &str,
    timeline: &ScheduleTimeline,
) -> Result<PlanDefinition> {
    let ids: Vec<String> = timeline.instances.iter().map(|i| fix_id(&i.id)).collect();
    let mut actions = Vec::new();
    for (index, instance) in timeline.instances.iter().enumerate() {
        let related: Vec<Value> = ids
            .get(index + 1)
            .map(|next| json!({ "targetId": next, "relationship": "before" }))
            .into_iter()
            .collect();
        let action = PLAN_DEFINITION_ACTION.build(
            json!({
                "id": ids[index],
                "title": instance.label_name(),
                "definitionCanonical": format!("{}/PlanDefinition/{}", base_url, fix_id(&instance.name)),
                "relatedAction": related,
            }),
            &mut ctx.diagnostics,
        );
        if let Ok(action) = action {
            actions.push(action);
        }
    }

    let title = timeline
        .label
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(&timeline.name);
    let mut fields = json!({
        "resourceType": "PlanDefinition",
        "id": fix_id(&timeline.id),
        "url": format!("{}/PlanDefinition/{}", base_url, fix_id(&timeline.name)),
        "name": timeline.name,
        "title": title,
        "status": "active",
        "date": ctx.timestamp,
        "action": actions,
    });
    if let Some(description) = timeline.description.as_deref().filter(|d| !d.is_empty()) {
        fields["description"] = Value::from(description);
    }
    Ok(PLAN_DEFINITION.build(fields, &mut ctx.diagnostics)?)
}

fn timepoint_plan_definition(
    ctx: &mut ExportContext<'_>,
    base_url: &str,
    instance: &ScheduledInstance,
) -> Result<PlanDefinition> {
    let design = ctx.design;
    let mut actions: Vec<PlanDefinitionAction> = Vec::new();
    for activity_id in &instance.activity_ids {
        let Some(activity) = design.activity(activity_id) else {
            ctx.diagnostics.warning(
                format!("Missing activity '{}' for instance '{}'", activity_id, instance.id),
                Location::new(MODULE, "timepoint_plan_definition"),
            );
            continue;
        };
        let action = PLAN_DEFINITION_ACTION.build(
            json!({
                "id": fix_id(&activity.id),
                "title": activity.label_name(),
                "definitionCanonical": activity_url(base_url, activity),
            }),
            &mut ctx.diagnostics,
        );
        if let Ok(action) = action {
            actions.push(action);
        }
    }

    let mut fields = json!({
        "resourceType": "PlanDefinition",
        "id": fix_id(&instance.id),
        "url": format!("{}/PlanDefinition/{}", base_url, fix_id(&instance.name)),
        "name": instance.name,
        "title": instance.label_name(),
        "status": "active",
        "action": actions,
    });
    let encounter = instance
        .encounter_id
        .as_deref()
        .and_then(|id| design.encounter(id));
    let description = instance
        .description
        .as_deref()
        .or_else(|| encounter.and_then(|e| e.label.as_deref().or(Some(e.name.as_str()))))
        .filter(|d| !d.is_empty());
    if let Some(description) = description {
        fields["description"] = Value::from(description);
    }
    Ok(PLAN_DEFINITION.build(fields, &mut ctx.diagnostics)?)
}

fn activity_definition(
    ctx: &mut ExportContext<'_>,
    base_url: &str,
    activity: &Activity,
) -> Result<ActivityDefinition> {
    let mut fields = json!({
        "resourceType": "ActivityDefinition",
        "id": fix_id(&activity.id),
        "url": activity_url(base_url, activity),
        "name": activity.name,
        "title": activity.label_name(),
        "status": "active",
    });
    if let Some(description) = activity.description.as_deref().filter(|d| !d.is_empty()) {
        fields["description"] = Value::from(description);
    }
    Ok(ACTIVITY_DEFINITION.build(fields, &mut ctx.diagnostics)?)
}

fn activity_url(base_url: &str, activity: &Activity) -> String {
    format!("{}/ActivityDefinition/{}", base_url, fix_id(&activity.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_url() {
        let activity = Activity {
            id: "Activity_1".to_string(),
            name: "Vital Signs".to_string(),
            ..Default::default()
        };
        assert_eq!(
            activity_url("http://d4k.dk/fhir/vulcan-soa/pilot", &activity),
            "http://d4k.dk/fhir/vulcan-soa/pilot/ActivityDefinition/vital-signs"
        );
    }
}
