//! Study designs, populations, eligibility criteria and schedules

use super::code::{AliasCode, Code};
use super::ct;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyDesign {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_phase: Option<AliasCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<StudyDesignPopulation>,

    #[serde(default)]
    pub eligibility_criteria: Vec<EligibilityCriterion>,

    #[serde(default)]
    pub activities: Vec<Activity>,

    #[serde(default)]
    pub encounters: Vec<Encounter>,

    #[serde(default)]
    pub schedule_timelines: Vec<ScheduleTimeline>,
}

impl StudyDesign {
    pub fn phase(&self) -> Option<&Code> {
        self.study_phase.as_ref().map(|p| &p.standard_code)
    }

    pub fn criterion(&self, id: &str) -> Option<&EligibilityCriterion> {
        self.eligibility_criteria.iter().find(|c| c.id == id)
    }

    /// Criteria referenced by the population, in population order
    pub fn population_criteria(&self) -> Vec<&EligibilityCriterion> {
        self.population
            .as_ref()
            .map(|p| {
                p.criterion_ids
                    .iter()
                    .filter_map(|id| self.criterion(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn find_timeline(&self, id: &str) -> Option<&ScheduleTimeline> {
        self.schedule_timelines.iter().find(|t| t.id == id)
    }

    pub fn main_timeline(&self) -> Option<&ScheduleTimeline> {
        self.schedule_timelines.iter().find(|t| t.main_timeline)
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn encounter(&self, id: &str) -> Option<&Encounter> {
        self.encounters.iter().find(|e| e.id == id)
    }

    /// Activities following their previous/next chain, falling back to
    /// declaration order when the chain is broken.
    pub fn activity_list(&self) -> Vec<&Activity> {
        let Some(mut current) = self.activities.iter().find(|a| a.previous_id.is_none()) else {
            return self.activities.iter().collect();
        };
        let mut ordered = vec![current];
        while let Some(next_id) = current.next_id.as_deref() {
            match self.activity(next_id) {
                Some(next) if ordered.len() < self.activities.len() => {
                    ordered.push(next);
                    current = next;
                }
                _ => break,
            }
        }
        if ordered.len() == self.activities.len() {
            ordered
        } else {
            self.activities.iter().collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudyDesignPopulation {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub includes_healthy_subjects: bool,

    #[serde(default)]
    pub criterion_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriterion {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub category: Code,

    #[serde(default)]
    pub identifier: String,

    #[serde(default)]
    pub criterion_item_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
}

impl EligibilityCriterion {
    pub fn is_exclusion(&self) -> bool {
        self.category.code == ct::EXCLUSION_CRITERIA
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
}

impl Activity {
    /// Label when present, otherwise the name
    pub fn label_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTimeline {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub main_timeline: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,

    #[serde(default)]
    pub instances: Vec<ScheduledInstance>,
}

/// A scheduled activity (or decision) instance on a timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledInstance {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub activity_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_condition_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_exit_id: Option<String>,
}

impl ScheduledInstance {
    pub fn label_name(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.name)
    }
}
