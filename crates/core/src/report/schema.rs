use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The structured summary of a refined idea.
///
/// Field names and nesting are the JSON wire shape shared with the model
/// and with anything that stores or exports the report. Every field is
/// required and every list must be present, possibly empty; there are no
/// defaults and no partially valid reports.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    /// Name and elevator pitch.
    pub pitch: Pitch,
    /// The problem being solved.
    pub problem: Problem,
    /// Who the product is for.
    pub audience: Audience,
    /// How the product solves the problem.
    pub solution: Solution,
    /// Feature scope.
    pub features: Features,
    /// Technical shape of the product.
    pub architecture: Architecture,
    /// Core entities.
    pub data_model: DataModel,
    /// Delivery plan.
    pub roadmap: Roadmap,
    /// What could go wrong.
    pub risks: Risks,
    /// Launch readiness checks.
    pub checklist: Checklist,
}

/// Name and elevator pitch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pitch {
    /// Product name.
    pub title: String,
    /// One sentence describing the product.
    pub one_liner: String,
}

/// The problem being solved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// The problem statement.
    pub statement: String,
    /// Why this is the right moment to solve it.
    pub why_now: String,
}

/// Who the product is for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Audience {
    /// Target personas.
    pub personas: Vec<Persona>,
}

/// A target persona.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Persona name.
    pub name: String,
    /// Who they are.
    pub description: String,
    /// What hurts today.
    pub pain_points: Vec<String>,
}

/// How the product solves the problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    /// The solution approach.
    pub description: String,
    /// What sets it apart from alternatives.
    pub differentiators: Vec<String>,
}

/// Feature scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    /// Features in the minimum viable product.
    pub mvp: Vec<String>,
    /// Features deferred to later releases.
    pub later: Vec<String>,
}

/// Technical shape of the product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Architecture {
    /// High-level overview.
    pub overview: String,
    /// Main components.
    pub components: Vec<String>,
}

/// Core entities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    /// Entities with their fields.
    pub entities: Vec<Entity>,
    /// Relations between entities, in prose.
    pub relations: Vec<String>,
}

/// An entity of the data model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Entity name.
    pub name: String,
    /// Entity fields.
    pub fields: Vec<EntityField>,
}

/// A field of an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityField {
    /// Field name.
    pub name: String,
    /// Field type, free-form.
    #[serde(rename = "type")]
    pub ty: String,
}

/// Delivery plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    /// Phases in delivery order.
    pub phases: Vec<Phase>,
}

/// A roadmap phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Phase name.
    pub name: String,
    /// Expected duration, free-form.
    pub duration: String,
    /// What the phase delivers.
    pub deliverables: Vec<String>,
}

/// What could go wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Risks {
    /// Individual risks.
    pub items: Vec<RiskItem>,
}

/// A risk and how to address it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    /// The risk.
    pub risk: String,
    /// How to mitigate it.
    pub mitigation: String,
}

/// Launch readiness checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    /// Security items.
    pub security: Vec<String>,
    /// Privacy items.
    pub privacy: Vec<String>,
    /// Cost items.
    pub cost: Vec<String>,
}
