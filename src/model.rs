use std::{fs::File, io::BufReader, io::BufWriter, path::Path};

use serde::{Deserialize, Deserializer};

use crate::error::{JobIconsError, JobIconsResult};

/// One playable class or job, as persisted to `class_job_info/<ABBREV>.json`.
///
/// Field names on disk match the upstream API's casing (including the
/// space in `Icon Path`) so descriptors stay interchangeable with the
/// original tool's output.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ClassJobInfo {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    /// API path of the class/job icon (relative to the API base URL).
    #[serde(rename = "Icon")]
    pub icon: String,
    /// API detail endpoint for this class/job.
    #[serde(rename = "Url")]
    pub url: String,
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,
    /// Local path of the downloaded class/job icon.
    #[serde(rename = "Icon Path")]
    pub icon_path: String,
    #[serde(rename = "Actions", default)]
    pub actions: Vec<IconRecord>,
    #[serde(rename = "Traits", default)]
    pub traits: Vec<IconRecord>,
}

/// An action or trait owned by a class/job. No identity outside its parent
/// descriptor.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IconRecord {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Icon Path")]
    pub icon_path: String,
}

impl ClassJobInfo {
    pub fn read_from(path: &Path) -> JobIconsResult<Self> {
        let f = File::open(path)
            .map_err(|err| JobIconsError::descriptor(format!("open '{}': {err}", path.display())))?;
        let info = serde_json::from_reader(BufReader::new(f)).map_err(|err| {
            JobIconsError::descriptor(format!("parse '{}': {err}", path.display()))
        })?;
        Ok(info)
    }

    /// Writes the descriptor with 4-space indentation, stable across runs.
    pub fn write_to(&self, path: &Path) -> JobIconsResult<()> {
        let f = File::create(path).map_err(|err| {
            JobIconsError::descriptor(format!("create '{}': {err}", path.display()))
        })?;
        let mut ser = serde_json::Serializer::with_formatter(
            BufWriter::new(f),
            serde_json::ser::PrettyFormatter::with_indent(b"    "),
        );
        serde::Serialize::serialize(self, &mut ser).map_err(|err| {
            JobIconsError::descriptor(format!("write '{}': {err}", path.display()))
        })?;
        Ok(())
    }
}

/// Wire type for the `ClassJob` list endpoint: `{ "Results": [ … ] }`.
/// Single page; no pagination handling.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ClassJobList {
    #[serde(rename = "Results")]
    pub results: Vec<ClassJobListing>,
}

/// One row of the list response.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ClassJobListing {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Icon")]
    pub icon: String,
    #[serde(rename = "Url")]
    pub url: String,
}

/// Wire type for a per-class/job detail response. Only the fields the
/// pipeline consumes are modeled.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ClassJobDetail {
    #[serde(rename = "Abbreviation")]
    pub abbreviation: String,
    #[serde(rename = "GameContentLinks", default)]
    pub links: GameContentLinks,
}

/// Link collections vary by class: crafters have `CraftAction`, some
/// classes (e.g. Lancer) have no `Trait`. Absence means empty, never error.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct GameContentLinks {
    #[serde(rename = "Action", default)]
    pub action: Option<LinkedIds>,
    #[serde(rename = "CraftAction", default)]
    pub craft_action: Option<LinkedIds>,
    #[serde(rename = "Trait", default)]
    pub r#trait: Option<LinkedIds>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct LinkedIds {
    #[serde(rename = "ClassJob", default)]
    pub class_job: Vec<u32>,
}

impl GameContentLinks {
    pub fn action_ids(&self) -> &[u32] {
        self.action.as_ref().map_or(&[], |l| &l.class_job)
    }

    pub fn craft_action_ids(&self) -> &[u32] {
        self.craft_action.as_ref().map_or(&[], |l| &l.class_job)
    }

    pub fn trait_ids(&self) -> &[u32] {
        self.r#trait.as_ref().map_or(&[], |l| &l.class_job)
    }
}

/// Wire type for a per-action/craft-action/trait detail response.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct SubEntityDetail {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Icon")]
    pub icon: String,
    /// Deprecated actions carry 0 here; the API serves it as 0/1 or bool.
    #[serde(rename = "IsPlayerAction", default, deserialize_with = "flag")]
    pub is_player_action: bool,
    /// Null for craft-actions with no class/job association.
    #[serde(rename = "ClassJob", default)]
    pub class_job: Option<serde_json::Value>,
}

impl SubEntityDetail {
    pub fn has_class_job(&self) -> bool {
        self.class_job.as_ref().is_some_and(|v| !v.is_null())
    }
}

/// Accepts a bool, a zero/nonzero integer, or null as a truthiness flag.
fn flag<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|x| x != 0),
        serde_json::Value::Null => false,
        _ => true,
    })
}
