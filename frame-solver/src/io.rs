//! JSON model definitions
//!
//! A [`ModelFile`] is the plain-data form of a [`FrameModel`]. Loading one
//! replays every entry through the model's add/define methods, so a file
//! gets exactly the same validation as a model built in code.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::elements::{Material, Member, Node, Section, Support};
use crate::error::FrameResult;
use crate::loads::{DistributedLoad, LoadCase, LoadCombination, NodeLoad, PointLoad};
use crate::model::FrameModel;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelFile {
    pub nodes: BTreeMap<String, Node>,
    pub materials: BTreeMap<String, Material>,
    pub sections: BTreeMap<String, Section>,
    pub members: BTreeMap<String, Member>,
    pub supports: BTreeMap<String, Support>,
    pub load_cases: Vec<LoadCase>,
    /// Keyed by node name
    pub node_loads: BTreeMap<String, Vec<NodeLoad>>,
    /// Keyed by member name
    pub member_point_loads: BTreeMap<String, Vec<PointLoad>>,
    /// Keyed by member name
    pub member_dist_loads: BTreeMap<String, Vec<DistributedLoad>>,
    pub load_combos: Vec<LoadCombination>,
}

impl ModelFile {
    /// Snapshot the definition of a model
    pub fn from_model(model: &FrameModel) -> Self {
        Self {
            nodes: model.nodes().clone(),
            materials: model.materials().clone(),
            sections: model.sections().clone(),
            members: model.members().clone(),
            supports: model.supports().clone(),
            load_cases: model.load_cases().values().cloned().collect(),
            node_loads: model.node_loads().clone(),
            member_point_loads: model.member_point_loads().clone(),
            member_dist_loads: model.member_dist_loads().clone(),
            load_combos: model.load_combos().values().cloned().collect(),
        }
    }

    /// Build a model, validating every entry
    pub fn into_model(self) -> FrameResult<FrameModel> {
        let mut model = FrameModel::new();

        for (name, material) in self.materials {
            model.add_material(&name, material)?;
        }
        for (name, section) in self.sections {
            model.add_section(&name, section)?;
        }
        for (name, node) in self.nodes {
            model.add_node(&name, node)?;
        }
        for (name, member) in self.members {
            model.add_member(&name, member)?;
        }
        for (name, support) in self.supports {
            model.def_support(&name, support)?;
        }
        for case in self.load_cases {
            model.add_load_case(case)?;
        }
        for (name, loads) in self.node_loads {
            for load in loads {
                model.add_node_load(&name, load)?;
            }
        }
        for (name, loads) in self.member_point_loads {
            for load in loads {
                model.add_member_point_load(&name, load)?;
            }
        }
        for (name, loads) in self.member_dist_loads {
            for load in loads {
                model.add_member_dist_load(&name, load)?;
            }
        }
        for combo in self.load_combos {
            model.add_load_combo(combo)?;
        }

        log::debug!(
            "Loaded model with {} nodes and {} members",
            model.nodes().len(),
            model.members().len()
        );
        Ok(model)
    }

    pub fn from_json(json: &str) -> FrameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> FrameResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a model definition from a JSON file
    pub fn read(path: impl AsRef<Path>) -> FrameResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Write the definition as pretty-printed JSON
    pub fn write(&self, path: impl AsRef<Path>) -> FrameResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
