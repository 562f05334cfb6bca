//! Global stiffness and load vector assembly

use std::collections::BTreeMap;

use crate::elements::DOF_LABELS;
use crate::error::{FrameError, FrameResult};
use crate::loads::{DistributedLoad, LoadCombination, PointLoad};
use crate::math::beam::{self, LoadTerm};
use crate::math::{self, reverse_cuthill_mckee, Mat12, Mat3, SparseMatrixBuilder, Vec as FVec};
use crate::model::FrameModel;

/// Node numbering: each node owns six consecutive global DOFs
#[derive(Debug, Clone)]
pub(crate) struct DofMap {
    names: Vec<String>,
    index: BTreeMap<String, usize>,
}

impl DofMap {
    /// Number the nodes in reverse Cuthill-McKee order of member connectivity
    pub fn number(model: &FrameModel) -> Self {
        let sorted: Vec<&String> = model.nodes().keys().collect();
        let position: BTreeMap<&str, usize> = sorted
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut adjacency = vec![Vec::new(); sorted.len()];
        for member in model.members().values() {
            if let (Some(&i), Some(&j)) = (
                position.get(member.i_node.as_str()),
                position.get(member.j_node.as_str()),
            ) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }

        let names: Vec<String> = reverse_cuthill_mckee(&adjacency)
            .into_iter()
            .map(|i| sorted[i].clone())
            .collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Self { names, index }
    }

    pub fn num_dofs(&self) -> usize {
        self.names.len() * 6
    }

    /// Node names by node index
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> FrameResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FrameError::NodeNotFound(name.to_string()))
    }

    /// Node name and DOF label of a global DOF
    pub fn describe(&self, dof: usize) -> (String, &'static str) {
        let name = self.names.get(dof / 6).cloned().unwrap_or_default();
        (name, DOF_LABELS[dof % 6])
    }
}

/// A member resolved against the model: geometry, stiffness and loads
#[derive(Debug)]
pub(crate) struct PreparedMember<'a> {
    pub name: &'a str,
    pub i_index: usize,
    pub j_index: usize,
    pub i_coords: [f64; 3],
    pub length: f64,
    /// Direction cosines (rows are local axes)
    pub r: Mat3,
    pub t: Mat12,
    /// Local stiffness without releases
    pub k_local: Mat12,
    /// Local stiffness with released DOFs condensed out
    pub k_condensed: Mat12,
    pub releases: [bool; 12],
    pub ea: f64,
    pub eiy: f64,
    pub eiz: f64,
    pub point_loads: &'a [PointLoad],
    pub dist_loads: &'a [DistributedLoad],
}

impl PreparedMember<'_> {
    /// Global DOF indices of the member's 12 end DOFs
    pub fn dofs(&self) -> [usize; 12] {
        std::array::from_fn(|k| {
            let node = if k < 6 { self.i_index } else { self.j_index };
            node * 6 + k % 6
        })
    }

    /// Factored local load terms for a combination
    pub fn load_terms(&self, combo: &LoadCombination) -> Vec<LoadTerm> {
        let mut terms = Vec::new();
        for load in self.point_loads {
            let factor = combo.factor(&load.case);
            if factor != 0.0 {
                terms.extend(LoadTerm::from_point_load(load, factor, &self.r));
            }
        }
        for load in self.dist_loads {
            let factor = combo.factor(&load.case);
            if factor != 0.0 {
                terms.extend(LoadTerm::from_distributed_load(
                    load,
                    factor,
                    &self.r,
                    self.length,
                ));
            }
        }
        terms
    }
}

/// Resolve every member against its nodes, material and section
pub(crate) fn prepare_members<'a>(
    model: &'a FrameModel,
    dofs: &DofMap,
) -> FrameResult<Vec<PreparedMember<'a>>> {
    model
        .members()
        .iter()
        .map(|(name, member)| {
            let i_node = model.node(&member.i_node)?;
            let j_node = model.node(&member.j_node)?;
            let material = model.material(&member.material)?;
            let section = model.section(&member.section)?;

            let r = math::member_rotation_matrix(&i_node.coords(), &j_node.coords(), member.rotation)
                .map_err(|e| match e {
                    FrameError::InvalidGeometry(msg) => {
                        FrameError::InvalidGeometry(format!("member '{}': {}", name, msg))
                    }
                    other => other,
                })?;
            let length = i_node.distance_to(j_node);

            let k_local = math::member_local_stiffness(
                material.e,
                material.g,
                section.a,
                section.iy,
                section.iz,
                section.j,
                length,
            );
            let releases = member.releases.as_array();
            let k_condensed = math::apply_releases(&k_local, &releases).map_err(|_| {
                FrameError::InvalidInput(format!(
                    "end releases leave member '{}' unstable",
                    name
                ))
            })?;

            Ok(PreparedMember {
                name,
                i_index: dofs.index_of(&member.i_node)?,
                j_index: dofs.index_of(&member.j_node)?,
                i_coords: i_node.coords(),
                length,
                r,
                t: math::expand_rotation(&r),
                k_local,
                k_condensed,
                releases,
                ea: material.e * section.a,
                eiy: material.e * section.iy,
                eiz: material.e * section.iz,
                point_loads: model.member_point_loads_of(name),
                dist_loads: model.member_dist_loads_of(name),
            })
        })
        .collect()
}

/// Scatter every member's global stiffness `T^T k T`
pub(crate) fn assemble_stiffness(members: &[PreparedMember<'_>], num_dofs: usize) -> SparseMatrixBuilder {
    let mut builder = SparseMatrixBuilder::new(num_dofs);
    for member in members {
        let k_global = member.t.transpose() * member.k_condensed * member.t;
        builder.add_member_matrix(&member.dofs(), &k_global);
    }
    builder
}

/// Global load vector for one combination
///
/// Factored node loads plus the member loads, carried to the nodes as the
/// negated fixed end reactions. `terms` is aligned with `members`.
pub(crate) fn load_vector(
    model: &FrameModel,
    dofs: &DofMap,
    members: &[PreparedMember<'_>],
    terms: &[Vec<LoadTerm>],
    combo: &LoadCombination,
) -> FrameResult<FVec> {
    let mut p = FVec::zeros(dofs.num_dofs());

    for (node_name, loads) in model.node_loads() {
        let base = dofs.index_of(node_name)? * 6;
        for load in loads {
            let factor = combo.factor(&load.case);
            if factor == 0.0 {
                continue;
            }
            for (i, value) in load.as_array().iter().enumerate() {
                p[base + i] += factor * value;
            }
        }
    }

    for (member, terms) in members.iter().zip(terms) {
        if terms.is_empty() {
            continue;
        }
        let fer = beam::fixed_end_reactions(terms, member.length);
        let fer = math::apply_fer_releases(&fer, &member.k_local, &member.releases)?;
        let fer_global = member.t.transpose() * fer;

        for (k, dof) in member.dofs().into_iter().enumerate() {
            p[dof] -= fer_global[k];
        }
    }

    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, Member, Node, Section};

    fn chain(n: usize) -> FrameModel {
        let mut model = FrameModel::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model.add_section("S", Section::rectangular(0.2, 0.4)).unwrap();
        for i in 0..n {
            model.add_node(&format!("N{}", i), Node::new(i as f64, 0.0, 0.0)).unwrap();
        }
        for i in 1..n {
            let (a, b) = (format!("N{}", i - 1), format!("N{}", i));
            model.add_member(&format!("M{}", i), Member::new(&a, &b, "Steel", "S")).unwrap();
        }
        model
    }

    #[test]
    fn test_numbering_covers_all_nodes() {
        let model = chain(12);
        let dofs = DofMap::number(&model);
        assert_eq!(dofs.num_dofs(), 72);
        for i in 0..12 {
            assert!(dofs.index_of(&format!("N{}", i)).unwrap() < 12);
        }
        assert!(matches!(dofs.index_of("X"), Err(FrameError::NodeNotFound(_))));
    }

    #[test]
    fn test_numbering_keeps_chain_banded() {
        // Alphabetical order would put N10, N11 between N1 and N2
        let model = chain(12);
        let dofs = DofMap::number(&model);
        let members = prepare_members(&model, &dofs).unwrap();
        for m in &members {
            assert_eq!((m.i_index as i64 - m.j_index as i64).abs(), 1);
        }
    }

    #[test]
    fn test_assembled_stiffness_is_symmetric() {
        let model = chain(4);
        let dofs = DofMap::number(&model);
        let members = prepare_members(&model, &dofs).unwrap();
        let k = assemble_stiffness(&members, dofs.num_dofs()).to_dense();
        assert_eq!(k.nrows(), 24);
        assert!((&k - k.transpose()).amax() < 1e-6 * k.amax());
    }

    #[test]
    fn test_describe_dof() {
        let model = chain(2);
        let dofs = DofMap::number(&model);
        let (name, label) = dofs.describe(dofs.index_of("N1").unwrap() * 6 + 5);
        assert_eq!(name, "N1");
        assert_eq!(label, "RZ");
    }
}
