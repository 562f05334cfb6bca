//! Frame model - named registry of nodes, members, supports and loads

use std::collections::BTreeMap;

use crate::analysis::{self, AnalysisOptions};
use crate::elements::{Material, Member, Node, Section, Support};
use crate::error::{FrameError, FrameResult};
use crate::loads::{DistributedLoad, LoadCase, LoadCombination, NodeLoad, PointLoad};
use crate::math;
use crate::results::{Analysis, MemberResults, NodeDisplacement, Reactions};

/// A 3D frame model
///
/// Every add/define call validates its references against what is already
/// registered, so members need their nodes, material and section first and
/// loads need their member (or node) and load case. Each successful change
/// bumps the model revision; results computed for an older revision are
/// refused with [`FrameError::StaleResults`].
#[derive(Debug, Clone, Default)]
pub struct FrameModel {
    nodes: BTreeMap<String, Node>,
    materials: BTreeMap<String, Material>,
    sections: BTreeMap<String, Section>,
    members: BTreeMap<String, Member>,
    supports: BTreeMap<String, Support>,
    load_cases: BTreeMap<String, LoadCase>,
    node_loads: BTreeMap<String, Vec<NodeLoad>>,
    member_point_loads: BTreeMap<String, Vec<PointLoad>>,
    member_dist_loads: BTreeMap<String, Vec<DistributedLoad>>,
    load_combos: BTreeMap<String, LoadCombination>,

    revision: u64,
    analysis: Option<Analysis>,
}

impl FrameModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node to the model
    pub fn add_node(&mut self, name: &str, node: Node) -> FrameResult<()> {
        if self.nodes.contains_key(name) {
            return Err(FrameError::DuplicateName(name.to_string()));
        }
        if !node.is_finite() {
            return Err(FrameError::InvalidGeometry(format!(
                "node '{}' has non-finite coordinates",
                name
            )));
        }
        self.nodes.insert(name.to_string(), node);
        self.touch();
        Ok(())
    }

    /// Add a material to the model
    pub fn add_material(&mut self, name: &str, material: Material) -> FrameResult<()> {
        if self.materials.contains_key(name) {
            return Err(FrameError::DuplicateName(name.to_string()));
        }
        material.validate(name)?;
        self.materials.insert(name.to_string(), material);
        self.touch();
        Ok(())
    }

    /// Add a section to the model
    pub fn add_section(&mut self, name: &str, section: Section) -> FrameResult<()> {
        if self.sections.contains_key(name) {
            return Err(FrameError::DuplicateName(name.to_string()));
        }
        section.validate(name)?;
        self.sections.insert(name.to_string(), section);
        self.touch();
        Ok(())
    }

    /// Add a member to the model
    pub fn add_member(&mut self, name: &str, member: Member) -> FrameResult<()> {
        if self.members.contains_key(name) {
            return Err(FrameError::DuplicateName(name.to_string()));
        }
        let i_node = self.node(&member.i_node)?;
        let j_node = self.node(&member.j_node)?;
        let material = self.material(&member.material)?;
        let section = self.section(&member.section)?;

        if member.i_node == member.j_node {
            return Err(FrameError::InvalidGeometry(format!(
                "member '{}' starts and ends at node '{}'",
                name, member.i_node
            )));
        }
        if !member.rotation.is_finite() {
            return Err(FrameError::InvalidInput(format!(
                "member '{}' has a non-finite rotation",
                name
            )));
        }
        math::member_rotation_matrix(&i_node.coords(), &j_node.coords(), member.rotation).map_err(
            |e| match e {
                FrameError::InvalidGeometry(msg) => {
                    FrameError::InvalidGeometry(format!("member '{}': {}", name, msg))
                }
                other => other,
            },
        )?;

        if member.releases.any() {
            let k = math::member_local_stiffness(
                material.e,
                material.g,
                section.a,
                section.iy,
                section.iz,
                section.j,
                i_node.distance_to(j_node),
            );
            math::apply_releases(&k, &member.releases.as_array()).map_err(|_| {
                FrameError::InvalidInput(format!(
                    "end releases leave member '{}' unstable",
                    name
                ))
            })?;
        }

        self.members.insert(name.to_string(), member);
        self.touch();
        Ok(())
    }

    /// Define the support at a node, replacing any earlier definition
    pub fn def_support(&mut self, node_name: &str, support: Support) -> FrameResult<()> {
        self.node(node_name)?;
        if support.enforced.iter().flatten().any(|v| !v.is_finite()) {
            return Err(FrameError::InvalidInput(format!(
                "support at '{}' has a non-finite enforced displacement",
                node_name
            )));
        }
        let unrestrained = support.unrestrained_enforced();
        if !unrestrained.is_empty() {
            return Err(FrameError::InvalidInput(format!(
                "support at '{}' enforces a displacement on unrestrained DOF(s) {}",
                node_name,
                unrestrained.join(", ")
            )));
        }
        self.supports.insert(node_name.to_string(), support);
        self.touch();
        Ok(())
    }

    /// Define a load case
    pub fn add_load_case(&mut self, case: LoadCase) -> FrameResult<()> {
        if self.load_cases.contains_key(&case.name) {
            return Err(FrameError::DuplicateName(case.name));
        }
        self.load_cases.insert(case.name.clone(), case);
        self.touch();
        Ok(())
    }

    /// Add a node load
    pub fn add_node_load(&mut self, node_name: &str, load: NodeLoad) -> FrameResult<()> {
        self.node(node_name)?;
        self.load_case(&load.case)?;
        if load.as_array().iter().any(|v| !v.is_finite()) {
            return Err(FrameError::InvalidInput(format!(
                "node load on '{}' has non-finite components",
                node_name
            )));
        }
        self.node_loads
            .entry(node_name.to_string())
            .or_default()
            .push(load);
        self.touch();
        Ok(())
    }

    /// Add a point load to a member
    pub fn add_member_point_load(&mut self, member_name: &str, load: PointLoad) -> FrameResult<()> {
        let length = self.member_length(member_name)?;
        self.load_case(&load.case)?;
        if !load.magnitude.is_finite() {
            return Err(FrameError::InvalidInput(format!(
                "point load on '{}' has a non-finite magnitude",
                member_name
            )));
        }
        if !(0.0..=length).contains(&load.position) {
            return Err(FrameError::InvalidInput(format!(
                "point load at {} lies outside member '{}' (length {})",
                load.position, member_name, length
            )));
        }
        self.member_point_loads
            .entry(member_name.to_string())
            .or_default()
            .push(load);
        self.touch();
        Ok(())
    }

    /// Add a distributed load to a member
    pub fn add_member_dist_load(&mut self, member_name: &str, load: DistributedLoad) -> FrameResult<()> {
        let length = self.member_length(member_name)?;
        self.load_case(&load.case)?;
        if load.direction.is_moment() {
            return Err(FrameError::InvalidInput(format!(
                "distributed load on '{}' must be a force, not {:?}",
                member_name, load.direction
            )));
        }
        if !load.w1.is_finite() || !load.w2.is_finite() {
            return Err(FrameError::InvalidInput(format!(
                "distributed load on '{}' has non-finite intensity",
                member_name
            )));
        }

        // No end (or an infinite one) means "to the j-node"
        let x2 = load
            .x2
            .filter(|x2| !x2.is_infinite())
            .unwrap_or(length);
        if !(0.0..length).contains(&load.x1) || !(x2 > load.x1 && x2 <= length) {
            return Err(FrameError::InvalidInput(format!(
                "distributed load span [{}, {}] is not within member '{}' (length {})",
                load.x1, x2, member_name, length
            )));
        }

        self.member_dist_loads
            .entry(member_name.to_string())
            .or_default()
            .push(DistributedLoad {
                x2: Some(x2),
                ..load
            });
        self.touch();
        Ok(())
    }

    /// Add a load combination
    pub fn add_load_combo(&mut self, combo: LoadCombination) -> FrameResult<()> {
        if self.load_combos.contains_key(&combo.name) {
            return Err(FrameError::DuplicateName(combo.name));
        }
        for (case, factor) in &combo.factors {
            self.load_case(case)?;
            if !factor.is_finite() {
                return Err(FrameError::InvalidInput(format!(
                    "combination '{}' has a non-finite factor for '{}'",
                    combo.name, case
                )));
            }
        }
        self.load_combos.insert(combo.name.clone(), combo);
        self.touch();
        Ok(())
    }

    // ========================
    // Registry Access
    // ========================

    pub fn node(&self, name: &str) -> FrameResult<&Node> {
        self.nodes
            .get(name)
            .ok_or_else(|| FrameError::NodeNotFound(name.to_string()))
    }

    pub fn material(&self, name: &str) -> FrameResult<&Material> {
        self.materials
            .get(name)
            .ok_or_else(|| FrameError::MaterialNotFound(name.to_string()))
    }

    pub fn section(&self, name: &str) -> FrameResult<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| FrameError::SectionNotFound(name.to_string()))
    }

    pub fn member(&self, name: &str) -> FrameResult<&Member> {
        self.members
            .get(name)
            .ok_or_else(|| FrameError::MemberNotFound(name.to_string()))
    }

    pub fn load_case(&self, name: &str) -> FrameResult<&LoadCase> {
        self.load_cases
            .get(name)
            .ok_or_else(|| FrameError::LoadCaseNotFound(name.to_string()))
    }

    pub fn load_combo(&self, name: &str) -> FrameResult<&LoadCombination> {
        self.load_combos
            .get(name)
            .ok_or_else(|| FrameError::LoadCombinationNotFound(name.to_string()))
    }

    /// Distance between a member's end nodes
    pub fn member_length(&self, name: &str) -> FrameResult<f64> {
        let member = self.member(name)?;
        Ok(self.node(&member.i_node)?.distance_to(self.node(&member.j_node)?))
    }

    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    pub fn materials(&self) -> &BTreeMap<String, Material> {
        &self.materials
    }

    pub fn sections(&self) -> &BTreeMap<String, Section> {
        &self.sections
    }

    pub fn members(&self) -> &BTreeMap<String, Member> {
        &self.members
    }

    pub fn supports(&self) -> &BTreeMap<String, Support> {
        &self.supports
    }

    pub fn load_cases(&self) -> &BTreeMap<String, LoadCase> {
        &self.load_cases
    }

    pub fn load_combos(&self) -> &BTreeMap<String, LoadCombination> {
        &self.load_combos
    }

    /// Node loads keyed by node name
    pub fn node_loads(&self) -> &BTreeMap<String, Vec<NodeLoad>> {
        &self.node_loads
    }

    /// Member point loads keyed by member name
    pub fn member_point_loads(&self) -> &BTreeMap<String, Vec<PointLoad>> {
        &self.member_point_loads
    }

    /// Member distributed loads keyed by member name, with resolved ends
    pub fn member_dist_loads(&self) -> &BTreeMap<String, Vec<DistributedLoad>> {
        &self.member_dist_loads
    }

    pub(crate) fn member_point_loads_of(&self, member: &str) -> &[PointLoad] {
        self.member_point_loads.get(member).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn member_dist_loads_of(&self, member: &str) -> &[DistributedLoad] {
        self.member_dist_loads.get(member).map_or(&[], Vec::as_slice)
    }

    /// Counter bumped by every successful model change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ========================
    // Analysis Methods
    // ========================

    /// Run a linear static analysis without touching the model
    pub fn solve(&self, options: &AnalysisOptions) -> FrameResult<Analysis> {
        analysis::run(self, options)
    }

    /// Run analysis with custom options and keep the result on the model
    pub fn analyze(&mut self, options: AnalysisOptions) -> FrameResult<&Analysis> {
        let result = self.solve(&options)?;
        Ok(self.analysis.insert(result))
    }

    /// Run linear static analysis with default options
    pub fn analyze_linear(&mut self) -> FrameResult<&Analysis> {
        self.analyze(AnalysisOptions::linear())
    }

    /// The last analysis, if it still matches the model
    pub fn analysis(&self) -> FrameResult<&Analysis> {
        match &self.analysis {
            None => Err(FrameError::NotAnalyzed),
            Some(a) if a.revision() != self.revision => Err(FrameError::StaleResults),
            Some(a) => Ok(a),
        }
    }

    /// Check if the model has current results
    pub fn is_analyzed(&self) -> bool {
        self.analysis().is_ok()
    }

    // ========================
    // Result Access Methods
    // ========================

    /// Get node displacement
    pub fn node_displacement(&self, node_name: &str, combo_name: &str) -> FrameResult<NodeDisplacement> {
        self.node(node_name)?;
        self.analysis()?.node_displacement(node_name, combo_name)
    }

    /// Get node reactions
    pub fn node_reaction(&self, node_name: &str, combo_name: &str) -> FrameResult<Reactions> {
        self.node(node_name)?;
        self.analysis()?.node_reaction(node_name, combo_name)
    }

    /// Get the force and deflection functions of a member
    pub fn member_results(&self, member_name: &str, combo_name: &str) -> FrameResult<&MemberResults> {
        self.member(member_name)?;
        self.analysis()?.member_results(member_name, combo_name)
    }

    /// Get all load combination names
    pub fn combo_names(&self) -> Vec<String> {
        self.load_combos.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::MemberReleases;
    use crate::loads::LoadDirection;
    use approx::assert_relative_eq;

    fn cantilever() -> FrameModel {
        let mut model = FrameModel::new();
        model.add_material("Steel", Material::steel()).unwrap();
        model.add_section("Section1", Section::rectangular(0.3, 0.5)).unwrap();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(10.0, 0.0, 0.0)).unwrap();
        model.add_member("M1", Member::new("N1", "N2", "Steel", "Section1")).unwrap();
        model.def_support("N1", Support::fixed()).unwrap();
        model.add_load_case(LoadCase::new("Case 1")).unwrap();
        model
    }

    #[test]
    fn test_simple_cantilever() {
        let mut model = cantilever();
        model.add_node_load("N2", NodeLoad::fy(-10000.0, "Case 1")).unwrap();
        model.analyze_linear().unwrap();

        let disp = model.node_displacement("N2", "Combo 1").unwrap();
        assert!(disp.dy < 0.0, "Expected negative Y displacement");

        let rxn = model.node_reaction("N1", "Combo 1").unwrap();
        assert_relative_eq!(rxn.fy, 10000.0, max_relative = 1e-8);
        assert_relative_eq!(rxn.mz, 100000.0, max_relative = 1e-8);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut model = cantilever();
        assert!(matches!(
            model.add_node("N1", Node::new(1.0, 1.0, 1.0)),
            Err(FrameError::DuplicateName(_))
        ));
        assert!(matches!(
            model.add_load_case(LoadCase::new("Case 1")),
            Err(FrameError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_references_checked_on_definition() {
        let mut model = cantilever();
        assert!(matches!(
            model.add_member("M2", Member::new("N1", "N9", "Steel", "Section1")),
            Err(FrameError::NodeNotFound(_))
        ));
        assert!(matches!(
            model.add_member("M2", Member::new("N1", "N2", "Glass", "Section1")),
            Err(FrameError::MaterialNotFound(_))
        ));
        assert!(matches!(
            model.add_member("M2", Member::new("N1", "N2", "Steel", "W99")),
            Err(FrameError::SectionNotFound(_))
        ));
        assert!(matches!(
            model.add_node_load("N2", NodeLoad::fy(1.0, "Wind")),
            Err(FrameError::LoadCaseNotFound(_))
        ));
        assert!(matches!(
            model.add_member_point_load("M9", PointLoad::downward(1.0, 1.0, "Case 1")),
            Err(FrameError::MemberNotFound(_))
        ));
        assert!(matches!(
            model.add_load_combo(LoadCombination::single("C", "Snow")),
            Err(FrameError::LoadCaseNotFound(_))
        ));
        assert!(matches!(
            model.def_support("N7", Support::pinned()),
            Err(FrameError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_enforced_displacement_needs_restraint() {
        let mut model = cantilever();
        let revision = model.revision();

        let mut support = Support::new();
        support.enforced[1] = Some(-0.01);
        assert!(matches!(
            model.def_support("N2", support),
            Err(FrameError::InvalidInput(_))
        ));
        assert!(model.supports().get("N2").is_none());
        assert_eq!(model.revision(), revision);

        let settled = Support::new().with_enforced(1, -0.01).unwrap();
        model.def_support("N2", settled).unwrap();
        model.analyze_linear().unwrap();
        assert_eq!(model.node_displacement("N2", "Combo 1").unwrap().dy, -0.01);
    }

    #[test]
    fn test_zero_length_member_rejected() {
        let mut model = cantilever();
        model.add_node("N3", Node::new(10.0, 0.0, 0.0)).unwrap();
        assert!(matches!(
            model.add_member("M2", Member::new("N2", "N3", "Steel", "Section1")),
            Err(FrameError::InvalidGeometry(_))
        ));
        assert!(matches!(
            model.add_member("M3", Member::new("N2", "N2", "Steel", "Section1")),
            Err(FrameError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_load_positions_validated() {
        let mut model = cantilever();
        assert!(matches!(
            model.add_member_point_load("M1", PointLoad::downward(1.0, 10.5, "Case 1")),
            Err(FrameError::InvalidInput(_))
        ));
        assert!(matches!(
            model.add_member_dist_load(
                "M1",
                DistributedLoad::new(1.0, 1.0, 6.0, 4.0, LoadDirection::Fy, "Case 1")
            ),
            Err(FrameError::InvalidInput(_))
        ));
        assert!(matches!(
            model.add_member_dist_load("M1", DistributedLoad::uniform(1.0, LoadDirection::MZ, "Case 1")),
            Err(FrameError::InvalidInput(_))
        ));

        let open_ended = DistributedLoad {
            x2: Some(f64::INFINITY),
            ..DistributedLoad::uniform(-2.0, LoadDirection::FY, "Case 1")
        };
        model.add_member_dist_load("M1", open_ended).unwrap();
        assert_eq!(model.member_dist_loads()["M1"][0].x2, Some(10.0));
    }

    #[test]
    fn test_unstable_release_rejected() {
        let mut model = cantilever();
        model.add_node("N3", Node::new(0.0, 5.0, 0.0)).unwrap();
        let mut releases = MemberReleases::none();
        releases.i_node[3] = true;
        releases.j_node[3] = true;
        assert!(matches!(
            model.add_member("M2", Member::new("N1", "N3", "Steel", "Section1").with_releases(releases)),
            Err(FrameError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_results_state_errors() {
        let mut model = cantilever();
        model.add_node_load("N2", NodeLoad::fy(-1.0, "Case 1")).unwrap();
        assert!(matches!(
            model.node_displacement("N2", "Combo 1"),
            Err(FrameError::NotAnalyzed)
        ));

        model.analyze_linear().unwrap();
        assert!(model.is_analyzed());
        assert!(matches!(
            model.node_displacement("N2", "Nope"),
            Err(FrameError::LoadCombinationNotFound(_))
        ));

        model.add_node_load("N2", NodeLoad::fx(5.0, "Case 1")).unwrap();
        assert!(matches!(
            model.node_displacement("N2", "Combo 1"),
            Err(FrameError::StaleResults)
        ));
        assert!(!model.is_analyzed());
    }

    #[test]
    fn test_solve_leaves_model_untouched() {
        let mut model = cantilever();
        model.add_node_load("N2", NodeLoad::fz(3.0, "Case 1")).unwrap();
        let analysis = model.solve(&AnalysisOptions::linear()).unwrap();
        assert_eq!(analysis.revision(), model.revision());
        assert!(matches!(model.analysis(), Err(FrameError::NotAnalyzed)));
    }

    #[test]
    fn test_failed_definition_keeps_revision() {
        let mut model = cantilever();
        let before = model.revision();
        let _ = model.add_node("N1", Node::new(0.0, 0.0, 0.0));
        assert_eq!(model.revision(), before);
    }
}
