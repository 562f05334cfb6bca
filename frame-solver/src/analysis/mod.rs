//! Linear static analysis
//!
//! The pipeline numbers the nodes, assembles one global stiffness matrix,
//! factorizes its free partition once and then solves every load
//! combination against that factor.

pub(crate) mod assembly;
pub(crate) mod solver;
pub(crate) mod statics;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::elements::Support;
use crate::error::{FrameError, FrameResult};
use crate::loads::LoadCombination;
use crate::math::beam::LoadTerm;
use crate::math::{self, Vec as FVec, Vec12};
use crate::model::FrameModel;
use crate::results::{Analysis, ComboResults, MemberResults, NodeDisplacement, Reactions};

use assembly::{DofMap, PreparedMember};
use solver::LinearSystem;

/// Name of the combination analysed when the model defines none
pub const DEFAULT_COMBO: &str = "Combo 1";

/// Options for structural analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Check static equilibrium after analysis
    pub check_statics: bool,
    /// Relative tolerance for the statics check
    pub statics_tolerance: f64,
    /// Use the skyline (banded) solver instead of a dense Cholesky
    pub sparse: bool,
    /// Solve load combinations on the rayon thread pool
    pub parallel: bool,
    /// Load combination tags to analyze (None = all)
    pub combo_tags: Option<Vec<String>>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_statics: false,
            statics_tolerance: 1e-6,
            sparse: true,
            parallel: true,
            combo_tags: None,
        }
    }
}

impl AnalysisOptions {
    /// Create options for linear analysis
    pub fn linear() -> Self {
        Self::default()
    }

    /// Enable the statics check
    pub fn with_statics_check(mut self) -> Self {
        self.check_statics = true;
        self
    }

    /// Set the statics check tolerance
    pub fn with_statics_tolerance(mut self, tol: f64) -> Self {
        self.statics_tolerance = tol;
        self
    }

    /// Use the dense solver
    pub fn dense(mut self) -> Self {
        self.sparse = false;
        self
    }

    /// Solve combinations one after another on the calling thread
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Filter by combo tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.combo_tags = Some(tags);
        self
    }
}

/// Run a linear static analysis of `model`
pub(crate) fn run(model: &FrameModel, options: &AnalysisOptions) -> FrameResult<Analysis> {
    if model.nodes().is_empty() {
        return Err(FrameError::InvalidInput("model has no nodes".to_string()));
    }
    if !(options.statics_tolerance > 0.0) {
        return Err(FrameError::InvalidInput(format!(
            "statics tolerance must be positive, got {}",
            options.statics_tolerance
        )));
    }

    let combos = select_combos(model, options)?;

    let dofs = DofMap::number(model);
    let members = assembly::prepare_members(model, &dofs)?;
    let k = assembly::assemble_stiffness(&members, dofs.num_dofs());
    log::debug!(
        "Assembled {} members into {} DOFs ({} stored entries)",
        members.len(),
        dofs.num_dofs(),
        k.nnz()
    );

    let system = LinearSystem::factorize(model, &dofs, k.to_csr(), options.sparse)?;

    let solve_one = |combo: &LoadCombination| {
        solve_combo(model, &dofs, &members, &system, combo, options)
    };
    let results: Vec<ComboResults> = if options.parallel {
        combos.par_iter().map(solve_one).collect::<FrameResult<_>>()?
    } else {
        combos.iter().map(solve_one).collect::<FrameResult<_>>()?
    };

    log::info!(
        "Linear analysis complete: {} nodes, {} members, {} free DOFs, {} combination(s)",
        model.nodes().len(),
        members.len(),
        system.num_free(),
        results.len()
    );

    Ok(Analysis::new(
        model.revision(),
        dofs.num_dofs(),
        system.num_free(),
        results
            .into_iter()
            .map(|combo| (combo.name.clone(), combo))
            .collect(),
    ))
}

/// Combinations to analyze, in name order
fn select_combos(model: &FrameModel, options: &AnalysisOptions) -> FrameResult<Vec<LoadCombination>> {
    if model.load_combos().is_empty() {
        let combo = model
            .load_cases()
            .keys()
            .fold(LoadCombination::new(DEFAULT_COMBO), |combo, case| {
                combo.with_case(case, 1.0)
            });
        log::debug!("No load combinations defined, analysing '{}'", DEFAULT_COMBO);
        return Ok(vec![combo]);
    }

    let combos: Vec<LoadCombination> = model
        .load_combos()
        .values()
        .filter(|combo| match &options.combo_tags {
            Some(tags) => combo.has_any_tag(tags),
            None => true,
        })
        .cloned()
        .collect();

    if combos.is_empty() {
        return Err(FrameError::InvalidInput(
            "no load combination carries the requested tags".to_string(),
        ));
    }
    Ok(combos)
}

fn solve_combo(
    model: &FrameModel,
    dofs: &DofMap,
    members: &[PreparedMember<'_>],
    system: &LinearSystem,
    combo: &LoadCombination,
    options: &AnalysisOptions,
) -> FrameResult<ComboResults> {
    let terms: Vec<Vec<LoadTerm>> = members.iter().map(|m| m.load_terms(combo)).collect();
    let loads = assembly::load_vector(model, dofs, members, &terms, combo)?;
    let (d, r) = system.solve(&loads);

    let mut displacements = BTreeMap::new();
    for (index, name) in dofs.names().iter().enumerate() {
        displacements.insert(
            name.clone(),
            NodeDisplacement::from_array(node_slice(&d, index)),
        );
    }

    let mut reactions = BTreeMap::new();
    for (name, support) in model.supports() {
        if !support.is_supported() {
            continue;
        }
        let index = dofs.index_of(name)?;
        reactions.insert(
            name.clone(),
            Reactions::from_array(mask_restrained(node_slice(&r, index), support)),
        );
    }

    let mut member_results = BTreeMap::new();
    for (member, terms) in members.iter().zip(terms) {
        let d_global = Vec12::from_iterator(
            node_slice(&d, member.i_index)
                .into_iter()
                .chain(node_slice(&d, member.j_index)),
        );
        member_results.insert(member.name.to_string(), member_results_for(member, &d_global, terms)?);
    }

    let statics = if options.check_statics {
        Some(statics::check(
            model,
            members,
            &member_results,
            &reactions,
            combo,
            options.statics_tolerance,
        )?)
    } else {
        None
    };

    log::debug!("Solved combination '{}'", combo.name);

    Ok(ComboResults {
        name: combo.name.clone(),
        displacements,
        reactions,
        members: member_results,
        statics,
    })
}

/// Local end forces and diagram data for one member
fn member_results_for(
    member: &PreparedMember<'_>,
    d_global: &Vec12,
    terms: Vec<LoadTerm>,
) -> FrameResult<MemberResults> {
    let d_local = member.t * d_global;
    let fer = math::beam::fixed_end_reactions(&terms, member.length);
    let d_local = math::recover_released_displacements(&d_local, &fer, &member.k_local, &member.releases)?;
    let forces = member.k_local * d_local + fer;

    Ok(MemberResults {
        length: member.length,
        forces,
        displacements: d_local,
        terms,
        axial_rigidity: member.ea,
        bending_rigidity_y: member.eiy,
        bending_rigidity_z: member.eiz,
    })
}

fn node_slice(v: &FVec, node_index: usize) -> [f64; 6] {
    let base = node_index * 6;
    std::array::from_fn(|i| v[base + i])
}

fn mask_restrained(mut values: [f64; 6], support: &Support) -> [f64; 6] {
    for (value, restrained) in values.iter_mut().zip(support.restraints()) {
        if !restrained {
            *value = 0.0;
        }
    }
    values
}
