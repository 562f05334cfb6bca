//! Global equilibrium check

use std::collections::BTreeMap;

use super::assembly::PreparedMember;
use crate::error::FrameResult;
use crate::loads::LoadCombination;
use crate::math::beam::{LoadIntegrals, Side};
use crate::math::Vec3;
use crate::model::FrameModel;
use crate::results::{MemberResults, Reactions, StaticsReport};

/// Running force and moment (about the global origin) totals
#[derive(Default)]
struct Resultant {
    force: Vec3,
    moment: Vec3,
    /// Sum of contribution magnitudes, the scale for the relative check
    force_scale: f64,
    moment_scale: f64,
}

impl Resultant {
    fn add_force(&mut self, at: &Vec3, force: Vec3) {
        let moment = at.cross(&force);
        self.force += force;
        self.moment += moment;
        self.force_scale += force.norm();
        self.moment_scale += moment.norm();
    }

    fn add_moment(&mut self, moment: Vec3) {
        self.moment += moment;
        self.moment_scale += moment.norm();
    }
}

/// Sum applied loads and reactions for one combination
///
/// Member loads enter as their global resultants: for each local axis the
/// total load and its first moment about the i-node.
pub(crate) fn check(
    model: &FrameModel,
    members: &[PreparedMember<'_>],
    results: &BTreeMap<String, MemberResults>,
    reactions: &BTreeMap<String, Reactions>,
    combo: &LoadCombination,
    tolerance: f64,
) -> FrameResult<StaticsReport> {
    let mut applied = Resultant::default();

    for (name, loads) in model.node_loads() {
        let at = Vec3::from(model.node(name)?.coords());
        for load in loads {
            let factor = combo.factor(&load.case);
            if factor == 0.0 {
                continue;
            }
            let [fx, fy, fz, mx, my, mz] = load.as_array();
            applied.add_force(&at, Vec3::new(fx, fy, fz) * factor);
            applied.add_moment(Vec3::new(mx, my, mz) * factor);
        }
    }

    for member in members {
        let Some(result) = results.get(member.name) else {
            continue;
        };
        if result.terms.is_empty() {
            continue;
        }

        let l = member.length;
        let s = LoadIntegrals::at(&result.terms, l, Side::Right);
        let origin = Vec3::from(member.i_coords);
        let axis = member.r.row(0).transpose();

        for local in 0..3 {
            let total = s.get(local, 0);
            // First moment about the i-node
            let lever = l * total - s.get(local, 1);
            let direction = member.r.row(local).transpose();

            applied.add_force(&origin, direction * total);
            applied.add_moment(axis.cross(&direction) * lever);
            applied.add_moment(direction * s.get(local + 3, 0));
        }
    }

    let mut reaction = Resultant::default();
    for (name, r) in reactions {
        let at = Vec3::from(model.node(name)?.coords());
        reaction.add_force(&at, Vec3::new(r.fx, r.fy, r.fz));
        reaction.add_moment(Vec3::new(r.mx, r.my, r.mz));
    }

    let net_force = applied.force + reaction.force;
    let net_moment = applied.moment + reaction.moment;
    let force_scale = applied.force_scale + reaction.force_scale;
    let moment_scale = applied.moment_scale + reaction.moment_scale;

    let balanced = within(net_force.norm(), force_scale, tolerance)
        && within(net_moment.norm(), moment_scale, tolerance);

    if balanced {
        log::debug!("Statics check passed for '{}'", combo.name);
    } else {
        log::warn!(
            "Statics check failed for '{}': net force {:.6e}, net moment {:.6e}",
            combo.name,
            net_force.norm(),
            net_moment.norm()
        );
    }

    Ok(StaticsReport {
        combo: combo.name.clone(),
        applied_force: applied.force.into(),
        applied_moment: applied.moment.into(),
        reaction_force: reaction.force.into(),
        reaction_moment: reaction.moment.into(),
        net_force: net_force.into(),
        net_moment: net_moment.into(),
        balanced,
    })
}

fn within(residual: f64, scale: f64, tolerance: f64) -> bool {
    residual <= tolerance * scale.max(f64::MIN_POSITIVE) || residual < 1e-12
}
