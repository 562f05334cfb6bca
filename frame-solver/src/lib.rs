//! Frame Solver - linear static analysis of 3D elastic frames
//!
//! Models are built from named nodes, materials, sections and members with
//! supports, node loads and member loads grouped into load cases. Every load
//! combination is solved against one factorization of the global stiffness
//! matrix, and each member exposes continuous axial, shear, moment, torque
//! and deflection functions along its length.
//!
//! ## Example
//! ```rust
//! use frame_solver::prelude::*;
//!
//! let mut model = FrameModel::new();
//!
//! model.add_material("Steel", Material::new(200e9, 77e9, 0.3, 7850.0)).unwrap();
//! model.add_section("W12x26", Section::new(7.65e-3, 17.3e-6, 204e-6, 0.3e-6)).unwrap();
//!
//! model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
//! model.add_node("N2", Node::new(10.0, 0.0, 0.0)).unwrap();
//! model.add_member("M1", Member::new("N1", "N2", "Steel", "W12x26")).unwrap();
//! model.def_support("N1", Support::fixed()).unwrap();
//!
//! model.add_load_case(LoadCase::dead()).unwrap();
//! model.add_node_load("N2", NodeLoad::fy(-10000.0, "D")).unwrap();
//!
//! model.analyze(AnalysisOptions::linear().with_statics_check()).unwrap();
//!
//! let tip = model.node_displacement("N2", "Combo 1").unwrap();
//! assert!(tip.dy < 0.0);
//!
//! let m1 = model.member_results("M1", "Combo 1").unwrap();
//! let root_moment = m1.moment_z(0.0).unwrap();
//! assert!((root_moment + 100000.0).abs() < 1e-3);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod io;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::AnalysisOptions;
    pub use crate::elements::{Material, Member, MemberReleases, Node, Section, Support};
    pub use crate::error::{FrameError, FrameResult};
    pub use crate::io::ModelFile;
    pub use crate::loads::{
        DistributedLoad, LoadCase, LoadCombination, LoadDirection, NodeLoad, PointLoad,
    };
    pub use crate::model::FrameModel;
    pub use crate::results::{
        Analysis, ComboResults, Diagram, Extreme, MemberForces, MemberResults, NodeDisplacement,
        Reactions, StaticsReport,
    };
}
