//! Pipeline module - synthesize, degrade, discretize, assemble and mine

pub mod assemble;
pub mod autobin;
pub mod discretize;
pub mod error;
pub mod generator;
pub mod mining;
pub mod missing;
pub mod outcome;
pub mod table;

pub use assemble::*;
pub use autobin::*;
pub use discretize::*;
pub use error::{PipelineError, Result};
pub use generator::*;
pub use mining::{
    check_preconditions, invoke_miner, AssociationMiner, CombinationResult, ContingencyMiner, MinerConfig,
    MiningRequest, DEFAULT_RESULT_COUNT,
};
pub use missing::*;
pub use outcome::*;
pub use table::*;
