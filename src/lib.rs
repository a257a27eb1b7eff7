//! SiMoHi hydrological alert service.
//!
//! Decides whether a flood alert should be raised for a sub-basin of the
//! Rio de Janeiro state network from two independent signals, a radar
//! rainfall estimate and a ground gauge reading, and records the reasoning
//! behind every decision.
//!
//! ```no_run
//! use simohi_service::alert::ConvergenceEngine;
//! use simohi_service::basins::find_basin;
//!
//! let unit = find_basin("sb-02").unwrap().to_unit();
//! let mut engine = ConvergenceEngine::new();
//! let analysis = engine.analyze(&unit, None, None);
//! assert!(engine.build_alert(&unit, &analysis).is_none());
//! ```

pub mod alert;
pub mod basins;
pub mod config;
pub mod dev_mode;
pub mod logging;
pub mod model;
pub mod store;
pub mod trace;
