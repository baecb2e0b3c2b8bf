//! Core engine: profitability computation and the refresh/save controller.

pub mod controller;
pub mod profit;
