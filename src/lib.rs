//! # Sales Forecast Workspace
//!
//! Umbrella crate over the workspace members.
//!
//! - [`sales_math`]: simplex optimisation, least squares and lag polynomials
//! - [`sales_forecast`]: aggregation, model selection, artifacts and serving
//!
//! ## Example
//!
//! ```
//! use sales_forecast_workspace::sales_forecast::Period;
//!
//! let period: Period = "2024-12".parse().unwrap();
//! assert_eq!(period.succ().label(), "January 2025");
//! ```

pub use sales_forecast;
pub use sales_math;
