//! `SeaORM` Entity prelude

pub use super::metric_identities::Entity as MetricIdentities;
pub use super::metric_values::Entity as MetricValues;
