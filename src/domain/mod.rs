// Domain layer - Dashboard snapshot access and insight values
pub mod insights;
pub mod snapshot;
