use crate::errors::CoreError;
use crate::models::view::DashboardView;

/// One-way sink for dashboard output.
///
/// Implementations decide labels, colours, currency symbols and rounding.
/// Nothing they return flows back into the computation.
pub trait Presenter {
    fn present(&mut self, view: &DashboardView) -> Result<(), CoreError>;
}
