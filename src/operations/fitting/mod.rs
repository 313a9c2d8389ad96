mod cyclic_tridiagonal;
mod fit_periodic_bspline;

pub use fit_periodic_bspline::{FitParams, FitPeriodicBSpline, Parameterization};
