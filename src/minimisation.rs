use argmin::core::observers::{ObserverMode, SlogLogger};
use argmin::core::{Executor, Jacobian, Operator, State, TerminationReason};
use argmin::solver::gaussnewton::GaussNewtonLS;
use argmin::solver::linesearch::MoreThuenteLineSearch;
use log::debug;
use ndarray::{s, Array1, Array2};

use crate::isotherm::IsothermModel;
use crate::{Error, Result};

const MAX_ITERS: u64 = 100;

/// Nonlinear least-squares problem for a two-parameter isotherm
///
/// The residual vector is the model evaluated at every equilibrium concentration minus the
/// observed equilibrium quantities.
#[derive(Clone)]
pub(crate) struct Problem {
    model: IsothermModel,
    /// Equilibrium concentrations Ce
    ce: Array1<f64>,
    /// Observed equilibrium quantities qe
    qe: Array1<f64>,
}

impl Problem {
    pub(crate) fn new(model: IsothermModel, ce: &[f64], qe: &[f64]) -> Result<Self> {
        if ce.len() != qe.len() {
            return Err(Error::input_shape(format!(
                "{} equilibrium concentrations for {} equilibrium quantities",
                ce.len(),
                qe.len()
            )));
        }
        if ce.len() < 2 {
            return Err(Error::input_shape(format!(
                "a two parameter isotherm needs at least two points, found {}",
                ce.len()
            )));
        }
        Ok(Self {
            model,
            ce: Array1::from(ce.to_vec()),
            qe: Array1::from(qe.to_vec()),
        })
    }

    /// Evaluate the model at every `Ce` for parameters `params`
    pub(crate) fn compute(&self, params: &Array1<f64>) -> Array1<f64> {
        let params = [params[0], params[1]];
        self.ce.mapv(|ce| self.model.evaluate(ce, params))
    }

    /// Compute the `ii`th column of the problem Jacobian
    fn jacobian_column(&self, params: &Array1<f64>, ii: usize) -> Array1<f64> {
        let params = [params[0], params[1]];
        self.ce.mapv(|ce| self.model.gradient(ce, params)[ii])
    }

    /// Run the optimisation from `initial_parameters`
    ///
    /// Gauss-Newton with a More-Thuente line search. Terminating on the iteration cap, a solver
    /// failure or non-finite parameters are all reported as a failure to converge.
    pub(crate) fn solve(self, initial_parameters: Array1<f64>, verbose: bool) -> Result<Array1<f64>> {
        let (param, iterations) = self.solve_within(initial_parameters, verbose, MAX_ITERS)?;
        debug!("converged after {iterations} iterations");
        Ok(param)
    }

    /// As [`Problem::solve`], capped at `max_iters`, also returning the iterations used
    fn solve_within(
        self,
        initial_parameters: Array1<f64>,
        verbose: bool,
        max_iters: u64,
    ) -> Result<(Array1<f64>, u64)> {
        let model = self.model.name();
        let guess = initial_parameters.to_vec();
        let failed = |reason: String| Error::FitConvergence {
            model,
            guess: guess.clone(),
            reason,
        };

        let linesearch = MoreThuenteLineSearch::new()
            .with_bounds(0.0, 1.0)
            .map_err(|e| failed(e.to_string()))?;

        // Set up solver
        let solver = GaussNewtonLS::new(linesearch)
            .with_tolerance(f64::EPSILON.sqrt())
            .map_err(|e| failed(e.to_string()))?;

        let mut executor = Executor::new(self, solver)
            .configure(|state| state.param(initial_parameters).max_iters(max_iters));
        if verbose {
            executor = executor.add_observer(SlogLogger::term(), ObserverMode::Always);
        }

        // Run solver
        let res = executor.run().map_err(|e| failed(e.to_string()))?;

        if let Some(TerminationReason::MaxItersReached) = res.state().get_termination_reason() {
            return Err(failed(format!(
                "no convergence within {max_iters} iterations"
            )));
        }

        let mut state = res.state().clone();
        let param = state
            .take_param()
            .ok_or_else(|| failed("solver returned no parameters".to_owned()))?;
        if param.iter().any(|p| !p.is_finite()) {
            return Err(failed(format!("non-finite parameters {param}")));
        }
        Ok((param, state.get_iter()))
    }
}

impl Operator for Problem {
    type Param = Array1<f64>;
    type Output = Array1<f64>;

    fn apply(&self, p: &Self::Param) -> ::std::result::Result<Self::Output, argmin::core::Error> {
        Ok(self.compute(p) - &self.qe)
    }
}

impl Jacobian for Problem {
    type Param = Array1<f64>;
    type Jacobian = Array2<f64>;

    fn jacobian(
        &self,
        p: &Self::Param,
    ) -> ::std::result::Result<Self::Jacobian, argmin::core::Error> {
        let mut jacobian = Array2::zeros((self.ce.len(), p.len()));
        for jj in 0..p.len() {
            let col = self.jacobian_column(p, jj);
            jacobian.slice_mut(s![.., jj]).assign(&col);
        }
        Ok(jacobian)
    }
}
