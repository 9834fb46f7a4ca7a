//! Translate a [`LinearModel`] into a `good_lp` problem and back.

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    default_solver, variable,
};
use tideway_core::{LinearModel, LinearTerm, Sense};

/// Values and objective of a solved model.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Solved {
    pub(crate) values: Vec<f64>,
    pub(crate) objective: f64,
}

#[expect(
    clippy::cast_precision_loss,
    reason = "model coefficients are bounded by 2^53 and exact in f64"
)]
fn expression(terms: &[LinearTerm], variables: &[Variable]) -> Expression {
    terms
        .iter()
        .filter_map(|term| {
            variables
                .get(term.variable.index())
                .map(|variable| (*variable, term.coefficient as f64))
        })
        .fold(Expression::default(), |mut expr, (variable, coefficient)| {
            expr.add_mul(coefficient, variable);
            expr
        })
}

/// Solve `model` to optimality with the default `good_lp` backend.
#[expect(
    clippy::cast_precision_loss,
    reason = "model bounds are bounded by 2^53 and exact in f64"
)]
pub(crate) fn solve(model: &LinearModel) -> Result<Solved, ResolutionError> {
    let mut problem = ProblemVariables::new();
    let variables: Vec<Variable> = model
        .variables()
        .iter()
        .map(|v| {
            problem.add(
                variable()
                    .integer()
                    .min(v.lower as f64)
                    .max(v.upper as f64)
                    .name(v.name.clone()),
            )
        })
        .collect();

    let objective = expression(model.objective(), &variables);
    let mut lp = problem.minimise(objective.clone()).using(default_solver);
    for constraint in model.constraints() {
        let lhs = expression(&constraint.terms, &variables);
        let rhs = constraint.rhs as f64;
        lp = lp.with(match constraint.sense {
            Sense::LessOrEqual => lhs.leq(rhs),
            Sense::GreaterOrEqual => lhs.geq(rhs),
            Sense::Equal => lhs.eq(rhs),
        });
    }

    let solution = lp.solve()?;
    Ok(Solved {
        values: variables.iter().map(|v| solution.value(*v)).collect(),
        objective: solution.eval(objective),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tideway_core::ConstraintKind;

    #[rstest]
    #[expect(
        clippy::float_cmp,
        clippy::float_arithmetic,
        reason = "integral optimum"
    )]
    fn cheapest_cover_is_found() {
        // min 3x + 2y  s.t.  x + y >= 4, x <= 3, y <= 3
        let mut model = LinearModel::default();
        let x = model.add_variable("x", 0, 3);
        let y = model.add_variable("y", 0, 3);
        model.add_constraint(
            "cover",
            ConstraintKind::Demand,
            vec![
                LinearTerm { variable: x, coefficient: 1 },
                LinearTerm { variable: y, coefficient: 1 },
            ],
            Sense::GreaterOrEqual,
            4,
        );
        model.set_objective(vec![
            LinearTerm { variable: x, coefficient: 3 },
            LinearTerm { variable: y, coefficient: 2 },
        ]);

        let solved = solve(&model).expect("feasible");
        assert_eq!(solved.objective, 9.0);
        assert_eq!(solved.values.len(), 2);
        assert!((solved.values.iter().sum::<f64>() - 4.0).abs() < 1e-6);
    }

    #[rstest]
    fn contradictory_rows_are_infeasible() {
        let mut model = LinearModel::default();
        let x = model.add_variable("x", 0, 10);
        let term = vec![LinearTerm { variable: x, coefficient: 1 }];
        model.add_constraint("low", ConstraintKind::VoyageCap, term.clone(), Sense::LessOrEqual, 2);
        model.add_constraint("high", ConstraintKind::Demand, term, Sense::Equal, 5);

        assert!(matches!(solve(&model), Err(ResolutionError::Infeasible)));
    }
}
