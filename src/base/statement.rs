use crate::api::Dtl;
use crate::api::DtlError;
use crate::HULL_EPS;

/// one addend of a statement: a signed reference to a variable of the
/// base, addressed as the user sees it (alternative, node ordinal).
/// P and W statements address total node numbers, V statements address
/// real consequence ordinals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub alt: usize,
    pub node: usize,
    pub sign: f64,
}

/// a linear interval constraint with one or two terms. single-term
/// statements bound a variable directly; two-term statements bound the
/// difference between two variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub terms: Vec<Term>,
    pub lobo: f64,
    pub upbo: f64,
}

impl Statement {
    /// direct interval bound on one variable
    pub fn interval(alt: usize, node: usize, lobo: f64, upbo: f64) -> Self {
        Self {
            terms: vec![Term {
                alt,
                node,
                sign: 1.,
            }],
            lobo,
            upbo,
        }
    }
    /// difference bound between two variables
    pub fn difference(one: (usize, usize), two: (usize, usize), lobo: f64, upbo: f64) -> Self {
        Self {
            terms: vec![
                Term {
                    alt: one.0,
                    node: one.1,
                    sign: 1.,
                },
                Term {
                    alt: two.0,
                    node: two.1,
                    sign: -1.,
                },
            ],
            lobo,
            upbo,
        }
    }

    /// shape and bound checks that need no frame context
    pub fn validate(&self) -> Dtl<()> {
        let (floor, ceil) = match self.terms.len() {
            1 => (0., 1.),
            2 => (-1., 1.),
            _ => return Err(DtlError::BadStatement),
        };
        if self.terms.iter().any(|t| t.sign.abs() != 1.) {
            return Err(DtlError::BadStatement);
        }
        if self.terms.len() == 1 && self.terms[0].sign < 0. {
            return Err(DtlError::BadStatement);
        }
        if self.terms.len() == 2 && self.terms[0].sign == self.terms[1].sign {
            return Err(DtlError::BadStatement);
        }
        if self.lobo > self.upbo {
            return Err(DtlError::BadBounds);
        }
        if self.lobo < floor - HULL_EPS || self.upbo > ceil + HULL_EPS {
            return Err(DtlError::BadBounds);
        }
        if self.upbo - self.lobo < 2. * HULL_EPS && self.terms.len() == 2 {
            return Err(DtlError::TooNarrow);
        }
        Ok(())
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for term in self.terms.iter() {
            write!(
                f,
                "{}{}.{}",
                if term.sign < 0. { " - " } else { "" },
                term.alt,
                term.node
            )?;
        }
        write!(f, " in [{}, {}]", self.lobo, self.upbo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_interval_statement_wellformed() {
        assert!(Statement::interval(1, 1, 0.2, 0.4).validate().is_ok());
    }
    #[test]
    fn is_crossing_bound_rejected() {
        assert!(Statement::interval(1, 1, 0.5, 0.2).validate() == Err(DtlError::BadBounds));
    }
    #[test]
    fn is_single_term_bound_unit_boxed() {
        assert!(Statement::interval(1, 1, -0.5, 0.2).validate() == Err(DtlError::BadBounds));
        assert!(Statement::difference((1, 1), (1, 2), -0.5, 0.2)
            .validate()
            .is_ok());
    }
    #[test]
    fn is_hairline_difference_too_narrow() {
        let narrow = Statement::difference((1, 1), (2, 1), 0.1, 0.1 + 1e-7);
        assert!(narrow.validate() == Err(DtlError::TooNarrow));
    }
    #[test]
    fn is_same_sign_difference_rejected() {
        let mut stmt = Statement::difference((1, 1), (1, 2), 0., 0.5);
        stmt.terms[1].sign = 1.;
        assert!(stmt.validate() == Err(DtlError::BadStatement));
    }
}
