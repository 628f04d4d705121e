use lscript_syntax::*;

/// Whether evaluating `term` may be observable beyond its value.
///
/// Calls and assignments are effectful; literals, variables and function
/// literals are not. Everything else is effectful when a part is.
pub fn has_side_effects(term: &Term) -> bool {
    match term {
        | Term::Call(_) | Term::Assign(_) => true,
        | Term::Lit(_) | Term::Var(_) | Term::Func(_) => false,
        | Term::Binary(Binary { op: _, lhs, rhs }) => {
            has_side_effects(lhs) || has_side_effects(rhs)
        }
        | Term::If(If { cond, then, alt }) => {
            has_side_effects(cond)
                || has_side_effects(then)
                || alt.as_deref().is_some_and(has_side_effects)
        }
        | Term::Let(Let { binds, body }) => {
            binds.iter().any(|bind| bind.init.as_deref().is_some_and(has_side_effects))
                || has_side_effects(body)
        }
        | Term::Seq(Seq(terms)) => terms.iter().any(has_side_effects),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects() {
        let call = Term::call(Term::var("f"), vec![]);
        assert!(has_side_effects(&call));
        assert!(has_side_effects(&Term::assign(Var::new("x"), Term::num(1.0))));
        assert!(!has_side_effects(&Term::binary(BinOp::Add, Term::num(1.0), Term::var("x"))));
        assert!(!has_side_effects(&Func::new(None, vec![], call.clone()).into()));
        assert!(has_side_effects(&Term::cond(Term::bool(true), Term::num(1.0), Some(call))));
        assert!(!has_side_effects(&Term::seq(vec![Term::num(1.0), Term::str("a")])));
    }
}
