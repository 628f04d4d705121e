/// Fresh-name supply for one compilation unit.
///
/// Every name it hands out has the shape `prefix$n` with a counter that only
/// grows, so two calls never return the same name. `$` never appears in a
/// source identifier, which keeps generated names apart from user names.
#[derive(Debug, Default, Clone)]
pub struct Gensym {
    next: usize,
}

impl Gensym {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn fresh(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}${}", prefix, self.next)
    }
    /// How many names were handed out so far.
    pub fn count(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_names_never_repeat() {
        let mut sym = Gensym::new();
        assert_eq!(sym.fresh("K"), "K$1");
        assert_eq!(sym.fresh("K"), "K$2");
        assert_eq!(sym.fresh("x"), "x$3");
        assert_eq!(sym.count(), 3);
    }
}
