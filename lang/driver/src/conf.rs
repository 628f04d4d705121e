use crate::err::{BuildError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Conf {
    /// guarded entries allowed per trampoline activation
    pub budget: usize,
    /// reject implicit globals that are read but never assigned
    pub strict: bool,
    /// run the optimizer over the CPS program
    pub optimize: bool,
}

impl Default for Conf {
    fn default() -> Self {
        Conf { budget: 200, strict: false, optimize: true }
    }
}

impl Conf {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let conf = Self::parse(&text)?;
        log::debug!("loaded configuration from `{}`: {:?}", path.display(), conf);
        Ok(conf)
    }
    pub fn parse(text: &str) -> Result<Self> {
        let conf: Conf = toml::from_str(text)?;
        conf.check()?;
        Ok(conf)
    }
    /// A budget of zero would suspend every guarded entry before it runs.
    pub fn check(&self) -> Result<()> {
        if self.budget == 0 {
            return Err(BuildError::ZeroBudget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_fields_take_defaults() {
        let conf = Conf::parse("strict = true").unwrap();
        assert_eq!(conf, Conf { budget: 200, strict: true, optimize: true });
        assert_eq!(Conf::parse("").unwrap(), Conf::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Conf::parse("budjet = 10").is_err());
        assert!(Conf::parse("budget = \"ten\"").is_err());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = Conf::parse("budget = 0").unwrap_err();
        assert!(matches!(err, BuildError::ZeroBudget));
        assert_eq!(Conf::parse("budget = 1").unwrap().budget, 1);
    }
}
