use crate::error::DinheiroError;
use glob::Pattern;

/// Criteria for selecting candidate sheets from a spreadsheet.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns; `None` accepts every sheet.
    pub sheet_name_patterns: Option<Vec<Pattern>>,
}

impl Criteria {
    /// Builds criteria from glob pattern strings.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, DinheiroError> {
        if patterns.is_empty() {
            return Ok(Criteria::default());
        }
        let patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Criteria {
            sheet_name_patterns: Some(patterns),
        })
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_criteria_accept_everything() {
        let criteria = Criteria::from_patterns::<&str>(&[]).unwrap();
        assert!(criteria.accept("Página1"));
    }

    #[test]
    fn patterns_filter_sheet_names() {
        let criteria = Criteria::from_patterns(&["Ações*", "FII?"]).unwrap();
        assert!(criteria.accept("Ações 2024"));
        assert!(criteria.accept("FIIs"));
        assert!(!criteria.accept("Resumo"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(Criteria::from_patterns(&["[unclosed"]).is_err());
    }
}
