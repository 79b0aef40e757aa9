/// Decides which products count toward consumption analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelFilter {
    keywords: Vec<String>,
}

impl FuelFilter {
    pub fn new(keywords: &[String]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|keyword| keyword.trim().to_uppercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    pub fn is_fuel(&self, fuel_type: &str) -> bool {
        let product = fuel_type.to_uppercase();
        self.keywords
            .iter()
            .any(|keyword| product.contains(keyword.as_str()))
    }
}

impl Default for FuelFilter {
    fn default() -> Self {
        Self::new(&crate::settings::Settings::default().fuel_keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::FuelFilter;

    #[test]
    fn matches_fuel_products_case_insensitively() {
        let filter = FuelFilter::default();
        assert!(filter.is_fuel("DIESEL"));
        assert!(filter.is_fuel("Super E10"));
        assert!(filter.is_fuel("EURODIESEL (B7)"));
        assert!(filter.is_fuel("benzin"));
    }

    #[test]
    fn additives_and_blank_products_are_not_fuel() {
        let filter = FuelFilter::default();
        assert!(!filter.is_fuel("ADBLUE"));
        assert!(!filter.is_fuel("Wash premium"));
        assert!(!filter.is_fuel(""));
    }
}
