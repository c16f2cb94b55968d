use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const BUILTIN_FILTERS: &str = include_str!("../../config/filters.yaml");

/// Keyword tables backing the dietary, allergy and cuisine filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    pub version: u32,
    #[serde(default)]
    pub dietary: Vec<DietRule>,
    #[serde(default)]
    pub allergies: Vec<AllergyRule>,
    #[serde(default)]
    pub cuisines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietRule {
    pub label: String,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergyRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Canonical form used to match caller-supplied labels: "Gluten Free",
/// "gluten-free" and "glutenfree" all collapse to the same key.
pub fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FilterRules {
    /// Tables compiled into the binary from `config/filters.yaml`
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_FILTERS, "built-in filters.yaml")
    }

    /// Load filter tables from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read filter config from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content, &path.as_ref().display().to_string())
    }

    fn from_yaml(content: &str, source: &str) -> Result<Self> {
        let mut rules: FilterRules = serde_yaml::from_str(content).map_err(|e| {
            Error::Config(format!("Failed to parse filter config from {source}: {e}"))
        })?;

        rules.validate()?;
        rules.lowercase_keywords();
        Ok(rules)
    }

    /// Validate the tables
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported filter config version: {}. Expected version 1",
                self.version
            )));
        }

        let mut seen = HashSet::new();
        for label in self.dietary.iter().map(|r| &r.label) {
            if normalize_label(label).is_empty() || !seen.insert(normalize_label(label)) {
                return Err(Error::Config(format!("Invalid or duplicate dietary label: {label:?}")));
            }
        }

        let mut seen = HashSet::new();
        for label in self.allergies.iter().map(|r| &r.label) {
            if normalize_label(label).is_empty() || !seen.insert(normalize_label(label)) {
                return Err(Error::Config(format!("Invalid or duplicate allergy label: {label:?}")));
            }
        }

        // An empty keyword would match every recipe
        let has_blank = self
            .dietary
            .iter()
            .flat_map(|r| r.exclude.iter())
            .chain(self.allergies.iter().flat_map(|r| r.keywords.iter()))
            .chain(self.cuisines.iter())
            .any(|k| k.trim().is_empty());
        if has_blank {
            return Err(Error::Config("Filter keywords must not be blank".to_string()));
        }

        Ok(())
    }

    fn lowercase_keywords(&mut self) {
        for rule in &mut self.dietary {
            for keyword in &mut rule.exclude {
                *keyword = keyword.trim().to_lowercase();
            }
        }
        for rule in &mut self.allergies {
            for keyword in &mut rule.keywords {
                *keyword = keyword.trim().to_lowercase();
            }
        }
        for cuisine in &mut self.cuisines {
            *cuisine = cuisine.trim().to_lowercase();
        }
    }

    pub fn dietary_labels(&self) -> Vec<&str> {
        self.dietary.iter().map(|r| r.label.as_str()).collect()
    }

    pub fn allergy_labels(&self) -> Vec<&str> {
        self.allergies.iter().map(|r| r.label.as_str()).collect()
    }

    /// Exclude keywords for a dietary label, `None` when the label is unknown
    pub fn diet_keywords(&self, label: &str) -> Option<&[String]> {
        let wanted = normalize_label(label);
        self.dietary
            .iter()
            .find(|r| normalize_label(&r.label) == wanted)
            .map(|r| r.exclude.as_slice())
    }

    /// Allergen synonyms for an allergy label, `None` when the label is unknown
    pub fn allergy_keywords(&self, label: &str) -> Option<&[String]> {
        let wanted = normalize_label(label);
        self.allergies
            .iter()
            .find(|r| normalize_label(&r.label) == wanted)
            .map(|r| r.keywords.as_slice())
    }

    /// Recognized cuisine keyword for a caller-supplied value
    pub fn cuisine(&self, value: &str) -> Option<&str> {
        let wanted = normalize_label(value);
        self.cuisines
            .iter()
            .find(|c| normalize_label(c) == wanted)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_load() {
        let rules = FilterRules::builtin().unwrap();
        assert_eq!(
            rules.dietary_labels(),
            vec!["vegetarian", "vegan", "gluten-free", "dairy-free", "low-carb", "keto", "paleo"]
        );
        assert_eq!(
            rules.allergy_labels(),
            vec!["nuts", "shellfish", "fish", "eggs", "soy", "wheat", "dairy"]
        );
        assert_eq!(rules.cuisines.len(), 6);
    }

    #[test]
    fn test_label_lookup_ignores_case_hyphens_and_spaces() {
        let rules = FilterRules::builtin().unwrap();
        assert!(rules.diet_keywords("Gluten Free").is_some());
        assert!(rules.diet_keywords("glutenfree").is_some());
        assert!(rules.diet_keywords("GLUTEN-FREE").is_some());
        assert!(rules.diet_keywords("carnivore").is_none());
        assert_eq!(rules.allergy_keywords("Eggs"), Some(&["egg".to_string()][..]));
        assert_eq!(rules.cuisine("Italian"), Some("italian"));
        assert_eq!(rules.cuisine("martian"), None);
    }

    #[test]
    fn test_rejects_wrong_version() {
        let yaml = "version: 2\ndietary: []\n";
        let err = FilterRules::from_yaml(yaml, "test").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_duplicate_labels_after_normalization() {
        let yaml = r#"
version: 1
dietary:
  - label: gluten-free
    exclude: [wheat]
  - label: Gluten Free
    exclude: [rye]
"#;
        assert!(FilterRules::from_yaml(yaml, "test").is_err());
    }

    #[test]
    fn test_rejects_blank_keyword() {
        let yaml = "version: 1\nallergies:\n  - label: soy\n    keywords: [\"soy\", \" \"]\n";
        assert!(FilterRules::from_yaml(yaml, "test").is_err());
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let yaml = "version: 1\nallergies:\n  - label: soy\n    keywords: [Tofu]\ncuisines: [Thai]\n";
        let rules = FilterRules::from_yaml(yaml, "test").unwrap();
        assert_eq!(rules.allergy_keywords("soy"), Some(&["tofu".to_string()][..]));
        assert_eq!(rules.cuisine("thai"), Some("thai"));
    }

    #[test]
    fn test_from_file_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.yaml");
        std::fs::write(
            &path,
            "version: 1\ndietary:\n  - label: pescatarian\n    exclude: [beef, chicken]\n",
        )
        .unwrap();

        let rules = FilterRules::from_file(&path).unwrap();
        assert_eq!(rules.dietary_labels(), vec!["pescatarian"]);
        assert!(rules.allergies.is_empty());
    }
}
