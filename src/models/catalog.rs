use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the skills catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: String,
    pub description: String,
}

/// Skills grouped by family, then keyed by skill identifier
pub type SkillsCatalog = BTreeMap<String, BTreeMap<String, CatalogEntry>>;

/// Catalog written on first start when the store has none
pub fn default_catalog() -> SkillsCatalog {
    let families: [(&str, &[(&str, &str, &str)]); 4] = [
        (
            "programming",
            &[
                ("python", "programming", "Python programming language"),
                ("javascript", "programming", "JavaScript programming language"),
                ("java", "programming", "Java programming language"),
                ("react", "frontend", "React.js framework"),
                ("nodejs", "backend", "Node.js runtime"),
            ],
        ),
        (
            "design",
            &[
                ("photoshop", "design", "Adobe Photoshop"),
                ("figma", "design", "Figma design tool"),
                ("ui_ux", "design", "UI/UX Design"),
            ],
        ),
        (
            "marketing",
            &[
                ("digital_marketing", "marketing", "Digital Marketing"),
                ("seo", "marketing", "Search Engine Optimization"),
                ("social_media", "marketing", "Social Media Marketing"),
            ],
        ),
        (
            "business",
            &[
                ("project_management", "business", "Project Management"),
                ("data_analysis", "business", "Data Analysis"),
                ("communication", "business", "Communication Skills"),
            ],
        ),
    ];

    families
        .iter()
        .map(|(family, skills)| {
            let entries = skills
                .iter()
                .map(|(id, category, description)| {
                    (
                        id.to_string(),
                        CatalogEntry {
                            category: category.to_string(),
                            description: description.to_string(),
                        },
                    )
                })
                .collect();
            (family.to_string(), entries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_families() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog["programming"]["react"].category, "frontend");
        assert_eq!(catalog["design"].len(), 3);
    }
}
