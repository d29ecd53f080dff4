//! Spec Catalog: the ordered, read-only table of creative categories.
//!
//! Order matters. Classification is first-match-wins over declaration order,
//! so catalogs that declare the same target size twice resolve to the earlier
//! entry. Such collisions are reported when the catalog is built.

pub mod classify;
pub mod spec;

pub use classify::Classification;
pub use spec::{CategorySpec, HeightSpec};

use anyhow::{bail, Result};
use std::collections::HashSet;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Two catalog entries that compete for the same asset dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// The entry that wins classification.
    pub winner: String,
    /// The entry that can never be (fully) reached for the shared dimensions.
    pub shadowed: String,
    pub dimensions: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    specs: Vec<CategorySpec>,
    collisions: Vec<Collision>,
}

impl Catalog {
    pub fn new(specs: Vec<CategorySpec>) -> Result<Self> {
        if specs.is_empty() {
            bail!("catalog must declare at least one category");
        }

        let mut names = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !names.insert(spec.name.as_str()) {
                bail!("duplicate category name '{}'", spec.name);
            }
        }

        let collisions = find_collisions(&specs);
        for collision in &collisions {
            log_warn!(
                "catalog collision at {}: '{}' shadows '{}' (first match wins)",
                collision.dimensions,
                collision.winner,
                collision.shadowed
            );
        }

        Ok(Self { specs, collisions })
    }

    pub fn get(&self, name: &str) -> Option<&CategorySpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }
}

fn find_collisions(specs: &[CategorySpec]) -> Vec<Collision> {
    let mut collisions = Vec::new();

    for (idx, later) in specs.iter().enumerate() {
        for earlier in &specs[..idx] {
            if earlier.width != later.width {
                continue;
            }
            let overlaps = match (earlier.height, later.height) {
                (HeightSpec::Fixed(a), HeightSpec::Fixed(b)) => a == b,
                // An earlier variable-height entry swallows every height at this width.
                (HeightSpec::Variable, _) => true,
                // A later variable entry still catches the heights nobody else claims.
                (HeightSpec::Fixed(_), HeightSpec::Variable) => false,
            };
            if overlaps {
                collisions.push(Collision {
                    winner: earlier.name.clone(),
                    shadowed: later.name.clone(),
                    dimensions: later.dimensions_label(),
                });
                break;
            }
        }
    }

    collisions
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn fixed(name: &str, width: u32, height: u32, limit_kb: f64) -> CategorySpec {
        CategorySpec {
            name: name.into(),
            width,
            height: HeightSpec::Fixed(height),
            size_limit_kb: limit_kb,
            guide_ref: None,
            note: None,
            max_text_chars: None,
            allows_device_mockup: false,
        }
    }

    pub fn variable(name: &str, width: u32, limit_kb: f64) -> CategorySpec {
        CategorySpec {
            height: HeightSpec::Variable,
            ..fixed(name, width, 1, limit_kb)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{fixed, variable};
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let err = Catalog::new(vec![
            fixed("list screen", 720, 360, 200.0),
            fixed("list screen", 720, 780, 400.0),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate category name"));
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(Catalog::new(Vec::new()).is_err());
    }

    #[test]
    fn flags_identical_dimensions() {
        let catalog = Catalog::new(vec![
            fixed("detail screen", 720, 780, 400.0),
            fixed("detail banner", 720, 780, 300.0),
        ])
        .unwrap();

        assert_eq!(
            catalog.collisions(),
            &[Collision {
                winner: "detail screen".into(),
                shadowed: "detail banner".into(),
                dimensions: "720x780".into(),
            }]
        );
    }

    #[test]
    fn flags_variable_height_shadowing_later_entries() {
        let catalog = Catalog::new(vec![
            variable("event image", 720, 1000.0),
            fixed("list screen", 720, 360, 200.0),
        ])
        .unwrap();
        assert_eq!(catalog.collisions().len(), 1);
        assert_eq!(catalog.collisions()[0].shadowed, "list screen");
    }

    #[test]
    fn trailing_variable_height_is_not_a_collision() {
        let catalog = Catalog::new(vec![
            fixed("list screen", 720, 360, 200.0),
            variable("event image", 720, 1000.0),
        ])
        .unwrap();
        assert!(catalog.collisions().is_empty());
    }
}
