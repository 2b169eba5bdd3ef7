//! Definition loading.
//!
//! Entity class definitions are JSON: an array of classes, each with a
//! name, an optional base class, and an ordered component list. Loading
//! is the explicit init phase that must complete before the simulation
//! loop starts; any error here aborts startup rather than running with
//! partial definitions.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use warren_core::{ClassDef, World};

/// Definitions compiled into the binary, used when no path is given.
const DEFAULT_DEFINITIONS: &str = include_str!("../data/definitions.json");

/// Parse, register, and validate entity class definitions.
pub fn load(world: &mut World, path: Option<&Path>) -> Result<()> {
    let (source, text) = match path {
        Some(p) => (
            p.display().to_string(),
            std::fs::read_to_string(p)
                .with_context(|| format!("reading definitions from {}", p.display()))?,
        ),
        None => ("built-in".to_string(), DEFAULT_DEFINITIONS.to_string()),
    };
    let defs: Vec<ClassDef> =
        serde_json::from_str(&text).with_context(|| format!("parsing definitions from {source}"))?;
    let classes = defs.len();
    for def in defs {
        world.register_class(def);
    }
    world
        .validate_definitions()
        .context("validating definitions")?;
    info!(source, classes, "definitions loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warren_core::components::{PlayerControl, StaticDrawable, Wander};

    #[test]
    fn test_builtin_definitions_load_and_validate() {
        let mut world = World::new(0);
        load(&mut world, None).unwrap();
        assert!(world.classes().contains("player"));
        assert!(world.classes().contains("rat"));
        assert!(world.classes().contains("dust"));
    }

    #[test]
    fn test_builtin_classes_construct() {
        let mut world = World::new(0);
        load(&mut world, None).unwrap();

        let player = world.create("player").unwrap();
        assert_eq!(world.component::<StaticDrawable>(player).symbol, '@');
        assert_eq!(world.component::<PlayerControl>(player).move_period, 1);
        assert!(world.is_of_class(player, "creature"));

        let rat = world.create("rat").unwrap();
        assert_eq!(world.component::<Wander>(rat).move_period, 6);

        let dust = world.create("dust").unwrap();
        assert_eq!(world.component::<StaticDrawable>(dust).symbol, ',');
    }

    #[test]
    fn test_missing_file_aborts() {
        let mut world = World::new(0);
        assert!(load(&mut world, Some(Path::new("/nonexistent/defs.json"))).is_err());
    }
}
