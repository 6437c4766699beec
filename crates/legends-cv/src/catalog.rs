//! The anchor-to-template catalog, loaded once at startup.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use legends_core::Anchor;

use crate::Result;
use crate::matcher::Template;

/// All reference images, keyed by anchor.
///
/// Loading is tolerant: a missing or unreadable file leaves a hole in the
/// catalog rather than failing the load, and [`Catalog::missing`] reports
/// the holes so the caller can decide whether they matter.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: HashMap<Anchor, Template>,
}

impl Catalog {
    /// Load every anchor's reference image from `dir`.
    pub fn load(dir: &Path) -> Result<Catalog> {
        if !dir.is_dir() {
            anyhow::bail!("asset directory {} does not exist", dir.display());
        }

        let mut templates = HashMap::new();
        for &anchor in Anchor::ALL {
            let path = dir.join(anchor.file_name());
            match image::open(&path) {
                Ok(img) => {
                    templates.insert(anchor, Template::new(img.into_luma8()));
                }
                Err(e) => {
                    log::warn!("no template for {anchor}: {} ({e})", path.display());
                }
            }
        }

        if templates.is_empty() {
            anyhow::bail!("no templates found in {}", dir.display());
        }
        log::info!(
            "loaded {}/{} templates from {}",
            templates.len(),
            Anchor::ALL.len(),
            dir.display()
        );
        Ok(Catalog { templates })
    }

    /// Strict variant of [`Catalog::load`] for the asset check tool.
    pub fn load_complete(dir: &Path) -> Result<Catalog> {
        let catalog = Catalog::load(dir)
            .with_context(|| format!("loading templates from {}", dir.display()))?;
        let missing = catalog.missing();
        if !missing.is_empty() {
            anyhow::bail!("missing templates: {missing:?}");
        }
        Ok(catalog)
    }

    pub fn get(&self, anchor: Anchor) -> Option<&Template> {
        self.templates.get(&anchor)
    }

    /// Anchors with no loaded template, in catalog order.
    pub fn missing(&self) -> Vec<Anchor> {
        Anchor::ALL
            .iter()
            .copied()
            .filter(|a| !self.templates.contains_key(a))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Start from nothing and insert templates directly. Test fixtures and
    /// the capture tool use this instead of a directory.
    pub fn empty() -> Catalog {
        Catalog::default()
    }

    pub fn insert(&mut self, anchor: Anchor, template: Template) {
        self.templates.insert(anchor, template);
    }
}
