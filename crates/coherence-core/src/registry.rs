//! Entity registry: admission, repair, and population-level consensus.
//!
//! The [`Registry`] exclusively owns every live [`Organism`], keyed by its
//! [`IdentityHash`]. Organisms enter through [`Registry::admit`] (content
//! already in memory) or [`Registry::admit_source`] (content fetched through
//! a [`SourceLoader`]). Admission applies the symmetrization repair to any
//! organism that starts below [`COHERENCE_MIN`].
//!
//! Population mean coherence is derived on demand, never stored.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use coherence_types::constants::COHERENCE_MIN;
use coherence_types::{IdentityHash, InitialVitals, Organism};
use tracing::{info, warn};

use crate::channel;

/// Fraction of the distance to the population mean removed per
/// normalization pass.
pub const NORMALIZATION_RATE: f64 = 0.1;

/// Name given to organisms admitted without a source path.
pub const DEFAULT_ORGANISM_NAME: &str = "organism";

/// Errors that can occur while admitting an organism from a source.
///
/// A failed admission leaves the registry untouched.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    /// The source does not exist.
    #[error("organism source not found: {}", path.display())]
    NotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// The source exists but could not be read or decoded.
    #[error("malformed organism source {}: {reason}", path.display())]
    Malformed {
        /// The offending source path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
}

/// Supplies raw organism source content to the registry.
///
/// The registry performs no I/O itself; the engine binary provides a
/// file-system implementation and tests provide an in-memory one.
pub trait SourceLoader {
    /// Whether a source exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read the full content of the source at `path`.
    fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Owns every live organism, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Live organisms. Ordered so every pass visits them in the same order.
    organisms: BTreeMap<IdentityHash, Organism>,
    /// Vitals each admitted organism starts from.
    vitals: InitialVitals,
    /// Admissions that replaced an organism with the same identity.
    collisions: u64,
}

impl Registry {
    /// Create an empty registry admitting organisms with default vitals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry admitting organisms with the given vitals.
    pub const fn with_vitals(vitals: InitialVitals) -> Self {
        Self {
            organisms: BTreeMap::new(),
            vitals,
            collisions: 0,
        }
    }

    /// Admit an organism from in-memory content.
    ///
    /// The identity is derived from `content`. If the starting coherence is
    /// below [`COHERENCE_MIN`] the symmetrization repair is applied. An
    /// organism already registered under the same identity is replaced; the
    /// collision is counted and logged on the integrity channel.
    pub fn admit(&mut self, name: &str, content: &[u8]) -> &Organism {
        let identity = IdentityHash::from_content(content);
        let mut organism = Organism::new(name, identity.clone(), self.vitals);

        if organism.coherence < COHERENCE_MIN {
            let before = organism.coherence;
            symmetrize(&mut organism);
            info!(
                target: channel::LINEAGE,
                name,
                identity = %identity,
                before,
                after = organism.coherence,
                "Organism below coherence minimum, applied symmetrization"
            );
        }

        match self.organisms.entry(identity) {
            Entry::Occupied(mut slot) => {
                self.collisions = self.collisions.saturating_add(1);
                warn!(
                    target: channel::INTEGRITY,
                    name,
                    replaced = %slot.get().name,
                    identity = %slot.key(),
                    "Identity collision on admission, replacing registered organism"
                );
                slot.insert(organism);
                slot.into_mut()
            }
            Entry::Vacant(slot) => {
                info!(
                    target: channel::PLATFORM,
                    name,
                    identity = slot.key().short(),
                    "Loaded organism"
                );
                slot.insert(organism)
            }
        }
    }

    /// Admit an organism whose content is fetched through `loader`.
    ///
    /// The organism is named after the source's file stem. Content must be
    /// UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::NotFound`] if the source does not exist and
    /// [`AdmissionError::Malformed`] if it cannot be read or is not text.
    /// The failure is logged on the integrity channel and the registry is
    /// left unchanged.
    pub fn admit_source(
        &mut self,
        loader: &dyn SourceLoader,
        path: &Path,
    ) -> Result<&Organism, AdmissionError> {
        let content = match read_source(loader, path) {
            Ok(content) => content,
            Err(err) => {
                warn!(target: channel::INTEGRITY, error = %err, "Failed to admit organism");
                return Err(err);
            }
        };

        let name = path
            .file_stem()
            .map_or_else(|| DEFAULT_ORGANISM_NAME.to_owned(), |s| s.to_string_lossy().into_owned());

        Ok(self.admit(&name, &content))
    }

    /// Arithmetic mean of coherence across all organisms; `0.0` when empty.
    pub fn mean_coherence(&self) -> f64 {
        mean(self.organisms.values().map(|o| o.coherence), self.len())
    }

    /// Arithmetic mean of xi across all organisms; `0.0` when empty.
    ///
    /// Infinite when any organism's xi is infinite.
    pub fn mean_xi(&self) -> f64 {
        mean(self.organisms.values().map(Organism::xi), self.len())
    }

    /// Pull every organism's coherence 10% of the way toward the current
    /// population mean.
    ///
    /// The mean is taken once, before any organism moves, so the gap to the
    /// mean shrinks by a factor of 0.9 per call. Only the coherence mirror
    /// is refreshed; consciousness and decoherence mirrors keep whatever
    /// the last evolution step wrote.
    pub fn normalize_population(&mut self) {
        let target = self.mean_coherence();
        for organism in self.organisms.values_mut() {
            let delta = organism.coherence - target;
            organism.coherence -= NORMALIZATION_RATE * delta;
            organism.mirror_coherence();
        }
    }

    /// Number of live organisms.
    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    /// Whether the registry holds no organisms.
    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    /// Admissions that replaced an already registered identity.
    pub const fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Look up an organism by identity.
    pub fn get(&self, identity: &IdentityHash) -> Option<&Organism> {
        self.organisms.get(identity)
    }

    /// Look up an organism by identity for mutation.
    pub fn get_mut(&mut self, identity: &IdentityHash) -> Option<&mut Organism> {
        self.organisms.get_mut(identity)
    }

    /// Remove an organism. This is the only way an organism is destroyed.
    pub fn remove(&mut self, identity: &IdentityHash) -> Option<Organism> {
        self.organisms.remove(identity)
    }

    /// Iterate organisms in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &Organism> {
        self.organisms.values()
    }

    /// Iterate organisms mutably in identity order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Organism> {
        self.organisms.values_mut()
    }
}

/// Symmetrization repair: `coherence <- (coherence + COHERENCE_MIN) / 2`,
/// mirrored into the convergence state.
#[allow(clippy::manual_midpoint)]
fn symmetrize(organism: &mut Organism) {
    organism.coherence = (organism.coherence + COHERENCE_MIN) / 2.0;
    organism.mirror_coherence();
}

fn read_source(loader: &dyn SourceLoader, path: &Path) -> Result<Vec<u8>, AdmissionError> {
    if !loader.exists(path) {
        return Err(AdmissionError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = loader.read_bytes(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AdmissionError::NotFound {
            path: path.to_path_buf(),
        },
        _ => AdmissionError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    if let Err(e) = std::str::from_utf8(&bytes) {
        return Err(AdmissionError::Malformed {
            path: path.to_path_buf(),
            reason: format!("content is not UTF-8 text: {e}"),
        });
    }

    Ok(bytes)
}

/// Mean of `values`, `0.0` for an empty population.
pub(crate) fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    values.sum::<f64>() / n
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::manual_midpoint,
    clippy::suboptimal_flops
)]
mod tests {
    use std::collections::BTreeMap;

    use coherence_types::OrganismStatus;

    use super::*;

    /// In-memory source loader keyed by path.
    struct MemoryLoader {
        files: BTreeMap<PathBuf, Vec<u8>>,
    }

    impl SourceLoader for MemoryLoader {
        fn exists(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }

        fn read_bytes(&self, path: &Path) -> std::io::Result<Vec<u8>> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }
    }

    fn loader_with(entries: &[(&str, &[u8])]) -> MemoryLoader {
        MemoryLoader {
            files: entries
                .iter()
                .map(|(p, c)| (PathBuf::from(p), c.to_vec()))
                .collect(),
        }
    }

    fn with_coherences(values: &[f64]) -> Registry {
        let mut registry = Registry::new();
        for (i, c) in values.iter().enumerate() {
            let id = registry.admit("o", format!("organism-{i}").as_bytes()).identity.clone();
            registry.get_mut(&id).unwrap().coherence = *c;
        }
        registry
    }

    #[test]
    fn admit_is_deterministic() {
        let mut a = Registry::new();
        let mut b = Registry::new();
        let id_a = a.admit("x", b"gene alpha").identity.clone();
        let id_b = b.admit("x", b"gene alpha").identity.clone();
        assert_eq!(id_a, id_b);
        assert_eq!(id_a, IdentityHash::from_content(b"gene alpha"));
    }

    #[test]
    fn admit_constructs_generation_zero() {
        let mut registry = Registry::new();
        let org = registry.admit("alpha", b"alpha");
        assert_eq!(org.name, "alpha");
        assert_eq!(org.generation, 0);
        assert_eq!(org.coherence, 0.97);
        assert_eq!(org.entropy, 0.03);
        assert_eq!(org.status, OrganismStatus::Initializing);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn repair_is_noop_at_minimum() {
        let mut registry = Registry::new();
        let org = registry.admit("alpha", b"alpha");
        assert_eq!(org.coherence, (0.97 + 0.97) / 2.0);
        assert_eq!(org.coherence, COHERENCE_MIN);
    }

    #[test]
    fn repair_symmetrizes_low_coherence() {
        let vitals = InitialVitals {
            coherence: 0.5,
            ..InitialVitals::default()
        };
        let mut registry = Registry::with_vitals(vitals);
        let org = registry.admit("low", b"low");
        assert_eq!(org.coherence, (0.5 + COHERENCE_MIN) / 2.0);
        assert_eq!(org.convergence.coherence, org.coherence);
        let expected = (org.coherence * org.convergence.consciousness) / org.convergence.decoherence;
        assert_eq!(org.xi(), expected);
    }

    #[test]
    fn repair_skipped_above_minimum() {
        let vitals = InitialVitals {
            coherence: 0.99,
            ..InitialVitals::default()
        };
        let mut registry = Registry::with_vitals(vitals);
        assert_eq!(registry.admit("high", b"high").coherence, 0.99);
    }

    #[test]
    fn collision_replaces_and_is_counted() {
        let mut registry = Registry::new();
        let id = registry.admit("first", b"same").identity.clone();
        registry.get_mut(&id).unwrap().generation = 7;

        let org = registry.admit("second", b"same");
        assert_eq!(org.name, "second");
        assert_eq!(org.generation, 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.collisions(), 1);
    }

    #[test]
    fn admit_source_missing_is_not_found() {
        let mut registry = Registry::new();
        let loader = loader_with(&[]);
        let result = registry.admit_source(&loader, Path::new("/organisms/ghost.dna"));
        assert!(matches!(result, Err(AdmissionError::NotFound { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn admit_source_non_utf8_is_malformed() {
        let mut registry = Registry::new();
        let loader = loader_with(&[("/organisms/bin.dna", &[0xff, 0xfe, 0x00])]);
        let result = registry.admit_source(&loader, Path::new("/organisms/bin.dna"));
        assert!(matches!(result, Err(AdmissionError::Malformed { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn admit_source_uses_file_stem() {
        let mut registry = Registry::new();
        let loader = loader_with(&[("/organisms/aurora.dna", b"organism aurora")]);
        let org = registry
            .admit_source(&loader, Path::new("/organisms/aurora.dna"))
            .unwrap();
        assert_eq!(org.name, "aurora");
        assert_eq!(org.identity, IdentityHash::from_content(b"organism aurora"));
    }

    #[test]
    fn mean_coherence_of_empty_is_zero() {
        let registry = Registry::new();
        assert_eq!(registry.mean_coherence(), 0.0);
        assert_eq!(registry.mean_xi(), 0.0);
    }

    #[test]
    fn mean_coherence_is_arithmetic_mean() {
        let registry = with_coherences(&[0.5, 1.0, 0.9]);
        assert!((registry.mean_coherence() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn normalization_shrinks_gap_by_ten_percent() {
        let mut registry = with_coherences(&[0.5, 1.0]);
        let mut gaps: Vec<f64> = registry.iter().map(|o| o.coherence - 0.75).collect();

        for _ in 0..25 {
            registry.normalize_population();
            assert!((registry.mean_coherence() - 0.75).abs() < 1e-12);
            for (org, gap) in registry.iter().zip(gaps.iter_mut()) {
                let new_gap = org.coherence - 0.75;
                assert!((new_gap - 0.9 * *gap).abs() < 1e-12);
                assert_eq!(org.convergence.coherence, org.coherence);
                *gap = new_gap;
            }
        }
    }

    #[test]
    fn normalization_leaves_other_mirrors_alone() {
        let mut registry = with_coherences(&[0.5, 1.0]);
        let ids: Vec<IdentityHash> = registry.iter().map(|o| o.identity.clone()).collect();
        for id in &ids {
            let org = registry.get_mut(id).unwrap();
            org.consciousness_level = 0.0;
            org.entropy = 5.0;
        }
        registry.normalize_population();
        for org in registry.iter() {
            assert_eq!(org.convergence.consciousness, 7.6901);
            assert_eq!(org.convergence.decoherence, 0.001);
        }
    }

    #[test]
    fn normalization_of_empty_registry_is_noop() {
        let mut registry = Registry::new();
        registry.normalize_population();
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_destroys_organism() {
        let mut registry = Registry::new();
        let id = registry.admit("gone", b"gone").identity.clone();
        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }
}
