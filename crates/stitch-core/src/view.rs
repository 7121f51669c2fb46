//! View identities, setups and the catalog tying them together.
//!
//! A *view setup* fixes the static attributes of an acquisition position
//! (angle, channel, illumination, tile) plus its voxel size; a *view* is one
//! setup imaged at one timepoint. The catalog stores which views are present
//! and the current world placement of each. Missing views are simply absent
//! from the catalog, never placeholders.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::factor::Factor;
use crate::math::Aff3;
use crate::volume::Dimensions;

/// Identity of a single view: one setup imaged at one timepoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ViewId {
    pub timepoint: u32,
    pub setup: u32,
}

impl ViewId {
    pub fn new(timepoint: u32, setup: u32) -> Self {
        Self { timepoint, setup }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tp{}/setup{}", self.timepoint, self.setup)
    }
}

/// Static attributes of an acquisition position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSetup {
    pub id: u32,
    pub angle: u32,
    pub channel: u32,
    pub illumination: u32,
    pub tile: u32,
    pub size: Dimensions,
}

impl ViewSetup {
    /// Value of a per-setup factor. `Timepoint` is a per-view property and
    /// returns `None` here; the catalog resolves it.
    pub fn attribute(&self, factor: Factor) -> Option<u32> {
        match factor {
            Factor::Timepoint => None,
            Factor::Angle => Some(self.angle),
            Factor::Channel => Some(self.channel),
            Factor::Illumination => Some(self.illumination),
            Factor::Tile => Some(self.tile),
        }
    }
}

/// A present view together with its current world placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRegistration {
    pub view: ViewId,
    pub transform: Aff3,
}

impl ViewRegistration {
    pub fn identity(view: ViewId) -> Self {
        Self {
            view,
            transform: Aff3::identity(),
        }
    }
}

/// Structural errors in catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate view setup id {0}")]
    DuplicateSetup(u32),
    #[error("view setup {0} has a zero-sized dimension")]
    DegenerateSetup(u32),
    #[error("duplicate view {0}")]
    DuplicateView(ViewId),
    #[error("view {view} references unknown setup {setup}")]
    UnknownSetup { view: ViewId, setup: u32 },
    #[error("unknown view {0}")]
    UnknownView(ViewId),
}

/// All views of an acquisition and their placements.
///
/// Setups and registrations are kept sorted by id, so every enumeration of
/// the catalog is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CatalogData", into = "CatalogData")]
pub struct ViewCatalog {
    setups: Vec<ViewSetup>,
    registrations: Vec<ViewRegistration>,
}

/// Serialized form of [`ViewCatalog`]; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogData {
    setups: Vec<ViewSetup>,
    views: Vec<ViewRegistration>,
}

impl TryFrom<CatalogData> for ViewCatalog {
    type Error = CatalogError;

    fn try_from(data: CatalogData) -> Result<Self, Self::Error> {
        ViewCatalog::with_registrations(data.setups, data.views)
    }
}

impl From<ViewCatalog> for CatalogData {
    fn from(catalog: ViewCatalog) -> Self {
        CatalogData {
            setups: catalog.setups,
            views: catalog.registrations,
        }
    }
}

impl ViewCatalog {
    /// Build a catalog with identity placements for every view.
    pub fn new(setups: Vec<ViewSetup>, views: Vec<ViewId>) -> Result<Self, CatalogError> {
        let registrations = views.into_iter().map(ViewRegistration::identity).collect();
        Self::with_registrations(setups, registrations)
    }

    /// Build a catalog from explicit per-view placements.
    pub fn with_registrations(
        mut setups: Vec<ViewSetup>,
        mut registrations: Vec<ViewRegistration>,
    ) -> Result<Self, CatalogError> {
        setups.sort_by_key(|s| s.id);
        for pair in setups.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(CatalogError::DuplicateSetup(pair[0].id));
            }
        }
        for setup in &setups {
            if setup.size.num_elements() == 0 {
                return Err(CatalogError::DegenerateSetup(setup.id));
            }
        }

        registrations.sort_by_key(|r| r.view);
        for pair in registrations.windows(2) {
            if pair[0].view == pair[1].view {
                return Err(CatalogError::DuplicateView(pair[0].view));
            }
        }
        for reg in &registrations {
            if setups.binary_search_by_key(&reg.view.setup, |s| s.id).is_err() {
                return Err(CatalogError::UnknownSetup {
                    view: reg.view,
                    setup: reg.view.setup,
                });
            }
        }

        Ok(Self {
            setups,
            registrations,
        })
    }

    pub fn setups(&self) -> &[ViewSetup] {
        &self.setups
    }

    pub fn setup(&self, id: u32) -> Option<&ViewSetup> {
        self.setups
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| &self.setups[idx])
    }

    pub fn num_views(&self) -> usize {
        self.registrations.len()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.find(view).is_ok()
    }

    /// All present views in ascending (timepoint, setup) order.
    pub fn all_views(&self) -> Vec<ViewId> {
        self.registrations.iter().map(|r| r.view).collect()
    }

    /// Present views admitted by `filter`, in ascending order.
    pub fn views(&self, filter: &ViewFilter) -> Vec<ViewId> {
        self.registrations
            .iter()
            .map(|r| r.view)
            .filter(|&v| filter.admits(self, v))
            .collect()
    }

    /// Distinct timepoints with at least one present view, ascending.
    pub fn timepoints(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.registrations.iter().map(|r| r.view.timepoint).collect();
        set.into_iter().collect()
    }

    /// Value of `factor` for `view`, or `None` if the view is unknown.
    pub fn factor_value(&self, view: ViewId, factor: Factor) -> Option<u32> {
        if factor == Factor::Timepoint {
            return self.contains(view).then_some(view.timepoint);
        }
        self.view_setup(view)?.attribute(factor)
    }

    /// Setup of a present view; `None` for unknown views.
    pub fn view_setup(&self, view: ViewId) -> Option<&ViewSetup> {
        self.find(view).ok()?;
        self.setup(view.setup)
    }

    pub fn dimensions(&self, view: ViewId) -> Option<Dimensions> {
        self.view_setup(view).map(|s| s.size)
    }

    pub fn registration(&self, view: ViewId) -> Option<&Aff3> {
        self.find(view)
            .ok()
            .map(|idx| &self.registrations[idx].transform)
    }

    pub fn set_registration(&mut self, view: ViewId, transform: Aff3) -> Result<(), CatalogError> {
        let idx = self.find(view).map_err(|_| CatalogError::UnknownView(view))?;
        self.registrations[idx].transform = transform;
        Ok(())
    }

    /// True when every present view is a single z-slice.
    pub fn all_2d(&self) -> bool {
        self.registrations
            .iter()
            .all(|r| match self.setup(r.view.setup) {
                Some(s) => s.size.is_2d(),
                None => false,
            })
    }

    fn find(&self, view: ViewId) -> Result<usize, usize> {
        self.registrations.binary_search_by_key(&view, |r| r.view)
    }
}

/// Restriction on which catalog views take part in a run.
///
/// An empty filter admits everything. Factor restrictions are conjunctive:
/// a view passes when, for every listed factor, its value is in the allowed
/// set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<BTreeSet<ViewId>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub allowed: BTreeMap<Factor, BTreeSet<u32>>,
}

impl ViewFilter {
    /// The match-all filter.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_ids<I: IntoIterator<Item = ViewId>>(ids: I) -> Self {
        Self {
            ids: Some(ids.into_iter().collect()),
            allowed: BTreeMap::new(),
        }
    }

    /// Restrict `factor` to the given values (replacing any previous
    /// restriction on that factor).
    pub fn restrict(mut self, factor: Factor, values: &[u32]) -> Self {
        self.allowed.insert(factor, values.iter().copied().collect());
        self
    }

    pub fn admits(&self, catalog: &ViewCatalog, view: ViewId) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&view) {
                return false;
            }
        }
        self.allowed.iter().all(|(factor, values)| {
            catalog
                .factor_value(view, *factor)
                .is_some_and(|v| values.contains(&v))
        })
    }
}
