//! The persisted project: a view catalog plus its pairwise results.

use serde::{Deserialize, Serialize};

use crate::results::ResultsStore;
use crate::view::ViewCatalog;

/// Everything a stitching run reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchingProject {
    catalog: ViewCatalog,
    #[serde(default)]
    results: ResultsStore,
}

impl StitchingProject {
    /// A fresh project with no pairwise results yet.
    pub fn new(catalog: ViewCatalog) -> Self {
        Self {
            catalog,
            results: ResultsStore::new(),
        }
    }

    pub fn catalog(&self) -> &ViewCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ViewCatalog {
        &mut self.catalog
    }

    pub fn results(&self) -> &ResultsStore {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut ResultsStore {
        &mut self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ViewId, ViewSetup};
    use crate::volume::Dimensions;

    #[test]
    fn results_default_to_empty_on_deserialization() {
        let setup = ViewSetup {
            id: 0,
            angle: 0,
            channel: 0,
            illumination: 0,
            tile: 0,
            size: Dimensions::new(4, 4, 1),
        };
        let catalog = ViewCatalog::new(vec![setup], vec![ViewId::new(0, 0)]).unwrap();
        let project = StitchingProject::new(catalog);

        let json = serde_json::to_value(&project).unwrap();
        let without_results = {
            let mut v = json.clone();
            v.as_object_mut().unwrap().remove("results");
            v
        };
        let back: StitchingProject = serde_json::from_value(without_results).unwrap();
        assert!(back.results().is_empty());
        assert_eq!(back.catalog().num_views(), 1);
    }
}
