use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ExtractionError;
use crate::features::LBP_BINS;

/// Selects which descriptor blocks make up the embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    /// Histogram of oriented gradients only.
    Hog,
    /// Oriented gradients followed by uniform LBP texture histograms.
    #[default]
    HogLbp,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hog => write!(f, "hog"),
            Self::HogLbp => write!(f, "hog-lbp"),
        }
    }
}

/// Configures face descriptor extraction.
///
/// Changing any field changes the embedding space, so a database must
/// always be queried with the configuration it was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Descriptor blocks (default: hog-lbp).
    pub kind: ModelKind,
    /// Side of the square luma patch in pixels (default: 128).
    pub size: u32,
    /// HOG cell side in pixels (default: 16).
    pub cell: u32,
    /// Unsigned orientation bins per HOG cell (default: 9).
    pub orientation_bins: u32,
    /// LBP regions per side (default: 4).
    pub lbp_grid: u32,
    /// Minimum width and height of the input image (default: 32).
    pub min_side: u32,
    /// Minimum luma standard deviation of the patch (default: 4.0).
    pub min_contrast: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::HogLbp,
            size: 128,
            cell: 16,
            orientation_bins: 9,
            lbp_grid: 4,
            min_side: 32,
            min_contrast: 4.0,
        }
    }
}

impl FeatureConfig {
    /// Checks that the geometry is consistent.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.size < 8 {
            return Err(ExtractionError::Config(format!("size {} is below 8", self.size)));
        }
        if self.cell == 0 || self.size % self.cell != 0 {
            return Err(ExtractionError::Config(format!(
                "size {} is not a multiple of cell {}",
                self.size, self.cell
            )));
        }
        if self.orientation_bins == 0 {
            return Err(ExtractionError::Config("orientation_bins must be positive".into()));
        }
        if self.kind == ModelKind::HogLbp
            && (self.lbp_grid == 0 || self.size % self.lbp_grid != 0)
        {
            return Err(ExtractionError::Config(format!(
                "size {} is not a multiple of lbp_grid {}",
                self.size, self.lbp_grid
            )));
        }
        if self.min_contrast.is_nan() || self.min_contrast < 0.0 {
            return Err(ExtractionError::Config("min_contrast must be non-negative".into()));
        }
        Ok(())
    }

    /// Length of the embeddings produced with this configuration.
    pub fn dimension(&self) -> usize {
        let cells = (self.size / self.cell.max(1)) as usize;
        let hog = cells * cells * self.orientation_bins as usize;
        match self.kind {
            ModelKind::Hog => hog,
            ModelKind::HogLbp => {
                let grid = self.lbp_grid as usize;
                hog + grid * grid * LBP_BINS
            }
        }
    }

    /// Identifier used in logs and persisted metadata.
    ///
    /// Encodes every field that shapes the descriptor, so two configurations
    /// share a name only when their embeddings are comparable. `min_side` and
    /// `min_contrast` only reject inputs and are left out.
    pub fn name(&self) -> String {
        let hog = format!("s{}-c{}-o{}", self.size, self.cell, self.orientation_bins);
        match self.kind {
            ModelKind::Hog => format!("{}-{hog}", self.kind),
            ModelKind::HogLbp => format!("{}-{hog}-g{}", self.kind, self.lbp_grid),
        }
    }
}
