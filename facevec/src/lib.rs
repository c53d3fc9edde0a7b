//! Face embedding extraction for individual identification.
//!
//! # Architecture
//!
//! 1. Decode the raster image (JPEG, PNG, GIF, WebP, BMP).
//! 2. Convert the face crop to a fixed-size luma patch.
//! 3. Compute the descriptor blocks selected by [`ModelKind`]:
//!    histogram of oriented gradients, optionally followed by uniform
//!    local binary pattern histograms.
//! 4. L2-normalize the concatenated vector.
//!
//! Extraction is a pure function of the image bytes and the
//! [`FeatureConfig`]: the same input always produces a bit-identical
//! embedding, so stored embeddings stay comparable across runs.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use elephid_facevec::{FaceModel, FeatureModel};
//!
//! let model = FeatureModel::default();
//! let emb = model.extract_file(Path::new("elephant.jpg")).unwrap();
//! assert_eq!(emb.len(), model.dimension());
//! ```

mod config;
mod error;
mod feature_model;
pub mod features;
mod model;

pub use config::{FeatureConfig, ModelKind};
pub use error::ExtractionError;
pub use feature_model::FeatureModel;
pub use features::{l2_normalize, to_luma, LumaPatch};
pub use model::FaceModel;
