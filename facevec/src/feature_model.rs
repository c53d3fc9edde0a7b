//! [`FaceModel`] implementation using hand-crafted gradient and texture descriptors.

use image::DynamicImage;
use tracing::debug;

use crate::config::{FeatureConfig, ModelKind};
use crate::error::ExtractionError;
use crate::features::{hog, l2_normalize, lbp, to_luma};
use crate::model::FaceModel;

/// Deterministic descriptor-based [`FaceModel`].
///
/// The whole input image is treated as the face crop; locating the face is
/// up to the caller. Images that are too small or too flat to carry any
/// texture are rejected with [`ExtractionError::NoFace`].
#[derive(Debug, Clone)]
pub struct FeatureModel {
    cfg: FeatureConfig,
    dim: usize,
    name: String,
}

impl FeatureModel {
    /// Creates a model after validating the configuration.
    pub fn new(cfg: FeatureConfig) -> Result<Self, ExtractionError> {
        cfg.validate()?;
        Ok(Self {
            dim: cfg.dimension(),
            name: cfg.name(),
            cfg,
        })
    }

    /// Computes an embedding from an already decoded image.
    pub fn extract_image(&self, img: &DynamicImage) -> Result<Vec<f32>, ExtractionError> {
        let (w, h) = (img.width(), img.height());
        if w < self.cfg.min_side || h < self.cfg.min_side {
            return Err(ExtractionError::NoFace(format!(
                "image is {w}x{h}, need at least {0}x{0}",
                self.cfg.min_side
            )));
        }

        let patch = to_luma(img, self.cfg.size);
        let contrast = patch.std_dev();
        if contrast < self.cfg.min_contrast {
            return Err(ExtractionError::NoFace(format!(
                "contrast {contrast:.2} below {:.2}",
                self.cfg.min_contrast
            )));
        }

        let mut emb = hog(&patch, self.cfg.cell as usize, self.cfg.orientation_bins as usize);
        if self.cfg.kind == ModelKind::HogLbp {
            emb.extend(lbp(&patch, self.cfg.lbp_grid as usize));
        }
        l2_normalize(&mut emb);

        if emb.iter().all(|&v| v == 0.0) {
            return Err(ExtractionError::NoFace("empty descriptor".into()));
        }
        debug_assert_eq!(emb.len(), self.dim);
        debug!(model = %self.name, width = w, height = h, contrast, "facevec: extracted embedding");
        Ok(emb)
    }
}

impl Default for FeatureModel {
    fn default() -> Self {
        let cfg = FeatureConfig::default();
        Self {
            dim: cfg.dimension(),
            name: cfg.name(),
            cfg,
        }
    }
}

impl FaceModel for FeatureModel {
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>, ExtractionError> {
        let img = image::load_from_memory(image).map_err(|e| ExtractionError::Decode(e.to_string()))?;
        self.extract_image(&img)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;

    fn encode_png(img: RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn textured(seed: u32) -> Vec<u8> {
        encode_png(RgbImage::from_fn(96, 96, |x, y| {
            let v = ((x * (3 + seed) + y * (7 + 2 * seed) + (x * y) % (11 + seed)) % 256) as u8;
            Rgb([v, v / 2, 255 - v])
        }))
    }

    fn dot(a: &[f32], b: &[f32]) -> f64 {
        a.iter().zip(b).map(|(&x, &y)| x as f64 * y as f64).sum()
    }

    #[test]
    fn extract_is_deterministic() {
        let model = FeatureModel::default();
        let img = textured(1);
        let a = model.extract(&img).unwrap();
        let b = model.extract(&img.clone()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), model.dimension());
    }

    #[test]
    fn embedding_is_unit_length() {
        let model = FeatureModel::default();
        let emb = model.extract(&textured(2)).unwrap();
        let norm = dot(&emb, &emb).sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm = {norm}");
    }

    #[test]
    fn different_images_differ() {
        let model = FeatureModel::default();
        let a = model.extract(&textured(1)).unwrap();
        let b = model.extract(&textured(5)).unwrap();
        assert_ne!(a, b);
        assert!(dot(&a, &b) < 0.9999);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let model = FeatureModel::default();
        let err = model.extract(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ExtractionError::Decode(_)), "{err}");
    }

    #[test]
    fn flat_image_has_no_face() {
        let model = FeatureModel::default();
        let flat = encode_png(RgbImage::from_pixel(64, 64, Rgb([90, 90, 90])));
        let err = model.extract(&flat).unwrap_err();
        assert!(matches!(err, ExtractionError::NoFace(_)), "{err}");
    }

    #[test]
    fn tiny_image_has_no_face() {
        let model = FeatureModel::default();
        let tiny = encode_png(RgbImage::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 0])));
        let err = model.extract(&tiny).unwrap_err();
        assert!(matches!(err, ExtractionError::NoFace(_)), "{err}");
    }

    #[test]
    fn hog_only_model() {
        let model = FeatureModel::new(FeatureConfig {
            kind: ModelKind::Hog,
            size: 64,
            cell: 8,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(model.name(), "hog-s64-c8-o9");
        let emb = model.extract(&textured(3)).unwrap();
        assert_eq!(emb.len(), 8 * 8 * 9);
    }

    #[test]
    fn invalid_config_rejected() {
        let err = FeatureModel::new(FeatureConfig { cell: 0, ..Default::default() }).unwrap_err();
        assert!(matches!(err, ExtractionError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let model = FeatureModel::default();
        let err = model
            .extract_file(std::path::Path::new("/nonexistent/elephant.jpg"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io { .. }));
    }
}
