use std::path::Path;

use crate::ExtractionError;

/// Extracts face embedding vectors from encoded images.
///
/// The output is a dense f32 vector whose dimensionality is returned by
/// [`FaceModel::dimension`]. Implementations must be deterministic: the
/// same bytes always map to the same vector. Any weight loading belongs in
/// the constructor, not in `extract`.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
pub trait FaceModel: Send + Sync {
    /// Computes an embedding from encoded image bytes.
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>, ExtractionError>;

    /// Returns the dimensionality of the embedding vectors.
    fn dimension(&self) -> usize;

    /// Short identifier of the model and its configuration (e.g. "hog-lbp-s128-c16-o9-g4").
    fn name(&self) -> &str;

    /// Reads an image file and computes its embedding.
    fn extract_file(&self, path: &Path) -> Result<Vec<f32>, ExtractionError> {
        let data = std::fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract(&data)
    }
}
