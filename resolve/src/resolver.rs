//! Image-to-identity resolution.
//!
//! For each image the resolver extracts an embedding, finds the closest
//! identity, and either appends the embedding to that identity or creates
//! a new one. The database is passed in explicitly so the caller decides
//! how it is loaded, shared and persisted.

use std::path::{Path, PathBuf};

use elephid_facevec::{ExtractionError, FaceModel};
use elephid_identity::{best_match, Embedding, IdentityDb};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{check_threshold, ResolverConfig};
use crate::outcome::{BatchReport, Resolution};
use crate::scan::image_files;
use crate::ResolveError;

/// Resolves images against an [`IdentityDb`] using one [`FaceModel`].
pub struct Resolver {
    model: Box<dyn FaceModel>,
    cfg: ResolverConfig,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("model", &self.model.name())
            .field("cfg", &self.cfg)
            .finish()
    }
}

impl Resolver {
    pub fn new(model: Box<dyn FaceModel>, cfg: ResolverConfig) -> Result<Self, ResolveError> {
        cfg.validate()?;
        Ok(Self { model, cfg })
    }

    pub fn model(&self) -> &dyn FaceModel {
        self.model.as_ref()
    }

    pub fn threshold(&self) -> f32 {
        self.cfg.threshold
    }

    /// Changes the match threshold for subsequent resolutions.
    pub fn set_threshold(&mut self, threshold: f32) -> Result<(), ResolveError> {
        check_threshold(threshold)?;
        self.cfg.threshold = threshold;
        Ok(())
    }

    /// Ties `db` to this resolver's model.
    ///
    /// An untagged database adopts the model name. A database tagged with a
    /// different model is rejected, since embeddings from different models
    /// are not comparable.
    pub fn bind(&self, db: &mut IdentityDb) -> Result<(), ResolveError> {
        let name = self.model.name();
        match db.model() {
            Some(existing) if existing != name => Err(ResolveError::ModelMismatch {
                db: existing.to_string(),
                model: name.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                db.set_model(name);
                Ok(())
            }
        }
    }

    /// Resolves an already extracted embedding.
    ///
    /// Matching and the follow-up mutation happen under the same `&mut`
    /// borrow, so no other resolution can interleave between them.
    pub fn resolve_embedding(
        &self,
        db: &mut IdentityDb,
        emb: Embedding,
    ) -> Result<Resolution, ResolveError> {
        db.check_embedding(&emb)?;
        match best_match(&emb, db, self.cfg.threshold) {
            Some(m) => {
                db.append(&m.key, emb)?;
                debug!(
                    key = %m.key,
                    score = m.score,
                    threshold = self.cfg.threshold,
                    "resolve: matched existing identity"
                );
                Ok(Resolution::matched(m.key, m.score))
            }
            None => {
                let key = db.create(emb)?;
                info!(key = %key, threshold = self.cfg.threshold, "resolve: created identity");
                Ok(Resolution::created(key))
            }
        }
    }

    /// Resolves one encoded image.
    pub fn resolve_bytes(&self, db: &mut IdentityDb, image: &[u8]) -> Result<Resolution, ResolveError> {
        self.bind(db)?;
        let emb = self.model.extract(image)?;
        self.resolve_embedding(db, emb)
    }

    /// Resolves one image file.
    pub fn resolve_file(&self, db: &mut IdentityDb, path: &Path) -> Result<Resolution, ResolveError> {
        self.bind(db)?;
        let emb = self.model.extract_file(path)?;
        let mut res = self.resolve_embedding(db, emb)?;
        res.source = Some(path.to_path_buf());
        Ok(res)
    }

    /// Resolves `paths` in the given order.
    ///
    /// Embeddings are extracted in parallel, then matched one by one in
    /// input order, so the result is the same as resolving each file in
    /// sequence. Failures specific to one image are recorded in the report
    /// and do not stop the run.
    pub fn resolve_paths(
        &self,
        db: &mut IdentityDb,
        paths: &[PathBuf],
    ) -> Result<BatchReport, ResolveError> {
        self.bind(db)?;

        let extracted: Vec<Result<Embedding, ExtractionError>> = paths
            .par_iter()
            .map(|p| self.model.extract_file(p))
            .collect();

        let mut report = BatchReport::default();
        for (path, emb) in paths.iter().zip(extracted) {
            let result = emb
                .map_err(ResolveError::from)
                .and_then(|emb| self.resolve_embedding(db, emb));
            match result {
                Ok(mut res) => {
                    res.source = Some(path.clone());
                    report.record(path, res);
                }
                Err(e) if e.is_per_image() => {
                    warn!(path = %path.display(), error = %e, "resolve: skipped image");
                    report.record_failure(path, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            processed = report.processed,
            failed = report.failed,
            new = report.new_identities,
            matched = report.matched,
            identities = db.len(),
            "resolve: batch done"
        );
        Ok(report)
    }

    /// Resolves every image file directly inside `dir`, in file name order.
    pub fn resolve_dir(&self, db: &mut IdentityDb, dir: &Path) -> Result<BatchReport, ResolveError> {
        let paths = image_files(dir, &self.cfg.extensions)?;
        debug!(dir = %dir.display(), images = paths.len(), "resolve: scanned directory");
        self.resolve_paths(db, &paths)
    }
}
