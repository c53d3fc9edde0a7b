//! Resolution of elephant face images to persistent identities.
//!
//! A [`Resolver`] pairs a [`FaceModel`](elephid_facevec::FaceModel) with a
//! match threshold. Each image either joins the most similar existing
//! identity, when the similarity reaches the threshold, or starts a new one.
//!
//! ```no_run
//! use std::path::Path;
//! use elephid_facevec::FeatureModel;
//! use elephid_identity::IdentityDb;
//! use elephid_resolve::{Resolver, ResolverConfig};
//!
//! let resolver = Resolver::new(Box::new(FeatureModel::default()), ResolverConfig::default()).unwrap();
//! let mut db = IdentityDb::default();
//! let res = resolver.resolve_file(&mut db, Path::new("photos/kala.jpg")).unwrap();
//! println!("{} ({})", res.key, res.outcome());
//! ```

mod config;
mod error;
mod outcome;
mod resolver;
mod scan;

pub use config::{ResolverConfig, DEFAULT_EXTENSIONS, DEFAULT_THRESHOLD};
pub use error::ResolveError;
pub use outcome::{BatchReport, ImageOutcome, Outcome, Resolution};
pub use resolver::Resolver;
pub use scan::image_files;
