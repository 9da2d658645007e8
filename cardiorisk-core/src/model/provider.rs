//! Process-wide model holder.
//!
//! Constructed once at start-up and passed explicitly to whatever renders
//! predictions. The artifact is loaded on first use, exactly once; the
//! outcome, success or [`LoadError`], is kept for the life of the process.
//! A new artifact needs a restart.

use super::{Classifier, artifact};
use crate::error::LoadError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::warn;

type Loader = Box<dyn Fn() -> Result<Arc<dyn Classifier>, LoadError> + Send + Sync>;

/// Outcome of the single load attempt.
#[derive(Debug, Clone)]
pub enum ModelState {
    Ready(Arc<dyn Classifier>),
    Unavailable(LoadError),
}

pub struct ModelProvider {
    source: String,
    loader: Loader,
    state: OnceLock<ModelState>,
}

impl fmt::Debug for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelProvider")
            .field("source", &self.source)
            .field("state", &self.state.get())
            .finish()
    }
}

impl ModelProvider {
    /// Provider that loads the artifact at `path` on first use.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let source = path.display().to_string();
        Self {
            source,
            loader: Box::new(move || artifact::load(&path)),
            state: OnceLock::new(),
        }
    }

    /// Provider backed by an arbitrary loader.
    pub fn from_loader<F>(source: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Classifier>, LoadError> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            loader: Box::new(loader),
            state: OnceLock::new(),
        }
    }

    /// Provider whose model is already in memory.
    pub fn preloaded(classifier: Arc<dyn Classifier>) -> Self {
        let source = format!("in-memory:{}", classifier.name());
        let cached = classifier.clone();
        Self {
            source,
            loader: Box::new(move || Ok(cached.clone())),
            state: OnceLock::from(ModelState::Ready(classifier)),
        }
    }

    /// Provider that always reports the given load failure.
    pub fn unavailable(err: LoadError) -> Self {
        let source = err.path().display().to_string();
        Self {
            source,
            loader: Box::new(move || Err(err.clone())),
            state: OnceLock::new(),
        }
    }

    /// Load on first call; every later call returns the cached outcome.
    pub fn state(&self) -> &ModelState {
        self.state.get_or_init(|| match (self.loader)() {
            Ok(model) => ModelState::Ready(model),
            Err(err) => {
                warn!(source = %self.source, error = %err, "Model unavailable, predictions disabled");
                ModelState::Unavailable(err)
            }
        })
    }

    /// Trigger the load eagerly, e.g. at process start.
    pub fn warm_up(&self) -> Result<(), &LoadError> {
        match self.state() {
            ModelState::Ready(_) => Ok(()),
            ModelState::Unavailable(err) => Err(err),
        }
    }

    pub fn classifier(&self) -> Option<&Arc<dyn Classifier>> {
        match self.state() {
            ModelState::Ready(model) => Some(model),
            ModelState::Unavailable(_) => None,
        }
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match self.state() {
            ModelState::Ready(_) => None,
            ModelState::Unavailable(err) => Some(err),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.classifier().is_some()
    }

    /// Whether the load attempt has happened yet.
    pub fn is_initialized(&self) -> bool {
        self.state.get().is_some()
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Resolve a configured model path against a working directory.
pub fn resolve_model_path(base: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        base.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassDistribution, FixedClassifier, RiskLabel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixed() -> Arc<dyn Classifier> {
        Arc::new(FixedClassifier::new(
            RiskLabel::Low,
            ClassDistribution::new(0.82, 0.18).unwrap(),
        ))
    }

    #[test]
    fn test_loader_runs_once_on_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = ModelProvider::from_loader("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(fixed())
        });
        assert!(!provider.is_initialized());
        for _ in 0..5 {
            assert!(provider.is_ready());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_loader_runs_once_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let provider = ModelProvider::from_loader("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(LoadError::NotFound {
                path: PathBuf::from("missing.json"),
            })
        });
        for _ in 0..3 {
            assert!(provider.classifier().is_none());
            assert!(provider.load_error().is_some());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_path_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ModelProvider::from_path(dir.path().join("nope.json"));
        assert!(matches!(
            provider.warm_up(),
            Err(LoadError::NotFound { .. })
        ));
    }

    #[test]
    fn test_preloaded_is_initialized() {
        let provider = ModelProvider::preloaded(fixed());
        assert!(provider.is_initialized());
        assert_eq!(provider.source(), "in-memory:fixed");
        assert!(provider.warm_up().is_ok());
    }

    #[test]
    fn test_resolve_model_path() {
        let base = Path::new("/srv/app");
        assert_eq!(
            resolve_model_path(base, Path::new("heart_disease_model.json")),
            PathBuf::from("/srv/app/heart_disease_model.json")
        );
        assert_eq!(
            resolve_model_path(base, Path::new("/models/m.json")),
            PathBuf::from("/models/m.json")
        );
    }
}
