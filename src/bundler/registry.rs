//! Backend registration.
//!
//! The registry is filled once per invocation: built-in backends first (unless
//! the project opts out of them), then custom backends from the compile-time
//! [`BundlerCatalog`], then subprocess backends declared in the configuration.
//! Ids are unique and the first registration of an id wins.

use super::backend::{
    Bundler, BundlerDescriptor, BundlerProvider, ExternalBundler, ValidationError,
};
use super::error::{Error, Result};
use super::settings::JfxSettings;
use super::ParameterModel;
use std::collections::BTreeMap;
use std::path::Path;

type BundlerFactory = Box<dyn Fn() -> Box<dyn Bundler> + Send + Sync>;

/// Custom backends known at compile time, addressed by name.
///
/// Embedding programs register their own backends here and reference them
/// from `custom_bundlers` in the configuration.
///
/// ```ignore
/// let catalog = BundlerCatalog::new().with("com.acme.Snap", || Box::new(SnapBundler));
/// ```
#[derive(Default)]
pub struct BundlerCatalog {
    factories: BTreeMap<String, BundlerFactory>,
}

impl BundlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`, replacing an earlier one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Bundler> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Bundler> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Instantiates the backend registered under `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn Bundler>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for BundlerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

/// Ordered set of backends with unique ids.
#[derive(Debug, Default)]
pub struct BundlerRegistry {
    bundlers: Vec<Box<dyn Bundler>>,
}

impl BundlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry for a project.
    ///
    /// Fails with [`Error::NoBundlersRegistered`] when nothing ends up registered.
    pub fn load(
        settings: &JfxSettings,
        project_dir: &Path,
        builtin: &dyn BundlerProvider,
        catalog: &BundlerCatalog,
    ) -> Result<Self> {
        let mut registry = Self::new();

        if settings.only_custom_bundlers {
            log::debug!("Skipping built-in bundlers, only custom bundlers are used");
        } else {
            registry.extend_from(builtin);
        }

        for name in &settings.custom_bundlers {
            match catalog.create(name) {
                Some(bundler) => {
                    registry.register(bundler);
                }
                None => log::warn!("Couldn't find custom bundler {name} in the bundler catalog"),
            }
        }

        for external in &settings.external_bundlers {
            registry.register(Box::new(ExternalBundler::new(external, project_dir)));
        }

        if registry.is_empty() {
            return Err(Error::NoBundlersRegistered);
        }
        Ok(registry)
    }

    /// Adds a backend unless its id is already taken. Returns whether it was added.
    pub fn register(&mut self, bundler: Box<dyn Bundler>) -> bool {
        if self.contains(bundler.id()) {
            log::info!(
                "Skipping bundler {} ({}), its id is already registered",
                bundler.id(),
                bundler.name()
            );
            return false;
        }
        log::debug!("Registered bundler {}", bundler.id());
        self.bundlers.push(bundler);
        true
    }

    /// Registers every backend of a provider, in provider order.
    pub fn extend_from(&mut self, provider: &dyn BundlerProvider) {
        for bundler in provider.bundlers() {
            self.register(bundler);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bundlers.iter().any(|b| b.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&dyn Bundler> {
        self.bundlers.iter().find(|b| b.id() == id).map(|b| b.as_ref())
    }

    pub fn bundlers(&self) -> impl Iterator<Item = &dyn Bundler> {
        self.bundlers.iter().map(|b| b.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.bundlers.iter().map(|b| b.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.bundlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundlers.is_empty()
    }

    /// Describes every backend usable on this host.
    ///
    /// Backends rejecting the platform are left out; configuration errors do
    /// not hide a backend since the listing runs without real parameters.
    pub async fn list(&self, params: &ParameterModel) -> Vec<BundlerDescriptor> {
        let mut listing = Vec::new();
        for bundler in self.bundlers() {
            match bundler.validate(params).await {
                Err(ValidationError::UnsupportedPlatform(_)) => {
                    log::debug!("Not listing {}, unsupported platform", bundler.id());
                }
                Ok(_) | Err(ValidationError::Config { .. }) => {
                    listing.push(bundler.descriptor());
                }
            }
        }
        listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::BoxFuture;
    use std::path::PathBuf;

    struct Stub {
        id: &'static str,
        name: &'static str,
        platform_ok: bool,
    }

    impl Bundler for Stub {
        fn id(&self) -> &str {
            self.id
        }
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "stub"
        }
        fn validate<'a>(
            &'a self,
            _params: &'a ParameterModel,
        ) -> BoxFuture<'a, std::result::Result<bool, ValidationError>> {
            Box::pin(async move {
                if self.platform_ok {
                    Ok(true)
                } else {
                    Err(ValidationError::UnsupportedPlatform("elsewhere".into()))
                }
            })
        }
        fn execute<'a>(
            &'a self,
            _params: &'a ParameterModel,
            _output_dir: &'a Path,
        ) -> BoxFuture<'a, Result<Vec<PathBuf>>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    struct Builtins;

    impl BundlerProvider for Builtins {
        fn bundlers(&self) -> Vec<Box<dyn Bundler>> {
            vec![
                Box::new(Stub { id: "app", name: "builtin app", platform_ok: true }),
                Box::new(Stub { id: "msi", name: "builtin msi", platform_ok: false }),
            ]
        }
    }

    fn catalog() -> BundlerCatalog {
        BundlerCatalog::new()
            .with("custom.App", || {
                Box::new(Stub { id: "app", name: "custom app", platform_ok: true })
            })
            .with("custom.Snap", || {
                Box::new(Stub { id: "snap", name: "custom snap", platform_ok: true })
            })
    }

    #[test]
    fn test_first_registered_id_wins() {
        let settings = JfxSettings {
            custom_bundlers: vec!["custom.App".into(), "custom.Snap".into()],
            ..Default::default()
        };
        let registry =
            BundlerRegistry::load(&settings, Path::new("."), &Builtins, &catalog()).unwrap();

        assert_eq!(registry.ids(), vec!["app", "msi", "snap"]);
        assert_eq!(registry.get("app").map(|b| b.name()), Some("builtin app"));
    }

    #[test]
    fn test_only_custom_drops_builtins() {
        let settings = JfxSettings {
            only_custom_bundlers: true,
            custom_bundlers: vec!["custom.App".into(), "does.not.Exist".into()],
            ..Default::default()
        };
        let registry =
            BundlerRegistry::load(&settings, Path::new("."), &Builtins, &catalog()).unwrap();
        assert_eq!(registry.ids(), vec!["app"]);
        assert_eq!(registry.get("app").map(|b| b.name()), Some("custom app"));
    }

    #[test]
    fn test_empty_registry_is_fatal() {
        let settings = JfxSettings {
            only_custom_bundlers: true,
            ..Default::default()
        };
        let err = BundlerRegistry::load(&settings, Path::new("."), &Builtins, &catalog())
            .unwrap_err();
        assert!(matches!(err, Error::NoBundlersRegistered));
    }

    #[tokio::test]
    async fn test_listing_hides_foreign_platforms() {
        let mut registry = BundlerRegistry::new();
        registry.extend_from(&Builtins);
        let listing = registry.list(&ParameterModel::default()).await;
        let ids: Vec<&str> = listing.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["app"]);
    }
}
