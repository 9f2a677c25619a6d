//! Layered file discovery producing a composite source.
//!
//! Discovers JSON5 property files (system/user/project/cwd/runtime), flattens
//! each into its own layer and stacks them so the most specific layer wins.

mod layer_io;
mod utils;


use crate::{CompositeSource, SourceError};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default property filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "propbind.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".propbind";
/// Marker files/dirs that identify a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

#[cfg(unix)]
/// Default system config path on Unix.
const SYSTEM_CONFIG_PATH: &str = "/etc/propbind/propbind.json5";
#[cfg(windows)]
/// Default system config path on Windows.
const SYSTEM_CONFIG_PATH: &str = "C:\\ProgramData\\propbind\\propbind.json5";

/// Composite source plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredSource {
    /// Loaded layers stacked highest precedence first.
    pub source: CompositeSource,
    /// Metadata for each layer loaded, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigLayerSource {
    /// System-wide configuration.
    System,
    /// User-specific configuration.
    User,
    /// Project root configuration.
    Project,
    /// Current working directory configuration.
    Cwd,
    /// Runtime overrides (highest precedence).
    Runtime,
}

/// Metadata about a loaded layer.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigLayer {
    /// Layer origin (system, user, runtime, etc).
    pub source: ConfigLayerSource,
    /// Location on disk.
    pub path: PathBuf,
    /// Name of the layer inside the composite source.
    pub name: String,
    /// Number of properties contributed.
    pub properties: usize,
}

/// Options controlling layer discovery.
#[derive(Debug, Clone)]
pub struct LayeredSourceOptions {
    /// Working directory used to resolve local layers.
    pub cwd: PathBuf,
    /// Optional system config path (defaults to `/etc/propbind/propbind.json5` on Unix).
    pub system_config_path: Option<PathBuf>,
    /// Optional user config path (defaults to `~/.propbind/propbind.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime override files applied last; these must exist.
    pub runtime_paths: Vec<PathBuf>,
    /// Marker files/dirs used to detect the project root.
    pub project_root_markers: Vec<String>,
}

impl LayeredSourceOptions {
    /// Create options with default layer locations for the provided cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::default_system_config_path(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Add a runtime override file that is applied last.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

/// Load the layer stack using explicit locations.
///
/// Layer precedence (low -> high): system, user, project, cwd, runtime.
pub fn load_layered_source_with_options(
    options: LayeredSourceOptions,
) -> Result<LayeredSource, SourceError> {
    let cwd = utils::normalize_path(&options.cwd)?;
    debug!("normalized cwd for source load: {}", cwd.display());
    let mut loaded = Vec::new();
    let mut seen_paths = HashSet::new();

    for (source, path) in [
        (
            ConfigLayerSource::System,
            options.system_config_path.as_deref(),
        ),
        (ConfigLayerSource::User, options.user_config_path.as_deref()),
    ] {
        if let Some(path) = path {
            push_optional(source, path, &mut loaded, &mut seen_paths)?;
        }
    }

    match utils::find_project_root(&cwd, &options.project_root_markers) {
        Some(project_root) => {
            debug!("resolved project root: {}", project_root.display());
            push_optional(
                ConfigLayerSource::Project,
                &project_root.join(DEFAULT_CONFIG_FILE),
                &mut loaded,
                &mut seen_paths,
            )?;
        }
        None => debug!("project root not found; skipping project layer"),
    }

    push_optional(
        ConfigLayerSource::Cwd,
        &cwd.join(DEFAULT_CONFIG_FILE),
        &mut loaded,
        &mut seen_paths,
    )?;

    for runtime_path in &options.runtime_paths {
        let layer = layer_io::load_required_layer(ConfigLayerSource::Runtime, runtime_path)?;
        debug!("loaded runtime layer (path={})", runtime_path.display());
        loaded.push(layer);
    }

    let mut composite = CompositeSource::new();
    let mut layers = Vec::with_capacity(loaded.len());
    for layer in loaded {
        composite.push_highest(layer.meta.name.clone(), Arc::new(layer.source));
        layers.push(layer.meta);
    }

    info!("layered source loaded (layers={})", layers.len());
    Ok(LayeredSource {
        source: composite,
        layers,
    })
}

/// Internal representation of a loaded layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    source: crate::Json5Source,
}

fn push_optional(
    source: ConfigLayerSource,
    path: &Path,
    loaded: &mut Vec<LoadedLayer>,
    seen_paths: &mut HashSet<PathBuf>,
) -> Result<(), SourceError> {
    if !path.exists() {
        debug!(
            "skipping missing layer (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(());
    }
    if !seen_paths.insert(utils::unique_path(path)) {
        debug!(
            "skipping duplicate layer (source={:?}, path={})",
            source,
            path.display()
        );
        return Ok(());
    }
    loaded.push(layer_io::load_required_layer(source, path)?);
    Ok(())
}
