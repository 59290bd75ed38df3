//! Per-component local configuration store.
//!
//! # Storage layout
//!
//! ```text
//! <context>/
//!   .hoist/
//!     config.yaml   (component settings — mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function takes the component context directory explicitly
//! (`load_at(context)`, `save_at(context, …)`); there is no process-wide
//! active component. Callers construct the context once per invocation and
//! thread it through.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{
    AppName, ComponentName, ComponentSettings, NamespaceName, ResourceBounds, SourceDescriptor,
    SourceType,
};

/// Supported `config set` parameter names, lowercase.
pub const SUPPORTED_PARAMETERS: &[&str] = &[
    "name",
    "app",
    "namespace",
    "type",
    "sourcetype",
    "sourcelocation",
    "ref",
    "minmemory",
    "maxmemory",
    "mincpu",
    "maxcpu",
];

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<context>/.hoist/config.yaml` — pure, no I/O.
pub fn config_path_at(context: &Path) -> PathBuf {
    context.join(".hoist").join("config.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the component settings for a context directory.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(context: &Path) -> Result<ComponentSettings, ConfigError> {
    let path = config_path_at(context);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save component settings to `<context>/.hoist/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
pub fn save_at(context: &Path, settings: &ComponentSettings) -> Result<(), ConfigError> {
    let path = config_path_at(context);
    let dir = context.join(".hoist");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let tmp = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(&tmp, yaml)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Load the settings for `context`, creating a default record if none exist.
///
/// Defaults: component name = context directory name, app = `app`,
/// namespace = `default`, local source rooted at the context itself.
/// Idempotent: an existing config is returned unchanged.
pub fn load_or_init_at(context: &Path) -> Result<ComponentSettings, ConfigError> {
    if config_path_at(context).exists() {
        return load_at(context);
    }
    let name = context
        .file_name()
        .unwrap_or_else(|| context.as_os_str())
        .to_string_lossy()
        .into_owned();
    let settings = ComponentSettings {
        name: ComponentName::from(name),
        app: AppName::from("app"),
        namespace: NamespaceName::from("default"),
        component_type: String::new(),
        source: SourceDescriptor {
            source_type: SourceType::Local,
            location: ".".to_string(),
            reference: None,
        },
        env: Default::default(),
        storage: vec![],
        resources: ResourceBounds::default(),
    };
    save_at(context, &settings)?;
    Ok(settings)
}

// ---------------------------------------------------------------------------
// 5. Source path resolution
// ---------------------------------------------------------------------------

/// Resolve the source root for local/binary sources.
///
/// The configured location may be a plain path (absolute, or relative to the
/// context directory) or a `file://` URI. Any other URI scheme is rejected.
/// Repository sources are never path-resolved.
pub fn resolve_source_path(
    context: &Path,
    settings: &ComponentSettings,
) -> Result<PathBuf, ConfigError> {
    let location = settings.source.location.as_str();
    let path = match location.split_once("://") {
        Some(("file", rest)) => PathBuf::from(rest),
        Some((scheme, _)) => {
            return Err(ConfigError::UnsupportedSourceScheme {
                component: settings.name.0.clone(),
                scheme: scheme.to_string(),
            })
        }
        None => PathBuf::from(location),
    };
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(context.join(path))
    }
}

// ---------------------------------------------------------------------------
// 6. Parameter access (config set / view / unset)
// ---------------------------------------------------------------------------

fn unknown(name: &str) -> ConfigError {
    ConfigError::UnknownParameter {
        name: name.to_string(),
        supported: SUPPORTED_PARAMETERS.join(", "),
    }
}

/// Set a single whitelisted parameter on the settings record.
pub fn set_parameter(
    settings: &mut ComponentSettings,
    name: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "name" => settings.name = ComponentName::from(value),
        "app" => settings.app = AppName::from(value),
        "namespace" => settings.namespace = NamespaceName::from(value),
        "type" => settings.component_type = value.to_string(),
        "sourcetype" => {
            settings.source.source_type = match value.to_ascii_lowercase().as_str() {
                "local" => SourceType::Local,
                "binary" => SourceType::Binary,
                "repository" => SourceType::Repository,
                other => {
                    return Err(ConfigError::InvalidValue {
                        name: name.to_string(),
                        value: other.to_string(),
                        reason: "expected: local, binary, repository".to_string(),
                    })
                }
            }
        }
        "sourcelocation" => settings.source.location = value.to_string(),
        "ref" => settings.source.reference = Some(value.to_string()),
        "minmemory" => settings.resources.min_memory = Some(value.to_string()),
        "maxmemory" => settings.resources.max_memory = Some(value.to_string()),
        "mincpu" => settings.resources.min_cpu = Some(value.to_string()),
        "maxcpu" => settings.resources.max_cpu = Some(value.to_string()),
        other => return Err(unknown(other)),
    }
    Ok(())
}

/// Clear a single optional parameter. Identity and source fields cannot be unset.
pub fn unset_parameter(settings: &mut ComponentSettings, name: &str) -> Result<(), ConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "ref" => settings.source.reference = None,
        "minmemory" => settings.resources.min_memory = None,
        "maxmemory" => settings.resources.max_memory = None,
        "mincpu" => settings.resources.min_cpu = None,
        "maxcpu" => settings.resources.max_cpu = None,
        "name" | "app" | "namespace" | "type" | "sourcetype" | "sourcelocation" => {
            return Err(ConfigError::InvalidValue {
                name: name.to_string(),
                value: String::new(),
                reason: "this parameter cannot be unset, only changed".to_string(),
            })
        }
        other => return Err(unknown(other)),
    }
    Ok(())
}

/// Whether a parameter currently has a value (used to prompt before override).
pub fn is_set(settings: &ComponentSettings, name: &str) -> bool {
    parameter_value(settings, name).is_some_and(|v| !v.is_empty())
}

/// Current value of a whitelisted parameter, `None` when unrecognized or unset.
pub fn parameter_value(settings: &ComponentSettings, name: &str) -> Option<String> {
    match name.to_ascii_lowercase().as_str() {
        "name" => Some(settings.name.0.clone()),
        "app" => Some(settings.app.0.clone()),
        "namespace" => Some(settings.namespace.0.clone()),
        "type" => Some(settings.component_type.clone()),
        "sourcetype" => Some(settings.source.source_type.to_string()),
        "sourcelocation" => Some(settings.source.location.clone()),
        "ref" => settings.source.reference.clone(),
        "minmemory" => settings.resources.min_memory.clone(),
        "maxmemory" => settings.resources.max_memory.clone(),
        "mincpu" => settings.resources.min_cpu.clone(),
        "maxcpu" => settings.resources.max_cpu.clone(),
        _ => None,
    }
}

/// All whitelisted parameters with their current values, in declaration order.
pub fn parameter_values(settings: &ComponentSettings) -> Vec<(String, String)> {
    SUPPORTED_PARAMETERS
        .iter()
        .map(|name| {
            (
                name.to_string(),
                parameter_value(settings, name).unwrap_or_default(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
