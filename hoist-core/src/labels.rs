//! Label keys applied to every remote object belonging to a component.

use std::collections::BTreeMap;

use crate::types::ComponentDescriptor;

/// Label key identifying the application a component belongs to.
pub const APP_LABEL: &str = "app.hoist.dev/application";

/// Label key identifying the component name.
pub const COMPONENT_LABEL: &str = "app.hoist.dev/component-name";

/// Label key identifying the component type.
pub const COMPONENT_TYPE_LABEL: &str = "app.hoist.dev/component-type";

/// Label key recording the fingerprint of the settings applied to a component.
/// Probed on later pushes to detect config changes.
pub const SETTINGS_FINGERPRINT_LABEL: &str = "app.hoist.dev/settings-fingerprint";

/// Labels that select every remote object for a component.
///
/// `component_type` is attached only at creation (`additional = true`);
/// selection filters must not depend on it.
pub fn get_labels(
    descriptor: &ComponentDescriptor,
    component_type: &str,
    additional: bool,
) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(APP_LABEL.to_string(), descriptor.app.0.clone());
    labels.insert(COMPONENT_LABEL.to_string(), descriptor.name.0.clone());
    if additional {
        labels.insert(
            COMPONENT_TYPE_LABEL.to_string(),
            component_type.to_string(),
        );
    }
    labels
}
