//! Derived display fields for a service.
//!
//! Every field falls back through spec → status → metadata, treating empty
//! strings the same as absent ones.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ServiceResource;

/// Shown in place of the image while a git build is in progress.
pub const BUILDING_FROM_GIT: &str = "Building from Git...";

/// Version that is rendered without an `@version` suffix.
const DEFAULT_VERSION: &str = "v0";

static DOCKER_HUB_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(index\.)?docker\.io/(library/)?").expect("static regex")
});
static DIGEST_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@sha256:[0-9a-f]+$").expect("static regex"));
static LATEST_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i):latest$").expect("static regex"));
static LOCAL_REGISTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)localhost:5442/(.*)").expect("static regex"));

fn non_empty(s: Option<&String>) -> Option<&str> {
    s.map(String::as_str).filter(|s| !s.is_empty())
}

impl ServiceResource {
    /// Application name: spec, then computed, then metadata name.
    pub fn app(&self) -> String {
        let status = self.status.as_ref();
        non_empty(self.spec.app.as_ref())
            .or_else(|| non_empty(status.and_then(|s| s.computed_app.as_ref())))
            .or_else(|| non_empty(self.metadata.name.as_ref()))
            .unwrap_or_default()
            .to_string()
    }

    /// Version label. Falls back to the first segment of the uid, then `?`.
    pub fn version(&self) -> String {
        let status = self.status.as_ref();
        let uid = self
            .metadata
            .uid
            .as_deref()
            .and_then(|uid| uid.split('-').next())
            .filter(|prefix| !prefix.is_empty());

        non_empty(self.spec.version.as_ref())
            .or_else(|| non_empty(status.and_then(|s| s.computed_version.as_ref())))
            .or(uid)
            .unwrap_or("?")
            .to_string()
    }

    /// `app@version`, or just `app` for the default version.
    pub fn name_display(&self) -> String {
        let version = self.version();
        if version == DEFAULT_VERSION {
            return self.app();
        }
        format!("{}@{}", self.app(), version)
    }

    /// `namespace:name`, using the id when the name is missing.
    pub fn namespace_name_display(&self) -> String {
        let namespace = self.metadata.namespace.as_deref().unwrap_or_default();
        let name = non_empty(self.metadata.name.as_ref()).unwrap_or(self.id.as_str());
        format!("{namespace}:{name}")
    }

    /// `namespace:app`.
    pub fn namespace_app(&self) -> String {
        let namespace = self.metadata.namespace.as_deref().unwrap_or_default();
        format!("{namespace}:{}", self.app())
    }

    /// Shortened image reference for tables.
    pub fn image_display(&self) -> String {
        let image = self.spec.image.as_deref().unwrap_or_default();
        if self.spec.build.is_some() && image.is_empty() {
            return BUILDING_FROM_GIT.to_string();
        }
        shorten_image(image)
    }
}

/// Strip registry noise from an image reference.
///
/// Docker Hub prefixes, digests and the `:latest` tag are dropped; images
/// from the local build registry are tagged `(local)`.
pub fn shorten_image(image: &str) -> String {
    let out = DOCKER_HUB_PREFIX.replace(image, "");
    let out = DIGEST_SUFFIX.replace(&out, "");
    let out = LATEST_TAG.replace(&out, "");
    LOCAL_REGISTRY.replace(&out, "$1 (local)").into_owned()
}
