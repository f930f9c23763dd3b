use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Istio makefile declaring the base image coordinates.
pub const MAKEFILE_CORE: &str = "Makefile.core.mk";

static DEFAULT_ASSIGNMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(BASE_VERSION|ISTIO_BASE_REGISTRY)[ \t]*\?[ \t]*=[ \t]*(.*?)[ \t]*$")
        .expect("makefile assignment pattern is valid")
});

/// Base image Istio builds its containers from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BaseImage {
    pub registry: String,
    pub version: String,
}

impl BaseImage {
    /// Reads `BASE_VERSION ?= …` and `ISTIO_BASE_REGISTRY ?= …` from
    /// `Makefile.core.mk`. Missing assignments leave the field empty.
    pub fn from_makefile_core(makefile: &str) -> Self {
        let mut image = Self::default();
        for caps in DEFAULT_ASSIGNMENT_RE.captures_iter(makefile) {
            let value = caps[2].to_owned();
            match &caps[1] {
                "BASE_VERSION" => image.version = value,
                "ISTIO_BASE_REGISTRY" => image.registry = value,
                _ => {}
            }
        }
        image
    }
}
