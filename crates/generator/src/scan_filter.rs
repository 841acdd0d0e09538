//! Namespace and name scoping of candidate classes

use entity_lengths_core::config::ScanOptions;

/// Decides which classes the extractors may look at
#[derive(Debug, Clone, Copy)]
pub struct ScanFilter<'a> {
    options: &'a ScanOptions,
}

impl<'a> ScanFilter<'a> {
    pub fn new(options: &'a ScanOptions) -> Self {
        Self { options }
    }

    /// Whether a class named `class_name` declared in `namespace` is scanned
    ///
    /// Exclusion always wins over inclusion. An empty include set admits every
    /// namespace that is not excluded.
    pub fn admit(&self, namespace: &str, class_name: &str) -> bool {
        if self
            .options
            .exclude_namespaces
            .iter()
            .any(|excluded| self.covers(excluded, namespace))
        {
            return false;
        }
        let included = self.options.include_namespaces.is_empty()
            || self
                .options
                .include_namespaces
                .iter()
                .any(|included| self.covers(included, namespace));
        if !included {
            return false;
        }
        match self.options.entity_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => class_name.ends_with(suffix),
            _ => true,
        }
    }

    /// `namespace` equals `scope`, or is nested below it when nested scanning is on
    fn covers(&self, scope: &str, namespace: &str) -> bool {
        namespace == scope
            || (self.options.scan_nested_namespaces
                && namespace
                    .strip_prefix(scope)
                    .is_some_and(|rest| rest.starts_with('.')))
    }
}
