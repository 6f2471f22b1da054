use std::path::PathBuf;

/// Options for creating a [`Core`](crate::Core).
///
/// Each root that is set is added as a system variable of the same name, lowercased:
/// `globalroot`, `localroot`, `runroot`, `target` and `loader`.
#[derive(Debug, Clone, Default)]
pub struct CoreOptions {
    /// The framework installation directory.
    pub global_root: Option<String>,
    /// The directory of the host application.
    pub local_root: Option<String>,
    /// The working directory the host was started from.
    pub run_root: Option<String>,
    /// The host executable name.
    pub target: Option<String>,
    /// The loader module name.
    pub loader: Option<String>,
    /// A variable definition file loaded as user variables.
    pub variables: Option<PathBuf>,
}

impl CoreOptions {
    pub(crate) fn system_variables(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("globalroot", &self.global_root),
            ("localroot", &self.local_root),
            ("runroot", &self.run_root),
            ("target", &self.target),
            ("loader", &self.loader),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
    }
}
