use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field holds a value outside of its admissible range
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
    /// Two fields hold values that are inconsistent with each other
    #[error("Inconsistent values for fields \"{0}\" and \"{1}\"")]
    InconsistentFields(&'static str, &'static str),
}
