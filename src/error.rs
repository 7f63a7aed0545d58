use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core.
///
/// Used throughout the crate instead of `.unwrap()`/`.expect()`; each variant
/// carries enough context to be actionable by the host.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A species symbol with no registry entry was requested.
    #[error("unknown species: {0:?}")]
    UnknownSpecies(String),

    /// A spawn request would exceed the configured particle ceiling.
    #[error("particle capacity exceeded (limit {limit})")]
    CapacityExceeded {
        /// The configured `max_particles` ceiling.
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let e = Error::InvalidParam("radius must be > 0".to_string());
        let msg = format!("{e}");
        assert!(msg.contains("invalid parameter"));
        assert!(msg.contains("radius"));
    }

    #[test]
    fn unknown_species_names_the_symbol() {
        let e = Error::UnknownSpecies("Xx".to_string());
        assert!(format!("{e}").contains("Xx"));
    }

    #[test]
    fn capacity_error_reports_limit() {
        let e = Error::CapacityExceeded { limit: 4096 };
        assert!(format!("{e}").contains("4096"));
    }

    #[test]
    fn result_type_alias_compiles() -> Result<()> {
        Ok(())
    }
}
