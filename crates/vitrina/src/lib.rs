//! Vitrina: image-catalog similarity and text search.
//!
//! Umbrella crate re-exporting the component crates. The catalog loader
//! and error types are always available; the backends come in behind
//! feature gates so library consumers pull only what they use:
//!
//! | Feature  | Adds                                              |
//! |----------|---------------------------------------------------|
//! | `vector` | remote collection client, ingestion, local index  |
//! | `fts`    | full-text search backend                          |
//! | `query`  | the query router (implies `vector` + `fts`)       |
//! | `cli`    | the command-line application (implies `query`)    |
//! | `full`   | everything above                                  |

pub use vitrina_catalog as catalog;
pub use vitrina_core::{Error, Result};

#[cfg(feature = "vector")]
pub use vitrina_vector as vector;

#[cfg(feature = "fts")]
pub use vitrina_fts as fts;

#[cfg(feature = "query")]
pub use vitrina_query as query;

#[cfg(feature = "cli")]
pub use vitrina_cli as cli;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_reexports_are_usable() {
        let result: Result<()> = Err(Error::config("probe"));
        assert!(result.is_err());

        let features = catalog::FeatureStore::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert_eq!(features.dimension(), 2);
    }
}
