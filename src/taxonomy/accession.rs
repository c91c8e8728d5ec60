//! Assembly accession spellings.
//!
//! Site paths spell accessions with underscores only (`GCA_001008285_1`);
//! NCBI uses a dot before the version (`GCA_001008285.1`).

/// Drops the version suffix: `GCA_001008285_1` becomes `GCA_001008285`.
///
/// Accessions without a version suffix are returned unchanged.
pub fn strip_version(accession: &str) -> &str {
    match split_version(accession) {
        Some((base, _)) => base,
        None => accession,
    }
}

/// NCBI spelling: `GCA_001008285_1` becomes `GCA_001008285.1`.
pub fn dotted(accession: &str) -> String {
    match split_version(accession) {
        Some((base, version)) => format!("{}.{}", base, version),
        None => accession.to_string(),
    }
}

/// Site spelling: `GCA_001008285.1` becomes `GCA_001008285_1`.
pub fn underscored(accession: &str) -> String {
    accession.replace('.', "_")
}

/// Splits `PREFIX_NUMBER_VERSION` at the last underscore.
fn split_version(accession: &str) -> Option<(&str, &str)> {
    if accession.matches('_').count() < 2 {
        return None;
    }
    accession.rsplit_once('_')
}
