use rst_common::with_logging::log::debug;

use crate::identity::verifiable::types::{LedgerBuilder, LedgerData, LedgerError};

use super::types::ProofError;
use super::Identifier;

/// `LedgerResolver` fetches the ledger objects referenced by a list of identifiers
#[derive(Clone)]
pub struct LedgerResolver<TLedger>
where
    TLedger: LedgerBuilder,
{
    ledger: TLedger,
}

impl<TLedger> LedgerResolver<TLedger>
where
    TLedger: LedgerBuilder,
{
    pub fn new(ledger: TLedger) -> Self {
        Self { ledger }
    }

    /// `resolve` loads every schema, credential definition and revocation registry once,
    /// any failed lookup aborts with [`ProofError::LedgerResolutionError`]
    pub async fn resolve(&self, identifiers: &[Identifier]) -> Result<LedgerData, ProofError> {
        let mut data = LedgerData::default();

        for identifier in identifiers.iter() {
            if !data.schemas.contains_key(&identifier.schema_id) {
                let schema = self
                    .ledger
                    .get_schema(identifier.schema_id.to_owned())
                    .await
                    .map_err(resolution_error)?;

                data.schemas.insert(identifier.schema_id.to_owned(), schema);
            }

            if !data
                .credential_definitions
                .contains_key(&identifier.cred_def_id)
            {
                let cred_def = self
                    .ledger
                    .get_credential_definition(identifier.cred_def_id.to_owned())
                    .await
                    .map_err(resolution_error)?;

                data.credential_definitions
                    .insert(identifier.cred_def_id.to_owned(), cred_def);
            }

            if let Some(rev_reg_id) = &identifier.rev_reg_id {
                if !data.revocation_registries.contains_key(rev_reg_id) {
                    let registry = self
                        .ledger
                        .get_revocation_registry(rev_reg_id.to_owned())
                        .await
                        .map_err(resolution_error)?;

                    data.revocation_registries
                        .insert(rev_reg_id.to_owned(), registry);
                }
            }
        }

        debug!(
            "ledger resolved: schemas={} cred_defs={} rev_regs={}",
            data.schemas.len(),
            data.credential_definitions.len(),
            data.revocation_registries.len()
        );

        Ok(data)
    }
}

fn resolution_error(err: LedgerError) -> ProofError {
    ProofError::LedgerResolutionError(err.to_string())
}
