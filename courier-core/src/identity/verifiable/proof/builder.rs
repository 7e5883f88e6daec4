use std::collections::BTreeMap;

use rst_common::with_logging::log::{debug, info};

use crate::identity::verifiable::credential::types::RepoBuilder as CredentialRepoBuilder;
use crate::identity::verifiable::credential::CredentialInfo;
use crate::identity::verifiable::types::LedgerBuilder;

use super::types::{ProofError, ProverBuilder};
use super::{
    Identifier, LedgerResolver, PresentedProof, ProofRequestObject, RequestedCredentials,
    RequestedProof, RevealedAttribute, RevealedAttributeGroup, SubProofReferent,
};

/// `SubProofs` hands out one sub proof index per bound credential, in order of first use
#[derive(Default)]
struct SubProofs {
    identifiers: Vec<Identifier>,
    credentials: BTreeMap<String, CredentialInfo>,
    indexes: BTreeMap<String, usize>,
}

impl SubProofs {
    fn index_of(&mut self, credential: &CredentialInfo) -> usize {
        if let Some(index) = self.indexes.get(&credential.referent) {
            return *index;
        }

        let index = self.identifiers.len();
        self.identifiers.push(Identifier {
            schema_id: credential.schema_id.to_owned(),
            cred_def_id: credential.cred_def_id.to_owned(),
            rev_reg_id: credential.rev_reg_id.to_owned(),
        });

        self.indexes.insert(credential.referent.to_owned(), index);
        self.credentials
            .insert(credential.referent.to_owned(), credential.to_owned());
        index
    }
}

/// `ProofBuilder` assembles a proof from the holder's credential selection
#[derive(Clone)]
pub struct ProofBuilder<TCredRepo, TLedger, TProver>
where
    TCredRepo: CredentialRepoBuilder,
    TLedger: LedgerBuilder,
    TProver: ProverBuilder,
{
    credentials: TCredRepo,
    resolver: LedgerResolver<TLedger>,
    prover: TProver,
}

impl<TCredRepo, TLedger, TProver> ProofBuilder<TCredRepo, TLedger, TProver>
where
    TCredRepo: CredentialRepoBuilder,
    TLedger: LedgerBuilder,
    TProver: ProverBuilder,
{
    pub fn new(credentials: TCredRepo, ledger: TLedger, prover: TProver) -> Self {
        Self {
            credentials,
            resolver: LedgerResolver::new(ledger),
            prover,
        }
    }

    fn check_selection(
        request: &ProofRequestObject,
        selection: &RequestedCredentials,
    ) -> Result<(), ProofError> {
        let missing_attr = request
            .requested_attributes
            .keys()
            .find(|key| !selection.requested_attributes.contains_key(*key));

        let missing_pred = request
            .requested_predicates
            .keys()
            .find(|key| !selection.requested_predicates.contains_key(*key));

        if let Some(referent) = missing_attr.or(missing_pred) {
            return Err(ProofError::IncompleteCredentialSelection(format!(
                "missing binding for referent: {}",
                referent
            )));
        }

        let unknown_attr = selection
            .requested_attributes
            .keys()
            .find(|key| !request.requested_attributes.contains_key(*key));

        let unknown_pred = selection
            .requested_predicates
            .keys()
            .find(|key| !request.requested_predicates.contains_key(*key));

        if let Some(referent) = unknown_attr.or(unknown_pred) {
            return Err(ProofError::ValidationError(format!(
                "binding for an unrequested referent: {}",
                referent
            )));
        }

        Ok(())
    }

    /// `build` checks the selection against the request and the wallet, resolves the ledger
    /// data of every bound credential and asks the prover for the proof
    pub async fn build(
        &self,
        request: &ProofRequestObject,
        selection: &RequestedCredentials,
    ) -> Result<PresentedProof, ProofError> {
        request.validate()?;
        Self::check_selection(request, selection)?;

        let mut sub_proofs = SubProofs::default();
        let mut requested_proof = RequestedProof::default();

        for (referent, attribute) in request.requested_attributes.iter() {
            let binding = selection
                .requested_attributes
                .get(referent)
                .ok_or_else(|| ProofError::IncompleteCredentialSelection(referent.to_owned()))?;

            let credential = self
                .credentials
                .get_credential_by_id(binding.cred_id.to_owned())
                .await?;

            if !attribute.satisfies_restrictions(&credential.schema_id, &credential.cred_def_id) {
                return Err(ProofError::ValidationError(format!(
                    "credential {} does not satisfy the restrictions of {}",
                    credential.referent, referent
                )));
            }

            let mut values = BTreeMap::new();
            for name in attribute.requested_names().iter() {
                let value = credential.get_attr_value(name).ok_or_else(|| {
                    ProofError::ValidationError(format!(
                        "credential {} has no attribute {}",
                        credential.referent, name
                    ))
                })?;

                values.insert(name.to_owned(), value);
            }

            let sub_proof_index = sub_proofs.index_of(&credential);
            match (attribute.is_group(), binding.revealed) {
                (true, _) => {
                    requested_proof.revealed_attr_groups.insert(
                        referent.to_owned(),
                        RevealedAttributeGroup {
                            sub_proof_index,
                            values,
                        },
                    );
                }
                (false, true) => {
                    let raw = values.into_values().next().unwrap_or_default();
                    requested_proof.revealed_attrs.insert(
                        referent.to_owned(),
                        RevealedAttribute {
                            sub_proof_index,
                            raw,
                        },
                    );
                }
                (false, false) => {
                    requested_proof
                        .unrevealed_attrs
                        .insert(referent.to_owned(), SubProofReferent { sub_proof_index });
                }
            }
        }

        for (referent, predicate) in request.requested_predicates.iter() {
            let binding = selection
                .requested_predicates
                .get(referent)
                .ok_or_else(|| ProofError::IncompleteCredentialSelection(referent.to_owned()))?;

            let credential = self
                .credentials
                .get_credential_by_id(binding.cred_id.to_owned())
                .await?;

            if !predicate.satisfies_restrictions(&credential.schema_id, &credential.cred_def_id) {
                return Err(ProofError::ValidationError(format!(
                    "credential {} does not satisfy the restrictions of {}",
                    credential.referent, referent
                )));
            }

            let value = credential
                .get_attr_value(&predicate.name)
                .and_then(|val| val.trim().parse::<i64>().ok())
                .ok_or_else(|| {
                    ProofError::PredicateNotSatisfied(format!(
                        "credential {} has no integer attribute {}",
                        credential.referent, predicate.name
                    ))
                })?;

            if !predicate.p_type.is_satisfied(value, predicate.p_value) {
                return Err(ProofError::PredicateNotSatisfied(referent.to_owned()));
            }

            let sub_proof_index = sub_proofs.index_of(&credential);
            requested_proof
                .predicates
                .insert(referent.to_owned(), SubProofReferent { sub_proof_index });
        }

        let ledger = self.resolver.resolve(&sub_proofs.identifiers).await?;
        debug!(
            "building proof for {} with {} sub proofs",
            request.name,
            sub_proofs.identifiers.len()
        );

        let proof = self
            .prover
            .create_proof(
                request.to_owned(),
                requested_proof.to_owned(),
                sub_proofs.credentials,
                ledger,
            )
            .await?;

        info!("proof built for request: {}", request.name);
        Ok(PresentedProof {
            requested_proof,
            identifiers: sub_proofs.identifiers,
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use std::collections::BTreeSet;

    use rst_common::standard::async_trait::async_trait;
    use rst_common::standard::serde_json::{json, Value};
    use rst_common::with_tokio::tokio;

    use crate::fakes::FakeCredentialRepo;
    use crate::identity::verifiable::proof::{AttributeInfo, PredicateInfo, PredicateType};
    use crate::identity::verifiable::types::{
        CredentialDefinition, LedgerData, LedgerError, RevocationRegistry, Schema,
    };

    mock!(
        FakeLedger{}

        impl Clone for FakeLedger {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl LedgerBuilder for FakeLedger {
            async fn get_schema(&self, id: String) -> Result<Schema, LedgerError>;
            async fn get_credential_definition(&self, id: String) -> Result<CredentialDefinition, LedgerError>;
            async fn get_revocation_registry(&self, id: String) -> Result<RevocationRegistry, LedgerError>;
        }
    );

    mock!(
        FakeProver{}

        impl Clone for FakeProver {
            fn clone(&self) -> Self;
        }

        #[async_trait]
        impl ProverBuilder for FakeProver {
            async fn create_proof(
                &self,
                request: ProofRequestObject,
                requested_proof: RequestedProof,
                credentials: BTreeMap<String, CredentialInfo>,
                ledger: LedgerData,
            ) -> Result<Value, ProofError>;

            async fn verify_proof(
                &self,
                request: ProofRequestObject,
                proof: PresentedProof,
                ledger: LedgerData,
            ) -> Result<bool, ProofError>;
        }
    );

    const SCHEMA_ID: &str = "NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0";
    const CRED_DEF_ID: &str = "VsKV7grR1BUE29mG2Fm2kX:3:CL:NcYxiDXkpYi6ov5FcYDi1e:2:gvt:1.0:tag";

    fn ledger() -> MockFakeLedger {
        let mut ledger = MockFakeLedger::new();
        ledger.expect_get_schema().returning(|id| {
            Ok(Schema {
                id,
                name: "gvt".to_string(),
                version: "1.0".to_string(),
                attr_names: vec!["first_name".to_string(), "age".to_string()],
            })
        });

        ledger.expect_get_credential_definition().returning(|id| {
            Ok(CredentialDefinition {
                id,
                schema_id: SCHEMA_ID.to_string(),
                tag: "tag".to_string(),
                value: Value::Null,
            })
        });

        ledger
    }

    fn wallet() -> FakeCredentialRepo {
        let mut alice = BTreeMap::new();
        alice.insert("first_name".to_string(), "Alice".to_string());
        alice.insert("last_name".to_string(), "Smith".to_string());
        alice.insert("age".to_string(), "28".to_string());

        let mut young = BTreeMap::new();
        young.insert("first_name".to_string(), "Bob".to_string());
        young.insert("age".to_string(), "17".to_string());

        FakeCredentialRepo::with(vec![
            CredentialInfo::new(
                "cred-1".to_string(),
                SCHEMA_ID.to_string(),
                CRED_DEF_ID.to_string(),
                alice,
                None,
            ),
            CredentialInfo::new(
                "cred-2".to_string(),
                SCHEMA_ID.to_string(),
                CRED_DEF_ID.to_string(),
                young,
                None,
            ),
        ])
    }

    fn request() -> ProofRequestObject {
        let mut attrs = BTreeMap::new();
        attrs.insert("attr1_referent".to_string(), AttributeInfo::with_name("first_name"));
        attrs.insert(
            "attr2_referent".to_string(),
            AttributeInfo::with_names(vec!["first_name", "last_name"]),
        );

        let mut preds = BTreeMap::new();
        preds.insert(
            "predicate1_referent".to_string(),
            PredicateInfo::new("age", PredicateType::GE, 18),
        );

        ProofRequestObject::new("kyc".to_string(), attrs, preds)
    }

    mod expect_success {
        use super::*;

        #[tokio::test]
        async fn test_build_complete_selection() {
            let mut prover = MockFakeProver::new();
            prover
                .expect_create_proof()
                .times(1)
                .withf(|_, requested, credentials, ledger| {
                    requested.revealed_attrs.contains_key("attr1_referent")
                        && credentials.len() == 1
                        && ledger.schemas.contains_key(SCHEMA_ID)
                })
                .returning(|_, _, _, _| Ok(json!({"proofs": []})));

            let builder = ProofBuilder::new(wallet(), ledger(), prover);
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-1", true)
                .attribute("attr2_referent", "cred-1", true)
                .predicate("predicate1_referent", "cred-1");

            let req = request();
            let proof = builder.build(&req, &selection).await;
            assert!(!proof.is_err());

            let proof = proof.unwrap();
            assert_eq!(
                proof.attribute_referents(),
                req.requested_attributes.keys().cloned().collect::<BTreeSet<_>>()
            );
            assert_eq!(
                proof.predicate_referents(),
                req.requested_predicates.keys().cloned().collect::<BTreeSet<_>>()
            );
            assert_eq!(proof.identifiers.len(), 1);
            assert_eq!(proof.revealed_value("attr1_referent"), Some("Alice".to_string()));
            assert_eq!(
                proof.requested_proof.revealed_attr_groups["attr2_referent"].values["last_name"],
                "Smith"
            );
            assert_eq!(proof.proof, json!({"proofs": []}));
        }

        #[tokio::test]
        async fn test_build_unrevealed_attribute() {
            let mut prover = MockFakeProver::new();
            prover
                .expect_create_proof()
                .times(1)
                .returning(|_, _, _, _| Ok(json!({})));

            let builder = ProofBuilder::new(wallet(), ledger(), prover);
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-2", false)
                .attribute("attr2_referent", "cred-1", true)
                .predicate("predicate1_referent", "cred-1");

            let proof = builder.build(&request(), &selection).await.unwrap();
            assert!(proof.requested_proof.revealed_attrs.is_empty());
            assert_eq!(
                proof.requested_proof.unrevealed_attrs["attr1_referent"].sub_proof_index,
                0
            );
            assert_eq!(proof.identifiers.len(), 2);
        }
    }

    mod expect_errors {
        use super::*;

        #[tokio::test]
        async fn test_build_missing_group() {
            let mut prover = MockFakeProver::new();
            prover.expect_create_proof().times(0);

            let builder = ProofBuilder::new(wallet(), MockFakeLedger::new(), prover);
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-1", true)
                .predicate("predicate1_referent", "cred-1");

            let proof = builder.build(&request(), &selection).await;
            assert!(matches!(
                proof,
                Err(ProofError::IncompleteCredentialSelection(_))
            ));
        }

        #[tokio::test]
        async fn test_build_missing_predicate() {
            let builder = ProofBuilder::new(wallet(), MockFakeLedger::new(), MockFakeProver::new());
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-1", true)
                .attribute("attr2_referent", "cred-1", true);

            let proof = builder.build(&request(), &selection).await;
            assert!(matches!(
                proof,
                Err(ProofError::IncompleteCredentialSelection(_))
            ));
        }

        #[tokio::test]
        async fn test_build_unrequested_binding() {
            let builder = ProofBuilder::new(wallet(), MockFakeLedger::new(), MockFakeProver::new());
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-1", true)
                .attribute("attr2_referent", "cred-1", true)
                .attribute("attr9_referent", "cred-1", true)
                .predicate("predicate1_referent", "cred-1");

            let proof = builder.build(&request(), &selection).await;
            assert!(matches!(proof, Err(ProofError::ValidationError(_))));
        }

        #[tokio::test]
        async fn test_build_predicate_not_satisfied() {
            let builder = ProofBuilder::new(wallet(), MockFakeLedger::new(), MockFakeProver::new());
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-1", true)
                .attribute("attr2_referent", "cred-1", true)
                .predicate("predicate1_referent", "cred-2");

            let proof = builder.build(&request(), &selection).await;
            assert!(matches!(proof, Err(ProofError::PredicateNotSatisfied(_))));
        }

        #[tokio::test]
        async fn test_build_unknown_credential() {
            let builder = ProofBuilder::new(wallet(), MockFakeLedger::new(), MockFakeProver::new());
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-404", true)
                .attribute("attr2_referent", "cred-1", true)
                .predicate("predicate1_referent", "cred-1");

            let proof = builder.build(&request(), &selection).await;
            assert!(matches!(proof, Err(ProofError::CredentialError(_))));
        }

        #[tokio::test]
        async fn test_build_unresolvable_ledger() {
            let mut ledger = MockFakeLedger::new();
            ledger
                .expect_get_schema()
                .times(1)
                .returning(|id| Err(LedgerError::NotFound(id)));

            let mut prover = MockFakeProver::new();
            prover.expect_create_proof().times(0);

            let builder = ProofBuilder::new(wallet(), ledger, prover);
            let selection = RequestedCredentials::default()
                .attribute("attr1_referent", "cred-1", true)
                .attribute("attr2_referent", "cred-1", true)
                .predicate("predicate1_referent", "cred-1");

            let proof = builder.build(&request(), &selection).await;
            assert!(matches!(proof, Err(ProofError::LedgerResolutionError(_))));
        }
    }
}
