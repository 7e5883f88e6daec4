use std::collections::BTreeMap;

use rst_common::standard::async_trait::async_trait;
use rst_common::with_logging::log::{debug, info, warn};

use crate::identity::connection::types::{ConnectionEntityAccessor, DirectoryAPI};
use crate::identity::connection::Connection;
use crate::identity::verifiable::credential::types::RepoBuilder as CredentialRepoBuilder;
use crate::identity::verifiable::credential::{CredentialsForRequest, Matcher};
use crate::identity::verifiable::proof::types::ProverBuilder;
use crate::identity::verifiable::proof::{
    AttributeInfo, PredicateInfo, ProofBuilder, ProofRequestObject, ProofVerifier,
    RequestedCredentials,
};
use crate::identity::verifiable::types::LedgerBuilder;
use crate::messaging::message::{ProofMessage, ProofRejectionMessage, ProofRequestMessage};
use crate::messaging::types::DispatcherAPI;
use crate::messaging::{AgentMessage, MessageContext};

use super::types::{
    ExchangeAPI, ExchangeError, ExchangeEvent, HandleOutcome, ProofState, RepoBuilder,
    RequestState, Role,
};
use super::{Locker, Proof, ProofRecord, ProofRequest};

#[derive(Clone)]
pub struct Usecase<TRepo, TDispatcher, TDirectory, TCredRepo, TLedger, TProver>
where
    TRepo: RepoBuilder,
    TDispatcher: DispatcherAPI,
    TDirectory: DirectoryAPI,
    TCredRepo: CredentialRepoBuilder,
    TLedger: LedgerBuilder,
    TProver: ProverBuilder,
{
    repo: TRepo,
    dispatcher: TDispatcher,
    directory: TDirectory,
    matcher: Matcher<TCredRepo>,
    builder: ProofBuilder<TCredRepo, TLedger, TProver>,
    verifier: ProofVerifier<TLedger, TProver>,
    locker: Locker,
}

impl<TRepo, TDispatcher, TDirectory, TCredRepo, TLedger, TProver>
    Usecase<TRepo, TDispatcher, TDirectory, TCredRepo, TLedger, TProver>
where
    TRepo: RepoBuilder,
    TDispatcher: DispatcherAPI,
    TDirectory: DirectoryAPI,
    TCredRepo: CredentialRepoBuilder,
    TLedger: LedgerBuilder,
    TProver: ProverBuilder,
{
    pub fn new(
        repo: TRepo,
        dispatcher: TDispatcher,
        directory: TDirectory,
        credentials: TCredRepo,
        ledger: TLedger,
        prover: TProver,
    ) -> Self {
        Self {
            repo,
            dispatcher,
            directory,
            matcher: Matcher::new(credentials.clone()),
            builder: ProofBuilder::new(credentials, ledger.clone(), prover.clone()),
            verifier: ProofVerifier::new(ledger, prover),
            locker: Locker::new(),
        }
    }

    async fn record(
        &self,
        request: &ProofRequest,
        proof_id: Option<String>,
        event: ExchangeEvent,
    ) -> Result<(), ExchangeError> {
        let record = ProofRecord::new(
            request.get_id(),
            proof_id,
            request.get_connection_id(),
            event,
        );

        self.repo.save_record(&record).await
    }

    async fn bound_connection(&self, request: &ProofRequest) -> Result<Connection, ExchangeError> {
        let connection_id = request.get_connection_id().ok_or_else(|| {
            ExchangeError::ValidationError(format!(
                "proof request {} has no connection",
                request.get_id()
            ))
        })?;

        let connection = self.directory.get_connection(connection_id).await?;
        Ok(connection)
    }

    /// `requester_thread` loads the requester side request answered by an inbound message
    /// and checks it came over the connection the request was sent on
    async fn requester_thread(
        &self,
        connection: &Option<Connection>,
        thread_id: String,
    ) -> Result<ProofRequest, ExchangeError> {
        let request = self.repo.get_proof_request_by_id(thread_id.clone()).await?;
        if request.get_role() != Role::Requester {
            return Err(ExchangeError::ValidationError(format!(
                "thread {} is not a requester thread",
                thread_id
            )));
        }

        let sender = connection.as_ref().map(|val| val.get_id());
        if sender.is_none() || sender != request.get_connection_id() {
            return Err(ExchangeError::ValidationError(format!(
                "thread {} was answered over an unexpected connection",
                thread_id
            )));
        }

        Ok(request)
    }

    async fn dispatch_proof(
        &self,
        request: &ProofRequest,
        mut proof: Proof,
    ) -> Result<Proof, ExchangeError> {
        let connection = self.bound_connection(request).await?;
        let message = AgentMessage::Proof(ProofMessage {
            thread_id: request.get_thread_id(),
            proof: proof.get_presented(),
        });

        if let Err(err) = self.dispatcher.send(message, connection).await {
            warn!("unable to send proof {}: {}", proof.get_id(), err);
            self.record(
                request,
                Some(proof.get_id()),
                ExchangeEvent::ProofSendFailed {
                    reason: err.to_string(),
                },
            )
            .await?;

            return Err(ExchangeError::MessagingError(err));
        }

        proof.transition(ProofState::Sent)?;
        self.repo.save_proof(&proof).await?;
        self.record(request, Some(proof.get_id()), ExchangeEvent::ProofSent)
            .await?;

        info!("proof {} sent for request {}", proof.get_id(), request.get_id());
        Ok(proof)
    }
}

#[async_trait]
impl<TRepo, TDispatcher, TDirectory, TCredRepo, TLedger, TProver> ExchangeAPI
    for Usecase<TRepo, TDispatcher, TDirectory, TCredRepo, TLedger, TProver>
where
    TRepo: RepoBuilder,
    TDispatcher: DispatcherAPI,
    TDirectory: DirectoryAPI,
    TCredRepo: CredentialRepoBuilder,
    TLedger: LedgerBuilder,
    TProver: ProverBuilder,
{
    async fn create_proof_request(
        &self,
        connection_id: String,
        name: String,
        requested_attributes: BTreeMap<String, AttributeInfo>,
        requested_predicates: BTreeMap<String, PredicateInfo>,
    ) -> Result<ProofRequest, ExchangeError> {
        if connection_id.is_empty() {
            return Err(ExchangeError::ValidationError(
                "connection_id was missing".to_string(),
            ));
        }

        let connection = self.directory.get_connection(connection_id).await?;
        let object = ProofRequestObject::new(name, requested_attributes, requested_predicates);
        let request = ProofRequest::new(connection.get_id(), object);
        request.validate()?;

        self.repo.save_proof_request(&request).await?;
        self.record(&request, None, ExchangeEvent::RequestCreated)
            .await?;

        debug!("proof request {} created", request.get_id());
        Ok(request)
    }

    async fn store_proof_request(&self, request: ProofRequest) -> Result<String, ExchangeError> {
        request.validate()?;
        let _guard = self.locker.acquire(&request.get_id()).await;

        match self.repo.get_proof_request_by_id(request.get_id()).await {
            Ok(stored) if stored.get_state() != request.get_state() => {
                return Err(ExchangeError::InvalidStateTransition(format!(
                    "proof request {} is {:?}, refusing to store it as {:?}",
                    request.get_id(),
                    stored.get_state(),
                    request.get_state()
                )));
            }
            Ok(_) | Err(ExchangeError::ProofRequestNotFound(_)) => {}
            Err(err) => return Err(err),
        }

        self.repo.save_proof_request(&request).await?;
        Ok(request.get_id())
    }

    async fn send_proof_request(&self, id: String) -> Result<ProofRequest, ExchangeError> {
        let _guard = self.locker.acquire(&id).await;

        let mut request = self.repo.get_proof_request_by_id(id).await?;
        if request.get_role() != Role::Requester
            || !request.get_state().can_transition_to(&RequestState::Sent)
        {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof request {} cannot be sent from {:?}",
                request.get_id(),
                request.get_state()
            )));
        }

        let connection = self.bound_connection(&request).await?;
        let message = AgentMessage::ProofRequest(ProofRequestMessage {
            id: request.get_thread_id(),
            request: request.get_request(),
            comment: None,
        });

        if let Err(err) = self.dispatcher.send(message, connection).await {
            warn!("unable to send proof request {}: {}", request.get_id(), err);
            self.record(
                &request,
                None,
                ExchangeEvent::RequestSendFailed {
                    reason: err.to_string(),
                },
            )
            .await?;

            return Err(ExchangeError::MessagingError(err));
        }

        request.transition(RequestState::Sent)?;
        self.repo.save_proof_request(&request).await?;
        self.record(&request, None, ExchangeEvent::RequestSent)
            .await?;

        info!("proof request {} sent", request.get_id());
        Ok(request)
    }

    async fn receive_proof_request(
        &self,
        connection: Option<Connection>,
        message: ProofRequestMessage,
    ) -> Result<ProofRequest, ExchangeError> {
        if message.id.is_empty() {
            return Err(ExchangeError::ValidationError(
                "proof request thread id was missing".to_string(),
            ));
        }

        let request = ProofRequest::received(
            connection.map(|val| val.get_id()),
            message.id,
            message.request,
        );
        request.validate()?;

        self.repo.save_proof_request(&request).await?;
        self.record(&request, None, ExchangeEvent::RequestReceived)
            .await?;

        info!(
            "proof request {} received on thread {}",
            request.get_id(),
            request.get_thread_id()
        );
        Ok(request)
    }

    async fn list_credentials_for_request(
        &self,
        id: String,
        referent: Option<String>,
    ) -> Result<CredentialsForRequest, ExchangeError> {
        let request = self.repo.get_proof_request_by_id(id).await?;
        let credentials = self
            .matcher
            .list_credentials_for_request(&request.get_request(), referent)
            .await?;

        Ok(credentials)
    }

    async fn accept_proof_request(
        &self,
        id: String,
        requested_credentials: RequestedCredentials,
    ) -> Result<Proof, ExchangeError> {
        let _guard = self.locker.acquire(&id).await;

        let mut request = self.repo.get_proof_request_by_id(id).await?;
        if request.get_role() != Role::Holder
            || !request
                .get_state()
                .can_transition_to(&RequestState::Accepted)
        {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof request {} cannot be accepted from {:?}",
                request.get_id(),
                request.get_state()
            )));
        }

        let _ = self.bound_connection(&request).await?;
        let presented = self
            .builder
            .build(&request.get_request(), &requested_credentials)
            .await?;

        let proof = Proof::new(&request, presented);
        self.repo.save_proof(&proof).await?;

        request.transition(RequestState::Accepted)?;
        self.repo.save_proof_request(&request).await?;
        self.record(&request, Some(proof.get_id()), ExchangeEvent::RequestAccepted)
            .await?;

        self.dispatch_proof(&request, proof).await
    }

    async fn resend_proof(&self, proof_id: String) -> Result<Proof, ExchangeError> {
        let proof = self.repo.get_proof_by_id(proof_id).await?;
        let _guard = self.locker.acquire(&proof.get_proof_request_id()).await;

        let proof = self.repo.get_proof_by_id(proof.get_id()).await?;
        if !proof.get_state().can_transition_to(&ProofState::Sent) {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof {} cannot be sent from {:?}",
                proof.get_id(),
                proof.get_state()
            )));
        }

        let request = self
            .repo
            .get_proof_request_by_id(proof.get_proof_request_id())
            .await?;

        self.dispatch_proof(&request, proof).await
    }

    async fn reject_proof_request(
        &self,
        id: String,
        reason: Option<String>,
    ) -> Result<ProofRequest, ExchangeError> {
        let _guard = self.locker.acquire(&id).await;

        let mut request = self.repo.get_proof_request_by_id(id).await?;
        if request.get_role() != Role::Holder {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof request {} is not held by this agent",
                request.get_id()
            )));
        }

        request.transition(RequestState::Rejected)?;
        self.repo.save_proof_request(&request).await?;
        self.record(
            &request,
            None,
            ExchangeEvent::RequestRejected {
                reason: reason.clone(),
            },
        )
        .await?;

        let connection = match self.bound_connection(&request).await {
            Ok(connection) => connection,
            Err(err) => {
                warn!(
                    "rejection of {} not notified, no connection: {}",
                    request.get_id(),
                    err
                );
                return Ok(request);
            }
        };

        let message = AgentMessage::ProofRejection(ProofRejectionMessage {
            thread_id: request.get_thread_id(),
            reason,
        });

        if let Err(err) = self.dispatcher.send(message, connection).await {
            warn!("unable to notify rejection of {}: {}", request.get_id(), err);
            self.record(
                &request,
                None,
                ExchangeEvent::RejectionSendFailed {
                    reason: err.to_string(),
                },
            )
            .await?;
        }

        Ok(request)
    }

    async fn receive_proof(
        &self,
        connection: Option<Connection>,
        message: ProofMessage,
    ) -> Result<Proof, ExchangeError> {
        let _guard = self.locker.acquire(&message.thread_id).await;

        let request = self
            .requester_thread(&connection, message.thread_id.clone())
            .await?;

        if request.get_state() != RequestState::Sent {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof request {} does not wait for a proof, state {:?}",
                request.get_id(),
                request.get_state()
            )));
        }

        let settled = self
            .repo
            .list_records_by_request(request.get_id())
            .await?
            .iter()
            .any(|record| record.get_event().settles_proof());
        if settled {
            return Err(ExchangeError::InvalidStateTransition(format!(
                "proof request {} already has a verification verdict",
                request.get_id()
            )));
        }

        let mut proof = Proof::received(&request, message.proof);
        self.repo.save_proof(&proof).await?;

        let verified = match self
            .verifier
            .verify(&request.get_request(), &proof.get_presented())
            .await
        {
            Ok(verified) => verified,
            Err(err) => {
                warn!("unable to verify proof {}: {}", proof.get_id(), err);
                self.record(
                    &request,
                    Some(proof.get_id()),
                    ExchangeEvent::ProofVerificationError {
                        reason: err.to_string(),
                    },
                )
                .await?;

                return Err(ExchangeError::ProofError(err));
            }
        };

        let (state, event) = if verified {
            (ProofState::Verified, ExchangeEvent::ProofVerified)
        } else {
            (
                ProofState::VerificationFailed,
                ExchangeEvent::ProofVerificationFailed,
            )
        };

        proof.transition(state)?;
        self.repo.save_proof(&proof).await?;
        self.record(&request, Some(proof.get_id()), event).await?;

        info!(
            "proof {} for request {} verified: {}",
            proof.get_id(),
            request.get_id(),
            verified
        );
        Ok(proof)
    }

    async fn receive_rejection(
        &self,
        connection: Option<Connection>,
        message: ProofRejectionMessage,
    ) -> Result<ProofRequest, ExchangeError> {
        let _guard = self.locker.acquire(&message.thread_id).await;

        let mut request = self
            .requester_thread(&connection, message.thread_id.clone())
            .await?;

        request.transition(RequestState::Rejected)?;
        self.repo.save_proof_request(&request).await?;
        self.record(
            &request,
            None,
            ExchangeEvent::RemoteRejected {
                reason: message.reason,
            },
        )
        .await?;

        info!("proof request {} rejected by the holder", request.get_id());
        Ok(request)
    }

    async fn handle(&self, context: MessageContext) -> Result<HandleOutcome, ExchangeError> {
        let connection = context.get_connection();

        match context.get_message().to_owned() {
            AgentMessage::ProofRequest(message) => self
                .receive_proof_request(connection, message)
                .await
                .map(HandleOutcome::RequestReceived),
            AgentMessage::Proof(message) => self
                .receive_proof(connection, message)
                .await
                .map(HandleOutcome::ProofReceived),
            AgentMessage::ProofRejection(message) => self
                .receive_rejection(connection, message)
                .await
                .map(HandleOutcome::RejectionReceived),
            other => Err(ExchangeError::UnsupportedMessage(
                other.message_type().name().to_string(),
            )),
        }
    }

    async fn get_proof_request(&self, id: String) -> Result<ProofRequest, ExchangeError> {
        self.repo.get_proof_request_by_id(id).await
    }

    async fn list_proof_requests(&self) -> Result<Vec<ProofRequest>, ExchangeError> {
        self.repo.list_proof_requests().await
    }

    async fn get_proof(&self, id: String) -> Result<Proof, ExchangeError> {
        self.repo.get_proof_by_id(id).await
    }

    async fn list_records(&self, request_id: String) -> Result<Vec<ProofRecord>, ExchangeError> {
        self.repo.list_records_by_request(request_id).await
    }
}
