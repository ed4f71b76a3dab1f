use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Default bound on how long a client waits for an actor to accept and answer a request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug + 'static;
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Failures of the actor runtime itself, or an entity hook rejecting the request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E: std::error::Error> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    /// The actor's mailbox stayed full; the request was never delivered.
    #[error("Actor mailbox full after {0:?}")]
    MailboxFull(Duration),
    /// The request was delivered but no reply arrived in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Rejected(E),
}

impl<E: std::error::Error> FrameworkError<E> {
    /// True when the actor may still apply the request; every other error means it did not.
    pub fn outcome_unknown(&self) -> bool {
        matches!(self, FrameworkError::Timeout(_))
    }
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    /// Apply every action in order; commit all of them or none.
    Transact {
        actions: Vec<(T::Id, T::Action)>,
        respond_to: Response<Vec<T::ActionResult>, T::Error>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item
                            .on_update(patch)
                            .map(|()| item.clone())
                            .map_err(FrameworkError::Rejected),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let result = match self.store.get(&id) {
                        Some(item) => item.on_delete().map_err(FrameworkError::Rejected),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    if result.is_ok() {
                        self.store.remove(&id);
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.handle_action(action).map_err(FrameworkError::Rejected),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Transact { actions, respond_to } => {
                    let _ = respond_to.send(self.transact(actions));
                }
            }
        }
    }

    fn create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id, params).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;
        let id = item.id().clone();
        self.store.insert(id.clone(), item);
        Ok(id)
    }

    /// Runs each action against a staged copy; the store is only touched once all succeed.
    fn transact(
        &mut self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T::Error>> {
        let mut staged: HashMap<T::Id, T> = HashMap::new();
        let mut results = Vec::with_capacity(actions.len());

        for (id, action) in actions {
            let item = match staged.entry(id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match self.store.get(&id) {
                    Some(current) => entry.insert(current.clone()),
                    None => return Err(FrameworkError::NotFound(id.to_string())),
                },
            };
            results.push(item.handle_action(action).map_err(FrameworkError::Rejected)?);
        }

        self.store.extend(staged);
        Ok(results)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    timeout: Duration,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self {
            sender,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, request: ResourceRequest<T>) -> Result<(), FrameworkError<T::Error>> {
        self.sender
            .send_timeout(request, self.timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => FrameworkError::MailboxFull(self.timeout),
                SendTimeoutError::Closed(_) => FrameworkError::ActorClosed,
            })
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.send(build(respond_to)).await?;

        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(FrameworkError::ActorDropped),
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis(), "Actor did not answer in time");
                Err(FrameworkError::Timeout(self.timeout))
            }
        }
    }

    /// Like `request`, but a reply that arrives after the timeout is handed to `on_late`
    /// instead of being lost, so the caller can settle a mutation whose outcome it never saw.
    async fn request_settled<R, F, Fut>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
        on_late: F,
    ) -> Result<R, FrameworkError<T::Error>>
    where
        R: Send + 'static,
        F: FnOnce(Result<R, FrameworkError<T::Error>>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (respond_to, mut response) = oneshot::channel();
        self.send(build(respond_to)).await?;

        match tokio::time::timeout(self.timeout, &mut response).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(FrameworkError::ActorDropped),
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis(),
                    "Actor did not answer in time, settling the outcome in the background"
                );
                tokio::spawn(async move {
                    let late = response.await.unwrap_or(Err(FrameworkError::ActorDropped));
                    on_late(late).await;
                });
                Err(FrameworkError::Timeout(self.timeout))
            }
        }
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        debug!("Sending create request");
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    pub async fn transact(
        &self,
        actions: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Transact { actions, respond_to }).await
    }

    /// `create` whose late reply, if any, goes to `on_late`.
    pub async fn create_settled<F, Fut>(&self, params: T::CreateParams, on_late: F) -> Result<T::Id, FrameworkError<T::Error>>
    where
        F: FnOnce(Result<T::Id, FrameworkError<T::Error>>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        debug!("Sending create request");
        self.request_settled(|respond_to| ResourceRequest::Create { params, respond_to }, on_late)
            .await
    }

    /// `transact` whose late reply, if any, goes to `on_late`.
    pub async fn transact_settled<F, Fut>(
        &self,
        actions: Vec<(T::Id, T::Action)>,
        on_late: F,
    ) -> Result<Vec<T::ActionResult>, FrameworkError<T::Error>>
    where
        F: FnOnce(Result<Vec<T::ActionResult>, FrameworkError<T::Error>>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.request_settled(|respond_to| ResourceRequest::Transact { actions, respond_to }, on_late)
            .await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Bin {
        id: String,
        units: u32,
    }

    #[derive(Debug)]
    struct BinCreate {
        units: u32,
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    enum BinError {
        #[error("bin {id} holds {units}, cannot take {requested}")]
        Short { id: String, units: u32, requested: u32 },
        #[error("bin {0} is pinned")]
        Pinned(String),
    }

    #[derive(Debug)]
    enum BinAction {
        Take(u32),
    }

    impl Entity for Bin {
        type Id = String;
        type CreateParams = BinCreate;
        type Patch = u32;
        type Action = BinAction;
        type ActionResult = u32;
        type Error = BinError;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create_params(id: String, params: BinCreate) -> Result<Self, BinError> {
            Ok(Self { id, units: params.units })
        }

        fn on_update(&mut self, units: u32) -> Result<(), BinError> {
            self.units = units;
            Ok(())
        }

        fn on_delete(&self) -> Result<(), BinError> {
            if self.units > 100 {
                return Err(BinError::Pinned(self.id.clone()));
            }
            Ok(())
        }

        fn handle_action(&mut self, action: BinAction) -> Result<u32, BinError> {
            match action {
                BinAction::Take(n) if n <= self.units => {
                    self.units -= n;
                    Ok(self.units)
                }
                BinAction::Take(n) => Err(BinError::Short {
                    id: self.id.clone(),
                    units: self.units,
                    requested: n,
                }),
            }
        }
    }

    fn start() -> ResourceClient<Bin> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("bin_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_action_mutates_single_entity() {
        let client = start();
        let id = client.create(BinCreate { units: 5 }).await.unwrap();

        let left = client.perform_action(id.clone(), BinAction::Take(2)).await.unwrap();
        assert_eq!(left, 3);

        let err = client.perform_action(id.clone(), BinAction::Take(4)).await.unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(BinError::Short { units: 3, .. })));
        assert_eq!(client.get(id).await.unwrap().unwrap().units, 3);
    }

    #[tokio::test]
    async fn test_transact_commits_all_or_nothing() {
        let client = start();
        let a = client.create(BinCreate { units: 5 }).await.unwrap();
        let b = client.create(BinCreate { units: 1 }).await.unwrap();

        // Second action fails, so the first must not be committed either.
        let err = client
            .transact(vec![(a.clone(), BinAction::Take(5)), (b.clone(), BinAction::Take(2))])
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(BinError::Short { .. })));
        assert_eq!(client.get(a.clone()).await.unwrap().unwrap().units, 5);
        assert_eq!(client.get(b.clone()).await.unwrap().unwrap().units, 1);

        let results = client
            .transact(vec![(a.clone(), BinAction::Take(5)), (b.clone(), BinAction::Take(1))])
            .await
            .unwrap();
        assert_eq!(results, vec![0, 0]);
        assert_eq!(client.get(a).await.unwrap().unwrap().units, 0);
    }

    #[tokio::test]
    async fn test_transact_accumulates_repeated_ids() {
        let client = start();
        let a = client.create(BinCreate { units: 3 }).await.unwrap();

        let err = client
            .transact(vec![(a.clone(), BinAction::Take(2)), (a.clone(), BinAction::Take(2))])
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::Rejected(BinError::Short { units: 1, .. })));
        assert_eq!(client.get(a).await.unwrap().unwrap().units, 3);
    }

    #[tokio::test]
    async fn test_transact_unknown_id_is_not_found() {
        let client = start();
        let a = client.create(BinCreate { units: 3 }).await.unwrap();

        let err = client
            .transact(vec![(a.clone(), BinAction::Take(1)), ("bin_99".into(), BinAction::Take(1))])
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::NotFound("bin_99".into()));
        assert_eq!(client.get(a).await.unwrap().unwrap().units, 3);
    }

    #[tokio::test]
    async fn test_delete_hook_can_veto() {
        let client = start();
        let pinned = client.create(BinCreate { units: 500 }).await.unwrap();
        let loose = client.create(BinCreate { units: 1 }).await.unwrap();

        assert!(client.delete(pinned.clone()).await.is_err());
        client.delete(loose.clone()).await.unwrap();

        let remaining = client.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, pinned);
        assert_eq!(client.delete(loose).await, Err(FrameworkError::NotFound("bin_2".into())));
    }

    #[tokio::test]
    async fn test_timeout_when_actor_never_answers() {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<Bin>>(1);
        let client = ResourceClient::new(sender).with_timeout(Duration::from_millis(20));

        // Holds the request (and its reply channel) without ever answering.
        let held = tokio::spawn(async move {
            let request = receiver.recv().await;
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(request);
        });
        let err = client.get("bin_1".into()).await.unwrap_err();
        assert_eq!(err, FrameworkError::Timeout(Duration::from_millis(20)));
        assert!(err.outcome_unknown());
        held.abort();
    }

    #[tokio::test]
    async fn test_full_mailbox_is_not_delivered() {
        let (sender, _receiver) = mpsc::channel::<ResourceRequest<Bin>>(1);
        let (respond_to, _response) = oneshot::channel();
        sender
            .try_send(ResourceRequest::Get { id: "bin_1".into(), respond_to })
            .unwrap();

        let client = ResourceClient::new(sender).with_timeout(Duration::from_millis(20));
        let err = client.get("bin_2".into()).await.unwrap_err();
        assert_eq!(err, FrameworkError::MailboxFull(Duration::from_millis(20)));
        assert!(!err.outcome_unknown());
    }

    #[tokio::test]
    async fn test_late_reply_reaches_settle_callback() {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<Bin>>(1);
        let client = ResourceClient::new(sender).with_timeout(Duration::from_millis(20));

        // Commits only after the client has given up.
        tokio::spawn(async move {
            if let Some(ResourceRequest::Create { respond_to, .. }) = receiver.recv().await {
                tokio::time::sleep(Duration::from_millis(80)).await;
                let _ = respond_to.send(Ok("bin_7".to_string()));
            }
        });

        let (settled_tx, settled_rx) = oneshot::channel();
        let err = client
            .create_settled(BinCreate { units: 1 }, move |late| async move {
                let _ = settled_tx.send(late);
            })
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::Timeout(Duration::from_millis(20)));

        let late = tokio::time::timeout(Duration::from_secs(1), settled_rx).await.unwrap().unwrap();
        assert_eq!(late, Ok("bin_7".to_string()));
    }

    #[tokio::test]
    async fn test_prompt_reply_skips_settle_callback() {
        let client = start();
        let (settled_tx, mut settled_rx) = oneshot::channel::<()>();

        let results = client
            .transact_settled(Vec::new(), move |_| async move {
                let _ = settled_tx.send(());
            })
            .await
            .unwrap();
        assert!(results.is_empty());

        // The callback was dropped unused, closing its channel.
        assert!(settled_rx.try_recv().is_err());
    }
}
