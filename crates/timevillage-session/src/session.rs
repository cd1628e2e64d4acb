//! The session: single-writer access to the ledger and the building table

use crate::config::SessionConfig;
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use timevillage_core::{
    Building, BuildingId, BuildingType, Catalog, Category, Cell, Ledger, ProgressionPolicy,
    Rejection, Subject, Subscription, TimerEngine, TimerView, Village, VillageState, VillageView,
};
use timevillage_db::Store;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub(crate) const TARGET: &str = "timevillage::session";

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One user's mutation context
///
/// Ledger and building changes are serialized through an internal writer
/// lock, so read-modify-write on the balance never interleaves. The store
/// handle is injected at construction and shared for the process lifetime.
pub struct Session {
    pub(crate) store: Arc<Store>,
    catalog: Arc<Catalog>,
    policy: Arc<dyn ProgressionPolicy>,
    pub(crate) config: SessionConfig,
    pub(crate) writer: Mutex<()>,
    pub(crate) timer: Arc<Mutex<TimerEngine>>,
    pub(crate) ticker: Mutex<Option<JoinHandle<()>>>,
    pub(crate) runtime: Option<Handle>,
    village_view: Subject<VillageView>,
    pub(crate) timer_view: Arc<Subject<TimerView>>,
    pub(crate) categories_view: Subject<Vec<Category>>,
}

impl Session {
    /// Open a session over `store`
    ///
    /// On first launch this writes the ledger row and places the MAIN
    /// building at the origin at the policy's starting level. When called
    /// inside a tokio runtime the timer is driven by a background ticker;
    /// otherwise it only advances through [`Session::tick_timer`].
    pub fn open(store: Arc<Store>, catalog: Arc<Catalog>, config: SessionConfig) -> Result<Self> {
        let policy = config.policy.build();
        let session = Self {
            store,
            catalog,
            policy,
            config,
            writer: Mutex::new(()),
            timer: Arc::new(Mutex::new(TimerEngine::new())),
            ticker: Mutex::new(None),
            runtime: Handle::try_current().ok(),
            village_view: Subject::new(),
            timer_view: Arc::new(Subject::with_value(TimerView::default())),
            categories_view: Subject::new(),
        };

        let state = {
            let _writer = lock(&session.writer);
            session.ensure_initialized()?
        };
        session.publish_village(&state);
        session.publish_categories()?;

        tracing::info!(
            target: TARGET,
            policy = ?session.policy.kind(),
            buildings = state.buildings.len(),
            balance = state.ledger.accumulated_time,
            "Session opened"
        );
        Ok(session)
    }

    fn ensure_initialized(&self) -> Result<VillageState> {
        let mut state = self.load_state()?;
        if self.store.load_ledger()?.is_none() {
            self.store.save_ledger(&state.ledger)?;
        }
        if state.main().is_none() && state.at(Cell::ORIGIN).is_none() {
            let main = Building::new(
                state.next_id(),
                BuildingType::main(),
                self.policy.starting_main_level(),
                Cell::ORIGIN,
            );
            self.store.commit_purchase(&state.ledger, &main)?;
            tracing::info!(target: TARGET, level = main.level, "Placed MAIN building");
            state.buildings.push(main);
        }
        Ok(state)
    }

    pub(crate) fn load_state(&self) -> Result<VillageState> {
        Ok(self.store.load_state(&self.config.default_nickname)?)
    }

    /// The rules table in use
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The progression policy in use
    pub fn policy(&self) -> &dyn ProgressionPolicy {
        self.policy.as_ref()
    }

    /// Settings the session was opened with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Village operations bound to this session's catalog and policy
    pub fn village(&self) -> Village<'_> {
        Village::new(&self.catalog, self.policy.as_ref())
    }

    /// Current ledger and buildings, read from the store
    pub fn state(&self) -> Result<VillageState> {
        self.load_state()
    }

    /// Current derived village view
    pub fn view(&self) -> Result<VillageView> {
        let state = self.load_state()?;
        Ok(VillageView::derive(&self.village(), &state))
    }

    /// Point read of the ledger
    pub fn ledger(&self) -> Result<Ledger> {
        Ok(self.load_state()?.ledger)
    }

    /// Whether a new building of `kind` is currently unlocked
    pub fn can_build_new(&self, kind: &BuildingType) -> Result<bool> {
        let state = self.load_state()?;
        Ok(self.village().can_build_new(&state, kind))
    }

    /// Whether the building may go up one level (ignoring balance)
    pub fn can_upgrade(&self, id: BuildingId) -> Result<bool> {
        let state = self.load_state()?;
        let building = state.get(id).ok_or(Rejection::BuildingNotFound(id))?;
        Ok(self.village().can_upgrade(&state, building))
    }

    /// Buy a level-1 building of `kind` at `cell`
    pub fn buy(&self, kind: &BuildingType, cell: Cell) -> Result<Building> {
        let _writer = lock(&self.writer);
        let mut state = self.load_state()?;

        let building = self.village().buy(&mut state, kind, cell).inspect_err(|rejection| {
            tracing::debug!(target: TARGET, %kind, %cell, reason = %rejection, "Purchase refused");
        })?;
        self.store.commit_purchase(&state.ledger, &building)?;

        tracing::info!(
            target: TARGET,
            id = %building.id,
            %kind,
            %cell,
            balance = state.ledger.accumulated_time,
            "Building placed"
        );
        self.publish_village(&state);
        Ok(building)
    }

    /// Raise a building by one level
    pub fn upgrade(&self, id: BuildingId) -> Result<Building> {
        let _writer = lock(&self.writer);
        let mut state = self.load_state()?;

        let building = self.village().upgrade(&mut state, id).inspect_err(|rejection| {
            tracing::debug!(target: TARGET, %id, reason = %rejection, "Upgrade refused");
        })?;
        self.store.commit_upgrade(&state.ledger, &building)?;

        tracing::info!(
            target: TARGET,
            %id,
            kind = %building.kind,
            level = building.level,
            balance = state.ledger.accumulated_time,
            "Building upgraded"
        );
        self.publish_village(&state);
        Ok(building)
    }

    /// Change the player's display name
    pub fn set_nickname(&self, nickname: &str) -> Result<()> {
        let _writer = lock(&self.writer);
        let mut state = self.load_state()?;
        state.ledger.nickname = nickname.trim().to_string();
        self.store.save_ledger(&state.ledger)?;
        self.publish_village(&state);
        Ok(())
    }

    /// Credit a finished timer session to the ledger
    pub(crate) fn credit(&self, seconds: u64) -> Result<Ledger> {
        let _writer = lock(&self.writer);
        let mut state = self.load_state()?;
        state.ledger.credit(seconds);
        self.store.save_ledger(&state.ledger)?;
        self.publish_village(&state);
        Ok(state.ledger)
    }

    /// Replace balances and buildings with a remote copy
    ///
    /// The local nickname is kept. Buildings receive fresh IDs in the order
    /// given. Nothing changes if any building collides with another cell.
    pub fn replace_from_remote(
        &self,
        accumulated_time: u64,
        global_time: u64,
        buildings: impl IntoIterator<Item = (BuildingType, u32, Cell)>,
    ) -> Result<VillageState> {
        let _writer = lock(&self.writer);
        let current = self.load_state()?;

        let ledger = Ledger {
            nickname: current.ledger.nickname,
            accumulated_time,
            global_time,
        };
        let buildings: Vec<Building> = buildings
            .into_iter()
            .enumerate()
            .map(|(i, (kind, level, cell))| {
                Building::new(BuildingId::new(i as u64 + 1), kind, level, cell)
            })
            .collect();

        self.store.replace_village(&ledger, &buildings)?;
        let state = VillageState::new(ledger, buildings);

        tracing::info!(
            target: TARGET,
            buildings = state.buildings.len(),
            balance = state.ledger.accumulated_time,
            "Village replaced from remote copy"
        );
        self.publish_village(&state);
        Ok(state)
    }

    fn publish_village(&self, state: &VillageState) {
        self.village_view
            .publish(VillageView::derive(&self.village(), state));
    }

    /// Live village view; the first value is the current state
    pub fn subscribe_village(&self) -> Subscription<VillageView> {
        self.village_view.subscribe()
    }

    /// Live timer view; the first value is the current state
    pub fn subscribe_timer(&self) -> Subscription<TimerView> {
        self.timer_view.subscribe()
    }

    /// Live ordered category list; the first value is the current list
    pub fn subscribe_categories(&self) -> Subscription<Vec<Category>> {
        self.categories_view.subscribe()
    }

    pub(crate) fn publish_categories(&self) -> Result<Vec<Category>> {
        let categories = self.store.load_categories()?;
        self.categories_view.publish(categories.clone());
        Ok(categories)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(ticker) = lock(&self.ticker).take() {
            ticker.abort();
        }
    }
}
