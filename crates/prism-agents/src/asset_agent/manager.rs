// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The [`AssetManager`], which queues, loads and caches assets.

use super::config::AssetManagerConfig;
use super::loader::{AnyLoaderLane, AssetLoaderLaneRegistry};
use super::queue::{AssetQueue, QueuedAsset};
use super::report::{BatchReport, LoadFailure};
use prism_core::{
    asset::{Asset, AssetDescriptor, AssetHandle, AssetType, LoadedAsset},
    AssetError, ConfigurationError, LoadContext,
};
use prism_lanes::asset_lane::{
    AssetLoaderLane, AudioLoaderLane, EnvironmentMapLoaderLane, GltfLoaderLane, ImageLoaderLane,
    JsonLoaderLane, TextureLoaderLane, VideoLoaderLane,
};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

/// A callback receiving the completed fraction of the running batch.
pub type ProgressListener = Arc<dyn Fn(f32) + Send + Sync>;

/// The result of running one item through its lane.
struct ItemOutcome {
    item: QueuedAsset,
    elapsed: Duration,
    result: Result<LoadedAsset, String>,
}

/// Renders an error together with its chain of causes.
fn describe(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Runs `item` through `lane` on its own task, so that a panicking lane
/// only fails its own item.
async fn run_item(lane: Arc<dyn AnyLoaderLane>, item: QueuedAsset, context: LoadContext) -> ItemOutcome {
    let started = Instant::now();
    let strategy = lane.strategy_name();
    let task = {
        let url = item.url.clone();
        let options = item.options.clone();
        let asset_type = item.asset_type;
        tokio::spawn(async move {
            lane.load_any(asset_type, &url, &options, &context)
                .await
                .map_err(|e| describe(&*e))
        })
    };

    let result = match task.await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => Err(format!("{strategy} panicked")),
        Err(join_error) => Err(join_error.to_string()),
    };

    ItemOutcome {
        item,
        elapsed: started.elapsed(),
        result,
    }
}

/// Queues asset requests, loads them in bounded-concurrency batches, and
/// caches the results by key.
///
/// A manager is constructed explicitly and passed to whatever needs assets.
/// Entries are never evicted; a failed load simply leaves its key absent, so
/// re-enqueueing it retries.
///
/// # Examples
///
/// ```no_run
/// # async fn run(context: prism_core::LoadContext) -> Result<(), Box<dyn std::error::Error>> {
/// use prism_agents::AssetManager;
/// use prism_core::asset::{AssetDescriptor, Texture};
///
/// let mut assets = AssetManager::default().with_default_lanes();
/// let key = assets.enqueue(AssetDescriptor::new("textures/albedo.png").with_option("flipY", false))?;
/// assets.add_progress_listener(|progress| println!("{:.0}%", progress * 100.0));
/// assets.load(&context).await?;
///
/// let albedo = assets.get::<Texture>(&key)?;
/// # let _ = albedo;
/// # Ok(())
/// # }
/// ```
pub struct AssetManager {
    config: AssetManagerConfig,
    lanes: AssetLoaderLaneRegistry,
    queue: AssetQueue,
    cache: HashMap<String, LoadedAsset>,
    listeners: Vec<ProgressListener>,
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new(AssetManagerConfig::default())
    }
}

impl fmt::Debug for AssetManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetManager")
            .field("config", &self.config)
            .field("lanes", &self.lanes.strategy_names())
            .field("pending", &self.queue.len())
            .field("cached", &self.cache.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AssetManager {
    /// Creates a manager with no lanes registered.
    pub fn new(config: AssetManagerConfig) -> Self {
        Self {
            config,
            lanes: AssetLoaderLaneRegistry::default(),
            queue: AssetQueue::default(),
            cache: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Registers the built-in lane for every [`AssetType`].
    pub fn with_default_lanes(mut self) -> Self {
        self.register_lane(AssetType::Model, GltfLoaderLane);
        self.register_lane(AssetType::Json, JsonLoaderLane);
        self.register_lane(AssetType::Image, ImageLoaderLane);
        self.register_lane(AssetType::Texture, TextureLoaderLane);
        self.register_lane(AssetType::EnvironmentMap, EnvironmentMapLoaderLane);
        self.register_lane(AssetType::Audio, AudioLoaderLane);
        self.register_lane(AssetType::Video, VideoLoaderLane);
        self
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &AssetManagerConfig {
        &self.config
    }

    /// Registers an `AssetLoaderLane` for a specific asset type, replacing
    /// the previous one.
    pub fn register_lane<A: Asset>(
        &mut self,
        asset_type: AssetType,
        lane: impl AssetLoaderLane<A> + 'static,
    ) {
        self.lanes.register::<A>(asset_type, lane);
    }

    /// Registers a callback invoked with the completed fraction of each batch.
    ///
    /// Listeners live as long as the manager.
    pub fn add_progress_listener(&mut self, listener: impl Fn(f32) + Send + Sync + 'static) {
        self.listeners.push(Arc::new(listener));
    }

    /// Resolves a descriptor's type and checks a lane exists for it.
    fn resolve(&self, descriptor: &AssetDescriptor) -> Result<AssetType, ConfigurationError> {
        if descriptor.url.trim().is_empty() {
            return Err(ConfigurationError::MissingUrl);
        }
        let asset_type = AssetType::resolve(descriptor.asset_type, &descriptor.url)?;
        if !self.lanes.contains(asset_type) {
            return Err(ConfigurationError::NoLoaderRegistered(asset_type));
        }
        Ok(asset_type)
    }

    /// Queues a descriptor for the next [`load`](Self::load) batch.
    ///
    /// Returns the key the asset will be retrievable under: the URL, the
    /// descriptor's explicit key, or a synthesized `<url>.<token>` key when
    /// the URL is already queued with different options. Queuing an identical
    /// request twice returns the same key.
    ///
    /// ## Errors
    /// * `ConfigurationError` - If the URL is empty, the type cannot be
    ///   inferred, no lane handles the type, or an explicit key is already
    ///   queued for another request.
    pub fn enqueue(
        &mut self,
        descriptor: impl Into<AssetDescriptor>,
    ) -> Result<String, ConfigurationError> {
        let descriptor = descriptor.into();
        let asset_type = self.resolve(&descriptor)?;
        let AssetDescriptor {
            url, options, key, ..
        } = descriptor;
        self.queue.push(url, asset_type, options, key)
    }

    /// Returns the asset cached under `key`.
    ///
    /// The handle shares the value the lane produced; nothing is copied.
    pub fn get<A: Asset>(&self, key: &str) -> Result<AssetHandle<A>, AssetError> {
        let loaded = self.get_loaded(key)?;
        loaded.downcast::<A>().ok_or_else(|| AssetError::TypeMismatch {
            key: key.to_owned(),
            expected: std::any::type_name::<A>(),
            found: loaded.type_name(),
        })
    }

    /// Returns the type-erased entry cached under `key`.
    pub fn get_loaded(&self, key: &str) -> Result<&LoadedAsset, AssetError> {
        self.cache
            .get(key)
            .ok_or_else(|| AssetError::NotFound(key.to_owned()))
    }

    /// Whether an asset is cached under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// The keys waiting for the next batch, in queue order.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.keys()
    }

    /// The keys currently cached, in no particular order.
    pub fn cached_keys(&self) -> impl Iterator<Item = &str> {
        self.cache.keys().map(String::as_str)
    }

    fn notify(&self, completed: usize, total: usize) {
        let progress = completed as f32 / total as f32;
        for listener in &self.listeners {
            listener(progress);
        }
    }

    /// Records a finished item in the cache and the report.
    fn settle(&mut self, outcome: ItemOutcome, report: &mut BatchReport) {
        let ItemOutcome {
            item,
            elapsed,
            result,
        } = outcome;
        match result {
            Ok(asset) => {
                if self.config.log_timings {
                    log::debug!("Loaded {} in {:?}", item.url, elapsed);
                }
                self.cache.insert(item.key, asset);
                report.loaded += 1;
            }
            Err(message) => {
                log::error!("Asset {} was not loaded: {}", item.url, message);
                report.failures.push(LoadFailure {
                    key: item.key,
                    url: item.url,
                    asset_type: item.asset_type,
                    message,
                });
            }
        }
    }

    /// Fails every item whose task was lost before it could report back.
    fn record_lost(
        &self,
        items: impl IntoIterator<Item = QueuedAsset>,
        reason: &str,
        report: &mut BatchReport,
    ) {
        for item in items {
            log::error!("Asset {} was not loaded: {}", item.url, reason);
            report.failures.push(LoadFailure {
                key: item.key,
                url: item.url,
                asset_type: item.asset_type,
                message: reason.to_owned(),
            });
        }
    }

    /// Runs one batch: drains the queue and loads every item, keeping at most
    /// `concurrency` loads in flight.
    ///
    /// Progress listeners are called after every item, in completion order.
    /// An empty batch notifies them with `1.0` from a separate task, after
    /// this call has returned. Item failures are logged and reported in the
    /// returned [`BatchReport`]; they never fail the batch.
    ///
    /// ## Errors
    /// * `ConfigurationError::MissingContext` - If the context lacks a device
    ///   or fetcher. Nothing is drained or loaded in that case.
    pub async fn load(&mut self, context: &LoadContext) -> Result<BatchReport, ConfigurationError> {
        context.validate()?;

        let started = Instant::now();
        let batch = self.queue.drain();
        let total = batch.len();
        let mut report = BatchReport::new(total);

        if batch.is_empty() {
            let listeners = self.listeners.clone();
            tokio::spawn(async move {
                for listener in &listeners {
                    listener(1.0);
                }
            });
            return Ok(report);
        }

        log::debug!("Loading a batch of {total} asset(s)");
        let concurrency = self.config.effective_concurrency();
        let mut items = batch.into_iter();
        let mut in_flight = JoinSet::new();
        let mut running = HashMap::new();
        let mut lost_reason = None;
        let mut completed = 0;

        loop {
            while in_flight.len() < concurrency {
                let Some(item) = items.next() else { break };

                if self.cache.contains_key(&item.key) {
                    log::trace!("{} is already cached", item.key);
                    report.cached += 1;
                    completed += 1;
                    self.notify(completed, total);
                    continue;
                }

                match self.lanes.get(item.asset_type) {
                    Some(lane) => {
                        running.insert(item.key.clone(), item.clone());
                        in_flight.spawn(run_item(lane, item, context.clone()));
                    }
                    None => {
                        // Unreachable through `enqueue`, which checks the registry.
                        let outcome = ItemOutcome {
                            result: Err(ConfigurationError::NoLoaderRegistered(item.asset_type)
                                .to_string()),
                            elapsed: Duration::ZERO,
                            item,
                        };
                        self.settle(outcome, &mut report);
                        completed += 1;
                        self.notify(completed, total);
                    }
                }
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            match joined {
                Ok(outcome) => {
                    running.remove(&outcome.item.key);
                    self.settle(outcome, &mut report);
                }
                // `run_item` catches lane panics itself, so this only fires if
                // the runtime is shutting down. The lost item is unknown until
                // every other task has reported.
                Err(join_error) => {
                    log::error!("An asset load task was lost: {join_error}");
                    lost_reason = Some(join_error.to_string());
                }
            }
            completed += 1;
            self.notify(completed, total);
        }

        if let Some(reason) = lost_reason {
            self.record_lost(running.into_values(), &reason, &mut report);
        }

        report.elapsed = started.elapsed();
        if report.is_complete() {
            log::info!("Assets loaded in {:?}", report.elapsed);
        } else {
            log::warn!("Could not load {} asset(s)", report.failures.len());
            for failure in &report.failures {
                log::warn!("  {} ({}): {}", failure.url, failure.asset_type, failure.message);
            }
        }
        Ok(report)
    }

    /// Loads one descriptor immediately, bypassing the queue.
    ///
    /// Returns the key on success, or `None` if the lane failed; failures are
    /// logged, never returned. An already cached key is returned without
    /// reloading. Progress listeners are not notified.
    ///
    /// ## Errors
    /// * `ConfigurationError` - For the same reasons as [`enqueue`](Self::enqueue)
    ///   and [`load`](Self::load).
    pub async fn load_single(
        &mut self,
        descriptor: impl Into<AssetDescriptor>,
        context: &LoadContext,
    ) -> Result<Option<String>, ConfigurationError> {
        context.validate()?;
        let descriptor = descriptor.into();
        let asset_type = self.resolve(&descriptor)?;
        let key = descriptor.key.unwrap_or_else(|| descriptor.url.clone());

        if self.cache.contains_key(&key) {
            return Ok(Some(key));
        }

        let Some(lane) = self.lanes.get(asset_type) else {
            return Err(ConfigurationError::NoLoaderRegistered(asset_type));
        };
        let item = QueuedAsset {
            key,
            url: descriptor.url,
            asset_type,
            options: descriptor.options,
        };
        let outcome = run_item(lane, item, context.clone()).await;
        let key = outcome.item.key.clone();
        let loaded = outcome.result.is_ok();

        let mut report = BatchReport::new(1);
        self.settle(outcome, &mut report);
        Ok(loaded.then_some(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Could not fetch a.png")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn errors_are_described_with_their_causes() {
        let error = Wrapped(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        assert_eq!(describe(&error), "Could not fetch a.png: no such file");
    }

    #[test]
    fn enqueue_requires_a_registered_lane() {
        let mut assets = AssetManager::default();
        assert_eq!(
            assets.enqueue("level.json"),
            Err(ConfigurationError::NoLoaderRegistered(AssetType::Json))
        );

        let mut assets = assets.with_default_lanes();
        assert_eq!(assets.enqueue("level.json"), Ok("level.json".to_owned()));
        assert_eq!(assets.enqueue(""), Err(ConfigurationError::MissingUrl));
    }

    #[test]
    fn lost_tasks_still_complete_the_report() {
        let assets = AssetManager::default();
        let mut report = BatchReport::new(2);
        report.loaded = 1;
        let item = QueuedAsset {
            key: "level".to_owned(),
            url: "level.json".to_owned(),
            asset_type: AssetType::Json,
            options: Default::default(),
        };

        assets.record_lost([item], "task 7 was cancelled", &mut report);

        assert_eq!(report.completed(), report.total);
        assert_eq!(report.failed_keys().collect::<Vec<_>>(), ["level"]);
        assert_eq!(report.failures[0].message, "task 7 was cancelled");
    }

    #[test]
    fn debug_output_lists_lanes() {
        let assets = AssetManager::default().with_default_lanes();
        let debug = format!("{assets:?}");
        assert!(debug.contains("TextureLoader"));
        assert!(debug.contains("pending: 0"));
    }
}
