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

use async_trait::async_trait;
use prism_agents::{AssetManager, AssetManagerConfig};
use prism_core::{
    asset::{Asset, AssetDescriptor, AssetOptions, AssetType},
    AssetError, ConfigurationError, LoadContext,
};
use prism_infra::{HeadlessDevice, MemoryFetcher};
use prism_lanes::asset_lane::AssetLoaderLane;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// --- Test setup: a scripted asset and lane ---
#[derive(Debug, PartialEq)]
struct Payload {
    url: String,
    options: AssetOptions,
    data: Vec<u8>,
}
impl Asset for Payload {}

/// Fails URLs containing "fail", panics on "panic", sleeps for a `delay_ms`
/// option, and records what it did.
#[derive(Default)]
struct ScriptedLane {
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    buffers: Mutex<Vec<usize>>,
    finished: Mutex<Vec<String>>,
}

impl ScriptedLane {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

#[async_trait]
impl AssetLoaderLane<Payload> for Arc<ScriptedLane> {
    async fn load(
        &self,
        url: &str,
        options: &AssetOptions,
        _context: &LoadContext,
    ) -> Result<Payload, Box<dyn Error + Send + Sync>> {
        self.calls.lock().unwrap().push(url.to_owned());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = options
            .get("delay_ms")
            .and_then(|ms| ms.as_u64())
            .map_or(self.delay, Duration::from_millis);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.lock().unwrap().push(url.to_owned());

        if url.contains("panic") {
            panic!("scripted panic for {url}");
        }
        if url.contains("fail") {
            return Err(format!("scripted failure for {url}").into());
        }

        let data = url.as_bytes().to_vec();
        self.buffers.lock().unwrap().push(data.as_ptr() as usize);
        Ok(Payload {
            url: url.to_owned(),
            options: options.clone(),
            data,
        })
    }

    fn strategy_name(&self) -> &'static str {
        "ScriptedLoader"
    }
}

fn context() -> LoadContext {
    LoadContext::new(Arc::new(HeadlessDevice::new()), Arc::new(MemoryFetcher::new()))
}

fn manager(lane: &Arc<ScriptedLane>) -> AssetManager {
    let mut assets = AssetManager::new(AssetManagerConfig::default());
    assets.register_lane::<Payload>(AssetType::Json, lane.clone());
    assets
}

fn json(url: &str, x: i64) -> AssetDescriptor {
    AssetDescriptor::new(url).with_option("x", x)
}
// ---

#[tokio::test]
async fn identical_requests_load_once() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);

    let first = assets.enqueue(json("a.json", 1)).unwrap();
    let second = assets.enqueue(json("a.json", 1)).unwrap();
    assert_eq!(first, second);

    let report = assets.load(&context()).await.unwrap();
    assert_eq!(report.total, 1);
    assert_eq!(*lane.calls.lock().unwrap(), ["a.json"]);
    assert!(assets.contains(&first));
}

#[tokio::test]
async fn divergent_options_load_twice() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);

    let one = assets.enqueue(json("a.json", 1)).unwrap();
    let two = assets.enqueue(json("a.json", 2)).unwrap();
    assert_ne!(one, two);

    let report = assets.load(&context()).await.unwrap();
    assert_eq!(report.loaded, 2);

    let first = assets.get::<Payload>(&one).unwrap();
    let second = assets.get::<Payload>(&two).unwrap();
    assert_eq!(first.options.get("x"), Some(&1.into()));
    assert_eq!(second.options.get("x"), Some(&2.into()));
    assert_eq!(first.url, second.url);
}

#[tokio::test]
async fn failures_are_isolated() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);

    let ok1 = assets.enqueue("one.json").unwrap();
    let bad = assets.enqueue("fail.json").unwrap();
    let ok3 = assets.enqueue("three.json").unwrap();

    let report = assets.load(&context()).await.unwrap();

    assert_eq!(report.loaded, 2);
    assert_eq!(report.failed_keys().collect::<Vec<_>>(), [bad.as_str()]);
    assert!(report.failures[0].message.contains("scripted failure"));
    assert!(assets.get::<Payload>(&ok1).is_ok());
    assert!(assets.get::<Payload>(&ok3).is_ok());
    assert_eq!(
        assets.get::<Payload>(&bad).unwrap_err(),
        AssetError::NotFound("fail.json".into())
    );
}

#[tokio::test]
async fn panicking_lanes_are_isolated() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);

    assets.enqueue("panic.json").unwrap();
    let ok = assets.enqueue("ok.json").unwrap();

    let report = assets.load(&context()).await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("ScriptedLoader panicked"));
    assert!(assets.contains(&ok));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_never_exceeds_the_ceiling() {
    let lane = Arc::new(ScriptedLane::with_delay(Duration::from_millis(20)));
    let mut assets = manager(&lane);
    for i in 0..25 {
        assets.enqueue(format!("item-{i}.json").as_str()).unwrap();
    }

    let report = assets.load(&context()).await.unwrap();

    assert_eq!(report.loaded, 25);
    let max = lane.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 10, "observed {max} loads in flight");
    assert!(max > 1, "loads were not overlapped");
}

#[tokio::test]
async fn configured_concurrency_is_respected() {
    let lane = Arc::new(ScriptedLane::with_delay(Duration::from_millis(5)));
    let mut assets = AssetManager::new(AssetManagerConfig {
        concurrency: 2,
        ..Default::default()
    });
    assets.register_lane::<Payload>(AssetType::Json, lane.clone());
    for i in 0..6 {
        assets.enqueue(format!("item-{i}.json").as_str()).unwrap();
    }

    assets.load(&context()).await.unwrap();
    assert!(lane.max_in_flight.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_one() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    assets.add_progress_listener(move |p| sink.lock().unwrap().push(p));

    for url in ["a.json", "fail.json", "c.json", "d.json"] {
        assets.enqueue(url).unwrap();
    }
    assets.load(&context()).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 4);
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(seen.last(), Some(&1.0));
}

#[tokio::test]
async fn progress_follows_completion_order() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (sink, finished) = (seen.clone(), lane.clone());
    assets.add_progress_listener(move |p| {
        let last = finished.finished.lock().unwrap().last().cloned();
        sink.lock().unwrap().push((p, last));
    });

    assets
        .enqueue(AssetDescriptor::new("slow.json").with_option("delay_ms", 200))
        .unwrap();
    assets
        .enqueue(AssetDescriptor::new("fast.json").with_option("delay_ms", 5))
        .unwrap();
    assets.load(&context()).await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        [
            (0.5, Some("fast.json".to_owned())),
            (1.0, Some("slow.json".to_owned())),
        ]
    );
}

#[tokio::test]
async fn empty_batch_reports_completion_asynchronously() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    let (tx, mut rx) = mpsc::unbounded_channel();
    assets.add_progress_listener(move |p| {
        let _ = tx.send(p);
    });

    let report = assets.load(&context()).await.unwrap();
    assert_eq!(report.total, 0);
    // Nothing has been delivered while `load` was on the stack.
    assert!(rx.try_recv().is_err());

    assert_eq!(rx.recv().await, Some(1.0));
    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn type_inference_happens_at_enqueue() {
    let mut assets = AssetManager::default().with_default_lanes();

    let key = assets.enqueue("models/bust.glb").unwrap();
    assert_eq!(key, "models/bust.glb");
    assert_eq!(
        assets.enqueue("unknown.xyz"),
        Err(ConfigurationError::UnknownAssetType {
            url: "unknown.xyz".into()
        })
    );
    assert_eq!(assets.pending().collect::<Vec<_>>(), ["models/bust.glb"]);
}

#[tokio::test]
async fn cached_handles_share_the_lane_output() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    let key = assets.enqueue("a.json").unwrap();
    assets.load(&context()).await.unwrap();

    let first = assets.get::<Payload>(&key).unwrap();
    let second = assets.get::<Payload>(&key).unwrap();

    assert!(prism_core::asset::AssetHandle::ptr_eq(&first, &second));
    // The buffer the lane allocated is the one stored, not a copy.
    assert_eq!(
        lane.buffers.lock().unwrap()[0],
        first.data.as_ptr() as usize
    );
}

#[tokio::test]
async fn wrong_type_is_reported() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    let key = assets.enqueue("a.json").unwrap();
    assets.load(&context()).await.unwrap();

    let err = assets.get::<serde_json::Value>(&key).unwrap_err();
    assert!(matches!(err, AssetError::TypeMismatch { .. }));
    assert_eq!(assets.get_loaded(&key).unwrap().asset_type(), AssetType::Json);
}

#[tokio::test]
async fn missing_context_fails_before_draining() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    assets.enqueue("a.json").unwrap();

    let no_device = LoadContext::default().with_fetcher(Arc::new(MemoryFetcher::new()));
    assert!(matches!(
        assets.load(&no_device).await,
        Err(ConfigurationError::MissingContext(_))
    ));
    assert_eq!(assets.pending().count(), 1);
    assert!(lane.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cached_keys_are_not_reloaded() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    assets.enqueue("a.json").unwrap();
    assets.load(&context()).await.unwrap();

    assets.enqueue("a.json").unwrap();
    let report = assets.load(&context()).await.unwrap();

    assert_eq!(report.cached, 1);
    assert_eq!(report.loaded, 0);
    assert_eq!(lane.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_keys_are_retried_when_requeued() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    assets.enqueue("fail.json").unwrap();
    assets.load(&context()).await.unwrap();
    assets.enqueue("fail.json").unwrap();
    assets.load(&context()).await.unwrap();

    assert_eq!(lane.calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn load_single_never_propagates_load_failures() {
    let lane = Arc::new(ScriptedLane::default());
    let mut assets = manager(&lane);
    let context = context();

    assert_eq!(
        assets.load_single("solo.json", &context).await,
        Ok(Some("solo.json".to_owned()))
    );
    assert_eq!(assets.load_single("fail.json", &context).await, Ok(None));
    assert_eq!(assets.load_single("panic.json", &context).await, Ok(None));

    // Cached: returned without calling the lane again.
    assert_eq!(
        assets.load_single("solo.json", &context).await,
        Ok(Some("solo.json".to_owned()))
    );
    assert_eq!(lane.calls.lock().unwrap().len(), 3);

    let keyed = AssetDescriptor::new("solo.json").with_key("solo-copy");
    assert_eq!(
        assets.load_single(keyed, &context).await,
        Ok(Some("solo-copy".to_owned()))
    );
    assert_eq!(
        assets.load_single("x.unknown", &context).await,
        Err(ConfigurationError::UnknownAssetType {
            url: "x.unknown".into()
        })
    );
}
