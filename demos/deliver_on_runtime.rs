//! # Deliver-on-runtime example
//!
//! Callbacks fire on plain OS threads; one listener is delivered on the tokio
//! runtime through its own queue, another consumes a `Stream`. Diagnostics
//! are written through `tracing` by the `LogWriter`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example deliver_on_runtime --features logging
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use delegate_relay::{
    Bus, Config, DelegateProxy, DelegateSlot, Listen, LogWriter, ProxyRegistry, Relay, Role,
    WeakSlot,
};

trait SensorDelegate: Send + Sync {
    fn did_sample(&self, _sensor: &Sensor, _value: u64) {}
}

#[derive(Default)]
struct Sensor {
    delegate: WeakSlot<dyn SensorDelegate>,
}

impl Sensor {
    fn sample(&self, value: u64) {
        if let Some(d) = self.delegate.upgrade() {
            d.did_sample(self, value);
        }
    }
}

impl DelegateSlot<dyn SensorDelegate> for Sensor {
    fn delegate(&self) -> Option<Weak<dyn SensorDelegate>> {
        self.delegate.get()
    }

    fn set_delegate(&self, delegate: Option<Weak<dyn SensorDelegate>>) {
        self.delegate.set(delegate);
    }

    fn exchange_delegate<T>(
        &self,
        install: impl FnOnce(Option<Weak<dyn SensorDelegate>>) -> (Weak<dyn SensorDelegate>, T),
    ) -> T {
        self.delegate.exchange(install)
    }

    fn retain_proxy(&self, proxy: Arc<dyn Any + Send + Sync>) {
        self.delegate.retain(proxy);
    }
}

struct SensorRelays {
    did_sample: Relay<u64>,
}

impl Role<Sensor> for SensorRelays {
    type Delegate = dyn SensorDelegate;

    fn relays(bus: &Bus, cfg: &Config) -> Self {
        Self {
            did_sample: Relay::with_config("did_sample", bus, cfg),
        }
    }

    fn as_delegate(proxy: Arc<DelegateProxy<Sensor, Self>>) -> Arc<dyn SensorDelegate> {
        proxy
    }
}

impl SensorDelegate for DelegateProxy<Sensor, SensorRelays> {
    fn did_sample(&self, sensor: &Sensor, value: u64) {
        self.notify(&self.relays().did_sample, value, |d| d.did_sample(sensor, value));
    }
}

struct Totals {
    sum: AtomicU64,
}

#[async_trait]
impl Listen<u64> for Totals {
    async fn on_event(&self, value: &u64) {
        self.sum.fetch_add(*value, Ordering::Relaxed);
    }

    fn name(&self) -> &'static str {
        "totals"
    }

    fn queue_capacity(&self) -> Option<usize> {
        Some(256)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = ProxyRegistry::new(Config::default());
    let token = CancellationToken::new();
    let writer = LogWriter::new().spawn(registry.bus(), token.clone());

    let sensor = Arc::new(Sensor::default());
    let proxy = registry.get_or_create::<Sensor, SensorRelays>(&sensor);

    let totals = Arc::new(Totals {
        sum: AtomicU64::new(0),
    });
    let _totals_sub = proxy.relays().did_sample.subscribe_async(totals.clone())?;
    let mut samples = proxy.relays().did_sample.stream();

    let producer = {
        let sensor = Arc::clone(&sensor);
        std::thread::spawn(move || {
            for v in 1..=10 {
                sensor.sample(v);
            }
        })
    };

    for _ in 0..10 {
        if let Some(v) = samples.next().await {
            println!("[stream] sample={v}");
        }
    }
    producer.join().map_err(|_| "producer panicked")?;

    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("[totals] sum={}", totals.sum.load(Ordering::Relaxed));

    token.cancel();
    writer.await?;
    Ok(())
}
