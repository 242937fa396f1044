//! # Speech synthesizer example
//!
//! Wraps a toy speech synthesizer whose delegate slot is already taken by an
//! app-level delegate. The proxy fans each callback out to independent
//! listeners and the original delegate keeps working, even after the
//! registry is gone.
//!
//! ## Run
//! ```bash
//! cargo run --example speech
//! ```

use std::any::Any;
use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use delegate_relay::{
    Bus, Config, DelegateProxy, DelegateSlot, ProxyRegistry, Relay, Role, Subscriptions, WeakSlot,
};

#[derive(Clone, Debug)]
struct Utterance(Arc<str>);

trait SynthesizerDelegate: Send + Sync {
    fn did_start(&self, _synth: &Synthesizer, _utterance: &Utterance) {}
    fn did_finish(&self, _synth: &Synthesizer, _utterance: &Utterance) {}
    fn did_pause(&self, _synth: &Synthesizer, _utterance: &Utterance) {}
    fn did_continue(&self, _synth: &Synthesizer, _utterance: &Utterance) {}
    fn did_cancel(&self, _synth: &Synthesizer, _utterance: &Utterance) {}
    fn will_speak_range(&self, _synth: &Synthesizer, _range: Range<usize>, _utterance: &Utterance) {}
}

#[derive(Default)]
struct Synthesizer {
    delegate: WeakSlot<dyn SynthesizerDelegate>,
}

impl Synthesizer {
    /// Speaks `text` word by word. Pauses and resumes after `pause_after`
    /// words, and cancels instead of finishing when `cancel_after` is reached.
    fn speak(&self, text: &str, pause_after: Option<usize>, cancel_after: Option<usize>) {
        let utterance = Utterance(text.into());
        let Some(d) = self.delegate.upgrade() else {
            return;
        };
        d.did_start(self, &utterance);
        let mut start = 0;
        for (i, word) in text.split(' ').enumerate() {
            if cancel_after == Some(i) {
                d.did_cancel(self, &utterance);
                return;
            }
            if pause_after == Some(i) {
                d.did_pause(self, &utterance);
                d.did_continue(self, &utterance);
            }
            d.will_speak_range(self, start..start + word.len(), &utterance);
            start += word.len() + 1;
        }
        d.did_finish(self, &utterance);
    }
}

impl DelegateSlot<dyn SynthesizerDelegate> for Synthesizer {
    fn delegate(&self) -> Option<Weak<dyn SynthesizerDelegate>> {
        self.delegate.get()
    }

    fn set_delegate(&self, delegate: Option<Weak<dyn SynthesizerDelegate>>) {
        self.delegate.set(delegate);
    }

    fn exchange_delegate<T>(
        &self,
        install: impl FnOnce(Option<Weak<dyn SynthesizerDelegate>>) -> (Weak<dyn SynthesizerDelegate>, T),
    ) -> T {
        self.delegate.exchange(install)
    }

    fn retain_proxy(&self, proxy: Arc<dyn Any + Send + Sync>) {
        self.delegate.retain(proxy);
    }
}

struct SynthesizerRelays {
    did_start: Relay<Utterance>,
    did_finish: Relay<Utterance>,
    did_pause: Relay<Utterance>,
    did_continue: Relay<Utterance>,
    did_cancel: Relay<Utterance>,
    will_speak_range: Relay<(Range<usize>, Utterance)>,
}

impl Role<Synthesizer> for SynthesizerRelays {
    type Delegate = dyn SynthesizerDelegate;

    fn relays(bus: &Bus, cfg: &Config) -> Self {
        Self {
            did_start: Relay::with_config("did_start", bus, cfg),
            did_finish: Relay::with_config("did_finish", bus, cfg),
            did_pause: Relay::with_config("did_pause", bus, cfg),
            did_continue: Relay::with_config("did_continue", bus, cfg),
            did_cancel: Relay::with_config("did_cancel", bus, cfg),
            will_speak_range: Relay::with_config("will_speak_range", bus, cfg),
        }
    }

    fn as_delegate(proxy: Arc<DelegateProxy<Synthesizer, Self>>) -> Arc<dyn SynthesizerDelegate> {
        proxy
    }
}

impl SynthesizerDelegate for DelegateProxy<Synthesizer, SynthesizerRelays> {
    fn did_start(&self, synth: &Synthesizer, utterance: &Utterance) {
        self.notify(&self.relays().did_start, utterance.clone(), |d| {
            d.did_start(synth, utterance)
        });
    }

    fn did_finish(&self, synth: &Synthesizer, utterance: &Utterance) {
        self.notify(&self.relays().did_finish, utterance.clone(), |d| {
            d.did_finish(synth, utterance)
        });
    }

    fn did_pause(&self, synth: &Synthesizer, utterance: &Utterance) {
        self.notify(&self.relays().did_pause, utterance.clone(), |d| {
            d.did_pause(synth, utterance)
        });
    }

    fn did_continue(&self, synth: &Synthesizer, utterance: &Utterance) {
        self.notify(&self.relays().did_continue, utterance.clone(), |d| {
            d.did_continue(synth, utterance)
        });
    }

    fn did_cancel(&self, synth: &Synthesizer, utterance: &Utterance) {
        self.notify(&self.relays().did_cancel, utterance.clone(), |d| {
            d.did_cancel(synth, utterance)
        });
    }

    fn will_speak_range(&self, synth: &Synthesizer, range: Range<usize>, utterance: &Utterance) {
        self.notify(
            &self.relays().will_speak_range,
            (range.clone(), utterance.clone()),
            |d| d.will_speak_range(synth, range, utterance),
        );
    }
}

/// The delegate the app installed before anyone asked for relays.
#[derive(Default)]
struct AppDelegate {
    finished: AtomicU32,
}

impl SynthesizerDelegate for AppDelegate {
    fn did_finish(&self, _synth: &Synthesizer, utterance: &Utterance) {
        self.finished.fetch_add(1, Ordering::Relaxed);
        println!("[app] finished {:?}", utterance.0);
    }
}

fn main() {
    let registry = ProxyRegistry::new(Config::default());
    let synth = Arc::new(Synthesizer::default());

    let app = Arc::new(AppDelegate::default());
    let app_dyn: Arc<dyn SynthesizerDelegate> = app.clone();
    synth.set_delegate(Some(Arc::downgrade(&app_dyn)));

    let relays = registry.get_or_create::<Synthesizer, SynthesizerRelays>(&synth);
    let mut subs = Subscriptions::new();

    for (relay, label) in [
        (&relays.relays().did_pause, "paused"),
        (&relays.relays().did_continue, "continued"),
        (&relays.relays().did_cancel, "cancelled"),
    ] {
        relay
            .subscribe_named("status", move |u| println!("[status] {label} {:?}", u.0))
            .store_in(&mut subs);
    }

    relays
        .relays()
        .did_start
        .subscribe_named("ui", |u| println!("[ui] speaking {:?}", u.0))
        .store_in(&mut subs);
    relays
        .relays()
        .will_speak_range
        .subscribe_named("captions", |(range, u)| {
            println!("[captions] {:?}", &u.0[range.clone()]);
        })
        .store_in(&mut subs);

    synth.speak("hello delegate relays", Some(1), None);
    synth.speak("second utterance is cut short", None, Some(2));

    // The synthesizer keeps its proxy; the registry is not needed any more.
    drop(relays);
    drop(registry);
    synth.speak("still forwarding", None, None);

    println!();
    println!("Summary:");
    println!(" ├─► app delegate finished: {}", app.finished.load(Ordering::Relaxed));
    println!(" └─► listeners attached:    {}", subs.len());
}
